use nalgebra::Vector3;

/// Dimension of the phase space handled by the engine.
pub const DIM: usize = 3;

/// A point in phase space.
pub type State = Vector3<f64>;

/// A displacement in the tangent space at the current state.
pub type TangentVector = Vector3<f64>;

/// The tracked tangent directions, index 0 being the fastest growing.
pub type TangentBasis = [TangentVector; DIM];

/// Returns the standard orthonormal basis `e_0, e_1, e_2`.
pub fn standard_basis() -> TangentBasis {
    [Vector3::x(), Vector3::y(), Vector3::z()]
}

/// Represents a continuous-time flow together with its linearization.
///
/// The struct implementing this trait carries the flow's coefficients, so the
/// parameters stay fixed for as long as the value is borrowed by a run.
pub trait VectorField {
    /// Evaluates the time derivative of the flow at `state`.
    fn derivative(&self, state: &State) -> State;

    /// Evaluates `J(state) * tangent`, the derivative of a tangent vector under
    /// the flow's linearization. Implementations should be analytic rather than
    /// finite-difference approximations.
    fn linearized_derivative(&self, state: &State, tangent: &TangentVector) -> TangentVector;

    /// Closed-form trace of the Jacobian, when it does not depend on the state.
    fn contraction_rate(&self) -> Option<f64> {
        None
    }

    /// Trace of the Jacobian at `state`.
    fn jacobian_trace(&self, state: &State) -> f64 {
        standard_basis()
            .iter()
            .map(|e| e.dot(&self.linearized_derivative(state, e)))
            .sum()
    }
}
