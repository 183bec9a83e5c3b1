//! Concrete three-dimensional flows.
//!
//! Each struct doubles as the immutable parameter record of its flow. The
//! quadratic flows implement [`VectorField`] with hand-written linearizations
//! and [`GenericField`] so the two can be checked against each other.

use crate::autodiff::{FieldScalar, GenericField};
use crate::traits::{State, TangentVector, VectorField, DIM};
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// Six-coefficient quadratic flow
///
/// ```text
/// x' = alpha*y*z - gamma*x
/// y' = mu*(y + z) - beta*x*z
/// z' = delta*y - lambda*z
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LorenzLike {
    pub alpha: f64,
    pub gamma: f64,
    pub mu: f64,
    pub beta: f64,
    pub delta: f64,
    pub lambda: f64,
}

impl Default for LorenzLike {
    fn default() -> Self {
        Self {
            alpha: 5.0,
            gamma: 1.0,
            mu: 2.2,
            beta: 8.0,
            delta: 1.0,
            lambda: 6.39,
        }
    }
}

impl VectorField for LorenzLike {
    fn derivative(&self, s: &State) -> State {
        State::new(
            self.alpha * s.y * s.z - self.gamma * s.x,
            self.mu * (s.y + s.z) - self.beta * s.x * s.z,
            self.delta * s.y - self.lambda * s.z,
        )
    }

    fn linearized_derivative(&self, s: &State, d: &TangentVector) -> TangentVector {
        TangentVector::new(
            self.alpha * (s.y * d.z + s.z * d.y) - self.gamma * d.x,
            self.mu * (d.y + d.z) - self.beta * (s.x * d.z + s.z * d.x),
            self.delta * d.y - self.lambda * d.z,
        )
    }

    fn contraction_rate(&self) -> Option<f64> {
        Some(self.mu - self.gamma - self.lambda)
    }
}

impl GenericField for LorenzLike {
    fn eval<T: FieldScalar>(&self, s: &[T; DIM]) -> [T; DIM] {
        let c = T::constant;
        let (x, y, z) = (s[0], s[1], s[2]);
        [
            c(self.alpha) * y * z - c(self.gamma) * x,
            c(self.mu) * (y + z) - c(self.beta) * x * z,
            c(self.delta) * y - c(self.lambda) * z,
        ]
    }

    fn contraction_rate(&self) -> Option<f64> {
        VectorField::contraction_rate(self)
    }
}

/// The classical Lorenz flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lorenz {
    pub sigma: f64,
    pub rho: f64,
    pub beta: f64,
}

impl Default for Lorenz {
    fn default() -> Self {
        Self {
            sigma: 10.0,
            rho: 28.0,
            beta: 8.0 / 3.0,
        }
    }
}

impl VectorField for Lorenz {
    fn derivative(&self, s: &State) -> State {
        State::new(
            self.sigma * (s.y - s.x),
            s.x * (self.rho - s.z) - s.y,
            s.x * s.y - self.beta * s.z,
        )
    }

    fn linearized_derivative(&self, s: &State, d: &TangentVector) -> TangentVector {
        TangentVector::new(
            self.sigma * (d.y - d.x),
            (self.rho - s.z) * d.x - d.y - s.x * d.z,
            s.y * d.x + s.x * d.y - self.beta * d.z,
        )
    }

    fn contraction_rate(&self) -> Option<f64> {
        Some(-self.sigma - 1.0 - self.beta)
    }
}

impl GenericField for Lorenz {
    fn eval<T: FieldScalar>(&self, s: &[T; DIM]) -> [T; DIM] {
        let c = T::constant;
        let (x, y, z) = (s[0], s[1], s[2]);
        [
            c(self.sigma) * (y - x),
            x * (c(self.rho) - z) - y,
            x * y - c(self.beta) * z,
        ]
    }

    fn contraction_rate(&self) -> Option<f64> {
        VectorField::contraction_rate(self)
    }
}

/// The Rössler flow. Its Jacobian trace `a + x - c` depends on the state, so
/// no closed-form contraction rate is offered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rossler {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Default for Rossler {
    fn default() -> Self {
        Self {
            a: 0.2,
            b: 0.2,
            c: 5.7,
        }
    }
}

impl GenericField for Rossler {
    fn eval<T: FieldScalar>(&self, s: &[T; DIM]) -> [T; DIM] {
        let k = T::constant;
        let (x, y, z) = (s[0], s[1], s[2]);
        [-y - z, x + k(self.a) * y, k(self.b) + z * (x - k(self.c))]
    }
}

/// Linear flow `x' = A x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Linear {
    pub matrix: Matrix3<f64>,
}

impl Linear {
    pub fn new(matrix: Matrix3<f64>) -> Self {
        Self { matrix }
    }

    pub fn diagonal(rates: [f64; DIM]) -> Self {
        Self::new(Matrix3::from_diagonal(&State::from(rates)))
    }

    /// The field `f(x) = 0`.
    pub fn zero() -> Self {
        Self::new(Matrix3::zeros())
    }
}

impl VectorField for Linear {
    fn derivative(&self, state: &State) -> State {
        self.matrix * state
    }

    fn linearized_derivative(&self, _state: &State, tangent: &TangentVector) -> TangentVector {
        self.matrix * tangent
    }

    fn contraction_rate(&self) -> Option<f64> {
        Some(self.matrix.trace())
    }
}

#[cfg(test)]
mod tests {
    use super::{Linear, Lorenz, LorenzLike, Rossler};
    use crate::autodiff::Linearized;
    use crate::traits::{State, TangentVector, VectorField};

    fn probe_points() -> Vec<(State, TangentVector)> {
        vec![
            (State::new(1.0, 1.0, 1.0), TangentVector::new(1.0, 0.0, 0.0)),
            (State::new(-3.2, 4.5, 17.0), TangentVector::new(0.3, -0.7, 0.2)),
            (State::new(0.01, -8.0, 2.5), TangentVector::new(-1.0, 2.0, 5.0)),
        ]
    }

    fn assert_linearization_is_exact<F>(analytic: &F, reference: &Linearized<F>)
    where
        F: VectorField + crate::autodiff::GenericField,
    {
        for (state, tangent) in probe_points() {
            let lhs = analytic.linearized_derivative(&state, &tangent);
            let rhs = reference.linearized_derivative(&state, &tangent);
            assert!(
                (lhs - rhs).norm() < 1e-12,
                "linearization mismatch at {state:?}: {lhs:?} vs {rhs:?}"
            );
            let f_lhs = analytic.derivative(&state);
            let f_rhs = reference.derivative(&state);
            assert!((f_lhs - f_rhs).norm() < 1e-12);
        }
    }

    #[test]
    fn lorenz_like_linearization_matches_dual_jvp() {
        let field = LorenzLike::default();
        assert_linearization_is_exact(&field, &Linearized(field));
    }

    #[test]
    fn lorenz_linearization_matches_dual_jvp() {
        let field = Lorenz::default();
        assert_linearization_is_exact(&field, &Linearized(field));
    }

    #[test]
    fn closed_form_contraction_matches_trace() {
        let like = LorenzLike::default();
        let lorenz = Lorenz::default();
        for (state, _) in probe_points() {
            assert!((like.jacobian_trace(&state) - (2.2 - 1.0 - 6.39)).abs() < 1e-12);
            assert!((lorenz.jacobian_trace(&state) + 13.0 + 2.0 / 3.0).abs() < 1e-12);
        }
        assert_eq!(like.contraction_rate(), Some(2.2 - 1.0 - 6.39));
    }

    #[test]
    fn rossler_trace_depends_on_state() {
        let field = Linearized(Rossler::default());
        assert!(field.contraction_rate().is_none());
        let trace = field.jacobian_trace(&State::new(2.0, 0.0, 0.0));
        assert!((trace - (0.2 + 2.0 - 5.7)).abs() < 1e-12);
    }

    #[test]
    fn linear_field_trace_and_zero_field() {
        let field = Linear::diagonal([-1.0, -2.0, -3.0]);
        assert_eq!(field.contraction_rate(), Some(-6.0));
        let zero = Linear::zero();
        assert_eq!(zero.derivative(&State::new(4.0, 5.0, 6.0)), State::zeros());
    }
}
