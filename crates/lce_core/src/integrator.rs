use crate::error::{LceError, Result};
use crate::traits::{State, TangentBasis, TangentVector, VectorField};
use serde::{Deserialize, Serialize};

/// How tangent vectors are stepped alongside the trajectory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TangentScheme {
    /// Advance the state first, then step every tangent vector with the
    /// linearization frozen at the advanced state.
    #[default]
    FrozenBase,
    /// Joint RK4 step: each tangent stage uses the linearization at the
    /// matching intermediate stage state of the trajectory.
    StageCoupled,
}

pub(crate) fn check_step(dt: f64) -> Result<()> {
    if !(dt > 0.0) || !dt.is_finite() {
        return Err(LceError::InvalidConfiguration(format!(
            "Step size dt must be positive and finite, got {dt}."
        )));
    }
    Ok(())
}

// y_next = y + (k1 + 2k2 + 2k3 + k4) / 6
fn combine(y: &State, k1: &State, k2: &State, k3: &State, k4: &State) -> State {
    y + (k1 + k2 * 2.0 + k3 * 2.0 + k4) / 6.0
}

/// Classic fourth-order Runge-Kutta step of the nonlinear flow.
pub fn advance<F: VectorField>(field: &F, state: &State, dt: f64) -> Result<State> {
    check_step(dt)?;
    Ok(rk4_state(field, state, dt))
}

/// Fourth-order Runge-Kutta step of a tangent vector, with the linearization
/// evaluated at the fixed `state` for all four stages.
pub fn advance_tangent<F: VectorField>(
    field: &F,
    state: &State,
    tangent: &TangentVector,
    dt: f64,
) -> Result<TangentVector> {
    check_step(dt)?;
    Ok(rk4_tangent(field, state, tangent, dt))
}

fn rk4_state<F: VectorField>(field: &F, y: &State, dt: f64) -> State {
    let k1 = field.derivative(y) * dt;
    let k2 = field.derivative(&(y + k1 * 0.5)) * dt;
    let k3 = field.derivative(&(y + k2 * 0.5)) * dt;
    let k4 = field.derivative(&(y + k3)) * dt;
    combine(y, &k1, &k2, &k3, &k4)
}

fn rk4_tangent<F: VectorField>(field: &F, base: &State, v: &TangentVector, dt: f64) -> TangentVector {
    let k1 = field.linearized_derivative(base, v) * dt;
    let k2 = field.linearized_derivative(base, &(v + k1 * 0.5)) * dt;
    let k3 = field.linearized_derivative(base, &(v + k2 * 0.5)) * dt;
    let k4 = field.linearized_derivative(base, &(v + k3)) * dt;
    combine(v, &k1, &k2, &k3, &k4)
}

/// Advances the state and every tangent vector of `basis` by one step of `dt`.
pub fn co_advance<F: VectorField>(
    field: &F,
    scheme: TangentScheme,
    state: &mut State,
    basis: &mut TangentBasis,
    dt: f64,
) -> Result<()> {
    check_step(dt)?;
    match scheme {
        TangentScheme::FrozenBase => {
            *state = rk4_state(field, state, dt);
            for v in basis.iter_mut() {
                *v = rk4_tangent(field, state, v, dt);
            }
        }
        TangentScheme::StageCoupled => {
            let y = *state;
            let k1 = field.derivative(&y) * dt;
            let s2 = y + k1 * 0.5;
            let k2 = field.derivative(&s2) * dt;
            let s3 = y + k2 * 0.5;
            let k3 = field.derivative(&s3) * dt;
            let s4 = y + k3;
            let k4 = field.derivative(&s4) * dt;

            for v in basis.iter_mut() {
                let l1 = field.linearized_derivative(&y, v) * dt;
                let l2 = field.linearized_derivative(&s2, &(*v + l1 * 0.5)) * dt;
                let l3 = field.linearized_derivative(&s3, &(*v + l2 * 0.5)) * dt;
                let l4 = field.linearized_derivative(&s4, &(*v + l3)) * dt;
                *v = combine(v, &l1, &l2, &l3, &l4);
            }
            *state = combine(&y, &k1, &k2, &k3, &k4);
        }
    }
    Ok(())
}

/// Integrates the trajectory alone, discarding `transient_steps` states and
/// returning the following `steps + 1` states (starting point included).
pub fn sample_orbit<F: VectorField>(
    field: &F,
    initial: &State,
    dt: f64,
    transient_steps: usize,
    steps: usize,
) -> Result<Vec<State>> {
    check_step(dt)?;
    let mut state = *initial;
    for _ in 0..transient_steps {
        state = rk4_state(field, &state, dt);
    }

    let mut orbit = Vec::with_capacity(steps + 1);
    orbit.push(state);
    for n in 0..steps {
        state = rk4_state(field, &state, dt);
        if !state.iter().all(|v| v.is_finite()) {
            return Err(LceError::NumericOverflow(format!(
                "Trajectory left the finite range at orbit step {n}."
            )));
        }
        orbit.push(state);
    }
    Ok(orbit)
}
