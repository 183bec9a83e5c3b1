//! Pull-back estimation of the Lyapunov spectrum.
//!
//! A run has three strictly sequential phases:
//!
//! 1. **Transient**: the trajectory alone is advanced `transients` steps so it
//!    settles onto the attractor.
//! 2. **Alignment**: the tangent basis is introduced and co-evolved for
//!    `transients` pull-back intervals, re-orthonormalizing after each one and
//!    discarding the growth factors, so the basis aligns with the flow's
//!    stable and unstable directions.
//! 3. **Accumulation**: the same loop runs for `pullbacks` further intervals,
//!    this time summing `ln(factor[k])` for every direction `k`.
//!
//! The sums divided by the elapsed accumulation time are the exponents. They
//! are expected in non-increasing order; an unordered result points to too
//! short a burn-in or too long a pull-back interval and is reported with a
//! warning rather than re-sorted, since each slot measures a specific
//! direction.

use crate::error::{LceError, Phase, Result};
use crate::integrator::{advance, check_step, co_advance, TangentScheme};
use crate::orthonormalize::orthonormalize;
use crate::traits::{standard_basis, State, TangentBasis, VectorField, DIM};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

/// Fixed settings of one estimation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Integrator step size.
    pub dt: f64,
    /// Trajectory burn-in steps, and also the number of alignment pull-backs.
    pub transients: usize,
    /// Integrator steps between re-orthonormalizations.
    pub steps_per_pullback: usize,
    /// Pull-back intervals accumulated into the exponents.
    pub pullbacks: usize,
    #[serde(default)]
    pub scheme: TangentScheme,
    /// Keep every state visited during accumulation.
    #[serde(default)]
    pub retain_trajectory: bool,
}

impl RunConfig {
    pub fn new(dt: f64, transients: usize, steps_per_pullback: usize, pullbacks: usize) -> Self {
        Self {
            dt,
            transients,
            steps_per_pullback,
            pullbacks,
            scheme: TangentScheme::FrozenBase,
            retain_trajectory: false,
        }
    }

    pub fn with_scheme(mut self, scheme: TangentScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn retaining_trajectory(mut self) -> Self {
        self.retain_trajectory = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_step(self.dt)?;
        if self.steps_per_pullback == 0 {
            return Err(LceError::InvalidConfiguration(
                "steps_per_pullback must be at least 1.".into(),
            ));
        }
        if self.pullbacks == 0 {
            return Err(LceError::InvalidConfiguration(
                "Spectrum estimation requires at least one accumulated pull-back.".into(),
            ));
        }
        if self.steps_per_pullback.checked_mul(self.pullbacks).is_none() {
            return Err(LceError::InvalidConfiguration(
                "Requested step count overflows usize.".into(),
            ));
        }
        Ok(())
    }

    /// Elapsed time covered by the accumulation phase.
    pub fn integration_time(&self) -> f64 {
        self.dt * self.steps_per_pullback as f64 * self.pullbacks as f64
    }
}

/// Output of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct LyapunovSpectrum {
    /// Exponent rates, slot 0 measuring the fastest-growing direction.
    pub exponents: [f64; DIM],
    pub integration_time: f64,
    pub pullbacks: usize,
    /// Time average of the Jacobian trace over the accumulation trajectory.
    pub mean_trace: f64,
    pub final_state: State,
    pub final_basis: TangentBasis,
    /// States visited during accumulation, empty unless requested.
    pub trajectory: Vec<State>,
}

impl LyapunovSpectrum {
    pub fn sum(&self) -> f64 {
        self.exponents.iter().sum()
    }

    /// Whether the exponents are non-increasing.
    pub fn is_ordered(&self) -> bool {
        self.exponents.windows(2).all(|w| w[0] >= w[1])
    }
}

/// Runs the pull-back method for a field and configuration. Holds no mutable
/// state, so one estimator can serve any number of runs.
pub struct LyapunovEstimator<'a, F> {
    field: &'a F,
    config: RunConfig,
    initial_basis: TangentBasis,
}

impl<'a, F: VectorField> LyapunovEstimator<'a, F> {
    pub fn new(field: &'a F, config: RunConfig) -> Self {
        Self {
            field,
            config,
            initial_basis: standard_basis(),
        }
    }

    /// Replaces the standard basis the alignment phase starts from.
    pub fn with_initial_basis(mut self, basis: TangentBasis) -> Self {
        self.initial_basis = basis;
        self
    }

    pub fn run(&self, initial_state: &State) -> Result<LyapunovSpectrum> {
        let cfg = &self.config;
        cfg.validate()?;
        if !is_finite(initial_state) {
            return Err(LceError::InvalidConfiguration(format!(
                "Initial state must be finite, got {:?}.",
                initial_state.as_slice()
            )));
        }

        debug!(steps = cfg.transients, dt = cfg.dt, "trajectory burn-in");
        let mut state = *initial_state;
        for step in 0..cfg.transients {
            state = advance(self.field, &state, cfg.dt)
                .and_then(|next| ensure_finite_state(&next).map(|_| next))
                .map_err(|e| e.at(Phase::Transient, step))?;
        }

        debug!(pullbacks = cfg.transients, "aligning tangent basis");
        let mut basis = self.initial_basis;
        for pullback in 0..cfg.transients {
            self.pullback_interval(&mut state, &mut basis, Phase::Alignment, pullback, |_| {})?;
        }

        debug!(pullbacks = cfg.pullbacks, "accumulating growth factors");
        let mut sums = [0.0; DIM];
        let mut trace_sum = 0.0;
        let mut trajectory = if cfg.retain_trajectory {
            Vec::with_capacity(cfg.pullbacks * cfg.steps_per_pullback)
        } else {
            Vec::new()
        };
        for pullback in 0..cfg.pullbacks {
            let factors = self.pullback_interval(
                &mut state,
                &mut basis,
                Phase::Accumulation,
                pullback,
                |s| {
                    trace_sum += self.field.jacobian_trace(s);
                    if cfg.retain_trajectory {
                        trajectory.push(*s);
                    }
                },
            )?;
            for (sum, factor) in sums.iter_mut().zip(factors) {
                *sum += factor.ln();
            }
            trace!(pullback, ?factors, "pull-back");
        }

        let integration_time = cfg.integration_time();
        let exponents = sums.map(|sum| sum / integration_time);
        let spectrum = LyapunovSpectrum {
            exponents,
            integration_time,
            pullbacks: cfg.pullbacks,
            mean_trace: trace_sum / (cfg.pullbacks * cfg.steps_per_pullback) as f64,
            final_state: state,
            final_basis: basis,
            trajectory,
        };

        if !spectrum.is_ordered() {
            warn!(
                ?exponents,
                "exponents are not non-increasing; burn-in may be too short or the pull-back interval too coarse"
            );
        }
        info!(?exponents, integration_time, "spectrum estimated");
        Ok(spectrum)
    }

    /// Co-advances state and basis for one pull-back interval, then re-bases.
    fn pullback_interval(
        &self,
        state: &mut State,
        basis: &mut TangentBasis,
        phase: Phase,
        pullback: usize,
        mut observe: impl FnMut(&State),
    ) -> Result<[f64; DIM]> {
        let cfg = &self.config;
        let first = pullback * cfg.steps_per_pullback;
        for i in 0..cfg.steps_per_pullback {
            co_advance(self.field, cfg.scheme, state, basis, cfg.dt)
                .and_then(|_| ensure_finite_state(state))
                .and_then(|_| ensure_finite_basis(basis))
                .map_err(|e| e.at(phase, first + i))?;
            observe(state);
        }
        orthonormalize(basis).map_err(|e| e.at(phase, first + cfg.steps_per_pullback - 1))
    }
}

/// Estimates the spectrum with the standard initial tangent basis.
pub fn lyapunov_spectrum<F: VectorField>(
    field: &F,
    config: RunConfig,
    initial_state: &State,
) -> Result<LyapunovSpectrum> {
    LyapunovEstimator::new(field, config).run(initial_state)
}

fn is_finite(state: &State) -> bool {
    state.iter().all(|v| v.is_finite())
}

fn ensure_finite_state(state: &State) -> Result<()> {
    if is_finite(state) {
        Ok(())
    } else {
        Err(LceError::NumericOverflow(format!(
            "Trajectory reached non-finite state {:?}.",
            state.as_slice()
        )))
    }
}

fn ensure_finite_basis(basis: &TangentBasis) -> Result<()> {
    match basis.iter().position(|v| !is_finite(v)) {
        None => Ok(()),
        Some(index) => Err(LceError::NumericOverflow(format!(
            "Tangent direction {index} reached non-finite value {:?}.",
            basis[index].as_slice()
        ))),
    }
}
