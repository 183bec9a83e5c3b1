//! Independent spectrum runs evaluated in parallel.
//!
//! Every run owns its state, basis and accumulator; only the immutable field
//! values and configuration are shared across worker threads.

use crate::error::Result;
use crate::estimator::{lyapunov_spectrum, LyapunovSpectrum, RunConfig};
use crate::traits::{State, VectorField};
use rayon::prelude::*;
use tracing::debug;

/// One parameter value of a sweep and the outcome of its run.
#[derive(Debug)]
pub struct SweepPoint {
    pub parameter: f64,
    pub outcome: Result<LyapunovSpectrum>,
}

/// Runs the estimator once per field, in parallel, preserving input order.
pub fn sweep<F>(fields: &[F], config: RunConfig, initial_state: &State) -> Vec<Result<LyapunovSpectrum>>
where
    F: VectorField + Sync,
{
    debug!(runs = fields.len(), "starting sweep");
    fields
        .par_iter()
        .map(|field| lyapunov_spectrum(field, config, initial_state))
        .collect()
}

/// Builds one field per parameter value with `build` and sweeps them.
pub fn sweep_parameter<F, B>(
    values: &[f64],
    build: B,
    config: RunConfig,
    initial_state: &State,
) -> Vec<SweepPoint>
where
    F: VectorField,
    B: Fn(f64) -> F + Sync,
{
    debug!(runs = values.len(), "starting parameter sweep");
    values
        .par_iter()
        .map(|&parameter| SweepPoint {
            parameter,
            outcome: lyapunov_spectrum(&build(parameter), config, initial_state),
        })
        .collect()
}

/// `count` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|i| start + step * i as f64).collect()
        }
    }
}
