//! Spectrum, orbit and sweep runners.

use crate::config::ExperimentConfig;
use crate::system::FieldSpec;
use anyhow::{Context, Result};
use lce_core::diagnostics::Diagnostics;
use lce_core::integrator::sample_orbit;
use lce_core::sweep::{linspace, sweep_parameter};
use lce_core::{LyapunovEstimator, LyapunovSpectrum, RunConfig, State};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub field: FieldSpec,
    pub run: RunConfig,
    pub initial_state: [f64; 3],
    pub spectrum: LyapunovSpectrum,
    pub diagnostics: Diagnostics,
}

pub fn run_spectrum(config: &ExperimentConfig) -> Result<RunReport> {
    info!(field = config.field.name(), "estimating Lyapunov spectrum");
    let spectrum = LyapunovEstimator::new(&config.field, config.run)
        .run(&config.initial_state())
        .context("Lyapunov spectrum estimation failed.")?;
    let diagnostics = Diagnostics::from_spectrum(&config.field, &spectrum)
        .context("Failed to derive diagnostics from the spectrum.")?;
    Ok(RunReport {
        field: config.field,
        run: config.run,
        initial_state: config.initial_state,
        spectrum,
        diagnostics,
    })
}

/// Post-transient trajectory for plotting.
pub fn run_orbit(config: &ExperimentConfig, steps: usize) -> Result<Vec<State>> {
    info!(field = config.field.name(), steps, "sampling orbit");
    sample_orbit(
        &config.field,
        &config.initial_state(),
        config.run.dt,
        config.run.transients,
        steps,
    )
    .context("Orbit integration failed.")
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepRow {
    pub parameter: f64,
    pub exponents: Option<[f64; 3]>,
    pub fractal_dimension: Option<f64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub field: FieldSpec,
    pub parameter: String,
    pub rows: Vec<SweepRow>,
}

pub fn run_sweep(
    config: &ExperimentConfig,
    parameter: &str,
    from: f64,
    to: f64,
    count: usize,
) -> Result<SweepReport> {
    // Reject unknown names before spawning any work.
    config.field.with_parameter(parameter, from)?;

    let values = linspace(from, to, count);
    info!(parameter, runs = values.len(), "sweeping");
    let base = config.field;
    let points = sweep_parameter(
        &values,
        |value| {
            let mut field = base;
            // Name was validated above.
            let _ = field.set_parameter(parameter, value);
            field
        },
        config.run,
        &config.initial_state(),
    );

    let rows = points
        .into_iter()
        .map(|point| match point.outcome {
            Ok(spectrum) => SweepRow {
                parameter: point.parameter,
                exponents: Some(spectrum.exponents),
                fractal_dimension: lce_core::fractal_dimension(&spectrum.exponents).ok(),
                error: None,
            },
            Err(err) => SweepRow {
                parameter: point.parameter,
                exponents: None,
                fractal_dimension: None,
                error: Some(err.to_string()),
            },
        })
        .collect();

    Ok(SweepReport {
        field: config.field,
        parameter: parameter.to_string(),
        rows,
    })
}
