//! Text and JSON rendering of runner output.

use crate::analysis::{RunReport, SweepReport};
use crate::system::FieldSpec;
use anyhow::{Context, Result};
use clap::ValueEnum;
use lce_core::diagnostics::ContractionSource;
use lce_core::TangentScheme;
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize report as JSON.")
}

fn parameter_tuple(field: &FieldSpec) -> String {
    let (names, values): (Vec<_>, Vec<_>) = field
        .parameters()
        .into_iter()
        .map(|(name, value)| (name, format!("{value}")))
        .unzip();
    format!("({}) = ({})", names.join(","), values.join(","))
}

fn scheme_label(scheme: TangentScheme) -> &'static str {
    match scheme {
        TangentScheme::FrozenBase => "frozen base",
        TangentScheme::StageCoupled => "stage coupled",
    }
}

pub fn render_run(report: &RunReport) -> String {
    let d = &report.diagnostics;
    let [l0, l1, l2] = report.spectrum.exponents;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "4th order Runge-Kutta method ({} tangents): {} ODE at {}",
        scheme_label(report.run.scheme),
        report.field.name(),
        parameter_tuple(&report.field)
    );
    let _ = writeln!(out, " LCEs = ({l0:.6}, {l1:.6}, {l2:.6})");
    let source = match d.contraction_source {
        ContractionSource::ClosedForm => "closed form",
        ContractionSource::TrajectoryAverage => "trajectory average",
        ContractionSource::Provided => "provided",
    };
    let _ = writeln!(
        out,
        " Contraction = {:.6} ({source}), Diff = {:.6}",
        d.contraction_rate, d.contraction_mismatch
    );
    match d.fractal_dimension {
        Some(dim) => {
            let _ = writeln!(out, " Fractal dimension = {dim:.6} ({:?})", d.attractor);
        }
        None => {
            let _ = writeln!(out, " Fractal dimension = undefined ({:?})", d.attractor);
        }
    }
    if !report.spectrum.is_ordered() {
        let _ = writeln!(
            out,
            " Warning: exponents are not ordered; increase transients or shorten the pull-back interval."
        );
    }
    let _ = write!(
        out,
        " Integration time = {} over {} pull-backs",
        report.spectrum.integration_time, report.spectrum.pullbacks
    );
    out
}

pub fn render_sweep(report: &SweepReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} sweep over {} (base {})",
        report.field.name(),
        report.parameter,
        parameter_tuple(&report.field)
    );
    let _ = writeln!(
        out,
        "{:>12} {:>12} {:>12} {:>12} {:>10}",
        report.parameter, "LCE0", "LCE1", "LCE2", "D_KY"
    );
    for row in &report.rows {
        match (&row.exponents, &row.error) {
            (Some([l0, l1, l2]), _) => {
                let dim = row
                    .fractal_dimension
                    .map(|v| format!("{v:.4}"))
                    .unwrap_or_else(|| "-".to_string());
                let _ = writeln!(
                    out,
                    "{:>12.4} {l0:>12.6} {l1:>12.6} {l2:>12.6} {dim:>10}",
                    row.parameter
                );
            }
            (None, error) => {
                let _ = writeln!(
                    out,
                    "{:>12.4} failed: {}",
                    row.parameter,
                    error.as_deref().unwrap_or("unknown error")
                );
            }
        }
    }
    out
}
