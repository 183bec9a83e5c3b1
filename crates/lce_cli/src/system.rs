//! Field selection and parameter overrides.

use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use lce_core::autodiff::Linearized;
use lce_core::fields::{Lorenz, LorenzLike, Rossler};
use lce_core::{State, TangentVector, VectorField};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FieldKind {
    Lorenz,
    LorenzLike,
    Rossler,
}

/// A concrete flow together with its coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldSpec {
    Lorenz(Lorenz),
    LorenzLike(LorenzLike),
    Rossler(Rossler),
}

impl Default for FieldSpec {
    fn default() -> Self {
        FieldSpec::Lorenz(Lorenz::default())
    }
}

impl FieldSpec {
    pub fn from_kind(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Lorenz => FieldSpec::Lorenz(Lorenz::default()),
            FieldKind::LorenzLike => FieldSpec::LorenzLike(LorenzLike::default()),
            FieldKind::Rossler => FieldSpec::Rossler(Rossler::default()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldSpec::Lorenz(_) => "Lorenz",
            FieldSpec::LorenzLike(_) => "Lorenz-like",
            FieldSpec::Rossler(_) => "Rossler",
        }
    }

    /// Coefficient names and values in declaration order.
    pub fn parameters(&self) -> Vec<(&'static str, f64)> {
        match self {
            FieldSpec::Lorenz(f) => vec![("sigma", f.sigma), ("rho", f.rho), ("beta", f.beta)],
            FieldSpec::LorenzLike(f) => vec![
                ("alpha", f.alpha),
                ("gamma", f.gamma),
                ("mu", f.mu),
                ("beta", f.beta),
                ("delta", f.delta),
                ("lambda", f.lambda),
            ],
            FieldSpec::Rossler(f) => vec![("a", f.a), ("b", f.b), ("c", f.c)],
        }
    }

    fn parameter_mut(&mut self, name: &str) -> Option<&mut f64> {
        match self {
            FieldSpec::Lorenz(f) => match name {
                "sigma" => Some(&mut f.sigma),
                "rho" => Some(&mut f.rho),
                "beta" => Some(&mut f.beta),
                _ => None,
            },
            FieldSpec::LorenzLike(f) => match name {
                "alpha" => Some(&mut f.alpha),
                "gamma" => Some(&mut f.gamma),
                "mu" => Some(&mut f.mu),
                "beta" => Some(&mut f.beta),
                "delta" => Some(&mut f.delta),
                "lambda" => Some(&mut f.lambda),
                _ => None,
            },
            FieldSpec::Rossler(f) => match name {
                "a" => Some(&mut f.a),
                "b" => Some(&mut f.b),
                "c" => Some(&mut f.c),
                _ => None,
            },
        }
    }

    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<()> {
        let known: Vec<&str> = self.parameters().iter().map(|(n, _)| *n).collect();
        let field_name = self.name();
        let slot = self.parameter_mut(name).ok_or_else(|| {
            anyhow!(
                "Unknown parameter \"{name}\" for the {field_name} field (expected one of {}).",
                known.join(", ")
            )
        })?;
        *slot = value;
        Ok(())
    }

    pub fn with_parameter(mut self, name: &str, value: f64) -> Result<Self> {
        self.set_parameter(name, value)?;
        Ok(self)
    }
}

impl VectorField for FieldSpec {
    fn derivative(&self, state: &State) -> State {
        match self {
            FieldSpec::Lorenz(f) => f.derivative(state),
            FieldSpec::LorenzLike(f) => f.derivative(state),
            FieldSpec::Rossler(f) => Linearized(*f).derivative(state),
        }
    }

    fn linearized_derivative(&self, state: &State, tangent: &TangentVector) -> TangentVector {
        match self {
            FieldSpec::Lorenz(f) => f.linearized_derivative(state, tangent),
            FieldSpec::LorenzLike(f) => f.linearized_derivative(state, tangent),
            FieldSpec::Rossler(f) => Linearized(*f).linearized_derivative(state, tangent),
        }
    }

    fn contraction_rate(&self) -> Option<f64> {
        match self {
            FieldSpec::Lorenz(f) => VectorField::contraction_rate(f),
            FieldSpec::LorenzLike(f) => VectorField::contraction_rate(f),
            FieldSpec::Rossler(f) => Linearized(*f).contraction_rate(),
        }
    }
}

/// Parses `name=value`.
pub fn parse_assignment(raw: &str) -> Result<(String, f64)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected NAME=VALUE, got \"{raw}\"."))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("Parameter name is empty in \"{raw}\".");
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| anyhow!("Parameter value in \"{raw}\" is not a number."))?;
    Ok((name.to_string(), value))
}

/// Parses `x,y,z`.
pub fn parse_state(raw: &str) -> Result<[f64; 3]> {
    let values = raw
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| anyhow!("State component \"{part}\" is not a number."))
        })
        .collect::<Result<Vec<_>>>()?;
    <[f64; 3]>::try_from(values.as_slice())
        .map_err(|_| anyhow!("State must have exactly 3 components, got {}.", values.len()))
}
