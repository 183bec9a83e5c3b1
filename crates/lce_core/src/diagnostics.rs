//! Contraction rate and Kaplan-Yorke dimension derived from a spectrum.

use crate::error::{LceError, Result};
use crate::estimator::LyapunovSpectrum;
use crate::traits::{State, VectorField, DIM};
use serde::Serialize;
use tracing::warn;

/// Exponents within this distance of zero are classified as zero.
pub const FRACTAL_TOLERANCE: f64 = 0.01;

/// Attractor type read off the signs of an ordered 3D spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttractorKind {
    /// (-, -, -)
    FixedPoint,
    /// (0, -, -)
    LimitCycle,
    /// (0, 0, -)
    Torus,
    /// (+, 0, -)
    Chaotic,
}

pub fn classify(exponents: &[f64; DIM], tolerance: f64) -> AttractorKind {
    let [l0, l1, _] = *exponents;
    if l0 < -tolerance {
        AttractorKind::FixedPoint
    } else if l0.abs() <= tolerance {
        if l1 < -tolerance {
            AttractorKind::LimitCycle
        } else {
            AttractorKind::Torus
        }
    } else {
        AttractorKind::Chaotic
    }
}

/// Kaplan-Yorke dimension of an ordered 3D spectrum using [`FRACTAL_TOLERANCE`].
pub fn fractal_dimension(exponents: &[f64; DIM]) -> Result<f64> {
    fractal_dimension_with_tolerance(exponents, FRACTAL_TOLERANCE)
}

pub fn fractal_dimension_with_tolerance(exponents: &[f64; DIM], tolerance: f64) -> Result<f64> {
    if exponents.iter().any(|v| !v.is_finite()) {
        return Err(LceError::NumericOverflow(format!(
            "Cannot classify non-finite exponents {exponents:?}."
        )));
    }
    match classify(exponents, tolerance) {
        AttractorKind::FixedPoint => Ok(0.0),
        AttractorKind::LimitCycle => Ok(1.0),
        AttractorKind::Torus => Ok(2.0),
        AttractorKind::Chaotic => {
            let [l0, l1, l2] = *exponents;
            if l2 == 0.0 {
                return Err(LceError::DivisionByZero(
                    "most contracting exponent is zero; Kaplan-Yorke dimension undefined".into(),
                ));
            }
            Ok(2.0 + (l0 + l1) / l2.abs())
        }
    }
}

/// Kaplan-Yorke dimension for a spectrum of any length: the number of leading
/// exponents with a non-negative cumulative sum, plus the fraction of the next
/// exponent that sum can offset.
pub fn kaplan_yorke(exponents: &[f64]) -> f64 {
    let mut sorted = exponents.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let mut partial = 0.0;
    for (k, &lambda) in sorted.iter().enumerate() {
        if partial + lambda < 0.0 {
            return k as f64 + partial / lambda.abs();
        }
        partial += lambda;
    }
    sorted.len() as f64
}

/// Trace of the Jacobian: the field's closed form when it has one, otherwise
/// the trace at `state`.
pub fn contraction_rate<F: VectorField>(field: &F, state: &State) -> f64 {
    field
        .contraction_rate()
        .unwrap_or_else(|| field.jacobian_trace(state))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContractionSource {
    /// State-independent closed form supplied by the field.
    ClosedForm,
    /// Time average of the trace along the accumulation trajectory.
    TrajectoryAverage,
    /// Constant supplied by the caller.
    Provided,
}

/// Derived quantities for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub exponents: [f64; DIM],
    pub exponent_sum: f64,
    pub contraction_rate: f64,
    pub contraction_source: ContractionSource,
    /// `|sum(exponents) - contraction_rate|`; small for a converged run.
    pub contraction_mismatch: f64,
    pub attractor: AttractorKind,
    /// `None` when the dimension is undefined (most contracting exponent zero).
    pub fractal_dimension: Option<f64>,
}

impl Diagnostics {
    pub fn new(
        exponents: [f64; DIM],
        contraction_rate: f64,
        contraction_source: ContractionSource,
    ) -> Result<Self> {
        let fractal_dimension = match fractal_dimension(&exponents) {
            Ok(value) => Some(value),
            Err(LceError::DivisionByZero(reason)) => {
                warn!(?exponents, "{reason}");
                None
            }
            Err(other) => return Err(other),
        };
        let exponent_sum: f64 = exponents.iter().sum();
        Ok(Self {
            exponents,
            exponent_sum,
            contraction_rate,
            contraction_source,
            contraction_mismatch: (exponent_sum - contraction_rate).abs(),
            attractor: classify(&exponents, FRACTAL_TOLERANCE),
            fractal_dimension,
        })
    }

    /// Uses the field's closed-form contraction when available and the
    /// spectrum's trajectory-averaged trace otherwise.
    pub fn from_spectrum<F: VectorField>(field: &F, spectrum: &LyapunovSpectrum) -> Result<Self> {
        match field.contraction_rate() {
            Some(rate) => Self::new(spectrum.exponents, rate, ContractionSource::ClosedForm),
            None => Self::new(
                spectrum.exponents,
                spectrum.mean_trace,
                ContractionSource::TrajectoryAverage,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        classify, contraction_rate, fractal_dimension, kaplan_yorke, AttractorKind,
        ContractionSource, Diagnostics, FRACTAL_TOLERANCE,
    };
    use crate::autodiff::Linearized;
    use crate::error::LceError;
    use crate::fields::{Lorenz, Rossler};
    use crate::traits::State;

    #[test]
    fn fractal_dimension_follows_sign_pattern() {
        assert_eq!(fractal_dimension(&[-1.0, -2.0, -3.0]).unwrap(), 0.0);
        assert_eq!(fractal_dimension(&[0.0, -1.0, -2.0]).unwrap(), 1.0);
        assert_eq!(fractal_dimension(&[0.0, 0.0, -1.0]).unwrap(), 2.0);
        assert_eq!(fractal_dimension(&[1.0, 0.0, -2.0]).unwrap(), 2.5);
    }

    #[test]
    fn near_zero_exponents_use_tolerance() {
        assert_eq!(
            classify(&[0.005, -0.5, -1.0], FRACTAL_TOLERANCE),
            AttractorKind::LimitCycle
        );
        assert_eq!(
            classify(&[-0.009, 0.004, -1.0], FRACTAL_TOLERANCE),
            AttractorKind::Torus
        );
        assert_eq!(
            classify(&[-0.02, -0.5, -1.0], FRACTAL_TOLERANCE),
            AttractorKind::FixedPoint
        );
    }

    #[test]
    fn zero_contracting_exponent_is_division_by_zero() {
        assert!(matches!(
            fractal_dimension(&[1.0, 0.0, 0.0]),
            Err(LceError::DivisionByZero(_))
        ));
        let diagnostics =
            Diagnostics::new([1.0, 0.0, 0.0], 1.0, ContractionSource::Provided).unwrap();
        assert_eq!(diagnostics.fractal_dimension, None);
        assert_eq!(diagnostics.attractor, AttractorKind::Chaotic);
    }

    #[test]
    fn non_finite_exponents_are_rejected() {
        assert!(matches!(
            fractal_dimension(&[f64::NAN, 0.0, -1.0]),
            Err(LceError::NumericOverflow(_))
        ));
    }

    #[test]
    fn kaplan_yorke_handles_empty_and_partial_sum() {
        assert_eq!(kaplan_yorke(&[]), 0.0);
        assert!((kaplan_yorke(&[0.1, 0.0, -1.0]) - 2.1).abs() < 1e-12);
        assert!((kaplan_yorke(&[-2.0, 1.0, 0.0]) - 2.5).abs() < 1e-12);
        assert_eq!(kaplan_yorke(&[0.5, 0.2]), 2.0);
    }

    #[test]
    fn contraction_prefers_closed_form() {
        let lorenz = Lorenz::default();
        let rate = contraction_rate(&lorenz, &State::new(100.0, 0.0, 0.0));
        assert!((rate + 13.0 + 2.0 / 3.0).abs() < 1e-12);

        let rossler = Linearized(Rossler::default());
        let rate = contraction_rate(&rossler, &State::new(1.0, 0.0, 0.0));
        assert!((rate - (0.2 + 1.0 - 5.7)).abs() < 1e-12);
    }

    #[test]
    fn diagnostics_report_mismatch() {
        let diagnostics = Diagnostics::new(
            [0.9, 0.0, -14.57],
            -13.6667,
            ContractionSource::ClosedForm,
        )
        .unwrap();
        assert!((diagnostics.exponent_sum + 13.67).abs() < 1e-12);
        assert!(diagnostics.contraction_mismatch < 0.01);
        let expected = 2.0 + 0.9 / 14.57;
        assert!((diagnostics.fractal_dimension.unwrap() - expected).abs() < 1e-12);
    }
}
