//! Error types for spectrum estimation.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The stage of an estimation run in which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Trajectory-only burn-in onto the attractor.
    Transient,
    /// Tangent vectors co-evolved and re-based, growth factors discarded.
    Alignment,
    /// Growth factors accumulated into the exponent sums.
    Accumulation,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Transient => "transient",
            Phase::Alignment => "alignment",
            Phase::Accumulation => "accumulation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum LceError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Degenerate tangent basis: direction {index} collapsed (norm {norm:e})")]
    DegenerateBasis { index: usize, norm: f64 },

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Numeric overflow: {0}")]
    NumericOverflow(String),

    #[error("Run aborted in {phase} phase at step {step}: {source}")]
    Aborted {
        phase: Phase,
        step: usize,
        #[source]
        source: Box<LceError>,
    },
}

impl LceError {
    pub(crate) fn at(self, phase: Phase, step: usize) -> Self {
        LceError::Aborted {
            phase,
            step,
            source: Box::new(self),
        }
    }

    /// Strips any phase/step wrapping and returns the underlying failure.
    pub fn root_cause(&self) -> &LceError {
        match self {
            LceError::Aborted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, LceError>;

#[cfg(test)]
mod tests {
    use super::{LceError, Phase};

    #[test]
    fn aborted_message_names_phase_and_step() {
        let err = LceError::DegenerateBasis {
            index: 1,
            norm: 0.0,
        }
        .at(Phase::Alignment, 40);
        let message = err.to_string();
        assert!(message.contains("alignment phase"), "got \"{message}\"");
        assert!(message.contains("step 40"), "got \"{message}\"");
        assert!(matches!(
            err.root_cause(),
            LceError::DegenerateBasis { index: 1, .. }
        ));
    }
}
