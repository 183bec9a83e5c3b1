pub mod autodiff;
pub mod diagnostics;
pub mod error;
pub mod estimator;
pub mod fields;
pub mod integrator;
pub mod orthonormalize;
pub mod sweep;
/// The `lce_core` crate estimates the Lyapunov spectrum of three-dimensional flows
/// with the pull-back (periodic Gram-Schmidt) method.
///
/// Key components:
/// - **Traits**: `VectorField`, the derivative/linearization pair any flow must supply.
/// - **Fields**: Lorenz, the six-coefficient Lorenz-like system, Rössler and linear flows.
/// - **Integrator**: fixed-step RK4 for the trajectory and its tangent vectors.
/// - **Orthonormalize**: modified Gram-Schmidt returning per-direction growth factors.
/// - **Estimator**: transient, alignment and accumulation phases producing the exponents.
/// - **Diagnostics**: contraction rate, attractor classification and Kaplan-Yorke dimension.
/// - **Autodiff**: dual numbers giving exact Jacobian-vector products for generic fields.
pub mod traits;

pub use diagnostics::{fractal_dimension, AttractorKind, Diagnostics};
pub use error::{LceError, Phase, Result};
pub use estimator::{lyapunov_spectrum, LyapunovEstimator, LyapunovSpectrum, RunConfig};
pub use integrator::TangentScheme;
pub use traits::{State, TangentBasis, TangentVector, VectorField, DIM};
