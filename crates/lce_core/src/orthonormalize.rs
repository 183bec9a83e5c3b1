//! Modified Gram-Schmidt re-orthonormalization of the tangent basis.

use crate::error::{LceError, Result};
use crate::traits::{TangentBasis, DIM};

/// A direction whose norm after projection falls to this fraction of its norm
/// before projection is treated as having collapsed onto the faster ones.
/// Sits at roundoff scale, so only numerically dependent directions trip it.
pub const DEGENERACY_TOLERANCE: f64 = 64.0 * f64::EPSILON;

/// Re-bases `basis` in place and returns the per-direction normalization
/// factors.
///
/// Directions are processed in index order: vector `k` first loses its
/// components along the already-normalized vectors `0..k`, then its remaining
/// length is recorded as `factors[k]` and it is scaled to unit length. The
/// logarithm of `factors[k]` is the growth of direction `k` orthogonal to all
/// faster directions, so the order of the basis must not be changed.
pub fn orthonormalize(basis: &mut TangentBasis) -> Result<[f64; DIM]> {
    let mut factors = [0.0; DIM];
    for k in 0..DIM {
        let raw_norm = basis[k].norm();
        for j in 0..k {
            let e = basis[j];
            let projection = e.dot(&basis[k]);
            basis[k] -= e * projection;
        }

        let norm = basis[k].norm();
        if !norm.is_finite() {
            return Err(LceError::NumericOverflow(format!(
                "Tangent direction {k} has non-finite norm {norm}."
            )));
        }
        if norm == 0.0 || norm <= DEGENERACY_TOLERANCE * raw_norm {
            return Err(LceError::DegenerateBasis { index: k, norm });
        }
        basis[k] /= norm;
        factors[k] = norm;
    }
    Ok(factors)
}

#[cfg(test)]
mod tests {
    use super::orthonormalize;
    use crate::error::LceError;
    use crate::traits::{standard_basis, TangentBasis, TangentVector};
    use nalgebra::linalg::QR;
    use nalgebra::Matrix3;
    use proptest::prelude::*;

    fn assert_orthonormal(basis: &TangentBasis) {
        for i in 0..3 {
            assert!((basis[i].norm() - 1.0).abs() < 1e-10);
            for j in (i + 1)..3 {
                assert!(basis[i].dot(&basis[j]).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn standard_basis_is_a_fixed_point() {
        let mut basis = standard_basis();
        let factors = orthonormalize(&mut basis).expect("basis should orthonormalize");
        assert_eq!(factors, [1.0, 1.0, 1.0]);
        assert_eq!(basis, standard_basis());
    }

    #[test]
    fn factors_match_qr_diagonal() {
        let mut basis = [
            TangentVector::new(2.0, 1.0, 0.5),
            TangentVector::new(-1.0, 3.0, 1.0),
            TangentVector::new(0.5, 0.5, 4.0),
        ];
        let matrix = Matrix3::from_columns(&basis);
        let factors = orthonormalize(&mut basis).expect("basis should orthonormalize");

        let (q, r) = QR::new(matrix).unpack();
        for k in 0..3 {
            assert!((factors[k] - r[(k, k)].abs()).abs() < 1e-12);
            let column = q.column(k).into_owned();
            assert!((basis[k].dot(&column).abs() - 1.0).abs() < 1e-12);
        }
        assert!((factors.iter().product::<f64>() - matrix.determinant().abs()).abs() < 1e-10);
    }

    #[test]
    fn first_direction_is_only_rescaled() {
        let v0 = TangentVector::new(0.0, 3.0, 4.0);
        let mut basis = [v0, TangentVector::x(), TangentVector::new(1.0, 1.0, 1.0)];
        let factors = orthonormalize(&mut basis).unwrap();
        assert_eq!(factors[0], 5.0);
        assert!((basis[0] - v0 / 5.0).norm() < 1e-15);
    }

    #[test]
    fn identical_directions_are_degenerate() {
        let v = TangentVector::new(1.0, 2.0, 3.0);
        let mut basis = [v, v, TangentVector::z()];
        match orthonormalize(&mut basis) {
            Err(LceError::DegenerateBasis { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected DegenerateBasis, got {other:?}"),
        }
    }

    #[test]
    fn small_but_resolved_remainder_is_accepted() {
        let mut basis = [
            TangentVector::x(),
            TangentVector::new(1.0, 1e-11, 0.0),
            TangentVector::z(),
        ];
        let factors = orthonormalize(&mut basis).expect("remainder is well above roundoff");
        assert!((factors[1] - 1e-11).abs() < 1e-20);
        assert!((basis[1] - TangentVector::y()).norm() < 1e-12);
    }

    #[test]
    fn zero_vector_is_degenerate() {
        let mut basis = [TangentVector::zeros(), TangentVector::y(), TangentVector::z()];
        assert!(matches!(
            orthonormalize(&mut basis),
            Err(LceError::DegenerateBasis { index: 0, .. })
        ));
    }

    #[test]
    fn non_finite_direction_is_overflow() {
        let mut basis = [
            TangentVector::new(f64::INFINITY, 0.0, 0.0),
            TangentVector::y(),
            TangentVector::z(),
        ];
        assert!(matches!(
            orthonormalize(&mut basis),
            Err(LceError::NumericOverflow(_))
        ));
    }

    fn component() -> impl Strategy<Value = f64> {
        -10.0..10.0f64
    }

    fn vector() -> impl Strategy<Value = TangentVector> {
        (component(), component(), component()).prop_map(|(x, y, z)| TangentVector::new(x, y, z))
    }

    proptest! {
        #[test]
        fn prop_output_is_orthonormal(a in vector(), b in vector(), c in vector()) {
            let mut basis = [a, b, c];
            prop_assume!(Matrix3::from_columns(&basis).determinant().abs() > 0.1);
            orthonormalize(&mut basis).expect("independent basis should orthonormalize");
            assert_orthonormal(&basis);
        }

        #[test]
        fn prop_second_pass_has_unit_factors(a in vector(), b in vector(), c in vector()) {
            let mut basis = [a, b, c];
            prop_assume!(Matrix3::from_columns(&basis).determinant().abs() > 0.1);
            orthonormalize(&mut basis).expect("independent basis should orthonormalize");
            let factors = orthonormalize(&mut basis).expect("orthonormal basis should pass");
            for factor in factors {
                prop_assert!((factor - 1.0).abs() < 1e-10);
            }
        }
    }
}
