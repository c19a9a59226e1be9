use ndarray::{Array1, Array2};
use ndarray_linalg::{Eigh, SVD, UPLO};
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::FitError;

/// Relative singular-value cutoff for rank decisions.
const SV_RCOND: f64 = 1e-12;

/// SVD pseudo-inverse of a square matrix together with its log
/// pseudo-determinant (sum of logs of the retained singular values).
pub struct PseudoInverse {
    pub inv: Array2<f64>,
    pub ln_det: f64,
    pub rank: usize,
}

/// Robust inverse via SVD. Singular values below the relative cutoff are
/// dropped, so near-singular covariance matrices yield a usable inverse
/// instead of blowing up.
pub fn pinv(m: &Array2<f64>) -> Result<PseudoInverse, FitError> {
    let (u, sv, vt) = m.svd(true, true)?;
    let u = u.ok_or_else(|| FitError::LinAlg("SVD returned no U factor".into()))?;
    let vt = vt.ok_or_else(|| FitError::LinAlg("SVD returned no V^T factor".into()))?;

    let smax = sv.iter().copied().fold(0.0_f64, f64::max);
    let cutoff = smax * SV_RCOND;

    let mut ln_det = 0.0;
    let mut rank = 0;
    let mut s_inv = Array1::<f64>::zeros(sv.len());
    for (i, &s) in sv.iter().enumerate() {
        if s > cutoff {
            s_inv[i] = 1.0 / s;
            ln_det += s.ln();
            rank += 1;
        }
    }

    // pinv = V * diag(1/s) * U^T
    let mut vs = vt.t().to_owned();
    for (j, &si) in s_inv.iter().enumerate() {
        vs.column_mut(j).mapv_inplace(|v| v * si);
    }
    let inv = vs.dot(&u.t());

    Ok(PseudoInverse { inv, ln_det, rank })
}

/// Exact inverse for systems where singularity is fatal (the class-center
/// solve). Returns `None` when the matrix is rank deficient; the caller maps
/// that to `FitError::SingularModel`.
pub fn inv_full_rank(m: &Array2<f64>) -> Result<Option<Array2<f64>>, FitError> {
    let p = pinv(m)?;
    if p.rank < m.nrows() {
        return Ok(None);
    }
    Ok(Some(p.inv))
}

/// Draw one sample from N(0, cov) via a symmetric eigen decomposition.
/// Negative eigenvalues (numerical noise in sample covariances) are clamped
/// to zero, so the input only has to be approximately positive semi-definite.
pub fn sample_mvn_zero(rng: &mut StdRng, cov: &Array2<f64>) -> Result<Array1<f64>, FitError> {
    let (vals, vecs) = cov.eigh(UPLO::Lower)?;
    let q = vals.len();
    let mut z = Array1::<f64>::zeros(q);
    for i in 0..q {
        let sd = vals[i].max(0.0).sqrt();
        let n: f64 = rng.sample(StandardNormal);
        z[i] = sd * n;
    }
    Ok(vecs.dot(&z))
}

/// Sample covariance of the columns of `x` (rows are observations, n-1
/// denominator). Falls back to the identity when there are fewer than two
/// observations, which keeps freshly initialized one-gene classes usable.
pub fn sample_covariance(x: &Array2<f64>) -> Array2<f64> {
    let (n, q) = (x.nrows(), x.ncols());
    if n < 2 {
        return Array2::eye(q);
    }
    let mean = x.mean_axis(ndarray::Axis(0)).expect("nonempty");
    let centered = x - &mean;
    centered.t().dot(&centered) / (n as f64 - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr2;
    use rand::SeedableRng;

    #[test]
    fn pinv_inverts_a_well_conditioned_matrix() {
        let m = arr2(&[[4.0, 1.0], [1.0, 3.0]]);
        let p = pinv(&m).unwrap();
        let prod = m.dot(&p.inv);
        assert_abs_diff_eq!(prod[(0, 0)], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(prod[(0, 1)], 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(prod[(1, 1)], 1.0, epsilon = 1e-10);
        assert_eq!(p.rank, 2);
        // det = 11
        assert_abs_diff_eq!(p.ln_det, 11.0_f64.ln(), epsilon = 1e-10);
    }

    #[test]
    fn pinv_tolerates_a_singular_matrix() {
        let m = arr2(&[[1.0, 1.0], [1.0, 1.0]]);
        let p = pinv(&m).unwrap();
        assert_eq!(p.rank, 1);
        assert!(p.inv.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn inv_full_rank_rejects_singular() {
        let m = arr2(&[[1.0, 2.0], [2.0, 4.0]]);
        assert!(inv_full_rank(&m).unwrap().is_none());
    }

    #[test]
    fn mvn_sample_is_seeded_and_finite() {
        let cov = arr2(&[[1.0, 0.3], [0.3, 2.0]]);
        let mut rng = StdRng::seed_from_u64(7);
        let a = sample_mvn_zero(&mut rng, &cov).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let b = sample_mvn_zero(&mut rng, &cov).unwrap();
        assert_eq!(a, b);
        assert!(a.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn covariance_of_independent_columns_is_near_diagonal() {
        let x = arr2(&[
            [1.0, 10.0],
            [2.0, 8.0],
            [3.0, 12.0],
            [4.0, 9.0],
            [5.0, 11.0],
        ]);
        let c = sample_covariance(&x);
        assert_abs_diff_eq!(c[(0, 0)], 2.5, epsilon = 1e-12);
        assert_eq!(c.nrows(), 2);
        assert_abs_diff_eq!(c[(0, 1)], c[(1, 0)], epsilon = 1e-12);
    }
}
