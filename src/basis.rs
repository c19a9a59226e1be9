use ndarray::{Array1, Array2};

use crate::error::FitError;

/// Order of the basis polynomials (order 4 = cubic).
pub const SPLINE_ORDER: usize = 4;

/// Default number of control points for n observed time points.
pub fn default_control_point_count(n: usize) -> usize {
    n / 3 + 2
}

/// The Cox-de Boor recursion for the normalized B-spline basis b_{i,k}(t).
///
/// Coincident knots make a denominator zero; that term contributes nothing
/// (standard convention), so the recursion never divides by zero.
pub fn bspline_basis(knots: &[f64], i: usize, k: usize, t: f64) -> f64 {
    if k == 1 {
        return if knots[i] <= t && t < knots[i + 1] { 1.0 } else { 0.0 };
    }

    let rec1 = bspline_basis(knots, i, k - 1, t);
    let rec2 = bspline_basis(knots, i + 1, k - 1, t);

    let mut v = 0.0;
    let d1 = knots[i + k - 1] - knots[i];
    if d1 > 0.0 {
        v += (t - knots[i]) * rec1 / d1;
    }
    let d2 = knots[i + k] - knots[i + 1];
    if d2 > 0.0 {
        v += (knots[i + k] - t) * rec2 / d2;
    }
    v
}

/// Place q + order knots equidistant over the time domain, with two knots
/// padding each side so the cubic basis is defined on [first, last]:
/// knot[2] = first and knot[q+1] = last.
pub fn place_knots(first: f64, last: f64, q: usize) -> Vec<f64> {
    let num_knots = q + SPLINE_ORDER;
    let h = (last - first) / (q as f64 - 1.0);
    (0..num_knots)
        .map(|k| first + h * (k as f64 - 2.0))
        .collect()
}

/// Choose q control-point abscissae from the observed time points so that
/// they are roughly equidistant. The first and last time point are always
/// selected; interior points greedily take the nearest still-available time
/// point, leaving room for the remaining ones so the selection is strictly
/// increasing.
pub fn choose_control_points(times: &[f64], q: usize) -> (Vec<f64>, Vec<usize>) {
    let n = times.len();
    let first = times[0];
    let last = times[n - 1];

    let mut rows: Vec<usize> = Vec::with_capacity(q);
    rows.push(0);
    for i in 1..q - 1 {
        let target = first + i as f64 * (last - first) / (q as f64 - 1.0);
        let lo = rows[rows.len() - 1] + 1;
        let hi = n - 1 - (q - 1 - i); // reserve one slot per remaining point
        let mut best = lo;
        for j in lo..=hi {
            if (times[j] - target).abs() < (times[best] - target).abs() {
                best = j;
            }
        }
        rows.push(best);
    }
    rows.push(n - 1);

    let points = rows.iter().map(|&r| times[r]).collect();
    (points, rows)
}

/// The shared spline basis description: control points, knots, and the basis
/// matrix S with S[i][j] = b_{j,4}(t_i). Computed once at initialization and
/// immutable afterwards.
#[derive(Clone)]
pub struct SplineBasis {
    /// Control-point abscissae, a subset of the observed time points.
    pub control_points: Vec<f64>,
    /// Observation row each control point was taken from.
    pub control_point_rows: Vec<usize>,
    /// q + 4 knots.
    pub knots: Vec<f64>,
    /// num_time_points x q basis matrix.
    pub s: Array2<f64>,
    /// Cached S^T S.
    pub sts: Array2<f64>,
}

impl SplineBasis {
    pub fn new(times: &[f64], q: usize) -> Result<Self, FitError> {
        let n = times.len();
        if q < 2 || q > n {
            return Err(FitError::InvalidInput(format!(
                "need 2 <= control points <= time points, got q={} for n={}",
                q, n
            )));
        }
        if times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(FitError::InvalidInput(
                "time points must be strictly increasing".into(),
            ));
        }

        let (control_points, control_point_rows) = choose_control_points(times, q);
        let knots = place_knots(times[0], times[n - 1], q);

        let mut s = Array2::<f64>::zeros((n, q));
        for i in 0..n {
            for j in 0..q {
                s[(i, j)] = bspline_basis(&knots, j, SPLINE_ORDER, times[i]);
            }
        }
        let sts = s.t().dot(&s);

        Ok(Self {
            control_points,
            control_point_rows,
            knots,
            s,
            sts,
        })
    }

    pub fn q(&self) -> usize {
        self.control_points.len()
    }

    /// Basis values at an arbitrary time point, one per control point.
    pub fn basis_row(&self, t: f64) -> Array1<f64> {
        basis_row(&self.knots, self.q(), t)
    }
}

/// One row of the basis matrix at an arbitrary t.
pub fn basis_row(knots: &[f64], q: usize, t: f64) -> Array1<f64> {
    Array1::from((0..q).map(|j| bspline_basis(knots, j, SPLINE_ORDER, t)).collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::linspace;
    use approx::assert_abs_diff_eq;

    #[test]
    fn knot_count_is_q_plus_order() {
        for q in 3..=10 {
            let knots = place_knots(0.0, 48.0, q);
            assert_eq!(knots.len(), q + 4);
        }
    }

    #[test]
    fn knots_bracket_the_time_domain() {
        let q = 6;
        let knots = place_knots(2.0, 32.0, q);
        assert_abs_diff_eq!(knots[2], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(knots[q + 1], 32.0, epsilon = 1e-12);
        assert!(knots.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn control_points_are_increasing_and_hit_both_ends() {
        // Scenario: 12 time points with the default rule q = 12/3 + 2 = 6.
        let times: Vec<f64> = linspace(0.0, 44.0, 12).to_vec();
        let q = default_control_point_count(times.len());
        assert_eq!(q, 6);
        let (points, rows) = choose_control_points(&times, q);
        assert_eq!(points.len(), q);
        assert_eq!(points[0], times[0]);
        assert_eq!(points[q - 1], times[11]);
        assert!(points.windows(2).all(|w| w[1] > w[0]));
        assert!(rows.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn control_points_work_at_the_q_equals_n_edge() {
        let times = [0.0, 1.0, 2.0, 3.0];
        let (points, _) = choose_control_points(&times, 4);
        assert_eq!(points, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn basis_is_a_partition_of_unity_inside_full_coverage() {
        let q = 6;
        let knots = place_knots(0.0, 10.0, q);
        // Full coverage of the cubic basis holds on [knot[3], knot[q]].
        let lo = knots[3];
        let hi = knots[q];
        for i in 0..50 {
            let t = lo + (hi - lo) * (i as f64 + 0.5) / 50.0;
            let sum: f64 = (0..q).map(|j| bspline_basis(&knots, j, SPLINE_ORDER, t)).sum();
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn basis_values_are_nonnegative_and_locally_supported() {
        let q = 5;
        let knots = place_knots(0.0, 8.0, q);
        for j in 0..q {
            for i in 0..80 {
                let t = -4.0 + 16.0 * i as f64 / 80.0;
                let v = bspline_basis(&knots, j, SPLINE_ORDER, t);
                assert!(v >= 0.0 && v.is_finite());
                // Support of b_{j,4} is [knot[j], knot[j+4]).
                if t < knots[j] || t >= knots[j + 4] {
                    assert_eq!(v, 0.0);
                }
            }
        }
    }

    #[test]
    fn coincident_knots_do_not_divide_by_zero() {
        let knots = [0.0, 0.0, 0.0, 1.0, 2.0, 2.0, 2.0, 3.0];
        for i in 0..4 {
            let v = bspline_basis(&knots, i, SPLINE_ORDER, 0.5);
            assert!(v.is_finite());
        }
    }

    #[test]
    fn out_of_domain_evaluation_returns_zero() {
        let q = 5;
        let knots = place_knots(0.0, 8.0, q);
        let row = basis_row(&knots, q, 1e6);
        assert!(row.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn basis_rejects_unsorted_times() {
        let times = [0.0, 2.0, 1.0, 3.0, 4.0, 5.0];
        assert!(SplineBasis::new(&times, 4).is_err());
    }

    #[test]
    fn basis_matrix_rows_match_basis_row() {
        let times: Vec<f64> = linspace(0.0, 20.0, 9).to_vec();
        let basis = SplineBasis::new(&times, 5).unwrap();
        for (i, &t) in times.iter().enumerate() {
            let row = basis.basis_row(t);
            for j in 0..basis.q() {
                assert_abs_diff_eq!(basis.s[(i, j)], row[j], epsilon = 1e-12);
            }
        }
    }
}
