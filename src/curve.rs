use ndarray::Array1;

use crate::basis::{basis_row, bspline_basis, SPLINE_ORDER};

/// Read-only continuous model for one gene, built after fitting completes:
/// value(t) = s(t) . (mu_class + gamma_gene).
///
/// Evaluation is defined for any real t; outside the knot domain every basis
/// function has left its support, so the value degrades to zero instead of
/// erroring.
#[derive(Clone)]
pub struct GeneCurve {
    mu: Array1<f64>,
    gamma: Array1<f64>,
    knots: Vec<f64>,
    control_points: Vec<f64>,
}

impl GeneCurve {
    pub fn new(
        mu: Array1<f64>,
        gamma: Array1<f64>,
        knots: Vec<f64>,
        control_points: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(mu.len(), control_points.len());
        debug_assert_eq!(gamma.len(), control_points.len());
        debug_assert_eq!(knots.len(), control_points.len() + SPLINE_ORDER);
        Self {
            mu,
            gamma,
            knots,
            control_points,
        }
    }

    /// Predicted expression value at an arbitrary time point.
    pub fn evaluate(&self, t: f64) -> f64 {
        let q = self.control_points.len();
        let mut v = 0.0;
        for i in 0..q {
            let b = bspline_basis(&self.knots, i, SPLINE_ORDER, t);
            if b != 0.0 {
                v += b * (self.mu[i] + self.gamma[i]);
            }
        }
        v
    }

    /// Basis values at t, one per control point.
    pub fn basis_at(&self, t: f64) -> Array1<f64> {
        basis_row(&self.knots, self.control_points.len(), t)
    }

    pub fn control_points(&self) -> &[f64] {
        &self.control_points
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn class_center(&self) -> &Array1<f64> {
        &self.mu
    }

    pub fn deviation(&self) -> &Array1<f64> {
        &self.gamma
    }
}
