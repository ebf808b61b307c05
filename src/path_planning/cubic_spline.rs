// Natural cubic spline y = f(x) through the anchor points of a cycle
//
// Coefficients follow the classic formulation: with h_i = x_{i+1} - x_i the
// second-order coefficients c solve a tridiagonal system A c = B with the
// natural boundary conditions c_0 = c_n = 0.

use log::trace;
use nalgebra::{DMatrix, DVector};

use crate::common::{CurveFitter, PlannerError, PlannerResult, SmoothCurve};

#[derive(Debug, Clone)]
pub struct CubicSpline1D {
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
    x: Vec<f64>,
}

impl CubicSpline1D {
    /// Fit through knots with strictly increasing `x`.
    pub fn new(x: &[f64], y: &[f64]) -> PlannerResult<Self> {
        Self::check_knots(x, y)?;

        let nx = x.len();
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let a = y.to_vec();

        let a_mat = Self::calc_a(&h);
        let b_mat = Self::calc_b(&h, &a);
        let c_na = a_mat.lu().solve(&b_mat).ok_or_else(|| {
            PlannerError::DegenerateFit("spline system is singular".to_string())
        })?;
        let c: Vec<f64> = c_na.iter().copied().collect();

        let mut b = Vec::with_capacity(nx - 1);
        let mut d = Vec::with_capacity(nx - 1);
        for i in 0..nx - 1 {
            d.push((c[i + 1] - c[i]) / (3.0 * h[i]));
            b.push((a[i + 1] - a[i]) / h[i] - h[i] * (c[i + 1] + 2.0 * c[i]) / 3.0);
        }
        trace!("spline through {} knots, c = {:?}", nx, c);

        Ok(CubicSpline1D {
            a,
            b,
            c,
            d,
            x: x.to_vec(),
        })
    }

    fn check_knots(x: &[f64], y: &[f64]) -> PlannerResult<()> {
        if x.len() != y.len() {
            return Err(PlannerError::DegenerateFit(format!(
                "{} x knots but {} y knots",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 2 {
            return Err(PlannerError::DegenerateFit(format!(
                "at least 2 knots are required, got {}",
                x.len()
            )));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(PlannerError::DegenerateFit("knot values must be finite".to_string()));
        }
        if let Some(i) = x.windows(2).position(|w| w[1] <= w[0]) {
            return Err(PlannerError::DegenerateFit(format!(
                "knot x values must be strictly increasing: x[{}] = {}, x[{}] = {}",
                i,
                x[i],
                i + 1,
                x[i + 1]
            )));
        }
        Ok(())
    }

    fn calc_a(h: &[f64]) -> DMatrix<f64> {
        let nx = h.len() + 1;
        let mut a = DMatrix::zeros(nx, nx);
        a[(0, 0)] = 1.0;
        for i in 0..nx - 1 {
            if i != nx - 2 {
                a[(i + 1, i + 1)] = 2.0 * (h[i] + h[i + 1]);
            }
            a[(i + 1, i)] = h[i];
            a[(i, i + 1)] = h[i];
        }
        a[(0, 1)] = 0.0;
        a[(nx - 1, nx - 2)] = 0.0;
        a[(nx - 1, nx - 1)] = 1.0;
        a
    }

    fn calc_b(h: &[f64], a: &[f64]) -> DVector<f64> {
        let nx = h.len() + 1;
        let mut b = DVector::zeros(nx);
        for i in 0..nx - 2 {
            b[i + 1] = 3.0 * (a[i + 2] - a[i + 1]) / h[i + 1] - 3.0 * (a[i + 1] - a[i]) / h[i];
        }
        b
    }

    /// Segment used to evaluate `t`. Outside the knot range the boundary
    /// segment is extended.
    fn search_index(&self, t: f64) -> usize {
        let idx = self.x.partition_point(|&xi| xi <= t);
        idx.saturating_sub(1).min(self.x.len() - 2)
    }

}

impl SmoothCurve for CubicSpline1D {
    fn evaluate(&self, t: f64) -> f64 {
        let i = self.search_index(t);
        let dx = t - self.x[i];
        self.a[i] + self.b[i] * dx + self.c[i] * dx.powi(2) + self.d[i] * dx.powi(3)
    }

    fn derivative(&self, t: f64) -> f64 {
        let i = self.search_index(t);
        let dx = t - self.x[i];
        self.b[i] + 2.0 * self.c[i] * dx + 3.0 * self.d[i] * dx.powi(2)
    }

    fn second_derivative(&self, t: f64) -> f64 {
        let i = self.search_index(t);
        let dx = t - self.x[i];
        2.0 * self.c[i] + 6.0 * self.d[i] * dx
    }
}

/// Fits natural cubic splines
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalSplineFitter;

impl CurveFitter for NaturalSplineFitter {
    type Curve = CubicSpline1D;

    fn fit(&self, x: &[f64], y: &[f64]) -> PlannerResult<CubicSpline1D> {
        CubicSpline1D::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_interpolates_knots() {
        let x = [-2.0, 0.0, 55.0, 85.0, 115.0];
        let y = [0.1, 0.0, 3.0, 4.0, 4.0];
        let sp = CubicSpline1D::new(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert_approx_eq!(sp.evaluate(*xi), *yi, 1e-9);
        }
    }

    #[test]
    fn test_natural_boundary() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 0.0, 1.0];
        let sp = CubicSpline1D::new(&x, &y).unwrap();
        assert_approx_eq!(sp.second_derivative(0.0), 0.0, 1e-9);
        assert_approx_eq!(sp.second_derivative(3.0), 0.0, 1e-9);
    }

    #[test]
    fn test_c1_continuity_at_knots() {
        let x = [0.0, 10.0, 25.0, 40.0];
        let y = [0.0, 2.0, -1.0, 3.0];
        let sp = CubicSpline1D::new(&x, &y).unwrap();
        let eps = 1e-7;
        for &k in &x[1..3] {
            assert_approx_eq!(sp.derivative(k - eps), sp.derivative(k + eps), 1e-5);
            assert_approx_eq!(sp.second_derivative(k - eps), sp.second_derivative(k + eps), 1e-5);
        }
    }

    #[test]
    fn test_straight_line_is_exact() {
        let x = [0.0, 1.0, 60.0, 90.0, 120.0];
        let y: Vec<f64> = x.iter().map(|v| 0.5 * v + 1.0).collect();
        let sp = CubicSpline1D::new(&x, &y).unwrap();
        assert_approx_eq!(sp.evaluate(30.0), 16.0, 1e-9);
        assert_approx_eq!(sp.derivative(100.0), 0.5, 1e-9);
        assert_approx_eq!(sp.curvature(45.0), 0.0, 1e-9);
    }

    #[test]
    fn test_two_knots_linear() {
        let sp = CubicSpline1D::new(&[0.0, 2.0], &[0.0, 4.0]).unwrap();
        assert_approx_eq!(sp.evaluate(1.0), 2.0, 1e-12);
        // extended beyond the last knot
        assert_approx_eq!(sp.evaluate(3.0), 6.0, 1e-12);
    }

    #[test]
    fn test_duplicate_x_is_degenerate() {
        let err = CubicSpline1D::new(&[0.0, 1.0, 1.0, 2.0], &[0.0, 1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, PlannerError::DegenerateFit(_)));
    }

    #[test]
    fn test_too_few_knots_is_degenerate() {
        let err = NaturalSplineFitter.fit(&[1.0], &[1.0]).unwrap_err();
        assert!(matches!(err, PlannerError::DegenerateFit(_)));
    }

    #[test]
    fn test_decreasing_x_is_degenerate() {
        let err = CubicSpline1D::new(&[0.0, 2.0, 1.0], &[0.0, 1.0, 2.0]).unwrap_err();
        assert!(matches!(err, PlannerError::DegenerateFit(_)));
    }
}
