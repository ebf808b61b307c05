//! Common traits defining the seams of the planning pipeline

use crate::common::error::PlannerResult;

/// Single-valued curve `y = f(x)` expressed in the vehicle-local frame
pub trait SmoothCurve {
    /// Evaluate `f(x)`
    fn evaluate(&self, x: f64) -> f64;

    /// First derivative `f'(x)`
    fn derivative(&self, x: f64) -> f64;

    /// Second derivative `f''(x)`
    fn second_derivative(&self, x: f64) -> f64;

    /// Signed curvature of the graph of `f` at `x` [1/m]
    fn curvature(&self, x: f64) -> f64 {
        let dy = self.derivative(x);
        self.second_derivative(x) / (1.0 + dy * dy).powf(1.5)
    }
}

/// Curve fitting strategy used by the planner
pub trait CurveFitter {
    type Curve: SmoothCurve;

    /// Fit a curve through the given knots, ordered by x
    fn fit(&self, x: &[f64], y: &[f64]) -> PlannerResult<Self::Curve>;
}
