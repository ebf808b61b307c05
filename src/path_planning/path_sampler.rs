//! Speed-controlled sampling of the fitted curve
//!
//! The curve is linearized over the horizon `Dx`: its arc length over
//! `[0, Dx]` is approximated by the chord `L = sqrt(Dx² + f(Dx)²)`. Covering
//! `L` at the commanded speed takes `N = L / (tick * speed)` ticks, so every
//! tick advances x by `Dx / N`. Where the curve's slope differs from the
//! chord's, the real spacing differs slightly from `tick * speed`; this
//! small lateral speed error is part of the planner's acceleration profile
//! and is kept on purpose.

use crate::common::{Point2D, SmoothCurve};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSampler {
    /// Time between two trajectory points [s]
    tick: f64,
    /// Local x distance the curve is linearized over [m]
    horizon: f64,
}

impl PathSampler {
    pub fn new(tick: f64, horizon: f64) -> Self {
        Self { tick, horizon }
    }

    /// Chord length of the curve over `[0, horizon]`
    pub fn chord_length<C: SmoothCurve>(&self, curve: &C) -> f64 {
        self.horizon.hypot(curve.evaluate(self.horizon))
    }

    /// Local x advance per tick at `speed`.
    ///
    /// Written as `Dx * tick * speed / L` so that a stopped vehicle gets a
    /// zero step instead of a division by zero.
    pub fn x_step<C: SmoothCurve>(&self, curve: &C, speed: f64) -> f64 {
        let chord = self.chord_length(curve);
        if chord <= 0.0 {
            return 0.0;
        }
        self.horizon * self.tick * speed / chord
    }

    /// Sample `count` local points starting one step after the origin
    pub fn sample<C: SmoothCurve>(&self, curve: &C, speed: f64, count: usize) -> Vec<Point2D> {
        let step = self.x_step(curve, speed);
        (1..=count)
            .map(|i| {
                let x = step * i as f64;
                Point2D::new(x, curve.evaluate(x))
            })
            .collect()
    }

    /// Upper bound of the lateral gap between the curve and the straight
    /// segments joining consecutive samples: the sagitta `κ_max · Δ² / 8`
    /// for a step length `Δ = tick * speed`, with `κ_max` the largest
    /// curvature magnitude at the given samples.
    pub fn chord_error_bound<C: SmoothCurve>(&self, curve: &C, samples: &[Point2D], speed: f64) -> f64 {
        let kappa_max = samples
            .iter()
            .map(|p| curve.curvature(p.x).abs())
            .fold(0.0, f64::max);
        let step_len = self.tick * speed;
        kappa_max * step_len * step_len / 8.0
    }
}
