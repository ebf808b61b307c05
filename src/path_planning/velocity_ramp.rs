//! Velocity ramp
//!
//! The commanded speed rises by a fixed step every cycle until it reaches
//! the ceiling. The ramp knows nothing about traffic; the ceiling is set by
//! whatever policy sits above the planner.

/// Commanded speed of one session [m/s]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampState {
    speed: f64,
}

impl RampState {
    pub fn new(speed: f64) -> Self {
        Self { speed: speed.max(0.0) }
    }

    pub fn stopped() -> Self {
        Self { speed: 0.0 }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }
}

impl Default for RampState {
    fn default() -> Self {
        Self::stopped()
    }
}

const SNAP_FRACTION: f64 = 1e-6;

/// Per-cycle speed update `speed <- min(ceiling, speed + step)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityRamp {
    step: f64,
}

impl VelocityRamp {
    pub fn new(step: f64) -> Self {
        Self { step }
    }

    /// Ramp state after one cycle under `ceiling`
    pub fn advance(&self, state: RampState, ceiling: f64) -> RampState {
        let next = state.speed + self.step;
        // accumulated rounding must not cost an extra cycle at the ceiling
        if next >= ceiling - self.step * SNAP_FRACTION {
            RampState::new(ceiling)
        } else {
            RampState::new(next)
        }
    }

    /// Number of cycles needed to go from `state` to `ceiling`
    pub fn cycles_to_ceiling(&self, state: RampState, ceiling: f64) -> usize {
        if state.speed >= ceiling {
            0
        } else {
            ((ceiling - state.speed) / self.step).ceil() as usize
        }
    }
}
