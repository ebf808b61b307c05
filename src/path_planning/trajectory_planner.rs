//! Per-cycle trajectory generation
//!
//! One call to [`TrajectoryPlanner::plan`] runs the whole pipeline:
//! anchors -> local frame -> curve fit -> speed-ramped sampling -> global
//! frame, and appends the new points to the untouched previous path.
//!
//! The planner itself is immutable and can be shared between sessions.
//! Everything that changes from one cycle to the next lives in
//! [`PlannerState`], which the caller passes in and gets back. A failed
//! cycle returns an error and the caller simply keeps its old state.

use log::debug;
use std::sync::Arc;

use super::anchor_selector::{AnchorMode, AnchorSelector, AnchorSet};
use super::cubic_spline::NaturalSplineFitter;
use super::path_sampler::PathSampler;
use super::velocity_ramp::{RampState, VelocityRamp};
use crate::common::{CurveFitter, Path2D, PlannerError, PlannerResult, VehiclePose};
use crate::config::PlannerConfig;
use crate::mapping::WaypointMap;

/// Externally chosen lane and speed limit for one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyInput {
    /// Lane index, 0 is the lane next to the centerline
    pub target_lane: usize,
    /// Speed ceiling [m/s]
    pub speed_ceiling: f64,
}

impl PolicyInput {
    pub fn new(target_lane: usize, speed_ceiling: f64) -> Self {
        Self { target_lane, speed_ceiling }
    }
}

/// Everything the planner needs for one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleInput {
    pub pose: VehiclePose,
    /// Points of the last trajectory the vehicle has not consumed yet
    pub previous_path: Path2D,
    pub policy: PolicyInput,
}

/// Session state carried from one cycle to the next
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlannerState {
    pub ramp: RampState,
    /// Number of completed cycles
    pub cycles: u64,
}

impl PlannerState {
    pub fn new(ramp: RampState) -> Self {
        Self { ramp, cycles: 0 }
    }

    pub fn speed(&self) -> f64 {
        self.ramp.speed()
    }
}

/// Result of a successful cycle
#[derive(Debug, Clone)]
pub struct CycleOutput {
    /// State to pass into the next cycle
    pub state: PlannerState,
    /// Previous path followed by the new points
    pub trajectory: Path2D,
    pub anchors: AnchorSet,
    /// Number of points appended this cycle
    pub new_points: usize,
}

impl CycleOutput {
    pub fn mode(&self) -> AnchorMode {
        self.anchors.mode
    }
}

pub struct TrajectoryPlanner<F: CurveFitter = NaturalSplineFitter> {
    map: Arc<WaypointMap>,
    config: PlannerConfig,
    selector: AnchorSelector,
    ramp: VelocityRamp,
    sampler: PathSampler,
    fitter: F,
}

impl TrajectoryPlanner<NaturalSplineFitter> {
    pub fn new(map: Arc<WaypointMap>, config: PlannerConfig) -> PlannerResult<Self> {
        Self::with_fitter(map, config, NaturalSplineFitter)
    }
}

impl<F: CurveFitter> TrajectoryPlanner<F> {
    pub fn with_fitter(map: Arc<WaypointMap>, config: PlannerConfig, fitter: F) -> PlannerResult<Self> {
        config.validate()?;
        let selector = AnchorSelector::new(config.anchors.forward_offsets);
        let ramp = VelocityRamp::new(config.ramp.step);
        let sampler = PathSampler::new(config.sampler.tick, config.linearization_horizon());
        Ok(Self {
            map,
            config,
            selector,
            ramp,
            sampler,
            fitter,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// State of a session that has not planned anything yet
    pub fn initial_state(&self) -> PlannerState {
        PlannerState::new(RampState::new(self.config.ramp.initial_speed))
    }

    /// Policy used when the session does not supply one
    pub fn default_policy(&self) -> PolicyInput {
        PolicyInput::new(1usize.min(self.config.lanes.lane_count - 1), self.config.ramp.ceiling)
    }

    fn check_input(&self, input: &CycleInput) -> PlannerResult<()> {
        input.pose.validate()?;
        input.previous_path.validate()?;

        let policy = &input.policy;
        if policy.target_lane >= self.config.lanes.lane_count {
            return Err(PlannerError::MalformedInput(format!(
                "target lane {} does not exist, the road has {} lanes",
                policy.target_lane, self.config.lanes.lane_count
            )));
        }
        if !policy.speed_ceiling.is_finite() || policy.speed_ceiling < 0.0 {
            return Err(PlannerError::MalformedInput(format!(
                "speed ceiling must be finite and non-negative, got {}",
                policy.speed_ceiling
            )));
        }
        Ok(())
    }

    /// Run one planning cycle.
    ///
    /// On error nothing is emitted and `state` stays valid for the next
    /// cycle.
    pub fn plan(&self, state: &PlannerState, input: &CycleInput) -> PlannerResult<CycleOutput> {
        self.check_input(input)?;

        let ramp = self.ramp.advance(state.ramp, input.policy.speed_ceiling);
        let target_d = self.config.lanes.lane_center(input.policy.target_lane);
        let anchors = self.selector.select(&input.pose, &input.previous_path, target_d, &self.map);

        let local = anchors.to_local();
        let xs: Vec<f64> = local.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = local.iter().map(|p| p.y).collect();
        let curve = self.fitter.fit(&xs, &ys)?;

        let kept = input.previous_path.len();
        let new_points = self.config.sampler.target_len.saturating_sub(kept);
        let samples = self.sampler.sample(&curve, ramp.speed(), new_points);

        let mut trajectory = Path2D::with_capacity(kept + new_points);
        trajectory.points.extend_from_slice(&input.previous_path.points);
        trajectory.points.extend(anchors.frame().to_global(&samples));

        debug!(
            "cycle {}: {} mode, speed {:.2} m/s, kept {} points, added {} (chord error <= {:.2e} m)",
            state.cycles + 1,
            anchors.mode,
            ramp.speed(),
            kept,
            new_points,
            self.sampler.chord_error_bound(&curve, &samples, ramp.speed())
        );

        Ok(CycleOutput {
            state: PlannerState {
                ramp,
                cycles: state.cycles + 1,
            },
            trajectory,
            anchors,
            new_points,
        })
    }
}
