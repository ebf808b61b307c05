//! Highway trajectory generation
//!
//! Produces, once per control cycle, a smooth and speed-controlled list of
//! global points continuing whatever the vehicle has not driven yet.
//!
//! # Components
//!
//! - `anchor_selector`: history and forward anchors, bootstrapping/tracking modes
//! - `frame`: global <-> vehicle-local transform
//! - `cubic_spline`: natural cubic spline through the local anchors
//! - `velocity_ramp`: per-session commanded speed
//! - `path_sampler`: chord-length linearized sampling of the spline
//! - `trajectory_planner`: the cycle itself
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use highway_planner::common::{Path2D, VehiclePose};
//! use highway_planner::config::PlannerConfig;
//! use highway_planner::mapping::WaypointMap;
//! use highway_planner::path_planning::{CycleInput, PolicyInput, TrajectoryPlanner};
//!
//! let map = WaypointMap::from_path("data/highway_map.csv", 6945.554).unwrap();
//! let planner = TrajectoryPlanner::new(Arc::new(map), PlannerConfig::default()).unwrap();
//!
//! let mut state = planner.initial_state();
//! let input = CycleInput {
//!     pose: VehiclePose::new(909.48, 1128.67, 124.83, 6.16, 0.0, 0.0),
//!     previous_path: Path2D::new(),
//!     policy: PolicyInput::new(1, 20.0),
//! };
//! let out = planner.plan(&state, &input).unwrap();
//! state = out.state;
//! ```

pub mod anchor_selector;
pub mod frame;
pub mod cubic_spline;
pub mod velocity_ramp;
pub mod path_sampler;
pub mod trajectory_planner;

// Re-exports
pub use anchor_selector::{AnchorMode, AnchorSelector, AnchorSet, ANCHOR_COUNT};
pub use frame::{to_global, to_local, LocalFrame};
pub use cubic_spline::{CubicSpline1D, NaturalSplineFitter};
pub use velocity_ramp::{RampState, VelocityRamp};
pub use path_sampler::PathSampler;
pub use trajectory_planner::{
    CycleInput, CycleOutput, PlannerState, PolicyInput, TrajectoryPlanner,
};
