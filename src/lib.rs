//! highway_planner - per-cycle local trajectory generation for highway driving
//!
//! Every control cycle the planner receives the vehicle localization and
//! the unconsumed tail of its last trajectory, and returns a longer,
//! smooth, speed-ramped trajectory that starts with that tail.

// Core modules
pub mod common;
pub mod config;
pub mod utils;

// Planning modules
pub mod mapping;
pub mod path_planning;
pub mod session;

// Re-export common types for convenience
pub use common::{FrenetPoint, Path2D, Point2D, Pose2D, VehiclePose};
pub use common::{CurveFitter, SmoothCurve};
pub use common::{PlannerError, PlannerResult};
pub use config::PlannerConfig;
pub use mapping::WaypointMap;
pub use path_planning::{CycleInput, CycleOutput, PlannerState, PolicyInput, TrajectoryPlanner};
pub use session::VehicleSession;
