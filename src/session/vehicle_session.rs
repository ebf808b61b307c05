//! One connected vehicle
//!
//! A session owns the planner state of a single simulator connection and
//! turns incoming frames into replies. Several sessions can share one
//! [`TrajectoryPlanner`].

use log::{debug, warn};
use std::sync::Arc;

use super::telemetry::{decode_frame, encode_control, Frame, Telemetry, MANUAL_REPLY};
use crate::common::PlannerResult;
use crate::path_planning::{CycleInput, CycleOutput, PlannerState, PolicyInput, TrajectoryPlanner};

pub struct VehicleSession {
    planner: Arc<TrajectoryPlanner>,
    state: PlannerState,
    policy: PolicyInput,
}

impl VehicleSession {
    pub fn new(planner: Arc<TrajectoryPlanner>) -> Self {
        let state = planner.initial_state();
        let policy = planner.default_policy();
        Self { planner, state, policy }
    }

    pub fn with_policy(planner: Arc<TrajectoryPlanner>, policy: PolicyInput) -> Self {
        let state = planner.initial_state();
        Self { planner, state, policy }
    }

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    pub fn policy(&self) -> PolicyInput {
        self.policy
    }

    pub fn set_policy(&mut self, policy: PolicyInput) {
        self.policy = policy;
    }

    /// Plan one cycle from decoded telemetry.
    ///
    /// The session state only moves forward when the cycle succeeds.
    pub fn step(&mut self, telemetry: &Telemetry) -> PlannerResult<CycleOutput> {
        let input = CycleInput {
            pose: telemetry.pose,
            previous_path: telemetry.previous_path.clone(),
            policy: self.policy,
        };
        let out = self.planner.plan(&self.state, &input)?;
        self.state = out.state;
        Ok(out)
    }

    /// Handle one text frame, returning the reply to send if there is one
    pub fn handle_frame(&mut self, text: &str) -> Option<String> {
        let frame = match decode_frame(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("dropping frame: {}", e);
                return None;
            }
        };

        match frame {
            Frame::Telemetry(telemetry) => match self.step(&telemetry) {
                Ok(out) => {
                    debug!(
                        "replying with {} points, {} vehicles around",
                        out.trajectory.len(),
                        telemetry.other_vehicles
                    );
                    Some(encode_control(&out.trajectory))
                }
                Err(e) => {
                    warn!("skipping cycle {}: {}", self.state.cycles + 1, e);
                    None
                }
            },
            Frame::Manual => Some(MANUAL_REPLY.to_string()),
            Frame::Ignored => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlannerConfig;
    use crate::mapping::{MapRow, WaypointMap};
    use assert_approx_eq::assert_approx_eq;
    use serde_json::Value;

    fn planner() -> Arc<TrajectoryPlanner> {
        let rows: Vec<MapRow> = (0..100)
            .map(|i| MapRow::new(10.0 * i as f64, 0.0, 10.0 * i as f64, 0.0, 1.0))
            .collect();
        let map = WaypointMap::from_rows(&rows, 1000.0).unwrap();
        Arc::new(TrajectoryPlanner::new(Arc::new(map), PlannerConfig::default()).unwrap())
    }

    const COLD_START: &str = r#"42["telemetry",{"x":0,"y":6,"yaw":0,"speed":0,"s":0,"d":6,"previous_path_x":[],"previous_path_y":[],"end_path_s":0,"end_path_d":0,"sensor_fusion":[]}]"#;

    #[test]
    fn test_cold_start_reply() {
        let mut session = VehicleSession::new(planner());
        let reply = session.handle_frame(COLD_START).unwrap();
        let value: Value = serde_json::from_str(&reply[2..]).unwrap();
        assert_eq!(value[0], "control");
        assert_eq!(value[1]["next_x"].as_array().unwrap().len(), 100);
        assert_eq!(session.state().cycles, 1);
        assert_approx_eq!(session.state().speed(), 0.1, 1e-12);
    }

    #[test]
    fn test_manual_reply() {
        let mut session = VehicleSession::new(planner());
        assert_eq!(session.handle_frame("42[\"telemetry\",null]").unwrap(), MANUAL_REPLY);
        assert_eq!(session.handle_frame("42").unwrap(), MANUAL_REPLY);
        assert_eq!(session.state().cycles, 0);
    }

    #[test]
    fn test_ignored_frames_have_no_reply() {
        let mut session = VehicleSession::new(planner());
        assert!(session.handle_frame("2").is_none());
        assert!(session.handle_frame("42[\"telemetry\",{\"x\":1}]").is_none());
    }

    #[test]
    fn test_failed_cycle_keeps_state() {
        let mut session = VehicleSession::new(planner());
        session.handle_frame(COLD_START).unwrap();
        let before = *session.state();

        // a previous path ending past the forward anchors cannot be fitted
        let degenerate = r#"42["telemetry",{"x":0,"y":6,"yaw":0,"speed":2,"s":0,"d":6,"previous_path_x":[79.6,80],"previous_path_y":[6,6]}]"#;
        assert!(session.handle_frame(degenerate).is_none());
        assert_eq!(*session.state(), before);

        session.handle_frame(COLD_START).unwrap();
        assert_eq!(session.state().cycles, 2);
        assert_approx_eq!(session.state().speed(), 0.2, 1e-12);
    }

    #[test]
    fn test_policy_lane_change() {
        let mut session = VehicleSession::new(planner());
        assert_eq!(session.policy().target_lane, 1);
        session.set_policy(PolicyInput::new(2, 20.0));
        let text = COLD_START.replace("\"d\":6", "\"d\":10").replace("\"y\":6", "\"y\":10");
        let reply = session.handle_frame(&text).unwrap();
        let value: Value = serde_json::from_str(&reply[2..]).unwrap();
        let ys = value[1]["next_y"].as_array().unwrap();
        assert_approx_eq!(ys[0].as_f64().unwrap(), 10.0, 1e-9);
    }
}
