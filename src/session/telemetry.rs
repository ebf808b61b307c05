//! Simulator message framing
//!
//! Messages are socket.io text events: the prefix `42` followed by a JSON
//! array `[event, payload]`. The simulator sends `telemetry` events with the
//! ego localization in degrees and miles per hour; the planner answers with
//! a `control` event holding the next trajectory, or with `manual` when the
//! simulator has nothing for us.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::{FrenetPoint, Path2D, PlannerResult, VehiclePose};

/// Miles per hour to meters per second
pub const MPH_TO_MPS: f64 = 0.44704;

/// Reply telling the simulator to hand control back to the user
pub const MANUAL_REPLY: &str = "42[\"manual\",{}]";

const EVENT_PREFIX: &str = "42";

/// Raw telemetry payload, simulator units
#[derive(Debug, Clone, Deserialize)]
struct TelemetryPayload {
    x: f64,
    y: f64,
    s: f64,
    d: f64,
    /// [deg]
    yaw: f64,
    /// [mph]
    speed: f64,
    previous_path_x: Vec<f64>,
    previous_path_y: Vec<f64>,
    #[serde(default)]
    end_path_s: f64,
    #[serde(default)]
    end_path_d: f64,
    #[serde(default)]
    sensor_fusion: Vec<Value>,
}

/// One decoded telemetry event, SI units
#[derive(Debug, Clone, PartialEq)]
pub struct Telemetry {
    pub pose: VehiclePose,
    pub previous_path: Path2D,
    /// Frenet position of the last previous-path point
    pub end_path: FrenetPoint,
    /// Number of other vehicles reported by sensor fusion. The planner does
    /// not react to them.
    pub other_vehicles: usize,
}

impl Telemetry {
    fn from_payload(p: TelemetryPayload) -> PlannerResult<Self> {
        let previous_path = Path2D::from_xy(&p.previous_path_x, &p.previous_path_y)?;
        Ok(Self {
            pose: VehiclePose::new(p.x, p.y, p.s, p.d, p.yaw.to_radians(), p.speed * MPH_TO_MPS),
            previous_path,
            end_path: FrenetPoint::new(p.end_path_s, p.end_path_d),
            other_vehicles: p.sensor_fusion.len(),
        })
    }
}

/// Decoded incoming message
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Telemetry(Telemetry),
    /// An event without payload; answer with [`MANUAL_REPLY`]
    Manual,
    /// Not an event or an event the planner does not handle
    Ignored,
}

/// Decode one text message
pub fn decode_frame(text: &str) -> PlannerResult<Frame> {
    let text = text.trim();
    let payload = match text.strip_prefix(EVENT_PREFIX) {
        Some("") => return Ok(Frame::Manual),
        Some(rest) => rest,
        None => return Ok(Frame::Ignored),
    };

    let value: Value = serde_json::from_str(payload)?;
    let items = match value.as_array() {
        Some(items) => items,
        None => return Ok(Frame::Ignored),
    };

    match (items.get(0).and_then(Value::as_str), items.get(1)) {
        (_, None) | (_, Some(Value::Null)) => Ok(Frame::Manual),
        (Some("telemetry"), Some(data)) => {
            let payload: TelemetryPayload = serde_json::from_value(data.clone())?;
            Ok(Frame::Telemetry(Telemetry::from_payload(payload)?))
        }
        _ => Ok(Frame::Ignored),
    }
}

/// Encode a trajectory as a `control` event
pub fn encode_control(trajectory: &Path2D) -> String {
    let msg = json!({
        "next_x": trajectory.x_coords(),
        "next_y": trajectory.y_coords(),
    });
    format!("42[\"control\",{}]", msg)
}
