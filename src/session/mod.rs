//! Simulator-facing session layer

pub mod telemetry;
pub mod vehicle_session;

pub use telemetry::{decode_frame, encode_control, Frame, Telemetry, MANUAL_REPLY, MPH_TO_MPS};
pub use vehicle_session::VehicleSession;
