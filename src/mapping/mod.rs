// Highway map module: waypoint table and Frenet conversions

pub mod waypoint_map;
pub mod frenet;

pub use waypoint_map::*;
pub use frenet::*;
