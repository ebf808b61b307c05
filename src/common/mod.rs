//! Common types, traits, and error definitions for highway_planner
//!
//! This module provides the foundational building blocks used by the
//! map, the planning pipeline and the session layer.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
