//! Error types for highway_planner

use thiserror::Error;

/// Main error type for the planner and its I/O layers
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Waypoint map could not be loaded. Fatal: nothing can be planned.
    #[error("Map load error: {0}")]
    MapLoad(String),
    /// Pose, previous path, policy or telemetry frame is missing or invalid.
    /// The cycle is skipped.
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    /// Anchors do not define a single-valued curve in the local frame.
    /// The cycle is skipped.
    #[error("Degenerate fit: {0}")]
    DegenerateFit(String),
    /// Invalid parameter file or parameter value
    #[error("Configuration error: {0}")]
    Config(String),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlannerError {
    /// Whether the error only invalidates the current cycle. The session
    /// keeps its state and the vehicle keeps driving its previous path.
    pub fn skips_cycle(&self) -> bool {
        matches!(self, PlannerError::MalformedInput(_) | PlannerError::DegenerateFit(_))
    }
}

impl From<csv::Error> for PlannerError {
    fn from(e: csv::Error) -> Self {
        PlannerError::MapLoad(e.to_string())
    }
}

impl From<toml::de::Error> for PlannerError {
    fn from(e: toml::de::Error) -> Self {
        PlannerError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(e: serde_json::Error) -> Self {
        PlannerError::MalformedInput(e.to_string())
    }
}

/// Result type alias for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlannerError::MapLoad("map is empty".to_string());
        assert_eq!(format!("{}", err), "Map load error: map is empty");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlannerError = io_err.into();
        assert!(matches!(err, PlannerError::Io(_)));
    }

    #[test]
    fn test_skips_cycle() {
        assert!(PlannerError::DegenerateFit("dup".to_string()).skips_cycle());
        assert!(PlannerError::MalformedInput("nan".to_string()).skips_cycle());
        assert!(!PlannerError::MapLoad("empty".to_string()).skips_cycle());
    }
}
