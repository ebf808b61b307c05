//! Planner parameters
//!
//! Every parameter has a default matching the highway simulator setup. A
//! TOML file only needs to list the values it overrides:
//!
//! ```toml
//! [ramp]
//! ceiling = 22.0
//!
//! [sampler]
//! target_len = 50
//! ```

use serde::Deserialize;
use std::fs::read_to_string;
use std::path::Path;

use crate::common::{PlannerError, PlannerResult};

/// Track length of the simulator highway loop [m]
pub const DEFAULT_MAX_S: f64 = 6945.554;

/// Waypoint map parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// The max s value before wrapping around the track back to 0 [m]
    pub max_s: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self { max_s: DEFAULT_MAX_S }
    }
}

/// Road geometry
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    /// Width of one lane [m]
    pub lane_width: f64,
    /// Number of lanes on our side of the road
    pub lane_count: usize,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            lane_width: 4.0,
            lane_count: 3,
        }
    }
}

impl LaneConfig {
    /// Lateral offset of the center of `lane` [m]
    pub fn lane_center(&self, lane: usize) -> f64 {
        self.lane_width * (lane as f64 + 0.5)
    }
}

/// Forward anchor placement
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Longitudinal offsets of the forward anchors ahead of the vehicle [m]
    pub forward_offsets: [f64; 3],
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            forward_offsets: [60.0, 90.0, 120.0],
        }
    }
}

/// Velocity ramp
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RampConfig {
    /// Speed increment per cycle [m/s]
    pub step: f64,
    /// Default speed ceiling, used when the policy does not set one [m/s]
    pub ceiling: f64,
    /// Commanded speed of a fresh session [m/s]
    pub initial_speed: f64,
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            step: 0.1,
            ceiling: 20.0,
            initial_speed: 0.0,
        }
    }
}

/// Path sampling
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Time between two consecutive trajectory points [s]
    pub tick: f64,
    /// Number of points in every emitted trajectory
    pub target_len: usize,
    /// Local x distance over which the curve is linearized [m].
    /// Defaults to the first forward anchor offset.
    pub horizon: Option<f64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            tick: 0.02,
            target_len: 100,
            horizon: None,
        }
    }
}

/// Complete planner configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub map: MapConfig,
    pub lanes: LaneConfig,
    pub anchors: AnchorConfig,
    pub ramp: RampConfig,
    pub sampler: SamplerConfig,
}

impl PlannerConfig {
    /// Load and validate a TOML parameter file
    pub fn load<P: AsRef<Path>>(path: P) -> PlannerResult<Self> {
        let path = path.as_ref();
        let params_str = read_to_string(path).map_err(|e| {
            PlannerError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&params_str)
    }

    pub fn from_toml_str(params_str: &str) -> PlannerResult<Self> {
        let config: PlannerConfig = toml::from_str(params_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Linearization horizon of the path sampler [m]
    pub fn linearization_horizon(&self) -> f64 {
        self.sampler.horizon.unwrap_or(self.anchors.forward_offsets[0])
    }

    pub fn validate(&self) -> PlannerResult<()> {
        fn positive(name: &str, value: f64) -> PlannerResult<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(PlannerError::Config(format!("{} must be positive, got {}", name, value)))
            }
        }

        positive("map.max_s", self.map.max_s)?;
        positive("lanes.lane_width", self.lanes.lane_width)?;
        positive("ramp.step", self.ramp.step)?;
        positive("sampler.tick", self.sampler.tick)?;
        positive("sampler.horizon", self.linearization_horizon())?;

        if !self.ramp.ceiling.is_finite() || self.ramp.ceiling < 0.0 {
            return Err(PlannerError::Config(format!(
                "ramp.ceiling must be non-negative, got {}",
                self.ramp.ceiling
            )));
        }
        if !self.ramp.initial_speed.is_finite() || self.ramp.initial_speed < 0.0 {
            return Err(PlannerError::Config(format!(
                "ramp.initial_speed must be non-negative, got {}",
                self.ramp.initial_speed
            )));
        }
        if self.lanes.lane_count == 0 {
            return Err(PlannerError::Config("lanes.lane_count must be at least 1".to_string()));
        }
        if self.sampler.target_len == 0 {
            return Err(PlannerError::Config("sampler.target_len must be at least 1".to_string()));
        }

        let offsets = &self.anchors.forward_offsets;
        positive("anchors.forward_offsets[0]", offsets[0])?;
        if offsets.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(PlannerError::Config(format!(
                "anchors.forward_offsets must be strictly increasing, got {:?}",
                offsets
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PlannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.linearization_horizon(), 60.0);
        assert_eq!(config.sampler.target_len, 100);
    }

    #[test]
    fn test_lane_center() {
        let lanes = LaneConfig::default();
        assert_eq!(lanes.lane_center(0), 2.0);
        assert_eq!(lanes.lane_center(1), 6.0);
        assert_eq!(lanes.lane_center(2), 10.0);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = PlannerConfig::from_toml_str(
            "[ramp]\nceiling = 22.0\n\n[sampler]\ntarget_len = 50\nhorizon = 30.0\n",
        )
        .unwrap();
        assert_eq!(config.ramp.ceiling, 22.0);
        assert_eq!(config.ramp.step, 0.1);
        assert_eq!(config.sampler.target_len, 50);
        assert_eq!(config.linearization_horizon(), 30.0);
        assert_eq!(config.map.max_s, DEFAULT_MAX_S);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = PlannerConfig::from_toml_str("").unwrap();
        assert_eq!(config.anchors.forward_offsets, [60.0, 90.0, 120.0]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = PlannerConfig::from_toml_str("[sampler]\ntick = 0.0\n").unwrap_err();
        assert!(matches!(err, PlannerError::Config(_)));

        let err = PlannerConfig::from_toml_str("[anchors]\nforward_offsets = [60.0, 50.0, 120.0]\n")
            .unwrap_err();
        assert!(matches!(err, PlannerError::Config(_)));

        let err = PlannerConfig::from_toml_str("[lanes]\nlane_count = 0\n").unwrap_err();
        assert!(matches!(err, PlannerError::Config(_)));
    }

    #[test]
    fn test_bad_toml_syntax() {
        let err = PlannerConfig::from_toml_str("[ramp\nstep = ").unwrap_err();
        assert!(matches!(err, PlannerError::Config(_)));
    }
}
