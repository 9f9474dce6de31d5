//! Configuration for the pose driver registry

use crate::curve::{Easing, Interpolation};
use crate::PoseDriverError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseDriverConfig {
    /// Distances at or below this are treated as coincident by the radius solver
    pub radius_epsilon: f64,
    /// Radius given to new activations before the solver runs
    pub default_radius: f64,
    /// Target weight for new activations when the shape key has no usable value
    pub default_target: f64,
    /// Shape key values above this are adopted as the activation target
    pub min_shape_value: f64,
    /// Name of auto-created groups
    pub default_group_name: String,
    /// Tolerance used when capture auto-detects channels that left their rest value
    pub capture_tolerance: f64,
    /// Preset used for new falloff curves
    pub default_interpolation: Interpolation,
    pub default_easing: Easing,
    /// Maximum number of events kept before the oldest are dropped
    pub max_events: usize,
}

impl Default for PoseDriverConfig {
    fn default() -> Self {
        Self {
            radius_epsilon: 0.001,
            default_radius: 0.2,
            default_target: 1.0,
            min_shape_value: 0.01,
            default_group_name: "PoseTarget".to_string(),
            capture_tolerance: 0.001,
            default_interpolation: Interpolation::Quad,
            default_easing: Easing::EaseInOut,
            max_events: 1024,
        }
    }
}

impl PoseDriverConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), PoseDriverError> {
        if self.radius_epsilon.is_nan() || self.radius_epsilon < 0.0 {
            return Err(PoseDriverError::InvalidValue {
                reason: "radius_epsilon must be non-negative".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.default_radius) {
            return Err(PoseDriverError::InvalidValue {
                reason: "default_radius must be within [0, 1]".to_string(),
            });
        }
        if !self.default_target.is_finite() {
            return Err(PoseDriverError::InvalidValue {
                reason: "default_target must be finite".to_string(),
            });
        }
        if self.default_group_name.trim().is_empty() {
            return Err(PoseDriverError::InvalidValue {
                reason: "default_group_name must not be empty".to_string(),
            });
        }
        if self.max_events == 0 {
            return Err(PoseDriverError::InvalidValue {
                reason: "max_events must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_radius_epsilon(mut self, epsilon: f64) -> Self {
        self.radius_epsilon = epsilon;
        self
    }

    pub fn with_default_radius(mut self, radius: f64) -> Self {
        self.default_radius = radius;
        self
    }

    pub fn with_default_group_name(mut self, name: impl Into<String>) -> Self {
        self.default_group_name = name.into();
        self
    }

    pub fn with_default_falloff(mut self, interpolation: Interpolation, easing: Easing) -> Self {
        self.default_interpolation = interpolation;
        self.default_easing = easing;
        self
    }

    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PoseDriverConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let config = PoseDriverConfig::default().with_default_radius(1.5);
        assert!(config.validate().is_err());
        let config = PoseDriverConfig::default().with_default_group_name("  ");
        assert!(config.validate().is_err());
        let config = PoseDriverConfig::default().with_radius_epsilon(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let config = PoseDriverConfig::default().with_max_events(8);
        let json = serde_json::to_string(&config).unwrap();
        let back: PoseDriverConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
