//! Numeric editing policy.

use cutlab_core::{CutlabError, Result, OVERLAP_EPSILON};
use serde::{Deserialize, Serialize};

/// Limits and tolerances applied by the edit engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Shortest allowed clip on the timeline, seconds (default: 0.5).
    pub min_clip_duration: f64,
    /// Tolerance for overlap and adjacency checks, seconds (default: 0.001).
    pub epsilon: f64,
    /// Slowest playback rate (default: 0.25).
    pub min_speed: f64,
    /// Fastest playback rate (default: 4.0).
    pub max_speed: f64,
    /// Shortest non-cut transition, seconds (default: 0.1).
    pub min_transition: f64,
    /// Longest transition, seconds (default: 5.0).
    pub max_transition: f64,
    /// Duration used for auto-generated non-cut transitions (default: 0.5).
    pub default_transition: f64,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            min_clip_duration: 0.5,
            epsilon: OVERLAP_EPSILON,
            min_speed: 0.25,
            max_speed: 4.0,
            min_transition: 0.1,
            max_transition: 5.0,
            default_transition: 0.5,
        }
    }
}

impl EditConfig {
    /// Reject configurations the engine cannot honour.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("min_clip_duration", self.min_clip_duration),
            ("min_speed", self.min_speed),
            ("min_transition", self.min_transition),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CutlabError::InvalidParameter(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(CutlabError::InvalidParameter(format!(
                "epsilon must be non-negative, got {}",
                self.epsilon
            )));
        }
        if !(self.max_speed.is_finite() && self.max_speed >= self.min_speed) {
            return Err(CutlabError::InvalidParameter(format!(
                "speed range [{}, {}] is empty",
                self.min_speed, self.max_speed
            )));
        }
        if !(self.max_transition.is_finite() && self.max_transition >= self.min_transition) {
            return Err(CutlabError::InvalidParameter(format!(
                "transition range [{}, {}] is empty",
                self.min_transition, self.max_transition
            )));
        }
        if self.default_transition < self.min_transition
            || self.default_transition > self.max_transition
        {
            return Err(CutlabError::InvalidParameter(format!(
                "default_transition {} is outside [{}, {}]",
                self.default_transition, self.min_transition, self.max_transition
            )));
        }
        Ok(())
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(data)
            .map_err(|e| CutlabError::Serialization(format!("Invalid edit config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}
