// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Dispenser configuration.
//!
//! Every option has a default, so a config file only needs the keys it
//! changes. Durations are expressed in seconds.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::math::Vec3;

/// Shortest period accepted for any periodic timer (homing ticks, auto-fire).
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Errors raised while loading or validating a [`DispenserConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read or written.
    #[error("config I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The config text is not valid JSON for this schema.
    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field holds a value the dispenser cannot run with.
    #[error("invalid config field '{field}': {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Inclusive range the launch impulse magnitude is sampled from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpulseRange {
    /// Smallest magnitude.
    pub min: f32,
    /// Largest magnitude.
    pub max: f32,
}

impl ImpulseRange {
    /// A degenerate range that always yields `magnitude`.
    pub fn fixed(magnitude: f32) -> Self {
        Self {
            min: magnitude,
            max: magnitude,
        }
    }
}

impl Default for ImpulseRange {
    fn default() -> Self {
        Self {
            min: 500.0,
            max: 2000.0,
        }
    }
}

/// Homing behavior of every spawned object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomingConfig {
    /// Magnitude of each homing impulse.
    pub force: f32,
    /// Length of the line-of-sight probe.
    pub probe_range: f32,
    /// Seconds between two homing ticks.
    pub interval_secs: f32,
    /// Maximum number of hits examined per probe.
    pub max_hits: usize,
    /// Fixed scene axis the probe is cast along.
    pub probe_direction: Vec3,
}

impl HomingConfig {
    /// Tick interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        secs_to_duration(self.interval_secs)
    }
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self {
            force: 50.0,
            probe_range: 20.0,
            interval_secs: 0.1,
            max_hits: 10,
            probe_direction: Vec3::FORWARD,
        }
    }
}

/// Timed, aimed shooting from a fixed shooter object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoFireConfig {
    /// Seconds between two shots.
    pub interval_secs: f32,
    /// Speed of each shot, used both as the initial velocity and as the
    /// launch impulse once the body is dynamic.
    pub speed: f32,
}

impl AutoFireConfig {
    /// Shot period as a [`Duration`].
    pub fn interval(&self) -> Duration {
        secs_to_duration(self.interval_secs)
    }
}

impl Default for AutoFireConfig {
    fn default() -> Self {
        Self {
            interval_secs: 1.0,
            speed: 50.0,
        }
    }
}

/// Complete configuration of one dispenser instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispenserConfig {
    /// Template/resource spawned on each trigger. The dispenser stays
    /// disabled while this is unset.
    pub template: Option<String>,
    /// Recoil impulse applied to the triggering body.
    pub impulse_strength: f32,
    /// Launch impulse applied to each dispensed object.
    pub launch_impulse: ImpulseRange,
    /// Independent spawn attempts per trigger.
    pub objects_per_trigger: u32,
    /// Seconds a dispensed object lives before it is destroyed.
    pub ttl_secs: f32,
    /// Homing parameters.
    pub homing: HomingConfig,
    /// Optional hard cap on live objects; the oldest is evicted on overflow.
    pub max_live_objects: Option<usize>,
    /// Seed for launch impulse sampling.
    pub rng_seed: u64,
    /// Periodic shots aimed at the first character in sight. Off when unset.
    pub auto_fire: Option<AutoFireConfig>,
}

impl Default for DispenserConfig {
    fn default() -> Self {
        Self {
            template: None,
            impulse_strength: 22.0,
            launch_impulse: ImpulseRange::default(),
            objects_per_trigger: 1,
            ttl_secs: 10.0,
            homing: HomingConfig::default(),
            max_live_objects: None,
            rng_seed: 0x5eed,
            auto_fire: None,
        }
    }
}

impl DispenserConfig {
    /// Load a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save the configuration to a JSON file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Lifetime of each dispensed object as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        secs_to_duration(self.ttl_secs)
    }

    /// Checks every numeric option.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("ttl_secs", self.ttl_secs)?;
        if self.ttl().is_zero() {
            return Err(invalid("ttl_secs", "rounds to a zero lifetime"));
        }
        positive("homing.interval_secs", self.homing.interval_secs)?;
        at_least_min_interval("homing.interval_secs", self.homing.interval())?;
        if let Some(auto_fire) = &self.auto_fire {
            positive("auto_fire.interval_secs", auto_fire.interval_secs)?;
            at_least_min_interval("auto_fire.interval_secs", auto_fire.interval())?;
            non_negative("auto_fire.speed", auto_fire.speed)?;
        }
        non_negative("impulse_strength", self.impulse_strength)?;
        non_negative("homing.force", self.homing.force)?;
        non_negative("homing.probe_range", self.homing.probe_range)?;
        non_negative("launch_impulse.min", self.launch_impulse.min)?;
        non_negative("launch_impulse.max", self.launch_impulse.max)?;

        if self.launch_impulse.min > self.launch_impulse.max {
            return Err(invalid(
                "launch_impulse",
                format!(
                    "min {} exceeds max {}",
                    self.launch_impulse.min, self.launch_impulse.max
                ),
            ));
        }
        if self.objects_per_trigger == 0 {
            return Err(invalid("objects_per_trigger", "must be at least 1"));
        }
        if self.homing.max_hits == 0 {
            return Err(invalid("homing.max_hits", "must be at least 1"));
        }
        let direction = self.homing.probe_direction;
        if !direction.is_finite() || direction.normalize() == Vec3::ZERO {
            return Err(invalid(
                "homing.probe_direction",
                "must be a finite, non-zero vector",
            ));
        }
        if self.max_live_objects == Some(0) {
            return Err(invalid("max_live_objects", "must be at least 1 when set"));
        }
        Ok(())
    }
}

// Rounded to whole microseconds so `0.1` means exactly 100ms.
fn secs_to_duration(secs: f32) -> Duration {
    Duration::from_micros((f64::from(secs.max(0.0)) * 1_000_000.0).round() as u64)
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a positive number, got {value}")))
    }
}

fn at_least_min_interval(field: &'static str, interval: Duration) -> Result<(), ConfigError> {
    if interval < MIN_INTERVAL {
        return Err(invalid(
            field,
            format!("{interval:?} is below the {MIN_INTERVAL:?} minimum"),
        ));
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a finite, non-negative number, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DispenserConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ttl(), Duration::from_secs(10));
        assert_eq!(config.homing.interval(), Duration::from_millis(100));
        assert!(config.template.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = DispenserConfig::from_json(
            r#"{ "template": "orb", "objects_per_trigger": 3, "homing": { "force": 12.5 } }"#,
        )
        .unwrap();
        assert_eq!(config.template.as_deref(), Some("orb"));
        assert_eq!(config.objects_per_trigger, 3);
        assert_eq!(config.homing.force, 12.5);
        assert_eq!(config.homing.probe_range, 20.0);
        assert_eq!(config.ttl_secs, 10.0);
    }

    #[test]
    fn test_rejects_inverted_launch_range() {
        let err = DispenserConfig::from_json(r#"{ "launch_impulse": { "min": 10, "max": 1 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "launch_impulse", .. }));
    }

    #[test]
    fn test_rejects_non_positive_durations() {
        let mut config = DispenserConfig::default();
        config.ttl_secs = 0.0;
        assert!(config.validate().is_err());

        let mut config = DispenserConfig::default();
        config.homing.interval_secs = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_values_that_would_be_rounded_or_clamped() {
        let mut config = DispenserConfig::default();
        config.ttl_secs = 1e-7;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "ttl_secs", .. })
        ));

        let mut config = DispenserConfig::default();
        config.homing.interval_secs = 0.0005;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "homing.interval_secs", .. })
        ));

        config.homing.interval_secs = 0.001;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auto_fire_section() {
        let config = DispenserConfig::from_json(r#"{ "auto_fire": { "speed": 30 } }"#).unwrap();
        let auto_fire = config.auto_fire.unwrap();
        assert_eq!(auto_fire.speed, 30.0);
        assert_eq!(auto_fire.interval(), Duration::from_secs(1));
        assert!(DispenserConfig::default().auto_fire.is_none());

        let err = DispenserConfig::from_json(r#"{ "auto_fire": { "interval_secs": 0 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "auto_fire.interval_secs", .. }
        ));
    }

    #[test]
    fn test_rejects_zero_probe_direction_and_cap() {
        let mut config = DispenserConfig::default();
        config.homing.probe_direction = Vec3::ZERO;
        assert!(config.validate().is_err());

        let mut config = DispenserConfig::default();
        config.max_live_objects = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dispenser.json");
        let mut config = DispenserConfig::default();
        config.template = Some("orb".to_string());
        config.max_live_objects = Some(8);

        config.to_file(&path).unwrap();
        let loaded = DispenserConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = DispenserConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
