//! # Vehicle Configuration
//!
//! Static configuration for the drive layer: safety constants, steering
//! calibration, range sensor refresh and the clearance watcher schedule.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [driving]
//! min_angle = -20.0
//! max_angle = 20.0
//! step_unit = 80
//! distance_per_step = 0.0125
//! safety_distance = 10.0
//!
//! [steering]
//! channel = 0
//! coefficients = [0.05, 2.5, 307.0]
//!
//! [watcher]
//! min_delay = 1.0
//! max_delay = 8.0
//! steps = 3
//! ```
//!
//! Steering coefficients are listed highest degree first; see
//! `src/steering.rs` for how they are evaluated.

// src/config.rs - Single configuration file
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::scheduler::AdaptiveSchedule;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration struct for driving, steering, sensors and watchers.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub driving: DrivingConfig,
    #[serde(default)]
    pub steering: SteeringConfig,
    #[serde(default)]
    pub sensors: SensorConfig,
    #[serde(default)]
    pub watcher: WatcherConfig,
}

/// Safety constants of the stepping engine. Invariant for the process lifetime.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DrivingConfig {
    #[serde(default = "default_min_angle")]
    pub min_angle: f64,
    #[serde(default = "default_max_angle")]
    pub max_angle: f64,
    /// Steps issued per safety-checked batch.
    #[serde(default = "default_step_unit")]
    pub step_unit: u32,
    /// Linear travel modeled per motor step, in sensor distance units.
    #[serde(default = "default_distance_per_step")]
    pub distance_per_step: f64,
    /// Clearance that must remain after a prospective batch.
    #[serde(default = "default_safety_distance")]
    pub safety_distance: f64,
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
}

impl Default for DrivingConfig {
    fn default() -> Self {
        Self {
            min_angle: default_min_angle(),
            max_angle: default_max_angle(),
            step_unit: default_step_unit(),
            distance_per_step: default_distance_per_step(),
            safety_distance: default_safety_distance(),
            retry_interval_ms: default_retry_interval_ms(),
        }
    }
}

impl DrivingConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn clamp_angle(&self, angle: f64) -> f64 {
        angle.max(self.min_angle).min(self.max_angle)
    }
}

/// Steering servo calibration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SteeringConfig {
    #[serde(default)]
    pub channel: u8,
    /// Polynomial coefficients, highest degree first.
    #[serde(default = "default_coefficients")]
    pub coefficients: Vec<f64>,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            coefficients: default_coefficients(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SensorConfig {
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
        }
    }
}

impl SensorConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

/// Adaptive polling schedule for condition watchers. Delays are in seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatcherConfig {
    #[serde(default = "default_min_delay")]
    pub min_delay: f64,
    #[serde(default = "default_max_delay")]
    pub max_delay: f64,
    #[serde(default = "default_watcher_steps")]
    pub steps: u32,
    /// Reading change below which a clearance probe reports "stable".
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            min_delay: default_min_delay(),
            max_delay: default_max_delay(),
            steps: default_watcher_steps(),
            tolerance: default_tolerance(),
        }
    }
}

impl WatcherConfig {
    pub fn schedule(&self) -> Result<AdaptiveSchedule, ConfigError> {
        AdaptiveSchedule::from_secs(self.min_delay, self.max_delay, self.steps)
            .map_err(|e| ConfigError::Invalid(format!("watcher: {}", e)))
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let driving = &self.driving;
        if driving.min_angle > driving.max_angle {
            return Err(ConfigError::Invalid(format!(
                "min_angle ({}) must not exceed max_angle ({})",
                driving.min_angle, driving.max_angle
            )));
        }
        if driving.step_unit == 0 {
            return Err(ConfigError::Invalid("step_unit must be at least 1".to_string()));
        }
        if driving.distance_per_step < 0.0 {
            return Err(ConfigError::Invalid("distance_per_step must not be negative".to_string()));
        }
        if self.steering.coefficients.is_empty() {
            return Err(ConfigError::Invalid("steering coefficients must not be empty".to_string()));
        }
        self.watcher.schedule()?;
        Ok(())
    }
}

fn default_min_angle() -> f64 { -20.0 }
fn default_max_angle() -> f64 { 20.0 }
fn default_step_unit() -> u32 { 80 }
fn default_distance_per_step() -> f64 { 0.0125 }
fn default_safety_distance() -> f64 { 10.0 }
fn default_retry_interval_ms() -> u64 { 1000 }
fn default_coefficients() -> Vec<f64> { vec![0.0, 2.5, 307.0] }
fn default_refresh_interval_ms() -> u64 { 400 }
fn default_min_delay() -> f64 { 1.0 }
fn default_max_delay() -> f64 { 8.0 }
fn default_watcher_steps() -> u32 { 3 }
fn default_tolerance() -> f64 { 1.0 }

pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let config: Config = match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to parse config TOML: {}", e);
                return Err(ConfigError::Toml(e));
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path.display(), e);
            return Err(ConfigError::Io(e));
        }
    };
    config.validate()?;
    Ok(config)
}
