//! Simulation configuration, loaded from TOML or built in code.
//!
//! ```toml
//! capacity = 20
//! vehicles = 100
//! time_unit_ms = 1000
//! dwell_min_units = 3
//! dwell_max_units = 5
//! crossing_units = 1
//! backoff_ms = 100
//! arrival_rate = 1.0
//! event_buffer = 100
//! overflow_policy = "drop"
//! wake_on_release = true
//! seed = 42
//! ```

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::ipc::channels::OverflowPolicy;

/// One hour. Keeps every derived delay far from `Duration` overflow.
pub const MAX_TIME_UNIT_MS: u64 = 3_600_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of parking spaces.
    pub capacity: usize,
    /// Vehicles spawned by the driver.
    pub vehicles: usize,
    /// Length of one simulated time unit.
    pub time_unit_ms: u64,
    pub dwell_min_units: u32,
    /// Inclusive upper bound of the parking duration.
    pub dwell_max_units: u32,
    /// How long a vehicle keeps the lane while crossing it.
    pub crossing_units: u32,
    /// Wait between attempts that were not admitted or not departed.
    pub backoff_ms: u64,
    /// Mean arrivals per time unit; inter-arrival gaps are exponential.
    pub arrival_rate: f64,
    /// Capacity of the status queue.
    pub event_buffer: usize,
    pub overflow_policy: OverflowPolicy,
    /// Wake waiting vehicles when the lane is released instead of only
    /// sleeping out the backoff.
    pub wake_on_release: bool,
    /// Give up entering after this many attempts. Unbounded when absent.
    pub max_entry_attempts: Option<u32>,
    /// Seed for arrivals and dwell times. Drawn from entropy when absent.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            vehicles: 100,
            time_unit_ms: 1000,
            dwell_min_units: 3,
            dwell_max_units: 5,
            crossing_units: 1,
            backoff_ms: 100,
            arrival_rate: 1.0,
            event_buffer: 100,
            overflow_policy: OverflowPolicy::Drop,
            wake_on_release: true,
            max_entry_attempts: None,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::Invalid("capacity must be at least 1".into()));
        }
        if self.vehicles == 0 {
            return Err(ConfigError::Invalid("vehicles must be at least 1".into()));
        }
        if self.time_unit_ms == 0 || self.time_unit_ms > MAX_TIME_UNIT_MS {
            return Err(ConfigError::Invalid(format!(
                "time_unit_ms must be in 1..={MAX_TIME_UNIT_MS}, got {}",
                self.time_unit_ms
            )));
        }
        if self.dwell_min_units > self.dwell_max_units {
            return Err(ConfigError::Invalid(format!(
                "dwell_min_units ({}) exceeds dwell_max_units ({})",
                self.dwell_min_units, self.dwell_max_units
            )));
        }
        if !self.arrival_rate.is_finite() || self.arrival_rate <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "arrival_rate must be a positive number, got {}",
                self.arrival_rate
            )));
        }
        if self.event_buffer == 0 {
            return Err(ConfigError::Invalid("event_buffer must be at least 1".into()));
        }
        if self.max_entry_attempts == Some(0) {
            return Err(ConfigError::Invalid(
                "max_entry_attempts must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }

    pub fn time_unit(&self) -> Duration {
        Duration::from_millis(self.time_unit_ms)
    }

    pub fn crossing_delay(&self) -> Duration {
        self.time_unit() * self.crossing_units
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn dwell_units(&self) -> RangeInclusive<u32> {
        self.dwell_min_units..=self.dwell_max_units
    }
}

/// Loads and validates a config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<SimulationConfig, ConfigError> {
    SimulationConfig::from_file(path.as_ref())
}
