//! Error types for configuration and simulation runs.
//!
//! Not-admitted and not-departed attempts are ordinary outcomes and never
//! show up here.

use crate::lot::VehicleId;

/// Errors raised while loading or validating a [`SimulationConfig`](crate::SimulationConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that end a simulation run early.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A vehicle actor panicked, which means a lot invariant was broken.
    #[error("vehicle {vehicle} panicked: {message}")]
    VehiclePanicked { vehicle: VehicleId, message: String },

    #[error("async runtime error: {0}")]
    Runtime(String),
}
