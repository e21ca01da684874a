//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Run count must be at least 1")]
    InvalidRunCount,

    #[error("Concurrency must be between 1 and {max}")]
    InvalidConcurrency { max: usize },

    #[error("Step ceiling must be at least 1")]
    InvalidStepCeiling,

    #[error("Quality pass score must lie in 0..=100")]
    InvalidPassScore,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Temperature must lie in 0.0..=2.0")]
    InvalidTemperature,

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),
}
