//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `INTERVIEW_FLOW` prefix
//! and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use interview_flow::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Simulating {} runs", config.simulation.runs);
//! ```

mod ai;
mod error;
mod logging;
mod simulation;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use simulation::{ResponderMode, SimulationConfig, MAX_CONCURRENCY};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
/// Every section has defaults, so an empty environment yields an offline
/// template-and-persona batch against the demo bot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Batch size, seeding, modes and output paths
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// AI provider configuration (OpenAI-compatible)
    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `INTERVIEW_FLOW` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `INTERVIEW_FLOW__SIMULATION__RUNS=50` -> `simulation.runs = 50`
    /// - `INTERVIEW_FLOW__AI__OPENAI_API_KEY=...` -> `ai.openai_api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("INTERVIEW_FLOW")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any section is invalid, or if a
    /// model-backed mode is selected without an API key.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.simulation.validate()?;
        self.ai.validate()?;
        self.logging.validate()?;
        if self.simulation.requires_ai() && !self.ai.has_api_key() {
            return Err(ValidationError::MissingRequired("AI__OPENAI_API_KEY"));
        }
        Ok(())
    }
}
