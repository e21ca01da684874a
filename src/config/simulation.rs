//! Simulation batch configuration

use serde::Deserialize;
use std::path::PathBuf;

use crate::application::{DriverSettings, GenerationMode, RunSimulationCommand};
use crate::domain::evaluation::DEFAULT_PASS_SCORE;
use crate::domain::simulation::{PersonaSelection, TimingModel};

use super::error::ValidationError;

/// Upper bound on runs in flight.
pub const MAX_CONCURRENCY: usize = 64;

/// Who answers the interviewer
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponderMode {
    #[default]
    Persona,
    Model,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_runs")]
    pub runs: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Assistant turns before a run is cut off
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Consecutive generation fallbacks tolerated per run
    #[serde(default = "default_max_generation_failures")]
    pub max_generation_failures: u32,

    #[serde(default)]
    pub persona_selection: PersonaSelection,

    #[serde(default)]
    pub generation_mode: GenerationMode,

    #[serde(default)]
    pub responder_mode: ResponderMode,

    #[serde(default = "default_pass_score")]
    pub quality_pass_score: f64,

    /// YAML bot definition; the built-in demo bot when unset
    pub bot_config_path: Option<PathBuf>,

    /// Where the JSON report is written; nothing is written when unset
    pub report_path: Option<PathBuf>,

    /// Best and worst runs kept in the report
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
}

impl SimulationConfig {
    /// Whether any part of the batch talks to a model.
    pub fn requires_ai(&self) -> bool {
        self.generation_mode == GenerationMode::Model || self.responder_mode == ResponderMode::Model
    }

    pub fn command(&self) -> RunSimulationCommand {
        RunSimulationCommand {
            runs: self.runs,
            seed: self.seed,
            concurrency: self.concurrency,
            persona_selection: self.persona_selection,
            sample_count: self.sample_count,
        }
    }

    pub fn driver_settings(&self) -> DriverSettings {
        DriverSettings {
            max_steps: self.max_steps,
            max_generation_failures: self.max_generation_failures,
            timing: TimingModel::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.runs == 0 {
            return Err(ValidationError::InvalidRunCount);
        }
        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            return Err(ValidationError::InvalidConcurrency {
                max: MAX_CONCURRENCY,
            });
        }
        if self.max_steps == 0 {
            return Err(ValidationError::InvalidStepCeiling);
        }
        if !(0.0..=100.0).contains(&self.quality_pass_score) {
            return Err(ValidationError::InvalidPassScore);
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            runs: default_runs(),
            seed: default_seed(),
            concurrency: default_concurrency(),
            max_steps: default_max_steps(),
            max_generation_failures: default_max_generation_failures(),
            persona_selection: PersonaSelection::default(),
            generation_mode: GenerationMode::default(),
            responder_mode: ResponderMode::default(),
            quality_pass_score: default_pass_score(),
            bot_config_path: None,
            report_path: None,
            sample_count: default_sample_count(),
        }
    }
}

fn default_runs() -> usize {
    20
}

fn default_seed() -> u64 {
    42
}

fn default_concurrency() -> usize {
    4
}

fn default_max_steps() -> usize {
    60
}

fn default_max_generation_failures() -> u32 {
    3
}

fn default_pass_score() -> f64 {
    DEFAULT_PASS_SCORE
}

fn default_sample_count() -> usize {
    3
}
