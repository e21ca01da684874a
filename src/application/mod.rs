//! Application layer - commands and their handlers.
//!
//! Orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    ConversationDriver, DriverSettings, GenerationMode, GenerationSettings, QuestionGenerator,
    RunError, RunSimulationCommand, RunTicket, SimulationError, SimulationRunner,
};
