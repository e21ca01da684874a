//! Application handlers.
//!
//! Command handlers that drive the interview domain against the ports.

pub mod simulation;

pub use simulation::{
    ConversationDriver, DriverSettings, GenerationMode, GenerationSettings, QuestionGenerator,
    RunError, RunSimulationCommand, RunTicket, SimulationError, SimulationRunner,
};
