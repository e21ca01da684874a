//! Simulation handlers - question generation, single runs and batches.

mod drive_conversation;
mod generate_question;
mod run_simulation;

pub use drive_conversation::{ConversationDriver, DriverSettings, RunError, RunTicket};
pub use generate_question::{
    GeneratedQuestion, GenerationError, GenerationMode, GenerationSettings, QuestionGenerator,
    QuestionRequest, QuestionSource,
};
pub use run_simulation::{RunSimulationCommand, SimulationError, SimulationRunner};
