//! Adapters - Implementations of port interfaces.
//!
//! - `ai` - text-generation providers (mock, OpenAI)
//! - `responders` - simulated respondents (scripted persona, live model)

pub mod ai;
pub mod responders;

pub use ai::{MockAIProvider, OpenAIConfig, OpenAIProvider};
pub use responders::{ModelResponder, PersonaResponder};
