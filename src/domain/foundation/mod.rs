//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, the language vocabulary, the state machine trait,
//! and error types used across the interview domain.

mod errors;
mod ids;
mod language;
mod state_machine;

pub use errors::ValidationError;
pub use ids::{BatchId, ConversationId};
pub use language::{KeywordTable, Language};
pub use state_machine::StateMachine;
