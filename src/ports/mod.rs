//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - text generation for interviewer questions and live answers
//! - `Responder` - the simulated respondent

mod ai_provider;
mod responder;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, GenerationPurpose,
    Message, MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use responder::{AnswerRequest, Responder, ResponderError};
