//! Responder port - who answers the interviewer in a simulated run.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::ConversationId;
use crate::domain::simulation::{AnswerContext, Persona, SimRng};

use super::ai_provider::AIError;

/// Everything a responder may use to produce one reply.
#[derive(Debug, Clone, Copy)]
pub struct AnswerRequest<'a> {
    pub persona: &'a Persona,
    pub context: AnswerContext<'a>,
    pub conversation_id: ConversationId,
    /// Index of the step within the run.
    pub step: usize,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResponderError {
    #[error("provider error: {0}")]
    Provider(#[from] AIError),

    #[error("responder produced no answer")]
    Empty,
}

/// Produces the respondent's side of a simulated conversation.
///
/// Implementations draw every random choice from the supplied [`SimRng`] so
/// that a run replays exactly from its seed.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn answer(
        &self,
        request: AnswerRequest<'_>,
        rng: &mut SimRng,
    ) -> Result<String, ResponderError>;

    /// Short name recorded in reports.
    fn name(&self) -> &'static str;
}
