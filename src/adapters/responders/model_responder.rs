//! Live model answers for topic questions.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::Language;
use crate::domain::interview::{AssistantAction, ResponseSanitizer};
use crate::domain::simulation::SimRng;
use crate::ports::{
    AIProvider, AnswerRequest, CompletionRequest, GenerationPurpose, MessageRole, RequestMetadata,
    Responder, ResponderError,
};

const MAX_ANSWER_TOKENS: u32 = 160;

/// Asks a model to play the persona on topic questions.
///
/// Offers, consent and field requests are answered from the persona script
/// so that refusal and skip rates stay under the persona's probabilities.
/// Provider failures on topic questions are returned to the caller, which
/// decides whether to fall back to the script.
pub struct ModelResponder {
    provider: Arc<dyn AIProvider>,
    temperature: f32,
    timeout: Duration,
    sanitizer: ResponseSanitizer,
}

impl ModelResponder {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            temperature: 0.8,
            timeout: Duration::from_secs(30),
            sanitizer: ResponseSanitizer::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_request(&self, request: &AnswerRequest<'_>) -> CompletionRequest {
        let language = match request.context.language {
            Language::En => "English",
            Language::It => "Italian",
        };
        let system = format!(
            "You are role-playing an interview respondent named {}. {} \
             Answer the interviewer's question in {language}, in one to three sentences, \
             speaking as yourself. Never ask the interviewer questions.",
            request.persona.name, request.persona.description
        );
        CompletionRequest::new(RequestMetadata::new(
            request.conversation_id,
            GenerationPurpose::Answer,
            request.step,
            format!("{}-{}", request.conversation_id, request.step),
        ))
        .with_system_prompt(system)
        .with_message(MessageRole::Assistant, request.context.question)
        .with_max_tokens(MAX_ANSWER_TOKENS)
        .with_temperature(self.temperature)
    }

    async fn ask_model(&self, request: &AnswerRequest<'_>) -> Result<String, ResponderError> {
        let completion = tokio::time::timeout(
            self.timeout,
            self.provider.complete(self.build_request(request)),
        )
        .await
        .map_err(|_| crate::ports::AIError::Timeout {
            timeout_secs: self.timeout.as_secs() as u32,
        })??;
        self.sanitizer
            .sanitize(&completion.content)
            .map_err(|_| ResponderError::Empty)
    }
}

#[async_trait]
impl Responder for ModelResponder {
    async fn answer(
        &self,
        request: AnswerRequest<'_>,
        rng: &mut SimRng,
    ) -> Result<String, ResponderError> {
        if !matches!(request.context.action, AssistantAction::AskTopic { .. }) {
            return Ok(request.persona.scripted_answer(&request.context, rng));
        }
        self.ask_model(&request).await.map_err(|err| {
            tracing::debug!(
                error = %err,
                persona = %request.persona.name,
                step = request.step,
                "model answer failed"
            );
            err
        })
    }

    fn name(&self) -> &'static str {
        "model"
    }
}
