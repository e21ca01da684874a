//! QuestionGenerator - turns an assistant action into interviewer text.
//!
//! The template renderer always produces a deterministic draft. In model
//! mode the draft is handed to the AI provider for rephrasing, and the
//! model's output is accepted only if it survives sanitization and, for
//! turns that expect a reply, asks exactly one question. Anything else falls
//! back to the draft.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::domain::foundation::{ConversationId, Language};
use crate::domain::interview::{
    AssistantAction, ResponseSanitizer, SanitizationError, TemplateRenderer, TopicPlan,
};
use crate::ports::{
    AIError, AIProvider, CompletionRequest, GenerationPurpose, MessageRole, RequestMetadata,
};

const MAX_QUESTION_TOKENS: u32 = 120;

/// Where interviewer text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    #[default]
    Template,
    Model,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    /// Bound on each provider call.
    pub timeout: Duration,
    /// Provider calls per turn before falling back.
    pub max_attempts: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            timeout: Duration::from_secs(20),
            max_attempts: 2,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
    #[error("provider error: {0}")]
    Provider(#[from] AIError),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("unusable output: {0}")]
    Sanitization(#[from] SanitizationError),

    #[error("expected {expected} question mark(s), found {found}")]
    QuestionCount { expected: usize, found: usize },

    #[error("no provider configured for model generation")]
    NoProvider,
}

impl GenerationError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Provider(err) => err.is_retryable(),
            Self::Timeout(_) | Self::Sanitization(_) | Self::QuestionCount { .. } => true,
            Self::NoProvider => false,
        }
    }
}

/// How the final text was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    Template,
    Model,
    /// Model generation failed and the template was used.
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedQuestion {
    pub text: String,
    pub source: QuestionSource,
}

/// Input for one interviewer turn.
#[derive(Debug, Clone, Copy)]
pub struct QuestionRequest<'a> {
    pub action: &'a AssistantAction,
    pub plans: &'a [TopicPlan],
    pub last_reply: Option<&'a str>,
    pub conversation_id: ConversationId,
    pub step: usize,
}

pub struct QuestionGenerator {
    renderer: TemplateRenderer,
    mode: GenerationMode,
    provider: Option<Arc<dyn AIProvider>>,
    sanitizer: ResponseSanitizer,
    settings: GenerationSettings,
}

impl QuestionGenerator {
    /// Template-only generation.
    pub fn template(renderer: TemplateRenderer) -> Self {
        Self {
            renderer,
            mode: GenerationMode::Template,
            provider: None,
            sanitizer: ResponseSanitizer::new(),
            settings: GenerationSettings::default(),
        }
    }

    /// Model generation with template fallback.
    pub fn model(
        renderer: TemplateRenderer,
        provider: Arc<dyn AIProvider>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            renderer,
            mode: GenerationMode::Model,
            provider: Some(provider),
            sanitizer: ResponseSanitizer::new(),
            settings,
        }
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn language(&self) -> Language {
        self.renderer.language()
    }

    /// Produces the interviewer's text. Never fails.
    pub async fn generate(&self, request: QuestionRequest<'_>) -> GeneratedQuestion {
        let draft = self
            .renderer
            .render(request.action, request.plans, request.last_reply);
        if self.mode == GenerationMode::Template {
            return GeneratedQuestion {
                text: draft,
                source: QuestionSource::Template,
            };
        }

        match self.try_model(&request, &draft).await {
            Ok(text) => GeneratedQuestion {
                text,
                source: QuestionSource::Model,
            },
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    conversation_id = %request.conversation_id,
                    step = request.step,
                    "question generation failed, using template"
                );
                GeneratedQuestion {
                    text: draft,
                    source: QuestionSource::Fallback,
                }
            }
        }
    }

    /// Asks the provider to rephrase `draft`, retrying within the attempt budget.
    pub async fn try_model(
        &self,
        request: &QuestionRequest<'_>,
        draft: &str,
    ) -> Result<String, GenerationError> {
        let provider = self.provider.as_ref().ok_or(GenerationError::NoProvider)?;
        let attempts = self.settings.max_attempts.max(1);
        let mut last_error = GenerationError::NoProvider;

        for attempt in 1..=attempts {
            let completion = tokio::time::timeout(
                self.settings.timeout,
                provider.complete(self.build_request(request, draft)),
            )
            .await;
            let result = match completion {
                Err(_) => Err(GenerationError::Timeout(self.settings.timeout)),
                Ok(Err(err)) => Err(GenerationError::Provider(err)),
                Ok(Ok(response)) => self.validate(request.action, &response.content),
            };
            match result {
                Ok(text) => return Ok(text),
                Err(err) => {
                    tracing::debug!(error = %err, attempt, "generation attempt rejected");
                    let retry = err.is_retryable();
                    last_error = err;
                    if !retry {
                        break;
                    }
                }
            }
        }
        Err(last_error)
    }

    fn validate(&self, action: &AssistantAction, raw: &str) -> Result<String, GenerationError> {
        let text = self.sanitizer.sanitize(raw)?;
        let expected = usize::from(action.expects_reply());
        let found = text.matches('?').count();
        if found != expected {
            return Err(GenerationError::QuestionCount { expected, found });
        }
        Ok(text)
    }

    fn build_request(&self, request: &QuestionRequest<'_>, draft: &str) -> CompletionRequest {
        let language = match self.renderer.language() {
            Language::En => "English",
            Language::It => "Italian",
        };
        let system = format!(
            "You are a warm, concise interviewer running a research interview in {language}. \
             Rewrite the draft turn in your own words while keeping its intent. \
             A turn that asks something must contain exactly one question mark. \
             Never ask for contact details unless the draft does. \
             Reply with the turn only."
        );
        let mut prompt = String::new();
        if let AssistantAction::AskTopic { topic_index, .. } = request.action {
            if let Some(plan) = request.plans.get(*topic_index) {
                prompt.push_str(&format!("Topic: {}\n", plan.label));
            }
        }
        if let Some(reply) = request.last_reply {
            prompt.push_str(&format!("Respondent's last answer: {reply}\n"));
        }
        prompt.push_str(&format!("Draft: {draft}"));

        CompletionRequest::new(RequestMetadata::new(
            request.conversation_id,
            GenerationPurpose::Question,
            request.step,
            format!("{}-{}", request.conversation_id, request.step),
        ))
        .with_system_prompt(system)
        .with_message(MessageRole::User, prompt)
        .with_max_tokens(MAX_QUESTION_TOKENS)
        .with_temperature(self.settings.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::domain::interview::{CloseReason, InterviewPhase, TopicDescriptor, TopicPlanner};

    fn plans() -> Vec<TopicPlan> {
        TopicPlanner::new().plan(
            &[TopicDescriptor::new("pricing", "Pricing strategy", 0)],
            Language::En,
            180,
        )
    }

    fn ask_topic() -> AssistantAction {
        AssistantAction::AskTopic {
            phase: InterviewPhase::Scan,
            topic_index: 0,
            turn_in_topic: 0,
            transition: None,
            rephrase: false,
        }
    }

    fn request<'a>(action: &'a AssistantAction, plans: &'a [TopicPlan]) -> QuestionRequest<'a> {
        QuestionRequest {
            action,
            plans,
            last_reply: None,
            conversation_id: ConversationId::from_u128(1),
            step: 0,
        }
    }

    fn settings() -> GenerationSettings {
        GenerationSettings {
            timeout: Duration::from_millis(50),
            ..GenerationSettings::default()
        }
    }

    fn model_generator(provider: MockAIProvider) -> (QuestionGenerator, MockAIProvider) {
        let generator = QuestionGenerator::model(
            TemplateRenderer::new(Language::En),
            Arc::new(provider.clone()),
            settings(),
        );
        (generator, provider)
    }

    mod template_mode {
        use super::*;

        #[tokio::test]
        async fn renders_without_provider() {
            let generator = QuestionGenerator::template(TemplateRenderer::new(Language::En));
            let (action, plans) = (ask_topic(), plans());
            let question = generator.generate(request(&action, &plans)).await;
            assert_eq!(question.source, QuestionSource::Template);
            assert_eq!(question.text.matches('?').count(), 1);
        }
    }

    mod model_mode {
        use super::*;

        #[tokio::test]
        async fn accepts_single_question() {
            let (generator, provider) =
                model_generator(MockAIProvider::new().with_response("So, how do you price things today?"));
            let (action, plans) = (ask_topic(), plans());

            let question = generator.generate(request(&action, &plans)).await;

            assert_eq!(question.source, QuestionSource::Model);
            assert_eq!(question.text, "So, how do you price things today?");
            let calls = provider.get_calls();
            assert!(calls[0].messages[0].content.contains("Topic: Pricing strategy"));
            assert_eq!(calls[0].metadata.purpose, GenerationPurpose::Question);
        }

        #[tokio::test]
        async fn retries_double_question_then_accepts() {
            let (generator, provider) = model_generator(
                MockAIProvider::new()
                    .with_response("How is pricing? And why?")
                    .with_response("How is pricing going?"),
            );
            let (action, plans) = (ask_topic(), plans());

            let question = generator.generate(request(&action, &plans)).await;

            assert_eq!(question.source, QuestionSource::Model);
            assert_eq!(provider.call_count(), 2);
        }

        #[tokio::test]
        async fn falls_back_after_budget() {
            let (generator, provider) = model_generator(MockAIProvider::new().with_default_response(""));
            let (action, plans) = (ask_topic(), plans());

            let question = generator.generate(request(&action, &plans)).await;

            assert_eq!(question.source, QuestionSource::Fallback);
            assert_eq!(provider.call_count(), 2);
            assert_eq!(question.text.matches('?').count(), 1);
        }

        #[tokio::test]
        async fn non_retryable_error_stops_immediately() {
            let (generator, provider) =
                model_generator(MockAIProvider::new().with_error(AIError::AuthenticationFailed));
            let (action, plans) = (ask_topic(), plans());

            let err = generator.try_model(&request(&action, &plans), "draft?").await.unwrap_err();

            assert_eq!(err, GenerationError::Provider(AIError::AuthenticationFailed));
            assert_eq!(provider.call_count(), 1);
        }

        #[tokio::test]
        async fn slow_provider_times_out() {
            let (generator, _) = model_generator(
                MockAIProvider::new()
                    .with_default_response("How is pricing?")
                    .with_delay(Duration::from_millis(500)),
            );
            let (action, plans) = (ask_topic(), plans());

            let err = generator.try_model(&request(&action, &plans), "draft?").await.unwrap_err();
            assert!(matches!(err, GenerationError::Timeout(_)));
        }

        #[tokio::test]
        async fn closing_must_not_ask() {
            let (generator, _) =
                model_generator(MockAIProvider::new().with_default_response("Thanks, anything else?"));
            let action = AssistantAction::Close {
                reason: CloseReason::Completed,
            };
            let plans = plans();

            let question = generator.generate(request(&action, &plans)).await;
            assert_eq!(question.source, QuestionSource::Fallback);
            assert!(!question.text.contains('?'));
        }
    }
}
