//! Scripted persona answers.

use async_trait::async_trait;

use crate::domain::simulation::SimRng;
use crate::ports::{AnswerRequest, Responder, ResponderError};

/// Answers from the persona's scripted phrase banks.
///
/// Never fails and never leaves the process, so a batch run with this
/// responder is fully reproducible from its seed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonaResponder;

impl PersonaResponder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Responder for PersonaResponder {
    async fn answer(
        &self,
        request: AnswerRequest<'_>,
        rng: &mut SimRng,
    ) -> Result<String, ResponderError> {
        Ok(request.persona.scripted_answer(&request.context, rng))
    }

    fn name(&self) -> &'static str {
        "persona"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ConversationId, Language};
    use crate::domain::interview::{AssistantAction, InterviewPhase};
    use crate::domain::simulation::{AnswerContext, Persona};

    #[tokio::test]
    async fn same_seed_gives_same_answers() {
        let persona = Persona::library().remove(0);
        let action = AssistantAction::AskTopic {
            phase: InterviewPhase::Scan,
            topic_index: 0,
            turn_in_topic: 0,
            transition: None,
            rephrase: false,
        };
        let request = AnswerRequest {
            persona: &persona,
            context: AnswerContext {
                action: &action,
                question: "What comes to mind about pricing?",
                topic_label: "Pricing",
                next_topic_label: None,
                language: Language::En,
            },
            conversation_id: ConversationId::from_u128(9),
            step: 0,
        };
        let responder = PersonaResponder::new();

        let mut a = SimRng::for_run(11, 0);
        let mut b = SimRng::for_run(11, 0);
        for _ in 0..5 {
            assert_eq!(
                responder.answer(request, &mut a).await.unwrap(),
                responder.answer(request, &mut b).await.unwrap()
            );
        }
    }
}
