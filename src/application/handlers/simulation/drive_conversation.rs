//! ConversationDriver - plays one simulated interview from start to finish.
//!
//! Each step asks the machine for its next action, renders it, audits it,
//! commits it, and when a reply is expected, asks the responder and folds the
//! answer back in. A failed answer is replaced by the persona's scripted one
//! and counted as a fallback. The run ends at the closing turn, at the step ceiling, or
//! on a per-run error; in every case the transcript gathered so far is
//! evaluated.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::evaluation::FlowEvaluator;
use crate::domain::foundation::ConversationId;
use crate::domain::interview::{InterviewError, InterviewMachine, InterviewPhase, Transcript, Turn};
use crate::domain::simulation::{
    AnswerContext, Persona, PolicyAuditor, RunOutcome, RunRecord, RunStatus, SimRng, TimingModel,
};
use crate::ports::{AnswerRequest, Responder, ResponderError};

use super::generate_question::{QuestionGenerator, QuestionRequest, QuestionSource};

/// Fatal per-run errors. Recorded on the run; never abort the batch.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RunError {
    #[error("question generation fell back {failures} times in a row")]
    GenerationFailed { failures: u32 },

    #[error("responder failed: {0}")]
    Responder(#[from] ResponderError),

    #[error("interview error: {0}")]
    Interview(#[from] InterviewError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverSettings {
    /// Assistant turns allowed before the run is cut off.
    pub max_steps: usize,
    /// Consecutive fallbacks tolerated in model mode, counted separately
    /// for questions and answers.
    pub max_generation_failures: u32,
    pub timing: TimingModel,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            max_steps: 60,
            max_generation_failures: 3,
            timing: TimingModel::default(),
        }
    }
}

/// Identity of one run within a batch.
#[derive(Debug, Clone, Copy)]
pub struct RunTicket<'a> {
    pub run_index: usize,
    pub batch_seed: u64,
    pub persona: &'a Persona,
}

impl RunTicket<'_> {
    pub fn conversation_id(&self) -> ConversationId {
        ConversationId::from_u128((u128::from(self.batch_seed) << 64) | self.run_index as u128)
    }
}

/// Mutable state of a run in progress.
struct RunProgress {
    machine: InterviewMachine,
    transcript: Transcript,
    auditor: PolicyAuditor,
    rng: SimRng,
    steps: usize,
    fallbacks: usize,
    consecutive_fallbacks: u32,
    consecutive_answer_failures: u32,
}

pub struct ConversationDriver {
    prototype: InterviewMachine,
    generator: Arc<QuestionGenerator>,
    responder: Arc<dyn Responder>,
    evaluator: FlowEvaluator,
    settings: DriverSettings,
}

impl ConversationDriver {
    /// `prototype` is cloned fresh for every run.
    pub fn new(
        prototype: InterviewMachine,
        generator: Arc<QuestionGenerator>,
        responder: Arc<dyn Responder>,
        evaluator: FlowEvaluator,
        settings: DriverSettings,
    ) -> Self {
        Self {
            prototype,
            generator,
            responder,
            evaluator,
            settings,
        }
    }

    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    /// Plays one conversation with `ticket.persona`, drawing randomness from `rng`.
    pub async fn run(&self, ticket: RunTicket<'_>, rng: SimRng) -> RunOutcome {
        let seed = rng.seed();
        let mut progress = RunProgress {
            machine: self.prototype.clone(),
            transcript: Transcript::new(),
            auditor: PolicyAuditor::new(self.prototype.plans().len(), self.prototype.planned_seconds()),
            rng,
            steps: 0,
            fallbacks: 0,
            consecutive_fallbacks: 0,
            consecutive_answer_failures: 0,
        };

        let status = match self.drive(&ticket, &mut progress).await {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(run = ticket.run_index, persona = %ticket.persona.name, error = %err, "run failed");
                RunStatus::Failed {
                    reason: err.to_string(),
                }
            }
        };

        let evaluation = self.evaluator.evaluate(&progress.transcript);
        let record = RunRecord {
            run_index: ticket.run_index,
            conversation_id: ticket.conversation_id(),
            seed,
            persona: ticket.persona.name.clone(),
            status,
            steps: progress.steps,
            planned_seconds: progress.machine.planned_seconds(),
            generation_fallbacks: progress.fallbacks,
            audit: progress.auditor.finish(),
            final_state: progress.machine.state().clone(),
            transcript: progress.transcript,
        };
        let outcome = RunOutcome::new(record, evaluation);
        tracing::info!(
            run = outcome.run_index,
            persona = %outcome.persona,
            status = outcome.status.label(),
            score = outcome.score(),
            passed = outcome.passed,
            "run finished"
        );
        outcome
    }

    async fn drive(&self, ticket: &RunTicket<'_>, p: &mut RunProgress) -> Result<RunStatus, RunError> {
        let conversation_id = ticket.conversation_id();
        let language = p.machine.language();

        while let Some(action) = p.machine.next_action() {
            if p.steps >= self.settings.max_steps {
                p.auditor.ceiling_reached(p.steps);
                return Ok(RunStatus::Incomplete);
            }
            let step = p.steps;
            p.steps += 1;

            let meta = p.machine.describe(&action);
            p.auditor.audit(&meta, p.machine.state());

            let question = self
                .generator
                .generate(QuestionRequest {
                    action: &action,
                    plans: p.machine.plans(),
                    last_reply: p.transcript.last_user_reply(),
                    conversation_id,
                    step,
                })
                .await;
            if question.source == QuestionSource::Fallback {
                p.fallbacks += 1;
                p.consecutive_fallbacks += 1;
                if p.consecutive_fallbacks > self.settings.max_generation_failures {
                    return Err(RunError::GenerationFailed {
                        failures: p.consecutive_fallbacks,
                    });
                }
            } else {
                p.consecutive_fallbacks = 0;
            }

            let topic_label = meta.topic_label.clone();
            let next_topic_label = match meta.phase {
                InterviewPhase::Scan | InterviewPhase::Deep => p
                    .machine
                    .plans()
                    .get(meta.topic_index + 1)
                    .map(|plan| plan.label.clone()),
                _ => None,
            };
            p.transcript.push(Turn::assistant(question.text.clone(), meta));
            p.machine.record_assistant_turn(&action)?;
            if !action.expects_reply() {
                continue;
            }

            let request = AnswerRequest {
                persona: ticket.persona,
                context: AnswerContext {
                    action: &action,
                    question: &question.text,
                    topic_label: &topic_label,
                    next_topic_label: next_topic_label.as_deref(),
                    language,
                },
                conversation_id,
                step,
            };
            let answer = match self.responder.answer(request, &mut p.rng).await {
                Ok(answer) => {
                    p.consecutive_answer_failures = 0;
                    answer
                }
                Err(err) => {
                    p.fallbacks += 1;
                    p.consecutive_answer_failures += 1;
                    if p.consecutive_answer_failures > self.settings.max_generation_failures {
                        return Err(RunError::Responder(err));
                    }
                    tracing::warn!(
                        error = %err,
                        responder = self.responder.name(),
                        persona = %ticket.persona.name,
                        step,
                        "answer failed, using scripted persona answer"
                    );
                    ticket.persona.scripted_answer(&request.context, &mut p.rng)
                }
            };
            let seconds = self
                .settings
                .timing
                .exchange_seconds(&question.text, &answer, &mut p.rng);
            p.machine.apply_user_reply(&answer, seconds)?;
            p.transcript.push(Turn::user(answer));
        }
        Ok(RunStatus::Completed)
    }
}
