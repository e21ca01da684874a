//! The interview phase state machine.
//!
//! One [`InterviewMachine`] drives one conversation. The caller alternates:
//!
//! 1. [`InterviewMachine::next_action`] tells it what to ask,
//! 2. [`InterviewMachine::record_assistant_turn`] commits the question,
//! 3. [`InterviewMachine::apply_user_reply`] folds the answer back in.
//!
//! A reply is reduced to a [`FlowEvent`], the next phase comes from the
//! [`transition`] table, and phase-entry effects run when the phase changes.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::foundation::{Language, StateMachine, ValidationError};

use super::bot::BotConfig;
use super::consent::ConsentFlow;
use super::flow::{transition, AssistantAction, CloseReason, FlowEvent};
use super::intent::{Intent, IntentClassifier, KeywordIntentClassifier};
use super::phase::InterviewPhase;
use super::planner::TopicPlanner;
use super::state::{Consent, ConversationState};
use super::topic::TopicPlan;
use super::transition::{PendingTransition, TransitionPolicy};
use super::turn::{AssistantMeta, TurnKind};

/// Deep-offer requests before an unresolved answer counts as a decline.
pub const MAX_DEEP_OFFER_ASKS: u32 = 2;

/// Errors raised by misuse of the machine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InterviewError {
    #[error("interview has no topics")]
    NoTopics,

    #[error("interview is already closed")]
    AlreadyClosed,

    #[error("no assistant question is awaiting a reply")]
    NoPendingQuestion,

    #[error("invalid phase transition: {0}")]
    InvalidTransition(#[from] ValidationError),
}

/// Conversational controller for a single interview.
#[derive(Debug, Clone)]
pub struct InterviewMachine {
    plans: Vec<TopicPlan>,
    planned_seconds: f64,
    state: ConversationState,
    consent_flow: ConsentFlow,
    transition_policy: TransitionPolicy,
    classifier: Arc<dyn IntentClassifier>,
    language: Language,
    last_action: Option<AssistantAction>,
}

impl InterviewMachine {
    /// Creates a machine over precomputed plans.
    pub fn new(
        plans: Vec<TopicPlan>,
        planned_seconds: f64,
        consent_flow: ConsentFlow,
        language: Language,
    ) -> Result<Self, InterviewError> {
        if plans.is_empty() {
            return Err(InterviewError::NoTopics);
        }
        Ok(Self {
            plans,
            planned_seconds,
            state: ConversationState::new(),
            consent_flow,
            transition_policy: TransitionPolicy::default(),
            classifier: Arc::new(KeywordIntentClassifier::new(language)),
            language,
            last_action: None,
        })
    }

    /// Plans the bot's topics and builds a machine for one conversation.
    pub fn for_bot(bot: &BotConfig, planner: &TopicPlanner) -> Result<Self, InterviewError> {
        let language = bot.language();
        let plans = planner.plan(&bot.ordered_topics(), language, bot.planned_seconds());
        let flow = ConsentFlow::new(bot.collect_data, bot.required_fields.clone(), language);
        Self::new(plans, f64::from(bot.planned_seconds()), flow, language)
    }

    /// Replaces the intent classifier used for offers and consent.
    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.consent_flow = self.consent_flow.with_classifier(Arc::clone(&classifier));
        self.classifier = classifier;
        self
    }

    pub fn with_transition_policy(mut self, policy: TransitionPolicy) -> Self {
        self.transition_policy = policy;
        self
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn plans(&self) -> &[TopicPlan] {
        &self.plans
    }

    pub fn planned_seconds(&self) -> f64 {
        self.planned_seconds
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn required_fields(&self) -> &[String] {
        self.consent_flow.required_fields()
    }

    pub fn phase(&self) -> InterviewPhase {
        self.state.phase
    }

    /// True once the closing message has been recorded.
    pub fn is_finished(&self) -> bool {
        self.state.closed
    }

    /// The plan for the current topic index.
    pub fn current_plan(&self) -> &TopicPlan {
        let index = self.state.topic_index.min(self.plans.len() - 1);
        &self.plans[index]
    }

    /// Decides what the assistant says next; `None` once closed.
    pub fn next_action(&self) -> Option<AssistantAction> {
        if self.state.closed {
            return None;
        }
        let action = match self.state.phase {
            InterviewPhase::Scan | InterviewPhase::Deep => AssistantAction::AskTopic {
                phase: self.state.phase,
                topic_index: self.state.topic_index,
                turn_in_topic: self.state.turn_in_topic,
                transition: self.state.pending_transition.clone(),
                rephrase: self.state.rephrase_pending,
            },
            InterviewPhase::DeepOffer => AssistantAction::OfferDeep {
                attempt: self.state.deep_offer_asks + 1,
            },
            InterviewPhase::DataCollection => self.consent_flow.next_action(&self.state),
            InterviewPhase::Done => match self.consent_flow.next_action(&self.state) {
                close @ AssistantAction::Close { .. } => close,
                _ => AssistantAction::Close {
                    reason: CloseReason::Completed,
                },
            },
        };
        Some(action)
    }

    /// Builds the transcript tags for an action in the current state.
    pub fn describe(&self, action: &AssistantAction) -> AssistantMeta {
        let (kind, field, transition) = match action {
            AssistantAction::AskTopic {
                rephrase: true, ..
            } => (TurnKind::Rephrase, None, None),
            AssistantAction::AskTopic { transition, .. } => (
                TurnKind::TopicQuestion,
                None,
                transition.as_ref().map(|t| t.mode),
            ),
            AssistantAction::OfferDeep { .. } => (TurnKind::DeepOffer, None, None),
            AssistantAction::AskConsent { .. } => (TurnKind::ConsentRequest, None, None),
            AssistantAction::AskField { field, .. } => {
                (TurnKind::FieldRequest, Some(field.clone()), None)
            }
            AssistantAction::Close { .. } => (TurnKind::Closing, None, None),
        };
        AssistantMeta {
            phase: self.state.phase,
            topic_index: self.state.topic_index,
            topic_label: self.current_plan().label.clone(),
            anchor_roots: self.current_plan().anchor_roots.clone(),
            kind,
            field,
            transition,
            effective_seconds: self.state.effective_seconds(),
        }
    }

    /// Commits an emitted assistant turn.
    ///
    /// A closing action moves the interview to DONE.
    pub fn record_assistant_turn(&mut self, action: &AssistantAction) -> Result<(), InterviewError> {
        if self.state.closed {
            return Err(InterviewError::AlreadyClosed);
        }
        match action {
            AssistantAction::AskTopic { .. } => {
                self.state.pending_transition = None;
                self.state.rephrase_pending = false;
            }
            AssistantAction::OfferDeep { .. } => self.state.deep_offer_asks += 1,
            AssistantAction::AskConsent { .. } => self.state.consent_asks += 1,
            AssistantAction::AskField { .. } => {}
            AssistantAction::Close { reason } => {
                self.advance(&FlowEvent::Closed)?;
                self.state.closed = true;
                self.last_action = None;
                tracing::debug!(?reason, "interview closed");
                return Ok(());
            }
        }
        self.last_action = Some(action.clone());
        Ok(())
    }

    /// Folds the respondent's reply into the state and returns the new phase.
    ///
    /// `elapsed_seconds` is the effective talk time of the exchange.
    pub fn apply_user_reply(
        &mut self,
        reply: &str,
        elapsed_seconds: f64,
    ) -> Result<InterviewPhase, InterviewError> {
        if self.state.closed {
            return Err(InterviewError::AlreadyClosed);
        }
        let action = self
            .last_action
            .take()
            .ok_or(InterviewError::NoPendingQuestion)?;
        self.state.add_effective_seconds(elapsed_seconds);

        let event = match action {
            AssistantAction::AskTopic { .. } => self.interpret_topic_reply(reply),
            AssistantAction::OfferDeep { .. } => self.interpret_offer_reply(reply),
            AssistantAction::AskConsent { .. } | AssistantAction::AskField { .. } => {
                self.consent_flow.apply_reply(&mut self.state, reply)
            }
            AssistantAction::Close { .. } => return Err(InterviewError::AlreadyClosed),
        };
        self.advance(&event)?;
        Ok(self.state.phase)
    }

    fn interpret_topic_reply(&mut self, reply: &str) -> FlowEvent {
        if !self.state.clarification_used && self.classifier.signals_confusion(reply) {
            self.state.clarification_used = true;
            self.state.rephrase_pending = true;
            return FlowEvent::ClarificationRequested;
        }

        self.state.turn_in_topic += 1;
        let index = self.state.topic_index;
        if self.state.turn_in_topic < self.plans[index].max_turns_for(self.state.phase) {
            return FlowEvent::TurnRecorded;
        }

        match self.plans.get(index + 1) {
            Some(next) => {
                let pending = self.transition_policy.decide(reply, &next.anchor_roots);
                self.state.enter_topic(index + 1);
                self.state.pending_transition = Some(pending);
                FlowEvent::TopicCompleted
            }
            None => FlowEvent::TopicsExhausted {
                time_remaining: self.state.remaining_seconds(self.planned_seconds) > 0.0,
            },
        }
    }

    fn interpret_offer_reply(&self, reply: &str) -> FlowEvent {
        match self.classifier.classify(reply) {
            Intent::Accept => FlowEvent::OfferAccepted,
            Intent::Refuse => FlowEvent::OfferDeclined,
            Intent::Neutral if self.state.deep_offer_asks >= MAX_DEEP_OFFER_ASKS => {
                FlowEvent::OfferDeclined
            }
            Intent::Neutral => FlowEvent::OfferUnresolved,
        }
    }

    fn advance(&mut self, event: &FlowEvent) -> Result<(), InterviewError> {
        let from = self.state.phase;
        let to = transition(from, event).ok_or_else(|| {
            ValidationError::invalid_format("phase", format!("{event:?} is not valid in {from}"))
        })?;
        if to == from {
            return Ok(());
        }
        self.state.phase = from.transition_to(to)?;
        self.enter_phase(to);
        tracing::debug!(%from, %to, ?event, "phase transition");
        Ok(())
    }

    fn enter_phase(&mut self, phase: InterviewPhase) {
        match phase {
            InterviewPhase::Deep => {
                self.state.enter_topic(0);
                self.state.pending_transition = Some(PendingTransition::clean_pivot());
            }
            InterviewPhase::DataCollection => {
                self.state.topic_index = self.plans.len() - 1;
                self.state.consent = Consent::Unknown;
                self.state.pending_transition = None;
            }
            InterviewPhase::Scan | InterviewPhase::DeepOffer | InterviewPhase::Done => {}
        }
    }
}
