//! Assistant actions, flow events, and the phase transition table.
//!
//! The machine reduces every respondent reply to a [`FlowEvent`] and looks the
//! next phase up in [`transition`]. Keeping the table pure means each
//! `(phase, event)` pair can be tested in isolation.

use serde::{Deserialize, Serialize};

use super::phase::InterviewPhase;
use super::transition::PendingTransition;

/// Why an interview is being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Every required field was collected or skipped.
    Completed,
    /// The respondent refused consent to data collection.
    ConsentRefused,
    /// The bot does not collect data, or declares no fields.
    CollectionDisabled,
}

/// What the assistant should say next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AssistantAction {
    AskTopic {
        phase: InterviewPhase,
        topic_index: usize,
        turn_in_topic: u32,
        transition: Option<PendingTransition>,
        /// The previous question confused the respondent.
        rephrase: bool,
    },
    OfferDeep {
        attempt: u32,
    },
    AskConsent {
        attempt: u32,
    },
    AskField {
        field: String,
        attempt: u32,
    },
    Close {
        reason: CloseReason,
    },
}

impl AssistantAction {
    /// Returns true for actions that must end in exactly one question.
    pub fn expects_reply(&self) -> bool {
        !matches!(self, Self::Close { .. })
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Self::Close { .. })
    }
}

/// The outcome of interpreting one reply (or of emitting a closing turn).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FlowEvent {
    /// Confusion consumed the topic's free clarification.
    ClarificationRequested,
    /// A topic turn was spent and the topic still has budget.
    TurnRecorded,
    /// The topic budget ran out and the next topic was entered.
    TopicCompleted,
    /// The last topic of the phase ran out of budget.
    TopicsExhausted { time_remaining: bool },
    OfferAccepted,
    OfferDeclined,
    OfferUnresolved,
    ConsentGranted,
    ConsentUnresolved,
    ConsentRefused,
    FieldResolved { field: String },
    FieldRetry { field: String },
    /// No required field remains unresolved.
    CollectionComplete,
    /// A closing message was emitted.
    Closed,
}

/// Looks up the phase following `event` in `phase`.
///
/// Returns `None` when the event cannot occur in that phase.
pub fn transition(phase: InterviewPhase, event: &FlowEvent) -> Option<InterviewPhase> {
    use FlowEvent::*;
    use InterviewPhase::*;

    match (phase, event) {
        (Scan | Deep, ClarificationRequested | TurnRecorded | TopicCompleted) => Some(phase),
        (Scan, TopicsExhausted { time_remaining: true }) => Some(Deep),
        (Scan, TopicsExhausted { time_remaining: false }) => Some(DeepOffer),
        (Deep, TopicsExhausted { .. }) => Some(DataCollection),

        (DeepOffer, OfferAccepted) => Some(Deep),
        (DeepOffer, OfferDeclined) => Some(DataCollection),
        (DeepOffer, OfferUnresolved) => Some(DeepOffer),

        (
            DataCollection,
            ConsentGranted | ConsentUnresolved | FieldResolved { .. } | FieldRetry { .. },
        ) => Some(DataCollection),
        (DataCollection, ConsentRefused | CollectionComplete | Closed) => Some(Done),

        (Done, Closed) => Some(Done),
        _ => None,
    }
}
