//! Interview domain module.
//!
//! The multi-phase interview controller: topic planning, anchor matching,
//! transition choice, consent and field collection, and the templates that
//! turn controller actions into text.

mod anchors;
mod bot;
mod consent;
mod fields;
mod flow;
mod intent;
mod machine;
mod phase;
mod planner;
mod sanitizer;
mod state;
mod templates;
mod topic;
mod transition;
mod turn;

pub use anchors::{
    extract_anchor_roots, extract_anchors, mentions_anchors, utterance_roots, Anchor,
    ANCHOR_ROOT_LEN, MAX_ANCHORS,
};
pub use bot::{BotConfig, BotConfigError};
pub use consent::{next_missing_field, ConsentFlow, MAX_CONSENT_ASKS};
pub use fields::{FieldExtractionError, FieldKind, MAX_FIELD_ATTEMPTS};
pub use flow::{transition, AssistantAction, CloseReason, FlowEvent};
pub use intent::{
    classify_intent, is_skip_request, signals_confusion, Intent, IntentClassifier,
    KeywordIntentClassifier,
};
pub use machine::{InterviewError, InterviewMachine, MAX_DEEP_OFFER_ASKS};
pub use phase::InterviewPhase;
pub use planner::{TopicPlanner, DEEP_MAX_TURNS, SECONDS_PER_TURN};
pub use sanitizer::{ResponseSanitizer, SanitizationError};
pub use state::{Consent, ConversationState, ProfileValue};
pub use templates::{has_probe, AnswerSignals, InterestThresholds, TemplateRenderer};
pub use topic::{TopicDescriptor, TopicPlan};
pub use transition::{
    sanitize_snippet, PendingTransition, TransitionMode, TransitionPolicy, BRIDGE_MIN_WORDS,
    SNIPPET_MAX_WORDS,
};
pub use turn::{AssistantMeta, Role, Transcript, Turn, TurnKind};
