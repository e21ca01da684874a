//! Consent and contact-field collection inside DATA_COLLECTION.
//!
//! Consent is asked first; once given, required fields are asked one at a
//! time in declaration order. Every field has a bounded attempt count and
//! consent is asked at most [`MAX_CONSENT_ASKS`] times, so the sub-flow
//! always terminates.

use std::sync::Arc;

use crate::domain::foundation::Language;

use super::fields::{FieldKind, MAX_FIELD_ATTEMPTS};
use super::flow::{AssistantAction, CloseReason, FlowEvent};
use super::intent::{Intent, IntentClassifier, KeywordIntentClassifier};
use super::state::{Consent, ConversationState};

/// Consent requests before an unresolved answer counts as a refusal.
pub const MAX_CONSENT_ASKS: u32 = 2;

/// Returns the first field that is neither resolved nor out of attempts.
pub fn next_missing_field<'a, S: AsRef<str>>(
    state: &ConversationState,
    fields: &'a [S],
) -> Option<&'a str> {
    fields
        .iter()
        .map(AsRef::as_ref)
        .find(|f| !state.is_field_resolved(f) && state.attempts(f) < MAX_FIELD_ATTEMPTS)
}

/// Drives consent and field collection for one bot configuration.
#[derive(Debug, Clone)]
pub struct ConsentFlow {
    collect_enabled: bool,
    required_fields: Vec<String>,
    language: Language,
    classifier: Arc<dyn IntentClassifier>,
}

impl ConsentFlow {
    pub fn new(collect_enabled: bool, required_fields: Vec<String>, language: Language) -> Self {
        Self {
            collect_enabled,
            required_fields,
            language,
            classifier: Arc::new(KeywordIntentClassifier::new(language)),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    /// Returns true when this bot collects at least one field.
    pub fn is_active(&self) -> bool {
        self.collect_enabled && !self.required_fields.is_empty()
    }

    /// Chooses the next DATA_COLLECTION action.
    pub fn next_action(&self, state: &ConversationState) -> AssistantAction {
        if !self.is_active() {
            return AssistantAction::Close {
                reason: CloseReason::CollectionDisabled,
            };
        }
        match state.consent {
            Consent::Refused => AssistantAction::Close {
                reason: CloseReason::ConsentRefused,
            },
            Consent::Unknown => AssistantAction::AskConsent {
                attempt: state.consent_asks + 1,
            },
            Consent::Given => match next_missing_field(state, &self.required_fields) {
                Some(field) => AssistantAction::AskField {
                    field: field.to_string(),
                    attempt: state.attempts(field) + 1,
                },
                None => AssistantAction::Close {
                    reason: CloseReason::Completed,
                },
            },
        }
    }

    /// Applies the respondent's reply to the pending consent or field request.
    pub fn apply_reply(&self, state: &mut ConversationState, reply: &str) -> FlowEvent {
        if !self.is_active() {
            return FlowEvent::Closed;
        }
        match state.consent {
            Consent::Refused => FlowEvent::ConsentRefused,
            Consent::Unknown => self.apply_consent_reply(state, reply),
            Consent::Given => self.apply_field_reply(state, reply),
        }
    }

    fn apply_consent_reply(&self, state: &mut ConversationState, reply: &str) -> FlowEvent {
        match self.classifier.classify(reply) {
            Intent::Accept => {
                state.consent = Consent::Given;
                tracing::debug!("consent granted");
                if next_missing_field(state, &self.required_fields).is_none() {
                    FlowEvent::CollectionComplete
                } else {
                    FlowEvent::ConsentGranted
                }
            }
            Intent::Neutral if state.consent_asks < MAX_CONSENT_ASKS => FlowEvent::ConsentUnresolved,
            Intent::Refuse | Intent::Neutral => {
                state.consent = Consent::Refused;
                state.data_collection_refused = true;
                tracing::debug!(asks = state.consent_asks, "consent refused");
                FlowEvent::ConsentRefused
            }
        }
    }

    fn apply_field_reply(&self, state: &mut ConversationState, reply: &str) -> FlowEvent {
        let Some(field) = next_missing_field(state, &self.required_fields).map(str::to_string)
        else {
            return FlowEvent::CollectionComplete;
        };

        let resolved = if self.classifier.is_skip_request(reply) {
            state.record_skipped(&field);
            true
        } else {
            match FieldKind::from_field_id(&field).extract(reply, self.language) {
                Ok(value) => {
                    state.record_collected(&field, value);
                    true
                }
                Err(err) => {
                    let attempts = state.record_failed_attempt(&field);
                    tracing::debug!(%field, attempts, error = %err, "field extraction failed");
                    if attempts >= MAX_FIELD_ATTEMPTS {
                        state.record_skipped(&field);
                        true
                    } else {
                        false
                    }
                }
            }
        };

        if next_missing_field(state, &self.required_fields).is_none() {
            FlowEvent::CollectionComplete
        } else if resolved {
            FlowEvent::FieldResolved { field }
        } else {
            FlowEvent::FieldRetry { field }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interview::state::ProfileValue;
    use proptest::prelude::*;

    fn flow(fields: &[&str]) -> ConsentFlow {
        ConsentFlow::new(
            true,
            fields.iter().map(|f| f.to_string()).collect(),
            Language::En,
        )
    }

    fn asked_consent(state: &mut ConversationState) {
        state.consent_asks += 1;
    }

    mod actions {
        use super::*;

        #[test]
        fn disabled_collection_closes_immediately() {
            let flow = ConsentFlow::new(false, vec!["email".into()], Language::En);
            assert_eq!(
                flow.next_action(&ConversationState::new()),
                AssistantAction::Close { reason: CloseReason::CollectionDisabled }
            );
        }

        #[test]
        fn no_fields_closes_immediately() {
            assert_eq!(
                flow(&[]).next_action(&ConversationState::new()),
                AssistantAction::Close { reason: CloseReason::CollectionDisabled }
            );
        }

        #[test]
        fn unknown_consent_asks_consent() {
            assert_eq!(
                flow(&["email"]).next_action(&ConversationState::new()),
                AssistantAction::AskConsent { attempt: 1 }
            );
        }

        #[test]
        fn fields_are_asked_in_declaration_order() {
            let flow = flow(&["name", "email"]);
            let mut state = ConversationState::new();
            state.consent = Consent::Given;
            assert_eq!(
                flow.next_action(&state),
                AssistantAction::AskField { field: "name".into(), attempt: 1 }
            );
            state.record_collected("name", "Jane");
            assert_eq!(
                flow.next_action(&state),
                AssistantAction::AskField { field: "email".into(), attempt: 1 }
            );
        }
    }

    mod consent {
        use super::*;

        #[test]
        fn yes_grants_consent() {
            let flow = flow(&["email"]);
            let mut state = ConversationState::new();
            asked_consent(&mut state);
            assert_eq!(flow.apply_reply(&mut state, "Yes, that's fine"), FlowEvent::ConsentGranted);
            assert_eq!(state.consent, Consent::Given);
        }

        #[test]
        fn no_refuses_and_flags_collection() {
            let flow = flow(&["email"]);
            let mut state = ConversationState::new();
            asked_consent(&mut state);
            assert_eq!(flow.apply_reply(&mut state, "no"), FlowEvent::ConsentRefused);
            assert_eq!(state.consent, Consent::Refused);
            assert!(state.data_collection_refused);
            assert_eq!(
                flow.next_action(&state),
                AssistantAction::Close { reason: CloseReason::ConsentRefused }
            );
        }

        #[test]
        fn second_unclear_answer_counts_as_refusal() {
            let flow = flow(&["email"]);
            let mut state = ConversationState::new();
            asked_consent(&mut state);
            assert_eq!(flow.apply_reply(&mut state, "hmm"), FlowEvent::ConsentUnresolved);
            assert_eq!(state.consent, Consent::Unknown);
            asked_consent(&mut state);
            assert_eq!(flow.apply_reply(&mut state, "hmm"), FlowEvent::ConsentRefused);
            assert_eq!(state.consent, Consent::Refused);
        }
    }

    mod fields {
        use super::*;

        fn consented() -> ConversationState {
            let mut state = ConversationState::new();
            state.consent = Consent::Given;
            state
        }

        #[test]
        fn valid_reply_is_collected() {
            let flow = flow(&["email", "phone"]);
            let mut state = consented();
            let event = flow.apply_reply(&mut state, "jane@example.com");
            assert_eq!(event, FlowEvent::FieldResolved { field: "email".into() });
            assert_eq!(
                state.profile_value("email"),
                Some(&ProfileValue::Collected("jane@example.com".into()))
            );
        }

        #[test]
        fn skip_request_marks_skipped() {
            let flow = flow(&["phone", "email"]);
            let mut state = consented();
            flow.apply_reply(&mut state, "I'd rather skip that");
            assert_eq!(state.profile_value("phone"), Some(&ProfileValue::Skipped));
        }

        #[test]
        fn three_failures_skip_the_field() {
            let flow = flow(&["email", "name"]);
            let mut state = consented();
            assert_eq!(
                flow.apply_reply(&mut state, "not telling"),
                FlowEvent::FieldRetry { field: "email".into() }
            );
            flow.apply_reply(&mut state, "still no address");
            assert_eq!(
                flow.apply_reply(&mut state, "nothing"),
                FlowEvent::FieldResolved { field: "email".into() }
            );
            assert_eq!(state.profile_value("email"), Some(&ProfileValue::Skipped));
            assert_eq!(next_missing_field(&state, flow.required_fields()), Some("name"));
        }

        #[test]
        fn last_field_completes_collection() {
            let flow = flow(&["email"]);
            let mut state = consented();
            assert_eq!(
                flow.apply_reply(&mut state, "it's jane@example.com"),
                FlowEvent::CollectionComplete
            );
            assert_eq!(
                flow.next_action(&state),
                AssistantAction::Close { reason: CloseReason::Completed }
            );
        }
    }

    proptest! {
        #[test]
        fn consent_resolves_within_two_asks(replies in proptest::collection::vec("[a-z ]{0,20}", 2)) {
            let flow = flow(&["email"]);
            let mut state = ConversationState::new();
            for reply in &replies {
                if state.consent.is_resolved() {
                    break;
                }
                state.consent_asks += 1;
                flow.apply_reply(&mut state, reply);
            }
            prop_assert!(state.consent.is_resolved());
        }

        #[test]
        fn collection_terminates_for_any_replies(replies in proptest::collection::vec(".{0,30}", 0..40)) {
            let flow = flow(&["email", "phone", "name"]);
            let mut state = ConversationState::new();
            state.consent = Consent::Given;
            let mut complete = false;
            for reply in replies.iter().chain(std::iter::repeat(&String::new()).take(9)) {
                if flow.apply_reply(&mut state, reply) == FlowEvent::CollectionComplete {
                    complete = true;
                    break;
                }
            }
            prop_assert!(complete);
        }
    }
}
