//! Mutable per-conversation state.
//!
//! One instance per conversation, owned by the [`InterviewMachine`] driving it.
//!
//! [`InterviewMachine`]: super::InterviewMachine

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::phase::InterviewPhase;
use super::transition::PendingTransition;

/// Tri-state consent to contact-data collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Consent {
    #[default]
    Unknown,
    Given,
    Refused,
}

impl Consent {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Value held for a required field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ProfileValue {
    Collected(String),
    Skipped,
}

impl ProfileValue {
    pub fn is_collected(&self) -> bool {
        matches!(self, Self::Collected(_))
    }
}

/// The mutable core of one interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub phase: InterviewPhase,
    pub topic_index: usize,
    pub turn_in_topic: u32,
    /// Simulated useful talk time, not wall-clock.
    effective_seconds: f64,
    pub consent: Consent,
    pub data_collection_refused: bool,
    profile: BTreeMap<String, ProfileValue>,
    pub field_attempts: BTreeMap<String, u32>,
    pub pending_transition: Option<PendingTransition>,
    pub deep_offer_asks: u32,
    pub consent_asks: u32,
    /// The current topic already used its one free clarification.
    pub clarification_used: bool,
    /// The next topic question must rephrase the previous one.
    pub rephrase_pending: bool,
    /// A closing message has been emitted.
    pub closed: bool,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    /// Creates the initial state: SCAN, first topic, nothing collected.
    pub fn new() -> Self {
        Self {
            phase: InterviewPhase::Scan,
            topic_index: 0,
            turn_in_topic: 0,
            effective_seconds: 0.0,
            consent: Consent::Unknown,
            data_collection_refused: false,
            profile: BTreeMap::new(),
            field_attempts: BTreeMap::new(),
            pending_transition: None,
            deep_offer_asks: 0,
            consent_asks: 0,
            clarification_used: false,
            rephrase_pending: false,
            closed: false,
        }
    }

    pub fn effective_seconds(&self) -> f64 {
        self.effective_seconds
    }

    /// Adds talk time. Negative or non-finite amounts are ignored.
    pub fn add_effective_seconds(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.effective_seconds += seconds;
        }
    }

    /// Seconds left of `planned_seconds`; negative once overrun.
    pub fn remaining_seconds(&self, planned_seconds: f64) -> f64 {
        planned_seconds - self.effective_seconds
    }

    pub fn profile(&self) -> &BTreeMap<String, ProfileValue> {
        &self.profile
    }

    pub fn profile_value(&self, field: &str) -> Option<&ProfileValue> {
        self.profile.get(field)
    }

    /// Returns true once a field is collected or skipped.
    pub fn is_field_resolved(&self, field: &str) -> bool {
        self.profile.contains_key(field)
    }

    pub fn attempts(&self, field: &str) -> u32 {
        self.field_attempts.get(field).copied().unwrap_or(0)
    }

    /// Records a collected value. A resolved field is never overwritten.
    pub fn record_collected(&mut self, field: &str, value: impl Into<String>) -> bool {
        if self.is_field_resolved(field) {
            return false;
        }
        self.profile
            .insert(field.to_string(), ProfileValue::Collected(value.into()));
        true
    }

    /// Marks a field skipped. A resolved field is never overwritten.
    pub fn record_skipped(&mut self, field: &str) -> bool {
        if self.is_field_resolved(field) {
            return false;
        }
        self.profile.insert(field.to_string(), ProfileValue::Skipped);
        true
    }

    /// Counts a failed attempt for `field`, returning the new total.
    pub fn record_failed_attempt(&mut self, field: &str) -> u32 {
        let attempts = self.field_attempts.entry(field.to_string()).or_insert(0);
        *attempts += 1;
        *attempts
    }

    /// Resets per-topic counters when a topic starts.
    pub fn enter_topic(&mut self, topic_index: usize) {
        self.topic_index = topic_index;
        self.turn_in_topic = 0;
        self.clarification_used = false;
        self.rephrase_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_starts_in_scan_at_first_topic() {
        let state = ConversationState::new();
        assert_eq!(state.phase, InterviewPhase::Scan);
        assert_eq!(state.topic_index, 0);
        assert_eq!(state.turn_in_topic, 0);
        assert_eq!(state.consent, Consent::Unknown);
        assert!(!state.closed);
    }

    #[test]
    fn effective_seconds_only_grow() {
        let mut state = ConversationState::new();
        state.add_effective_seconds(10.0);
        state.add_effective_seconds(-5.0);
        state.add_effective_seconds(f64::NAN);
        assert_eq!(state.effective_seconds(), 10.0);
        assert_eq!(state.remaining_seconds(30.0), 20.0);
    }

    #[test]
    fn collected_value_is_never_overwritten() {
        let mut state = ConversationState::new();
        assert!(state.record_collected("email", "a@b.co"));
        assert!(!state.record_skipped("email"));
        assert!(!state.record_collected("email", "c@d.co"));
        assert_eq!(
            state.profile_value("email"),
            Some(&ProfileValue::Collected("a@b.co".into()))
        );
    }

    #[test]
    fn skipped_value_stays_skipped() {
        let mut state = ConversationState::new();
        assert!(state.record_skipped("phone"));
        assert!(!state.record_collected("phone", "123"));
        assert_eq!(state.profile_value("phone"), Some(&ProfileValue::Skipped));
    }

    #[test]
    fn failed_attempts_accumulate() {
        let mut state = ConversationState::new();
        assert_eq!(state.record_failed_attempt("name"), 1);
        assert_eq!(state.record_failed_attempt("name"), 2);
        assert_eq!(state.attempts("name"), 2);
        assert_eq!(state.attempts("email"), 0);
    }

    #[test]
    fn profile_value_serializes_tagged() {
        let json = serde_json::to_string(&ProfileValue::Collected("x".into())).unwrap();
        assert_eq!(json, r#"{"status":"collected","value":"x"}"#);
        assert_eq!(
            serde_json::to_string(&ProfileValue::Skipped).unwrap(),
            r#"{"status":"skipped"}"#
        );
    }
}
