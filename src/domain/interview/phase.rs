//! Interview phases.
//!
//! Phases flow forward only:
//! - `Scan` → `Deep` (time left) or `DeepOffer` (time used up)
//! - `DeepOffer` → `Deep` (accepted) or `DataCollection` (declined)
//! - `Deep` → `DataCollection` → `Done`

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// The current phase of an interview conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterviewPhase {
    /// Breadth-first pass over every topic.
    #[default]
    Scan,
    /// Short follow-up pass over every topic.
    Deep,
    /// Asking whether the respondent will stay for a deeper pass.
    DeepOffer,
    /// Consent and contact-field collection.
    DataCollection,
    /// Interview closed.
    Done,
}

impl InterviewPhase {
    /// Returns true for phases that spend topic turns.
    pub fn is_topic_phase(&self) -> bool {
        matches!(self, Self::Scan | Self::Deep)
    }

    /// Returns the upper-case label used in transcripts and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Scan => "SCAN",
            Self::Deep => "DEEP",
            Self::DeepOffer => "DEEP_OFFER",
            Self::DataCollection => "DATA_COLLECTION",
            Self::Done => "DONE",
        }
    }
}

impl fmt::Display for InterviewPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl StateMachine for InterviewPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            Self::Scan => vec![Self::Deep, Self::DeepOffer],
            Self::Deep => vec![Self::DataCollection],
            Self::DeepOffer => vec![Self::Deep, Self::DataCollection],
            Self::DataCollection => vec![Self::Done],
            Self::Done => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_phase_is_scan() {
        assert_eq!(InterviewPhase::default(), InterviewPhase::Scan);
    }

    #[test]
    fn serializes_to_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&InterviewPhase::DeepOffer).unwrap(),
            "\"DEEP_OFFER\""
        );
        let phase: InterviewPhase = serde_json::from_str("\"DATA_COLLECTION\"").unwrap();
        assert_eq!(phase, InterviewPhase::DataCollection);
    }

    #[test]
    fn only_scan_and_deep_spend_topic_turns() {
        assert!(InterviewPhase::Scan.is_topic_phase());
        assert!(InterviewPhase::Deep.is_topic_phase());
        assert!(!InterviewPhase::DeepOffer.is_topic_phase());
        assert!(!InterviewPhase::Done.is_topic_phase());
    }

    #[test]
    fn scan_cannot_skip_to_data_collection() {
        assert!(InterviewPhase::Scan
            .transition_to(InterviewPhase::DataCollection)
            .is_err());
    }

    #[test]
    fn deep_offer_branches() {
        assert!(InterviewPhase::DeepOffer.can_transition_to(&InterviewPhase::Deep));
        assert!(InterviewPhase::DeepOffer.can_transition_to(&InterviewPhase::DataCollection));
    }

    #[test]
    fn done_is_terminal() {
        assert!(InterviewPhase::Done.is_terminal());
        for phase in [
            InterviewPhase::Scan,
            InterviewPhase::Deep,
            InterviewPhase::DeepOffer,
            InterviewPhase::DataCollection,
        ] {
            assert!(!phase.is_terminal());
        }
    }

    #[test]
    fn nothing_returns_to_scan() {
        for phase in [
            InterviewPhase::Deep,
            InterviewPhase::DeepOffer,
            InterviewPhase::DataCollection,
            InterviewPhase::Done,
        ] {
            assert!(!phase.can_transition_to(&InterviewPhase::Scan));
        }
    }
}
