//! Flow-policy audit of a simulated conversation.
//!
//! The auditor watches every assistant turn just before it is committed,
//! together with the conversation state at that moment, and records
//! behavior the interview policy forbids.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::domain::interview::{
    AssistantMeta, Consent, ConversationState, InterviewPhase, ProfileValue, TurnKind,
};

/// A breach of interview policy observed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyViolation {
    /// A deep-dive offer was made although planned time remained.
    DeepOfferWithTimeRemaining,
    /// A field was requested again after a value had been collected.
    FieldReaskedAfterCollected { field: String },
    /// Data collection started before every topic was touched.
    DataCollectionBeforeFullCoverage { covered: usize, total: usize },
    FieldAskedAfterConsentRefused { field: String },
    /// The run stopped at the step ceiling without closing.
    StepCeilingReached { steps: usize },
}

impl PolicyViolation {
    /// Stable name used for histograms.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DeepOfferWithTimeRemaining => "deep_offer_with_time_remaining",
            Self::FieldReaskedAfterCollected { .. } => "field_reasked_after_collected",
            Self::DataCollectionBeforeFullCoverage { .. } => "data_collection_before_full_coverage",
            Self::FieldAskedAfterConsentRefused { .. } => "field_asked_after_consent_refused",
            Self::StepCeilingReached { .. } => "step_ceiling_reached",
        }
    }
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldReaskedAfterCollected { field } | Self::FieldAskedAfterConsentRefused { field } => {
                write!(f, "{} ({field})", self.name())
            }
            Self::DataCollectionBeforeFullCoverage { covered, total } => {
                write!(f, "{} ({covered}/{total})", self.name())
            }
            Self::StepCeilingReached { steps } => write!(f, "{} ({steps})", self.name()),
            Self::DeepOfferWithTimeRemaining => f.write_str(self.name()),
        }
    }
}

/// Topics touched before and after data collection begins.
///
/// Both sets only grow. Once collection has started the "before" set is
/// frozen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageTracker {
    topic_count: usize,
    before: BTreeSet<usize>,
    after: BTreeSet<usize>,
    collection_started: bool,
}

impl CoverageTracker {
    pub fn new(topic_count: usize) -> Self {
        Self {
            topic_count,
            before: BTreeSet::new(),
            after: BTreeSet::new(),
            collection_started: false,
        }
    }

    /// Records that `topic_index` was asked about. Out-of-range indices are ignored.
    pub fn touch(&mut self, topic_index: usize) {
        if topic_index >= self.topic_count {
            return;
        }
        if self.collection_started {
            self.after.insert(topic_index);
        } else {
            self.before.insert(topic_index);
        }
    }

    /// Marks the start of data collection; true the first time only.
    pub fn start_collection(&mut self) -> bool {
        !std::mem::replace(&mut self.collection_started, true)
    }

    pub fn collection_started(&self) -> bool {
        self.collection_started
    }

    pub fn covered_before_collection(&self) -> &BTreeSet<usize> {
        &self.before
    }

    pub fn covered_after_collection(&self) -> &BTreeSet<usize> {
        &self.after
    }

    pub fn topic_count(&self) -> usize {
        self.topic_count
    }

    pub fn before_collection_fraction(&self) -> f64 {
        self.fraction(self.before.len())
    }

    /// Fraction of topics touched at any point of the run.
    pub fn overall_fraction(&self) -> f64 {
        self.fraction(self.before.union(&self.after).count())
    }

    fn fraction(&self, covered: usize) -> f64 {
        if self.topic_count == 0 {
            0.0
        } else {
            covered as f64 / self.topic_count as f64
        }
    }

    pub fn summary(&self) -> Coverage {
        Coverage {
            before_collection: self.before_collection_fraction(),
            overall: self.overall_fraction(),
        }
    }
}

/// Coverage fractions of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coverage {
    pub before_collection: f64,
    pub overall: f64,
}

/// Result of auditing one run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AuditReport {
    pub coverage: Coverage,
    pub violations: Vec<PolicyViolation>,
}

/// Watches assistant turns for policy breaches.
#[derive(Debug, Clone)]
pub struct PolicyAuditor {
    planned_seconds: f64,
    coverage: CoverageTracker,
    violations: Vec<PolicyViolation>,
}

impl PolicyAuditor {
    pub fn new(topic_count: usize, planned_seconds: f64) -> Self {
        Self {
            planned_seconds,
            coverage: CoverageTracker::new(topic_count),
            violations: Vec::new(),
        }
    }

    pub fn coverage(&self) -> &CoverageTracker {
        &self.coverage
    }

    pub fn violations(&self) -> &[PolicyViolation] {
        &self.violations
    }

    /// Audits one assistant turn against the state it was emitted from.
    pub fn audit(&mut self, meta: &AssistantMeta, state: &ConversationState) {
        if meta.phase.is_topic_phase() {
            self.coverage.touch(meta.topic_index);
        }
        if matches!(meta.phase, InterviewPhase::DataCollection | InterviewPhase::Done)
            && self.coverage.start_collection()
        {
            let covered = self.coverage.covered_before_collection().len();
            let total = self.coverage.topic_count();
            if covered < total {
                self.record(PolicyViolation::DataCollectionBeforeFullCoverage { covered, total });
            }
        }

        match (meta.kind, meta.field.as_deref()) {
            (TurnKind::DeepOffer, _) if state.remaining_seconds(self.planned_seconds) > 0.0 => {
                self.record(PolicyViolation::DeepOfferWithTimeRemaining);
            }
            (TurnKind::FieldRequest, Some(field)) => {
                if state.consent == Consent::Refused || state.data_collection_refused {
                    self.record(PolicyViolation::FieldAskedAfterConsentRefused {
                        field: field.to_string(),
                    });
                }
                if matches!(state.profile_value(field), Some(ProfileValue::Collected(_))) {
                    self.record(PolicyViolation::FieldReaskedAfterCollected {
                        field: field.to_string(),
                    });
                }
            }
            _ => {}
        }
    }

    /// Records that the run was cut off after `steps` steps.
    pub fn ceiling_reached(&mut self, steps: usize) {
        self.record(PolicyViolation::StepCeilingReached { steps });
    }

    fn record(&mut self, violation: PolicyViolation) {
        tracing::debug!(%violation, "policy violation");
        self.violations.push(violation);
    }

    pub fn finish(self) -> AuditReport {
        AuditReport {
            coverage: self.coverage.summary(),
            violations: self.violations,
        }
    }
}
