//! The result of one simulated conversation.

use serde::{Deserialize, Serialize};

use crate::domain::evaluation::TranscriptEvaluation;
use crate::domain::foundation::ConversationId;
use crate::domain::interview::{ConversationState, Transcript};

use super::audit::{AuditReport, Coverage, PolicyViolation};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    /// The interview reached its closing turn.
    Completed,
    /// The step ceiling stopped the run first.
    Incomplete,
    /// A fatal per-run error stopped the run.
    Failed { reason: String },
}

impl RunStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub run_index: usize,
    pub conversation_id: ConversationId,
    pub seed: u64,
    pub persona: String,
    pub status: RunStatus,
    pub steps: usize,
    pub effective_seconds: f64,
    pub planned_seconds: f64,
    /// Effective seconds over planned seconds.
    pub utilization: f64,
    pub coverage: Coverage,
    pub violations: Vec<PolicyViolation>,
    /// Assistant turns whose generated text was replaced by a template.
    pub generation_fallbacks: usize,
    pub evaluation: TranscriptEvaluation,
    pub final_state: ConversationState,
    pub transcript: Transcript,
    /// Completed, free of violations, and above the quality bar.
    pub passed: bool,
}

/// Everything a driver gathers before an outcome is assembled.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub run_index: usize,
    pub conversation_id: ConversationId,
    pub seed: u64,
    pub persona: String,
    pub status: RunStatus,
    pub steps: usize,
    pub planned_seconds: f64,
    pub generation_fallbacks: usize,
    pub audit: AuditReport,
    pub final_state: ConversationState,
    pub transcript: Transcript,
}

impl RunOutcome {
    pub fn new(record: RunRecord, evaluation: TranscriptEvaluation) -> Self {
        let effective_seconds = record.final_state.effective_seconds();
        let utilization = if record.planned_seconds > 0.0 {
            effective_seconds / record.planned_seconds
        } else {
            0.0
        };
        let passed = record.status == RunStatus::Completed
            && record.audit.violations.is_empty()
            && evaluation.passed;
        Self {
            run_index: record.run_index,
            conversation_id: record.conversation_id,
            seed: record.seed,
            persona: record.persona,
            status: record.status,
            steps: record.steps,
            effective_seconds,
            planned_seconds: record.planned_seconds,
            utilization,
            coverage: record.audit.coverage,
            violations: record.audit.violations,
            generation_fallbacks: record.generation_fallbacks,
            evaluation,
            final_state: record.final_state,
            transcript: record.transcript,
            passed,
        }
    }

    pub fn score(&self) -> f64 {
        self.evaluation.score
    }
}
