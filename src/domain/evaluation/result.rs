//! Evaluation results. Derived data: always rebuilt from a transcript.

use serde::{Deserialize, Serialize};

use crate::domain::interview::InterviewPhase;

/// One boolean quality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnCheck {
    SingleQuestion,
    NoPrematureClosing,
    NoContactRequest,
    OnTopic,
    NotRepetitive,
    ProbesShortAnswer,
    OffersContinuation,
    UnderstoodReply,
    NaturalRephrase,
    ConsentCoherent,
    TransitionCoherent,
}

impl TurnCheck {
    /// Issue text reported when the check fails.
    pub fn issue(&self) -> &'static str {
        match self {
            Self::SingleQuestion => "turn does not ask exactly one question",
            Self::NoPrematureClosing => "closing language before the interview ends",
            Self::NoContactRequest => "contact details requested outside data collection",
            Self::OnTopic => "turn ignores both the topic and the respondent's words",
            Self::NotRepetitive => "turn repeats the previous question",
            Self::ProbesShortAnswer => "short answer was not probed",
            Self::OffersContinuation => "deep offer does not offer to continue",
            Self::UnderstoodReply => "confusion was not addressed with a rephrase",
            Self::NaturalRephrase => "rephrase without any sign of confusion",
            Self::ConsentCoherent => "consent answer was misinterpreted",
            Self::TransitionCoherent => "incoherent topic transition",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub check: TurnCheck,
    pub passed: bool,
}

/// Checklist, score and issues for one assistant turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnEvaluation {
    /// Position of the turn in the transcript.
    pub turn_index: usize,
    pub phase: InterviewPhase,
    pub topic_label: String,
    /// Topic label differs from the previous assistant turn's.
    pub is_transition: bool,
    pub checks: Vec<CheckOutcome>,
    /// 0-100.
    pub score: u8,
    pub issues: Vec<String>,
}

impl TurnEvaluation {
    /// Builds a result from checks, subtracting `penalty` when any check fails.
    pub(crate) fn from_checks(
        turn_index: usize,
        phase: InterviewPhase,
        topic_label: &str,
        is_transition: bool,
        checks: Vec<CheckOutcome>,
        penalty: u8,
    ) -> Self {
        let score = score_checks(&checks).saturating_sub(penalty);
        let issues = checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.check.issue().to_string())
            .collect();
        Self {
            turn_index,
            phase,
            topic_label: topic_label.to_string(),
            is_transition,
            checks,
            score,
            issues,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed(&self, check: TurnCheck) -> bool {
        self.checks.iter().any(|c| c.check == check && !c.passed)
    }

    pub fn has_check(&self, check: TurnCheck) -> bool {
        self.checks.iter().any(|c| c.check == check)
    }
}

/// `round(passed / total * 100)`; 100 exactly when every check passes.
pub fn score_checks(checks: &[CheckOutcome]) -> u8 {
    let total = checks.len();
    if total == 0 {
        return 100;
    }
    let passed = checks.iter().filter(|c| c.passed).count();
    let score = ((passed as f64 / total as f64) * 100.0).round() as u8;
    if passed < total {
        score.min(99)
    } else {
        score
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCount {
    pub issue: String,
    pub count: usize,
}

/// Aggregate quality of a whole transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEvaluation {
    /// Mean of the per-turn scores; 0 for a transcript without assistant turns.
    pub score: f64,
    pub passed: bool,
    pub failed_turns: usize,
    pub transition_failures: usize,
    pub consent_failures: usize,
    pub top_issues: Vec<IssueCount>,
    pub turns: Vec<TurnEvaluation>,
}

impl TranscriptEvaluation {
    pub fn empty() -> Self {
        Self {
            score: 0.0,
            passed: false,
            failed_turns: 0,
            transition_failures: 0,
            consent_failures: 0,
            top_issues: Vec::new(),
            turns: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(check: TurnCheck, passed: bool) -> CheckOutcome {
        CheckOutcome { check, passed }
    }

    #[test]
    fn no_checks_score_full_marks() {
        assert_eq!(score_checks(&[]), 100);
    }

    #[test]
    fn score_rounds_ratio() {
        let checks = vec![
            outcome(TurnCheck::SingleQuestion, true),
            outcome(TurnCheck::OnTopic, true),
            outcome(TurnCheck::NotRepetitive, false),
        ];
        assert_eq!(score_checks(&checks), 67);
    }

    #[test]
    fn penalty_saturates_at_zero() {
        let eval = TurnEvaluation::from_checks(
            0,
            InterviewPhase::Scan,
            "Pricing",
            true,
            vec![outcome(TurnCheck::TransitionCoherent, false)],
            15,
        );
        assert_eq!(eval.score, 0);
        assert_eq!(eval.issues, vec!["incoherent topic transition".to_string()]);
        assert!(eval.failed(TurnCheck::TransitionCoherent));
    }
}
