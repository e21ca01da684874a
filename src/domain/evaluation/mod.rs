//! Transcript quality evaluation.
//!
//! - `TurnEvaluator` - checklist scoring of one assistant turn
//! - `FlowEvaluator` - whole-conversation scoring built on the turn checklist
//!
//! Both are total: any transcript, including an empty one, yields a result.

mod flow_evaluator;
mod heuristics;
mod result;
mod turn_evaluator;

pub use flow_evaluator::{FlowEvaluator, DEFAULT_PASS_SCORE, DEFAULT_TOP_ISSUES, TRANSITION_PENALTY};
pub use heuristics::{jaccard_similarity, NEAR_DUPLICATE_THRESHOLD, SHORT_ANSWER_MAX_WORDS};
pub use result::{
    score_checks, CheckOutcome, IssueCount, TranscriptEvaluation, TurnCheck, TurnEvaluation,
};
pub use turn_evaluator::{TurnEvaluator, TurnInput};
