//! Whole-transcript semantic flow evaluation.
//!
//! Every assistant turn gets the single-turn checklist plus checks that need
//! the surrounding conversation: was confusion answered with a rephrase, was
//! a rephrase warranted, was a consent answer read correctly, and did a topic
//! change flow from what came before.

use std::collections::BTreeMap;

use crate::domain::foundation::Language;
use crate::domain::interview::{
    classify_intent, mentions_anchors, signals_confusion, utterance_roots, Intent, InterviewPhase,
    Role, Transcript, TurnKind,
};

use super::heuristics::{has_bridging_language, has_rephrase_marker};
use super::result::{CheckOutcome, IssueCount, TranscriptEvaluation, TurnCheck, TurnEvaluation};
use super::turn_evaluator::{resolve_topic_roots, TurnEvaluator, TurnInput};

/// Points subtracted from a topic-transition turn whose transition is incoherent.
pub const TRANSITION_PENALTY: u8 = 15;

/// Default minimum mean score for a passing transcript.
pub const DEFAULT_PASS_SCORE: f64 = 80.0;

/// Default number of issues listed in a result.
pub const DEFAULT_TOP_ISSUES: usize = 5;

/// Scores a full transcript.
#[derive(Debug, Clone)]
pub struct FlowEvaluator {
    turn_evaluator: TurnEvaluator,
    pass_score: f64,
    top_issues: usize,
}

struct PriorTurn<'a> {
    text: &'a str,
    kind: TurnKind,
    topic_label: &'a str,
}

impl FlowEvaluator {
    pub fn new(language: Language) -> Self {
        Self {
            turn_evaluator: TurnEvaluator::new(language),
            pass_score: DEFAULT_PASS_SCORE,
            top_issues: DEFAULT_TOP_ISSUES,
        }
    }

    pub fn with_pass_score(mut self, pass_score: f64) -> Self {
        self.pass_score = pass_score;
        self
    }

    pub fn with_top_issues(mut self, top_issues: usize) -> Self {
        self.top_issues = top_issues;
        self
    }

    fn language(&self) -> Language {
        self.turn_evaluator.language()
    }

    /// Evaluates `transcript`. Never fails: an empty transcript scores zero.
    pub fn evaluate(&self, transcript: &Transcript) -> TranscriptEvaluation {
        let lang = self.language();
        let mut turns = Vec::new();
        let mut prior: Option<PriorTurn<'_>> = None;
        let mut last_reply: Option<&str> = None;
        let mut consent_refused = false;
        let mut consent_failures = 0;
        let mut transition_failures = 0;

        for (index, turn) in transcript.turns().iter().enumerate() {
            if turn.role == Role::User {
                last_reply = Some(turn.text.as_str());
                continue;
            }

            let (phase, topic_label, topic_roots, kind) = match &turn.meta {
                Some(meta) => (
                    meta.phase,
                    meta.topic_label.as_str(),
                    meta.anchor_roots.as_slice(),
                    meta.kind,
                ),
                None => (InterviewPhase::Scan, "", &[][..], TurnKind::TopicQuestion),
            };
            let input = TurnInput {
                text: &turn.text,
                phase,
                topic_label,
                topic_roots,
                kind,
                previous_reply: last_reply,
                previous_assistant: prior.as_ref().map(|p| p.text),
            };
            let mut checks = self.turn_evaluator.checks(&input);

            let confused = last_reply.map_or(false, |r| signals_confusion(r, lang));
            if confused && phase.is_topic_phase() {
                checks.push(CheckOutcome {
                    check: TurnCheck::UnderstoodReply,
                    passed: kind == TurnKind::Rephrase || has_rephrase_marker(&turn.text, lang),
                });
            }
            if kind == TurnKind::Rephrase || has_rephrase_marker(&turn.text, lang) {
                checks.push(CheckOutcome {
                    check: TurnCheck::NaturalRephrase,
                    passed: confused,
                });
            }

            if let Some(coherent) = self.consent_coherence(prior.as_ref(), last_reply, kind, &mut consent_refused) {
                if !coherent {
                    consent_failures += 1;
                }
                checks.push(CheckOutcome {
                    check: TurnCheck::ConsentCoherent,
                    passed: coherent,
                });
            }

            let is_transition = prior.as_ref().map_or(false, |p| p.topic_label != topic_label);
            let mut penalty = 0;
            if is_transition {
                let roots = resolve_topic_roots(topic_label, topic_roots, lang);
                let coherent = self.transition_coherent(&turn.text, &roots, kind, last_reply);
                if !coherent {
                    transition_failures += 1;
                    penalty = TRANSITION_PENALTY;
                }
                checks.push(CheckOutcome {
                    check: TurnCheck::TransitionCoherent,
                    passed: coherent,
                });
            }

            turns.push(TurnEvaluation::from_checks(
                index,
                phase,
                topic_label,
                is_transition,
                checks,
                penalty,
            ));
            prior = Some(PriorTurn {
                text: &turn.text,
                kind,
                topic_label,
            });
            last_reply = None;
        }

        if turns.is_empty() {
            return TranscriptEvaluation::empty();
        }

        let score = turns.iter().map(|t| f64::from(t.score)).sum::<f64>() / turns.len() as f64;
        let failed_turns = turns.iter().filter(|t| !t.all_passed()).count();
        let passed = score >= self.pass_score && consent_failures == 0;

        TranscriptEvaluation {
            score,
            passed,
            failed_turns,
            transition_failures,
            consent_failures,
            top_issues: self.top_issues(&turns),
            turns,
        }
    }

    /// Judges a turn against the consent answer before it.
    ///
    /// Returns `None` when consent is not in play for this turn.
    fn consent_coherence(
        &self,
        prior: Option<&PriorTurn<'_>>,
        reply: Option<&str>,
        kind: TurnKind,
        consent_refused: &mut bool,
    ) -> Option<bool> {
        let answered_consent = prior.map_or(false, |p| p.kind == TurnKind::ConsentRequest);
        if let (true, Some(reply)) = (answered_consent, reply) {
            let coherent = match classify_intent(reply, self.language()) {
                Intent::Refuse => {
                    *consent_refused = true;
                    kind == TurnKind::Closing
                }
                Intent::Accept => matches!(kind, TurnKind::FieldRequest | TurnKind::Closing),
                Intent::Neutral => matches!(kind, TurnKind::ConsentRequest | TurnKind::Closing),
            };
            return Some(coherent);
        }
        if *consent_refused && kind == TurnKind::FieldRequest {
            return Some(false);
        }
        None
    }

    /// Judges a turn that lands on a new topic label.
    ///
    /// Only a topic question has to name the new topic; any turn that bridges
    /// must quote the reply it bridges from.
    fn transition_coherent(&self, text: &str, topic_roots: &[String], kind: TurnKind, reply: Option<&str>) -> bool {
        let lang = self.language();
        match kind {
            TurnKind::Rephrase => return false,
            TurnKind::TopicQuestion if !mentions_anchors(text, topic_roots) => return false,
            _ => {}
        }
        if has_bridging_language(text, lang) {
            // A bridge must quote something the respondent actually said.
            let reply_roots = reply.map(|r| utterance_roots(r, lang)).unwrap_or_default();
            return mentions_anchors(text, &reply_roots);
        }
        true
    }

    fn top_issues(&self, turns: &[TurnEvaluation]) -> Vec<IssueCount> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for issue in turns.iter().flat_map(|t| t.issues.iter()) {
            *counts.entry(issue.as_str()).or_insert(0) += 1;
        }
        let mut issues: Vec<IssueCount> = counts
            .into_iter()
            .map(|(issue, count)| IssueCount {
                issue: issue.to_string(),
                count,
            })
            .collect();
        issues.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.issue.cmp(&b.issue)));
        issues.truncate(self.top_issues);
        issues
    }
}
