//! Checklist evaluation of a single assistant turn.

use std::borrow::Cow;

use crate::domain::foundation::Language;
use crate::domain::interview::{
    extract_anchor_roots, has_probe, mentions_anchors, utterance_roots, InterviewPhase, TurnKind,
};

use super::heuristics::{
    has_bridging_language, has_closing_language, has_contact_request, has_offer_language,
    is_near_duplicate, is_short_answer, question_count,
};
use super::result::{CheckOutcome, TurnCheck, TurnEvaluation};

/// One assistant turn with the context needed to judge it.
#[derive(Debug, Clone, Copy)]
pub struct TurnInput<'a> {
    pub text: &'a str,
    pub phase: InterviewPhase,
    pub topic_label: &'a str,
    /// Roots recorded with the turn; empty means derive them from the label.
    pub topic_roots: &'a [String],
    pub kind: TurnKind,
    /// The respondent's reply just before this turn.
    pub previous_reply: Option<&'a str>,
    /// The assistant turn before this one.
    pub previous_assistant: Option<&'a str>,
}

/// Anchor roots for a tagged topic, falling back to the label alone.
pub(crate) fn resolve_topic_roots<'a>(
    topic_label: &str,
    topic_roots: &'a [String],
    language: Language,
) -> Cow<'a, [String]> {
    if topic_roots.is_empty() {
        Cow::Owned(extract_anchor_roots::<&str>(topic_label, &[], language))
    } else {
        Cow::Borrowed(topic_roots)
    }
}

/// Scores one assistant turn in isolation.
#[derive(Debug, Clone, Copy)]
pub struct TurnEvaluator {
    language: Language,
}

impl TurnEvaluator {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn evaluate(&self, input: &TurnInput<'_>) -> TurnEvaluation {
        TurnEvaluation::from_checks(0, input.phase, input.topic_label, false, self.checks(input), 0)
    }

    /// Runs the per-turn checklist.
    pub fn checks(&self, input: &TurnInput<'_>) -> Vec<CheckOutcome> {
        let lang = self.language;
        let closing = input.kind == TurnKind::Closing;
        let mut checks = Vec::with_capacity(7);
        let mut push = |check, passed| checks.push(CheckOutcome { check, passed });

        if !closing {
            push(TurnCheck::SingleQuestion, question_count(input.text) == 1);
        }
        push(
            TurnCheck::NoPrematureClosing,
            closing || !has_closing_language(input.text, lang),
        );
        push(
            TurnCheck::NoContactRequest,
            input.phase == InterviewPhase::DataCollection || !has_contact_request(input.text, lang),
        );

        if input.phase.is_topic_phase() {
            let topic_roots = resolve_topic_roots(input.topic_label, input.topic_roots, lang);
            let reply_roots = input
                .previous_reply
                .map(|r| utterance_roots(r, lang))
                .unwrap_or_default();
            push(
                TurnCheck::OnTopic,
                mentions_anchors(input.text, &topic_roots)
                    || mentions_anchors(input.text, &reply_roots)
                    || has_bridging_language(input.text, lang),
            );
            push(
                TurnCheck::NotRepetitive,
                input
                    .previous_assistant
                    .map_or(true, |prev| !is_near_duplicate(input.text, prev)),
            );
            if input.previous_reply.map_or(false, is_short_answer) {
                push(TurnCheck::ProbesShortAnswer, has_probe(input.text, lang));
            }
        }

        if input.phase == InterviewPhase::DeepOffer {
            push(TurnCheck::OffersContinuation, has_offer_language(input.text, lang));
        }
        checks
    }
}
