//! Lexical measures shared by the evaluators.

use std::collections::BTreeSet;

use crate::domain::foundation::{KeywordTable, Language};

/// Token-overlap similarity at or above which two turns count as duplicates.
pub const NEAR_DUPLICATE_THRESHOLD: f64 = 0.8;

/// Answers of at most this many words call for a probe.
pub const SHORT_ANSWER_MAX_WORDS: usize = 4;

pub fn question_count(text: &str) -> usize {
    text.matches('?').count()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn token_set(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Jaccard similarity of the two texts' token sets, in `[0, 1]`.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let a = token_set(a);
    let b = token_set(b);
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

pub fn is_near_duplicate(a: &str, b: &str) -> bool {
    jaccard_similarity(a, b) >= NEAR_DUPLICATE_THRESHOLD
}

pub fn is_short_answer(text: &str) -> bool {
    word_count(text) <= SHORT_ANSWER_MAX_WORDS
}

pub fn has_closing_language(text: &str, language: Language) -> bool {
    KeywordTable::text_contains_any(text, language.keywords().closing)
}

pub fn has_contact_request(text: &str, language: Language) -> bool {
    KeywordTable::text_contains_any(text, language.keywords().contact_terms)
}

pub fn has_offer_language(text: &str, language: Language) -> bool {
    KeywordTable::text_contains_any(text, language.keywords().offer)
}

pub fn has_bridging_language(text: &str, language: Language) -> bool {
    KeywordTable::text_contains_any(text, language.keywords().bridging)
}

pub fn has_rephrase_marker(text: &str, language: Language) -> bool {
    KeywordTable::text_contains_any(text, language.keywords().rephrase)
}
