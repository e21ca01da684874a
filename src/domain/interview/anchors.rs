//! Topic anchor extraction and the cheap relevance predicate built on it.
//!
//! An anchor is a salient keyword truncated to a short root so that simple
//! substring checks catch inflections ("pricing", "priced", "prices").

use crate::domain::foundation::Language;

/// Maximum number of anchors kept per input.
pub const MAX_ANCHORS: usize = 6;

/// Anchors are truncated to this many characters.
pub const ANCHOR_ROOT_LEN: usize = 6;

/// Words shorter than this are dropped unless whitelisted.
pub const MIN_ANCHOR_LEN: usize = 4;

/// Short domain acronyms kept regardless of length.
const ACRONYM_WHITELIST: &[&str] = &[
    "ai", "ux", "ui", "hr", "pr", "qa", "bi", "ml", "ar", "vr", "seo", "crm", "erp", "kpi",
    "roi", "api", "b2b", "b2c",
];

/// A keyword together with its matching root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub word: String,
    pub root: String,
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn root_of(word: &str) -> String {
    word.chars().take(ANCHOR_ROOT_LEN).collect()
}

fn is_candidate(word: &str, language: Language) -> bool {
    if ACRONYM_WHITELIST.contains(&word) {
        return true;
    }
    if word.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    word.chars().count() >= MIN_ANCHOR_LEN && !language.keywords().is_stop_word(word)
}

/// Extracts up to [`MAX_ANCHORS`] anchors from a label and its sub-goals.
///
/// Order follows first occurrence; anchors sharing a root are de-duplicated.
pub fn extract_anchors<S: AsRef<str>>(label: &str, sub_goals: &[S], language: Language) -> Vec<Anchor> {
    let mut anchors: Vec<Anchor> = Vec::new();
    let parts = std::iter::once(label).chain(sub_goals.iter().map(AsRef::as_ref));

    for part in parts {
        for word in tokens(part) {
            if anchors.len() >= MAX_ANCHORS {
                return anchors;
            }
            if !is_candidate(&word, language) {
                continue;
            }
            let root = root_of(&word);
            if anchors.iter().any(|a| a.root == root) {
                continue;
            }
            anchors.push(Anchor { word, root });
        }
    }
    anchors
}

/// Extracts only the roots of [`extract_anchors`].
pub fn extract_anchor_roots<S: AsRef<str>>(label: &str, sub_goals: &[S], language: Language) -> Vec<String> {
    extract_anchors(label, sub_goals, language)
        .into_iter()
        .map(|a| a.root)
        .collect()
}

/// Extracts anchor roots from a free utterance.
pub fn utterance_roots(text: &str, language: Language) -> Vec<String> {
    extract_anchor_roots::<&str>(text, &[], language)
}

/// Returns true if `text` mentions any of `roots`.
///
/// A root matches when it appears anywhere in the lowercased text, so short
/// acronyms also fire inside longer words ("ai" in "said").
pub fn mentions_anchors<S: AsRef<str>>(text: &str, roots: &[S]) -> bool {
    let lower = text.to_lowercase();
    roots
        .iter()
        .map(AsRef::as_ref)
        .any(|root| !root.is_empty() && lower.contains(root))
}
