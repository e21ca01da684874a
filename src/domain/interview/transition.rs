//! Topic-boundary transition policy.
//!
//! At a topic boundary the interviewer either bridges from something the
//! respondent just said or pivots cleanly. Bridging is only chosen when the
//! respondent organically foreshadowed the next topic.

use serde::{Deserialize, Serialize};

use super::anchors::mentions_anchors;

/// Minimum answer length (in words) that may be bridged from.
pub const BRIDGE_MIN_WORDS: usize = 5;

/// Maximum words quoted back in a bridge.
pub const SNIPPET_MAX_WORDS: usize = 6;

/// How the next topic question should be introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionMode {
    Bridge,
    CleanPivot,
}

/// A transition decided at a boundary and consumed by the next assistant turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransition {
    pub mode: TransitionMode,
    /// Words of the respondent's answer to reference; only set for bridges.
    pub snippet: Option<String>,
}

impl PendingTransition {
    pub fn clean_pivot() -> Self {
        Self {
            mode: TransitionMode::CleanPivot,
            snippet: None,
        }
    }

    pub fn bridge(snippet: impl Into<String>) -> Self {
        Self {
            mode: TransitionMode::Bridge,
            snippet: Some(snippet.into()),
        }
    }

    pub fn is_bridge(&self) -> bool {
        self.mode == TransitionMode::Bridge
    }
}

/// Decides between bridging and pivoting.
#[derive(Debug, Clone)]
pub struct TransitionPolicy {
    min_words: usize,
    snippet_words: usize,
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self {
            min_words: BRIDGE_MIN_WORDS,
            snippet_words: SNIPPET_MAX_WORDS,
        }
    }
}

impl TransitionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chooses the transition into a topic whose anchors are `upcoming_roots`.
    pub fn decide<S: AsRef<str>>(&self, answer: &str, upcoming_roots: &[S]) -> PendingTransition {
        let words: Vec<&str> = answer.split_whitespace().collect();
        if words.len() < self.min_words || !mentions_anchors(answer, upcoming_roots) {
            tracing::debug!(words = words.len(), "transition: clean pivot");
            return PendingTransition::clean_pivot();
        }

        let sanitized = sanitize_words(answer);
        let hit = sanitized
            .iter()
            .position(|w| mentions_anchors(w, upcoming_roots))
            .unwrap_or(0);
        let start = hit
            .saturating_sub(2)
            .min(sanitized.len().saturating_sub(self.snippet_words));
        let snippet = sanitized
            .iter()
            .skip(start)
            .take(self.snippet_words)
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");

        if snippet.is_empty() {
            return PendingTransition::clean_pivot();
        }
        tracing::debug!(%snippet, "transition: bridge");
        PendingTransition::bridge(snippet)
    }
}

fn sanitize_words(text: &str) -> Vec<String> {
    let cleaned: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '\'' || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned
        .split_whitespace()
        .map(|w| w.trim_matches(|c| c == '\'' || c == '-').to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Reduces `text` to at most `max_words` plain words: punctuation, quotes
/// and control characters are dropped and whitespace is collapsed.
pub fn sanitize_snippet(text: &str, max_words: usize) -> String {
    sanitize_words(text)
        .into_iter()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}
