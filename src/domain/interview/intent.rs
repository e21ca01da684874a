//! Keyword-table intent classification of respondent replies.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{KeywordTable, Language};

/// Coarse intent of a reply to a yes/no style question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Accept,
    Refuse,
    Neutral,
}

/// Classifies replies into [`Intent`]s.
///
/// The interview machine only depends on this trait, so a model-backed
/// classifier can replace the keyword one without touching transitions.
pub trait IntentClassifier: Send + Sync + std::fmt::Debug {
    fn classify(&self, text: &str) -> Intent;

    fn signals_confusion(&self, text: &str) -> bool;

    fn is_skip_request(&self, text: &str) -> bool;
}

/// Classifier backed by a language's [`KeywordTable`].
#[derive(Debug, Clone, Copy)]
pub struct KeywordIntentClassifier {
    language: Language,
}

impl KeywordIntentClassifier {
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

impl IntentClassifier for KeywordIntentClassifier {
    fn classify(&self, text: &str) -> Intent {
        classify_intent(text, self.language)
    }

    fn signals_confusion(&self, text: &str) -> bool {
        signals_confusion(text, self.language)
    }

    fn is_skip_request(&self, text: &str) -> bool {
        is_skip_request(text, self.language)
    }
}

/// Classifies `text` as accept, refuse or neutral.
///
/// Accepting idioms ("no problem") win first, then any refusal phrase wins
/// over acceptance, so "yes, but not now" is a refusal.
pub fn classify_intent(text: &str, language: Language) -> Intent {
    let table = language.keywords();
    let normalized = KeywordTable::normalize(text);

    if KeywordTable::contains_any(&normalized, table.accepting_idioms) {
        Intent::Accept
    } else if KeywordTable::contains_any(&normalized, table.refuse) {
        Intent::Refuse
    } else if KeywordTable::contains_any(&normalized, table.accept) {
        Intent::Accept
    } else {
        Intent::Neutral
    }
}

/// Returns true if the reply says the respondent did not understand.
pub fn signals_confusion(text: &str, language: Language) -> bool {
    KeywordTable::text_contains_any(text, language.keywords().confusion)
}

/// Returns true if the reply asks to skip the current field.
pub fn is_skip_request(text: &str, language: Language) -> bool {
    KeywordTable::text_contains_any(text, language.keywords().skip)
}
