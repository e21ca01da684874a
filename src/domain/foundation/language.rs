//! Interview languages and their keyword tables.
//!
//! Every lexical heuristic in the crate (intent detection, anchor stop-words,
//! evaluator checks) reads its vocabulary from a [`KeywordTable`]. Supporting
//! a new language means adding a table, not new branches.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language an interview is conducted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    It,
}

impl Language {
    /// Parses a language code such as `en`, `IT` or `en-US`.
    ///
    /// Region suffixes are ignored. Returns `None` for unsupported codes.
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Self::En),
            "it" => Some(Self::It),
            _ => None,
        }
    }

    /// Parses a language code, falling back to English when unsupported.
    pub fn from_code_or_default(code: &str) -> Self {
        Self::from_code(code).unwrap_or_else(|| {
            tracing::warn!(code, "unsupported language code, falling back to English");
            Self::En
        })
    }

    /// Returns the ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::It => "it",
        }
    }

    /// Returns the keyword table for this language.
    pub fn keywords(&self) -> &'static KeywordTable {
        match self {
            Self::En => &ENGLISH,
            Self::It => &ITALIAN,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Per-language vocabulary used by the lexical heuristics.
///
/// Phrases are stored already normalized (see [`KeywordTable::normalize`]):
/// lowercase, punctuation replaced by single spaces.
#[derive(Debug)]
pub struct KeywordTable {
    pub stop_words: &'static [&'static str],
    pub accept: &'static [&'static str],
    pub refuse: &'static [&'static str],
    /// Phrases that look negative but accept ("no problem", "why not").
    pub accepting_idioms: &'static [&'static str],
    pub confusion: &'static [&'static str],
    pub skip: &'static [&'static str],
    pub probing: &'static [&'static str],
    pub closing: &'static [&'static str],
    pub contact_terms: &'static [&'static str],
    pub offer: &'static [&'static str],
    pub bridging: &'static [&'static str],
    pub rephrase: &'static [&'static str],
}

impl KeywordTable {
    /// Lowercases and replaces every non-alphanumeric character (apostrophes
    /// excepted) with a space, padding the result so phrases can be matched
    /// on whole-token boundaries.
    pub fn normalize(text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 2);
        out.push(' ');
        let mut last_space = true;
        for c in text.chars().flat_map(char::to_lowercase) {
            let c = if c == '\u{2019}' { '\'' } else { c };
            if c.is_alphanumeric() || c == '\'' {
                out.push(c);
                last_space = false;
            } else if !last_space {
                out.push(' ');
                last_space = true;
            }
        }
        if !last_space {
            out.push(' ');
        }
        out
    }

    /// Returns true if the normalized text contains any phrase as a
    /// whole-token sequence.
    pub fn contains_any(normalized: &str, phrases: &[&str]) -> bool {
        phrases
            .iter()
            .any(|phrase| normalized.contains(&format!(" {} ", phrase)))
    }

    /// Normalizes `text` and checks it against `phrases`.
    pub fn text_contains_any(text: &str, phrases: &[&str]) -> bool {
        Self::contains_any(&Self::normalize(text), phrases)
    }

    /// Returns true if `word` (lowercase) is a stop-word.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(&word)
    }
}

static ENGLISH: KeywordTable = KeywordTable {
    stop_words: &[
        "the", "a", "an", "and", "or", "but", "for", "with", "about", "from", "into", "onto",
        "your", "you", "yours", "our", "ours", "their", "they", "them", "this", "that", "these",
        "those", "what", "which", "when", "where", "who", "how", "why", "are", "is", "was",
        "were", "been", "being", "have", "has", "had", "does", "did", "doing", "will", "would",
        "could", "should", "can", "may", "might", "must", "shall", "there", "here", "then",
        "than", "some", "such", "very", "more", "most", "much", "many", "other", "also", "just",
        "like", "really", "think", "thing", "things", "something", "anything", "everything",
        "over", "under", "each", "every", "within", "without", "across", "through", "during",
        "after", "before", "because", "while", "its", "it's", "i'm", "we're", "don't", "not",
    ],
    accept: &[
        "yes", "yeah", "yep", "sure", "ok", "okay", "of course", "absolutely", "happy to",
        "sounds good", "go ahead", "i agree", "let's continue", "let's do it", "fine",
        "certainly", "definitely", "gladly", "i consent", "agreed",
    ],
    refuse: &[
        "no", "nope", "not now", "no thanks", "no thank you", "i don't want", "i do not want",
        "i'd rather not", "rather not", "prefer not", "i have to go", "i need to go",
        "not interested", "stop", "decline", "i decline", "i disagree", "not today",
    ],
    accepting_idioms: &[
        "no problem", "why not", "don't mind", "do not mind", "not at all", "no worries",
    ],
    confusion: &[
        "not sure i understand", "don't understand", "do not understand", "didn't understand",
        "what do you mean", "can you repeat", "could you repeat", "i'm confused", "confused",
        "not clear", "sorry what", "lost me",
    ],
    skip: &[
        "skip", "rather not", "prefer not", "pass", "no thanks", "no thank you",
        "not comfortable", "rather not say", "prefer not to say",
    ],
    probing: &[
        "tell me more", "could you elaborate", "can you elaborate", "for example",
        "for instance", "an example", "what do you mean by", "in what way", "why", "how so",
        "what makes", "could you describe", "can you describe", "specifically", "walk me through",
    ],
    closing: &[
        "thank you for your time", "thanks for your time", "goodbye", "bye",
        "have a great day", "have a nice day", "thanks for participating",
        "thank you for participating", "that's all from me", "we're done",
    ],
    contact_terms: &[
        "email", "e mail", "phone", "phone number", "contact details", "contact information",
        "linkedin", "reach you", "your name", "company name",
    ],
    offer: &[
        "continue", "a few more minutes", "few extra minutes", "go deeper", "keep going",
        "more questions", "extend",
    ],
    bridging: &[
        "you mentioned", "you said", "as you said", "you just said", "building on",
        "speaking of", "earlier you", "you brought up",
    ],
    rephrase: &[
        "let me put it differently", "let me rephrase", "in other words",
        "to put it another way", "what i meant",
    ],
};

static ITALIAN: KeywordTable = KeywordTable {
    stop_words: &[
        "il", "lo", "la", "i", "gli", "le", "un", "uno", "una", "di", "del", "dello", "della",
        "dei", "degli", "delle", "a", "al", "allo", "alla", "ai", "agli", "alle", "da", "dal",
        "dalla", "in", "nel", "nello", "nella", "nei", "negli", "nelle", "con", "su", "sul",
        "sulla", "per", "tra", "fra", "e", "ed", "o", "ma", "che", "chi", "cosa", "come",
        "quale", "quali", "quando", "dove", "perché", "sono", "sei", "siamo", "siete", "essere",
        "hai", "abbiamo", "avete", "hanno", "questo", "questa", "questi", "queste", "quello",
        "quella", "tuo", "tua", "tuoi", "tue", "nostro", "nostra", "loro", "anche", "molto",
        "più", "poi", "qualche", "ogni", "tutto", "tutti", "cose", "cosa", "non", "già",
    ],
    accept: &[
        "sì", "si", "certo", "va bene", "ok", "okay", "volentieri", "d'accordo", "perfetto",
        "assolutamente", "continuiamo", "procediamo", "acconsento", "certamente",
    ],
    refuse: &[
        "no", "non voglio", "preferisco di no", "preferisco non", "non ora", "no grazie",
        "devo andare", "non mi interessa", "non acconsento", "basta", "rifiuto",
    ],
    accepting_idioms: &["perché no", "nessun problema", "non c'è problema", "figurati"],
    confusion: &[
        "non ho capito", "non capisco", "cosa intendi", "puoi ripetere", "in che senso",
        "non è chiaro", "sono confuso", "sono confusa",
    ],
    skip: &[
        "salta", "saltiamo", "preferisco non", "preferisco di no", "passo", "no grazie",
        "non voglio",
    ],
    probing: &[
        "raccontami", "puoi approfondire", "potresti approfondire", "ad esempio", "per esempio",
        "un esempio", "perché", "in che modo", "cosa intendi con", "nello specifico",
        "potresti descrivere",
    ],
    closing: &[
        "grazie per il tuo tempo", "grazie per il tempo", "arrivederci", "buona giornata",
        "grazie per aver partecipato", "abbiamo finito", "a presto",
    ],
    contact_terms: &[
        "email", "e mail", "telefono", "numero di telefono", "contatti", "recapito", "linkedin",
        "il tuo nome", "nome dell'azienda",
    ],
    offer: &[
        "continuare", "qualche minuto", "approfondire", "ancora qualche domanda", "proseguire",
    ],
    bridging: &[
        "hai detto", "hai menzionato", "come dicevi", "parlando di", "riprendendo",
        "hai accennato",
    ],
    rephrase: &[
        "in altre parole", "lo riformulo", "provo a spiegarmi meglio", "detto diversamente",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    mod codes {
        use super::*;

        #[test]
        fn parses_plain_and_regional_codes() {
            assert_eq!(Language::from_code("en"), Some(Language::En));
            assert_eq!(Language::from_code("IT"), Some(Language::It));
            assert_eq!(Language::from_code("en-US"), Some(Language::En));
            assert_eq!(Language::from_code("it_IT"), Some(Language::It));
        }

        #[test]
        fn unknown_code_is_none() {
            assert_eq!(Language::from_code("de"), None);
            assert_eq!(Language::from_code(""), None);
        }

        #[test]
        fn unknown_code_falls_back_to_english() {
            assert_eq!(Language::from_code_or_default("xx"), Language::En);
        }

        #[test]
        fn serializes_lowercase() {
            assert_eq!(serde_json::to_string(&Language::It).unwrap(), "\"it\"");
        }
    }

    mod matching {
        use super::*;

        #[test]
        fn normalize_pads_and_strips_punctuation() {
            assert_eq!(KeywordTable::normalize("Yes, sure!"), " yes sure ");
            assert_eq!(KeywordTable::normalize("   "), " ");
        }

        #[test]
        fn normalize_keeps_apostrophes() {
            assert_eq!(KeywordTable::normalize("I don\u{2019}t mind"), " i don't mind ");
        }

        #[test]
        fn phrase_match_respects_token_boundaries() {
            assert!(KeywordTable::text_contains_any("No, thanks", &["no thanks"]));
            assert!(!KeywordTable::text_contains_any("I know it", &["no"]));
        }

        #[test]
        fn every_table_has_core_vocabulary() {
            for lang in [Language::En, Language::It] {
                let table = lang.keywords();
                assert!(!table.accept.is_empty());
                assert!(!table.refuse.is_empty());
                assert!(!table.stop_words.is_empty());
                assert!(!table.probing.is_empty());
                assert!(!table.closing.is_empty());
            }
        }
    }
}
