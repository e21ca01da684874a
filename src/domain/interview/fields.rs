//! Contact-field kinds and structured extraction from free replies.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{KeywordTable, Language};

use super::intent::{classify_intent, signals_confusion, Intent};

/// Attempts allowed per field before it is marked skipped.
pub const MAX_FIELD_ATTEMPTS: u32 = 3;

/// Longest free-text value accepted, in characters.
pub const MAX_FREE_TEXT_LENGTH: usize = 80;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[a-z0-9._%+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}")
        .expect("email pattern is valid")
});

static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\d[\d\s().-]{5,}\d").expect("phone pattern is valid"));

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:https?://|www\.)[^\s]+|\b[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}/[^\s]*")
        .expect("url pattern is valid")
});

/// A leading "yes," or "sure." before the actual value.
static AFFIRMATION_LEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:yes|yeah|yep|sure|ok|okay|of course|sì|si|certo|certamente|va bene)\s*[,.!:;]\s*")
        .expect("affirmation pattern is valid")
});

/// Errors raised when a reply does not contain a usable value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldExtractionError {
    #[error("no {kind:?} value found in reply")]
    NoMatch { kind: FieldKind },

    #[error("reply is empty")]
    Empty,

    #[error("value is too long: {length} characters exceeds {max}")]
    TooLong { length: usize, max: usize },

    #[error("reply is not an answer")]
    NotAnAnswer,
}

/// The kind of a required field, inferred from its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Email,
    Phone,
    ProfileUrl,
    Name,
    Company,
    Role,
    FreeText,
}

impl FieldKind {
    /// Infers the kind from a field identifier such as `email` or `job_title`.
    pub fn from_field_id(id: &str) -> Self {
        let id = id.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| id.contains(n));
        if has(&["mail"]) {
            Self::Email
        } else if has(&["phone", "mobile", "telefono", "cellulare"]) {
            Self::Phone
        } else if has(&["linkedin", "url", "website", "link", "profile"]) {
            Self::ProfileUrl
        } else if has(&["company", "azienda", "organization", "organisation", "employer"]) {
            Self::Company
        } else if has(&["role", "title", "position", "ruolo", "job"]) {
            Self::Role
        } else if has(&["name", "nome"]) {
            Self::Name
        } else {
            Self::FreeText
        }
    }

    /// Extracts a value of this kind from `reply`.
    pub fn extract(&self, reply: &str, language: Language) -> Result<String, FieldExtractionError> {
        let reply = reply.trim();
        if reply.is_empty() {
            return Err(FieldExtractionError::Empty);
        }
        match self {
            Self::Email => EMAIL
                .find(reply)
                .map(|m| m.as_str().to_lowercase())
                .ok_or(FieldExtractionError::NoMatch { kind: *self }),
            Self::Phone => extract_phone(reply).ok_or(FieldExtractionError::NoMatch { kind: *self }),
            Self::ProfileUrl => URL
                .find(reply)
                .map(|m| trim_trailing_punctuation(m.as_str()).to_string())
                .ok_or(FieldExtractionError::NoMatch { kind: *self }),
            Self::Name | Self::Company | Self::Role | Self::FreeText => {
                extract_free_text(*self, reply, language)
            }
        }
    }

    /// Maximum words for a free-text value of this kind.
    fn max_words(&self) -> usize {
        match self {
            Self::Name => 5,
            Self::Company | Self::Role => 8,
            _ => 12,
        }
    }
}

fn trim_trailing_punctuation(value: &str) -> &str {
    value.trim_end_matches(['.', ',', ';', ':', ')', '!', '?'])
}

fn extract_phone(reply: &str) -> Option<String> {
    PHONE.find_iter(reply).find_map(|m| {
        let raw = m.as_str().trim();
        let digits = raw.chars().filter(char::is_ascii_digit).count();
        (7..=15).contains(&digits).then(|| raw.to_string())
    })
}

fn lead_ins(kind: FieldKind, language: Language) -> &'static [&'static str] {
    match (language, kind) {
        (Language::En, FieldKind::Name) => &["my name is", "i'm", "i am", "it's", "call me", "name is"],
        (Language::En, FieldKind::Company) => &["i work at", "i work for", "my company is", "company is", "it's", "at"],
        (Language::En, FieldKind::Role) => &["i'm a", "i'm an", "i am a", "i am an", "i work as", "my role is", "i'm the", "i'm"],
        (Language::En, _) => &["it's", "it is"],
        (Language::It, FieldKind::Name) => &["mi chiamo", "il mio nome è", "sono"],
        (Language::It, FieldKind::Company) => &["lavoro in", "lavoro per", "lavoro presso", "la mia azienda è"],
        (Language::It, FieldKind::Role) => &["lavoro come", "il mio ruolo è", "sono un", "sono una", "sono"],
        (Language::It, _) => &["è"],
    }
}

/// Strips `lead` and the whitespace after it from the front of `text`, ignoring case.
fn strip_lead_in<'a>(text: &'a str, lead: &str) -> Option<&'a str> {
    let mut chars = text.chars();
    for expected in lead.chars() {
        let actual = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    let rest = chars.as_str();
    rest.starts_with(char::is_whitespace)
        .then(|| rest.trim_start())
}

fn extract_free_text(kind: FieldKind, reply: &str, language: Language) -> Result<String, FieldExtractionError> {
    if reply.contains('?') || signals_confusion(reply, language) {
        return Err(FieldExtractionError::NotAnAnswer);
    }
    if classify_intent(reply, language) == Intent::Refuse {
        return Err(FieldExtractionError::NotAnAnswer);
    }

    let mut value = reply.trim();
    if let Some(rest) = AFFIRMATION_LEAD
        .find(value)
        .map(|m| &value[m.end()..])
        .filter(|rest| !rest.is_empty())
    {
        value = rest;
    }
    if let Some(rest) = lead_ins(kind, language)
        .iter()
        .find_map(|lead| strip_lead_in(value, lead))
    {
        value = rest;
    }
    let value = trim_trailing_punctuation(value.trim()).trim();

    if value.is_empty() || !value.chars().any(char::is_alphabetic) {
        return Err(FieldExtractionError::NoMatch { kind });
    }
    let length = value.chars().count();
    if length > MAX_FREE_TEXT_LENGTH {
        return Err(FieldExtractionError::TooLong {
            length,
            max: MAX_FREE_TEXT_LENGTH,
        });
    }
    if value.split_whitespace().count() > kind.max_words() {
        return Err(FieldExtractionError::NoMatch { kind });
    }
    // A bare yes/ok is not a name or company.
    if KeywordTable::normalize(value).trim() == KeywordTable::normalize(reply).trim()
        && classify_intent(value, language) == Intent::Accept
        && value.split_whitespace().count() <= 2
    {
        return Err(FieldExtractionError::NotAnAnswer);
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod kinds {
        use super::*;

        #[test]
        fn infers_kind_from_identifier() {
            assert_eq!(FieldKind::from_field_id("email"), FieldKind::Email);
            assert_eq!(FieldKind::from_field_id("work_email"), FieldKind::Email);
            assert_eq!(FieldKind::from_field_id("phone_number"), FieldKind::Phone);
            assert_eq!(FieldKind::from_field_id("linkedin_url"), FieldKind::ProfileUrl);
            assert_eq!(FieldKind::from_field_id("company_name"), FieldKind::Company);
            assert_eq!(FieldKind::from_field_id("job_title"), FieldKind::Role);
            assert_eq!(FieldKind::from_field_id("full_name"), FieldKind::Name);
            assert_eq!(FieldKind::from_field_id("budget"), FieldKind::FreeText);
        }
    }

    mod structured {
        use super::*;

        #[test]
        fn extracts_email_inside_sentence() {
            let value = FieldKind::Email
                .extract("Sure, it's Jane.Doe@Example.com thanks", Language::En)
                .unwrap();
            assert_eq!(value, "jane.doe@example.com");
        }

        #[test]
        fn rejects_spelled_out_email() {
            let err = FieldKind::Email
                .extract("jane at example dot com", Language::En)
                .unwrap_err();
            assert_eq!(err, FieldExtractionError::NoMatch { kind: FieldKind::Email });
        }

        #[test]
        fn extracts_phone_with_separators() {
            let value = FieldKind::Phone
                .extract("call me on +39 333 123 4567 please", Language::En)
                .unwrap();
            assert_eq!(value, "+39 333 123 4567");
        }

        #[test]
        fn rejects_short_numbers() {
            assert!(FieldKind::Phone.extract("room 12-34", Language::En).is_err());
        }

        #[test]
        fn extracts_profile_link() {
            let value = FieldKind::ProfileUrl
                .extract("here: linkedin.com/in/janedoe.", Language::En)
                .unwrap();
            assert_eq!(value, "linkedin.com/in/janedoe");
        }

        #[test]
        fn email_is_not_a_profile_link() {
            assert!(FieldKind::ProfileUrl.extract("jane@example.com", Language::En).is_err());
        }
    }

    mod free_text {
        use super::*;

        #[test]
        fn strips_lead_in() {
            assert_eq!(
                FieldKind::Name.extract("My name is Jane Doe.", Language::En).unwrap(),
                "Jane Doe"
            );
            assert_eq!(
                FieldKind::Name.extract("Mi chiamo Giulia Rossi", Language::It).unwrap(),
                "Giulia Rossi"
            );
        }

        #[test]
        fn strips_affirmation_before_lead_in() {
            assert_eq!(
                FieldKind::Name.extract("Yes, it's Jane Doe", Language::En).unwrap(),
                "Jane Doe"
            );
            assert_eq!(
                FieldKind::Name.extract("Sì, mi chiamo Giulia Rossi", Language::It).unwrap(),
                "Giulia Rossi"
            );
            assert_eq!(
                FieldKind::Name.extract("Yes.", Language::En),
                Err(FieldExtractionError::NotAnAnswer)
            );
        }

        #[test]
        fn non_ascii_reply_does_not_split_characters() {
            assert_eq!(
                FieldKind::Name.extract("İlknur Şahin", Language::En).unwrap(),
                "İlknur Şahin"
            );
            assert_eq!(
                FieldKind::FreeText.extract("È Äcme Srl", Language::It).unwrap(),
                "Äcme Srl"
            );
        }

        #[test]
        fn rejects_questions_and_confusion() {
            assert_eq!(
                FieldKind::Company.extract("why do you need that?", Language::En),
                Err(FieldExtractionError::NotAnAnswer)
            );
            assert_eq!(
                FieldKind::Role.extract("sorry, what do you mean", Language::En),
                Err(FieldExtractionError::NotAnAnswer)
            );
        }

        #[test]
        fn rejects_bare_acknowledgement() {
            assert_eq!(
                FieldKind::Name.extract("ok", Language::En),
                Err(FieldExtractionError::NotAnAnswer)
            );
        }

        #[test]
        fn rejects_rambling() {
            let reply = "well it depends on the day and who is asking and what the weather is like";
            assert!(FieldKind::Name.extract(reply, Language::En).is_err());
        }

        #[test]
        fn empty_reply_is_an_error() {
            assert_eq!(FieldKind::Role.extract("   ", Language::En), Err(FieldExtractionError::Empty));
        }
    }
}
