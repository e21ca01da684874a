//! Bot configuration: the topics, language and collection rules of an
//! interview bot, loaded from YAML.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::domain::foundation::{Language, ValidationError};

use super::topic::TopicDescriptor;

/// Longest interview accepted, in minutes.
pub const MAX_DURATION_MINUTES: f64 = 240.0;

#[derive(Debug, Error)]
pub enum BotConfigError {
    #[error("failed to read bot configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse bot configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid bot configuration: {0}")]
    Invalid(#[from] ValidationError),
}

/// An interview bot as configured by its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    pub bot_id: String,
    pub name: String,
    /// Language code such as `en` or `it-IT`.
    pub language: String,
    pub planned_duration_minutes: f64,
    #[serde(default)]
    pub collect_data: bool,
    #[serde(default)]
    pub required_fields: Vec<String>,
    pub topics: Vec<TopicDescriptor>,
}

impl BotConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, BotConfigError> {
        let bot: Self = serde_yaml::from_str(yaml)?;
        bot.validate()?;
        Ok(bot)
    }

    /// Reads, parses and validates a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BotConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.topics.is_empty() {
            return Err(ValidationError::empty_field("topics"));
        }
        if self.language.trim().is_empty() {
            return Err(ValidationError::empty_field("language"));
        }
        if !(self.planned_duration_minutes > 0.0
            && self.planned_duration_minutes <= MAX_DURATION_MINUTES)
        {
            return Err(ValidationError::out_of_range(
                "planned_duration_minutes",
                1,
                MAX_DURATION_MINUTES as i64,
                self.planned_duration_minutes as i64,
            ));
        }

        let mut ids = HashSet::new();
        for topic in &self.topics {
            if topic.id.trim().is_empty() {
                return Err(ValidationError::empty_field("topics.id"));
            }
            if topic.label.trim().is_empty() {
                return Err(ValidationError::empty_field("topics.label"));
            }
            if !ids.insert(topic.id.as_str()) {
                return Err(ValidationError::duplicate("topics.id", &topic.id));
            }
        }

        let mut fields = HashSet::new();
        for field in &self.required_fields {
            if field.trim().is_empty() {
                return Err(ValidationError::empty_field("required_fields"));
            }
            if !fields.insert(field.as_str()) {
                return Err(ValidationError::duplicate("required_fields", field));
            }
        }
        Ok(())
    }

    /// The interview language; unsupported codes fall back to English.
    pub fn language(&self) -> Language {
        Language::from_code_or_default(&self.language)
    }

    /// Topics sorted by their declared order; ties keep file order.
    pub fn ordered_topics(&self) -> Vec<TopicDescriptor> {
        let mut topics = self.topics.clone();
        topics.sort_by_key(|t| t.order);
        topics
    }

    pub fn planned_seconds(&self) -> u32 {
        (self.planned_duration_minutes * 60.0).round().max(0.0) as u32
    }

    /// A small English bot used when no configuration file is given.
    pub fn demo() -> Self {
        Self {
            bot_id: "demo-product-feedback".into(),
            name: "Product feedback interview".into(),
            language: "en".into(),
            planned_duration_minutes: 6.0,
            collect_data: true,
            required_fields: vec!["full_name".into(), "email".into(), "company".into()],
            topics: vec![
                TopicDescriptor::new("discovery", "Product discovery", 1)
                    .with_sub_goal("how they first heard about the product"),
                TopicDescriptor::new("onboarding", "Onboarding experience", 2)
                    .with_sub_goal("setup friction")
                    .with_sub_goal("documentation quality"),
                TopicDescriptor::new("pricing", "Pricing and value", 3)
                    .with_sub_goal("willingness to pay"),
                TopicDescriptor::new("support", "Customer support", 4).with_max_turns(2),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML: &str = r#"
bot_id: retail
name: Retail study
language: it
planned_duration_minutes: 5
collect_data: true
required_fields: [email, phone]
topics:
  - id: checkout
    label: Esperienza di pagamento
    order: 2
  - id: store
    label: Negozio fisico
    order: 1
    max_turns: 2
    sub_goals: [orari di apertura]
"#;

    mod parsing {
        use super::*;

        #[test]
        fn parses_yaml_and_orders_topics() {
            let bot = BotConfig::from_yaml_str(YAML).unwrap();
            assert_eq!(bot.language(), Language::It);
            assert_eq!(bot.planned_seconds(), 300);
            let ids: Vec<_> = bot.ordered_topics().into_iter().map(|t| t.id).collect();
            assert_eq!(ids, vec!["store", "checkout"]);
        }

        #[test]
        fn loads_from_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(YAML.as_bytes()).unwrap();
            let bot = BotConfig::load(file.path()).unwrap();
            assert_eq!(bot.bot_id, "retail");
        }

        #[test]
        fn missing_file_is_io_error() {
            let err = BotConfig::load("/definitely/not/here.yaml").unwrap_err();
            assert!(matches!(err, BotConfigError::Io(_)));
        }

        #[test]
        fn malformed_yaml_is_parse_error() {
            let err = BotConfig::from_yaml_str("topics: [unclosed").unwrap_err();
            assert!(matches!(err, BotConfigError::Parse(_)));
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn demo_is_valid() {
            assert!(BotConfig::demo().validate().is_ok());
        }

        #[test]
        fn rejects_no_topics() {
            let mut bot = BotConfig::demo();
            bot.topics.clear();
            assert_eq!(bot.validate(), Err(ValidationError::empty_field("topics")));
        }

        #[test]
        fn rejects_empty_language() {
            let mut bot = BotConfig::demo();
            bot.language = " ".into();
            assert_eq!(bot.validate(), Err(ValidationError::empty_field("language")));
        }

        #[test]
        fn rejects_zero_duration() {
            let mut bot = BotConfig::demo();
            bot.planned_duration_minutes = 0.0;
            assert!(matches!(bot.validate(), Err(ValidationError::OutOfRange { .. })));
        }

        #[test]
        fn rejects_duplicate_topic_ids() {
            let mut bot = BotConfig::demo();
            bot.topics[1].id = bot.topics[0].id.clone();
            assert!(matches!(bot.validate(), Err(ValidationError::Duplicate { .. })));
        }

        #[test]
        fn rejects_duplicate_fields() {
            let mut bot = BotConfig::demo();
            bot.required_fields.push("email".into());
            assert!(matches!(bot.validate(), Err(ValidationError::Duplicate { .. })));
        }

        #[test]
        fn invalid_yaml_document_is_rejected() {
            let err = BotConfig::from_yaml_str(&YAML.replace("language: it", "language: ''"))
                .unwrap_err();
            assert!(matches!(err, BotConfigError::Invalid(_)));
        }
    }
}
