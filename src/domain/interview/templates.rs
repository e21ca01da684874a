//! Deterministic question templates.
//!
//! Every [`AssistantAction`] can be rendered without a model. These texts are
//! also the fallback whenever generated output is unusable, so each question
//! template carries exactly one question mark and no closing language.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{KeywordTable, Language};

use super::fields::FieldKind;
use super::flow::{AssistantAction, CloseReason};
use super::phase::InterviewPhase;
use super::topic::TopicPlan;
use super::transition::{sanitize_snippet, PendingTransition, TransitionMode, SNIPPET_MAX_WORDS};

/// Tunable thresholds for the "interesting answer" predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestThresholds {
    /// Minimum words before an answer can count as rich.
    pub min_words: usize,
    /// Whether numbers in an answer count as a concrete detail.
    pub digits_count: bool,
    /// Lowercase word prefixes that signal a concrete detail.
    pub markers: Vec<String>,
}

impl Default for InterestThresholds {
    fn default() -> Self {
        Self {
            min_words: 12,
            digits_count: true,
            markers: [
                "because", "problem", "issue", "challeng", "frustrat", "example", "instead",
                "switch", "cost", "perché", "difficil", "esempio", "invece", "costo",
            ]
            .iter()
            .map(|m| m.to_string())
            .collect(),
        }
    }
}

/// Measurable features of one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerSignals {
    pub words: usize,
    pub has_digits: bool,
    pub marker_hits: usize,
}

impl AnswerSignals {
    pub fn of(answer: &str, thresholds: &InterestThresholds) -> Self {
        let lower = answer.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        let marker_hits = tokens
            .iter()
            .filter(|t| thresholds.markers.iter().any(|m| t.starts_with(m.as_str())))
            .count();
        Self {
            words: answer.split_whitespace().count(),
            has_digits: answer.chars().any(|c| c.is_ascii_digit()),
            marker_hits,
        }
    }

    /// Long enough, and carrying a number or a marker word.
    pub fn is_interesting(&self, thresholds: &InterestThresholds) -> bool {
        self.words >= thresholds.min_words
            && ((thresholds.digits_count && self.has_digits) || self.marker_hits > 0)
    }
}

/// Renders assistant actions into plain text for one language.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    language: Language,
    thresholds: InterestThresholds,
}

impl TemplateRenderer {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            thresholds: InterestThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: InterestThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Renders `action`. `last_reply` is the respondent's latest answer.
    pub fn render(&self, action: &AssistantAction, plans: &[TopicPlan], last_reply: Option<&str>) -> String {
        match action {
            AssistantAction::AskTopic {
                phase,
                topic_index,
                turn_in_topic,
                transition,
                rephrase,
            } => {
                let label = plans
                    .get(*topic_index)
                    .map(|p| p.label.as_str())
                    .unwrap_or_default();
                if *rephrase {
                    self.rephrase(label)
                } else if *turn_in_topic > 0 {
                    self.follow_up(label, *turn_in_topic, last_reply)
                } else {
                    self.opener(label, *phase, *topic_index, transition.as_ref())
                }
            }
            AssistantAction::OfferDeep { attempt } => self.offer(*attempt).to_string(),
            AssistantAction::AskConsent { attempt } => self.consent(*attempt).to_string(),
            AssistantAction::AskField { field, attempt } => self.field_request(field, *attempt),
            AssistantAction::Close { reason } => self.closing(*reason).to_string(),
        }
    }

    fn opener(
        &self,
        label: &str,
        phase: InterviewPhase,
        topic_index: usize,
        transition: Option<&PendingTransition>,
    ) -> String {
        let l = label.to_lowercase();
        if let Some(PendingTransition {
            mode: TransitionMode::Bridge,
            snippet: Some(snippet),
        }) = transition
        {
            return match self.language {
                Language::En => format!(
                    "You mentioned \"{snippet}\", which brings us to {label}. How does {l} fit into that picture for you?"
                ),
                Language::It => format!(
                    "Hai menzionato \"{snippet}\", e questo ci porta a {label}. Come si inserisce {l} in questo quadro per te?"
                ),
            };
        }
        match (self.language, phase, topic_index, transition.is_some()) {
            (Language::En, InterviewPhase::Scan, 0, false) => format!(
                "To start, let's talk about {label}. How would you describe your experience with {l} so far?"
            ),
            (Language::En, InterviewPhase::Deep, 0, _) => format!(
                "Let's go back to {label} and look a little closer. What has changed for you around {l} recently?"
            ),
            (Language::En, InterviewPhase::Deep, _, _) => format!(
                "Let's take a closer look at {label}. What stands out most for you about {l} today?"
            ),
            (Language::En, _, _, _) => format!(
                "Let's move on to {label}. What comes to mind first when you think about {l}?"
            ),
            (Language::It, InterviewPhase::Scan, 0, false) => format!(
                "Per iniziare, parliamo di {label}. Come descriveresti la tua esperienza con {l} finora?"
            ),
            (Language::It, InterviewPhase::Deep, 0, _) => format!(
                "Torniamo su {label} per guardarlo più da vicino. Cosa è cambiato per te riguardo a {l} di recente?"
            ),
            (Language::It, InterviewPhase::Deep, _, _) => format!(
                "Guardiamo più da vicino {label}. Cosa ti colpisce di più di {l} oggi?"
            ),
            (Language::It, _, _, _) => format!(
                "Passiamo a {label}. Cosa ti viene in mente per primo quando pensi a {l}?"
            ),
        }
    }

    fn follow_up(&self, label: &str, turn_in_topic: u32, last_reply: Option<&str>) -> String {
        let l = label.to_lowercase();
        let rich = last_reply
            .filter(|reply| AnswerSignals::of(reply, &self.thresholds).is_interesting(&self.thresholds))
            .map(|reply| sanitize_snippet(reply, SNIPPET_MAX_WORDS))
            .filter(|snippet| !snippet.is_empty());

        if let Some(snippet) = rich {
            return match self.language {
                Language::En => format!(
                    "You mentioned \"{snippet}\". Could you elaborate on how that shapes {l} for you?"
                ),
                Language::It => format!(
                    "Hai menzionato \"{snippet}\": puoi approfondire in che modo questo influisce su {l}?"
                ),
            };
        }

        match (self.language, turn_in_topic % 3) {
            (Language::En, 1) => {
                format!("Can you tell me more about how {l} plays out for you day to day?")
            }
            (Language::En, 2) => {
                format!("Could you give me an example of a moment when {l} really mattered?")
            }
            (Language::En, _) => format!("What makes {l} important to you, specifically?"),
            (Language::It, 1) => {
                format!("Puoi approfondire come si manifesta {l} nella tua giornata?")
            }
            (Language::It, 2) => {
                format!("Potresti farmi un esempio di un momento in cui {l} ha fatto la differenza?")
            }
            (Language::It, _) => format!("In che modo {l} è importante per te, nello specifico?"),
        }
    }

    fn rephrase(&self, label: &str) -> String {
        let l = label.to_lowercase();
        match self.language {
            Language::En => {
                format!("Let me put it differently: what is one thing you would change about {l}?")
            }
            Language::It => {
                format!("Provo a spiegarmi meglio: qual è una cosa che cambieresti di {l}?")
            }
        }
    }

    fn offer(&self, attempt: u32) -> &'static str {
        match (self.language, attempt) {
            (Language::En, 0 | 1) => "We've covered all the topics I had planned. Would you be willing to continue for a few more minutes so we can go deeper?",
            (Language::En, _) => "Just to check: would you like to continue for a few more minutes, or shall we wrap up?",
            (Language::It, 0 | 1) => "Abbiamo toccato tutti gli argomenti previsti. Ti andrebbe di continuare ancora qualche minuto per approfondire?",
            (Language::It, _) => "Solo per conferma: vuoi continuare ancora qualche minuto?",
        }
    }

    fn consent(&self, attempt: u32) -> &'static str {
        match (self.language, attempt) {
            (Language::En, 0 | 1) => "Before we finish, may I ask for a few contact details so the team can follow up with you?",
            (Language::En, _) => "Sorry, I didn't quite catch that. Is it okay if I ask for your contact details?",
            (Language::It, 0 | 1) => "Prima di concludere, posso chiederti alcuni recapiti per poterti ricontattare?",
            (Language::It, _) => "Scusa, non ho capito bene. Va bene se ti chiedo i tuoi contatti?",
        }
    }

    fn field_request(&self, field: &str, attempt: u32) -> String {
        let readable = field.replace(['_', '-'], " ");
        let question = match (self.language, FieldKind::from_field_id(field)) {
            (Language::En, FieldKind::Email) => "What is the best email address to reach you?".to_string(),
            (Language::En, FieldKind::Phone) => "What phone number can we reach you on?".to_string(),
            (Language::En, FieldKind::ProfileUrl) => {
                "Could you share a link to your LinkedIn or professional profile?".to_string()
            }
            (Language::En, FieldKind::Name) => "What is your full name?".to_string(),
            (Language::En, FieldKind::Company) => "Which company do you work for?".to_string(),
            (Language::En, FieldKind::Role) => "What is your role or job title?".to_string(),
            (Language::En, FieldKind::FreeText) => format!("Could you share your {readable}?"),
            (Language::It, FieldKind::Email) => {
                "Qual è l'indirizzo email migliore per contattarti?".to_string()
            }
            (Language::It, FieldKind::Phone) => {
                "Qual è un numero di telefono a cui possiamo raggiungerti?".to_string()
            }
            (Language::It, FieldKind::ProfileUrl) => {
                "Puoi condividere il link al tuo profilo LinkedIn o professionale?".to_string()
            }
            (Language::It, FieldKind::Name) => "Qual è il tuo nome e cognome?".to_string(),
            (Language::It, FieldKind::Company) => "Per quale azienda lavori?".to_string(),
            (Language::It, FieldKind::Role) => "Qual è il tuo ruolo?".to_string(),
            (Language::It, FieldKind::FreeText) => format!("Puoi indicarmi {readable}?"),
        };
        if attempt > 1 {
            let prefix = match self.language {
                Language::En => "Sorry, I couldn't quite catch that.",
                Language::It => "Scusa, non sono riuscito a capire.",
            };
            format!("{prefix} {question}")
        } else {
            question
        }
    }

    fn closing(&self, reason: CloseReason) -> &'static str {
        match (self.language, reason) {
            (Language::En, CloseReason::Completed) => {
                "That's everything I needed. Thank you for your time, and have a great day!"
            }
            (Language::En, CloseReason::ConsentRefused) => {
                "Of course, I won't ask for anything else. Thank you for your time and have a great day!"
            }
            (Language::En, CloseReason::CollectionDisabled) => {
                "That's all the questions I had. Thank you for your time!"
            }
            (Language::It, CloseReason::Completed) => {
                "È tutto quello che mi serviva. Grazie per il tuo tempo e buona giornata!"
            }
            (Language::It, CloseReason::ConsentRefused) => {
                "Certo, non ti chiederò altro. Grazie per il tuo tempo e buona giornata!"
            }
            (Language::It, CloseReason::CollectionDisabled) => {
                "Queste erano tutte le mie domande. Grazie per il tuo tempo!"
            }
        }
    }
}

/// Returns true if `text` contains probing language in `language`.
pub fn has_probe(text: &str, language: Language) -> bool {
    KeywordTable::text_contains_any(text, language.keywords().probing)
}
