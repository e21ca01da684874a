//! Synthetic respondents.
//!
//! A [`Persona`] is a read-only behavioral profile shared by many runs. Its
//! probabilities are sampled through the run's [`SimRng`], so the same seed
//! always produces the same answers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::Language;
use crate::domain::interview::{AssistantAction, FieldKind};

use super::rng::SimRng;

/// How long a persona's topic answers run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStyle {
    /// One or two sentences.
    Detailed,
    /// Three-word generic answers.
    Terse,
    /// Several sentences per answer.
    Rambling,
}

/// How personas are assigned to runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PersonaSelection {
    #[default]
    RoundRobin,
    Weighted,
}

/// What the respondent is answering.
#[derive(Debug, Clone, Copy)]
pub struct AnswerContext<'a> {
    pub action: &'a AssistantAction,
    pub question: &'a str,
    pub topic_label: &'a str,
    pub next_topic_label: Option<&'a str>,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub description: String,
    pub style: AnswerStyle,
    pub offer_refusal: f64,
    pub consent_refusal: f64,
    pub field_skip: f64,
    pub confusion: f64,
    /// Chance of an unusable first answer to a field request.
    pub malformed_first_answer: f64,
    /// Chance of mentioning the next topic unprompted.
    pub foreshadow: f64,
    #[serde(default)]
    pub field_values: BTreeMap<String, String>,
    pub weight: u32,
}

impl Persona {
    fn new(name: &str, description: &str, style: AnswerStyle) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            style,
            offer_refusal: 0.1,
            consent_refusal: 0.1,
            field_skip: 0.05,
            confusion: 0.0,
            malformed_first_answer: 0.0,
            foreshadow: 0.0,
            field_values: BTreeMap::new(),
            weight: 1,
        }
    }

    /// The built-in persona library.
    pub fn library() -> Vec<Persona> {
        vec![
            Persona {
                confusion: 0.05,
                malformed_first_answer: 0.05,
                foreshadow: 0.35,
                weight: 4,
                ..Self::new(
                    "cooperative",
                    "Engaged respondent who answers in full sentences and shares details willingly.",
                    AnswerStyle::Detailed,
                )
            },
            Persona {
                offer_refusal: 0.3,
                consent_refusal: 0.2,
                field_skip: 0.1,
                weight: 2,
                ..Self::new(
                    "terse",
                    "Polite but minimal respondent who answers every question in about three words.",
                    AnswerStyle::Terse,
                )
            },
            Persona {
                offer_refusal: 0.9,
                consent_refusal: 0.3,
                field_skip: 0.2,
                malformed_first_answer: 0.1,
                foreshadow: 0.2,
                weight: 2,
                ..Self::new(
                    "busy",
                    "Time-pressed respondent who talks at length but wants to leave on time.",
                    AnswerStyle::Rambling,
                )
            },
            Persona {
                offer_refusal: 0.3,
                consent_refusal: 0.95,
                field_skip: 0.8,
                foreshadow: 0.2,
                ..Self::new(
                    "privacy_conscious",
                    "Happy to discuss the topics but unwilling to share personal details.",
                    AnswerStyle::Detailed,
                )
            },
            Persona {
                consent_refusal: 0.0,
                field_skip: 0.9,
                ..Self::new(
                    "skipper",
                    "Agrees to follow-up but skips most individual contact fields.",
                    AnswerStyle::Detailed,
                )
            },
            Persona {
                confusion: 0.5,
                foreshadow: 0.1,
                ..Self::new(
                    "confused",
                    "Often unsure what a question means and asks for clarification.",
                    AnswerStyle::Detailed,
                )
            },
            Persona {
                consent_refusal: 0.0,
                malformed_first_answer: 0.9,
                ..Self::new(
                    "sloppy",
                    "Gives vague or malformed contact values on the first try.",
                    AnswerStyle::Detailed,
                )
            },
        ]
    }

    /// Picks the persona for run `run_index`.
    pub fn select<'a>(
        personas: &'a [Persona],
        selection: PersonaSelection,
        run_index: usize,
        rng: &mut SimRng,
    ) -> Option<&'a Persona> {
        if personas.is_empty() {
            return None;
        }
        match selection {
            PersonaSelection::RoundRobin => personas.get(run_index % personas.len()),
            PersonaSelection::Weighted => {
                let total: u64 = personas.iter().map(|p| u64::from(p.weight)).sum();
                if total == 0 {
                    return personas.get(run_index % personas.len());
                }
                let mut ticket = rng.index(total as usize) as u64;
                personas.iter().find(|p| {
                    let w = u64::from(p.weight);
                    if ticket < w {
                        true
                    } else {
                        ticket -= w;
                        false
                    }
                })
            }
        }
    }

    /// Produces the persona's answer to the current question.
    pub fn scripted_answer(&self, ctx: &AnswerContext<'_>, rng: &mut SimRng) -> String {
        let bank = PhraseBank::for_language(ctx.language);
        match ctx.action {
            AssistantAction::AskTopic { .. } => self.topic_answer(ctx, bank, rng),
            AssistantAction::OfferDeep { .. } => {
                let refuse = rng.chance(self.offer_refusal);
                pick(rng, if refuse { bank.offer_refuse } else { bank.offer_accept })
            }
            AssistantAction::AskConsent { .. } => {
                let refuse = rng.chance(self.consent_refusal);
                pick(rng, if refuse { bank.consent_refuse } else { bank.consent_accept })
            }
            AssistantAction::AskField { field, attempt } => {
                if rng.chance(self.field_skip) {
                    return pick(rng, bank.skip);
                }
                let kind = FieldKind::from_field_id(field);
                if *attempt == 1 && rng.chance(self.malformed_first_answer) {
                    return bank.malformed(kind).to_string();
                }
                self.field_values
                    .get(field)
                    .cloned()
                    .unwrap_or_else(|| bank.field_value(kind).to_string())
            }
            AssistantAction::Close { .. } => String::new(),
        }
    }

    fn topic_answer(&self, ctx: &AnswerContext<'_>, bank: &PhraseBank, rng: &mut SimRng) -> String {
        if rng.chance(self.confusion) {
            return pick(rng, bank.confusion);
        }
        let topic = ctx.topic_label.to_lowercase();
        let mut answer = match self.style {
            AnswerStyle::Terse => return pick(rng, bank.terse),
            AnswerStyle::Detailed => fill(&pick(rng, bank.detailed), &topic),
            AnswerStyle::Rambling => {
                let first = rng.index(bank.detailed.len());
                let second = (first + 1 + rng.index(bank.detailed.len().saturating_sub(1).max(1)))
                    % bank.detailed.len();
                format!(
                    "{} {} {}",
                    fill(bank.detailed[first], &topic),
                    fill(bank.detailed[second], &topic),
                    pick(rng, bank.rambling_tail)
                )
            }
        };
        if let Some(next) = ctx.next_topic_label {
            if rng.chance(self.foreshadow) {
                answer.push(' ');
                answer.push_str(&fill(bank.foreshadow, &next.to_lowercase()));
            }
        }
        answer
    }
}

fn pick(rng: &mut SimRng, options: &[&str]) -> String {
    rng.pick(options).copied().unwrap_or_default().to_string()
}

fn fill(template: &str, topic: &str) -> String {
    template.replace("{topic}", topic)
}

/// Canned respondent phrases for one language.
struct PhraseBank {
    terse: &'static [&'static str],
    detailed: &'static [&'static str],
    rambling_tail: &'static [&'static str],
    foreshadow: &'static str,
    confusion: &'static [&'static str],
    offer_accept: &'static [&'static str],
    offer_refuse: &'static [&'static str],
    consent_accept: &'static [&'static str],
    consent_refuse: &'static [&'static str],
    skip: &'static [&'static str],
    values: [&'static str; 7],
    malformed: [&'static str; 4],
}

impl PhraseBank {
    fn for_language(language: Language) -> &'static PhraseBank {
        match language {
            Language::En => &ENGLISH_PHRASES,
            Language::It => &ITALIAN_PHRASES,
        }
    }

    fn field_value(&self, kind: FieldKind) -> &'static str {
        match kind {
            FieldKind::Email => self.values[0],
            FieldKind::Phone => self.values[1],
            FieldKind::ProfileUrl => self.values[2],
            FieldKind::Name => self.values[3],
            FieldKind::Company => self.values[4],
            FieldKind::Role => self.values[5],
            FieldKind::FreeText => self.values[6],
        }
    }

    fn malformed(&self, kind: FieldKind) -> &'static str {
        match kind {
            FieldKind::Email => self.malformed[0],
            FieldKind::Phone => self.malformed[1],
            FieldKind::ProfileUrl => self.malformed[2],
            _ => self.malformed[3],
        }
    }
}

static ENGLISH_PHRASES: PhraseBank = PhraseBank {
    terse: &["Not much really.", "It's fine mostly.", "Hard to say.", "Pretty standard stuff."],
    detailed: &[
        "Honestly, {topic} has been a big focus for us this year, mostly because it eats so much of the team's time.",
        "When it comes to {topic}, we had a rough start, but things improved once we set up a weekly review with two colleagues.",
        "I would say {topic} works reasonably well for us, although we still hit the same problem every quarter when budgets reset.",
        "We changed our approach to {topic} about 6 months ago, and since then the feedback from customers has been a lot better.",
    ],
    rambling_tail: &[
        "Sorry, I tend to go on a bit, there is a lot of history behind all of this and it is hard to summarize quickly.",
        "There is more to it than that, but the short version is that everyone on the team has a slightly different opinion about it.",
    ],
    foreshadow: "It also ties into {topic}, to be honest.",
    confusion: &["Sorry, what do you mean?", "I'm not sure I understand the question."],
    offer_accept: &["Sure, I'm happy to keep going for a few more minutes.", "Yes, let's continue, I have some time."],
    offer_refuse: &["No thanks, I have to go soon.", "Not today, I need to go to another meeting."],
    consent_accept: &["Yes, that's fine.", "Sure, go ahead."],
    consent_refuse: &["No, I'd rather not share that.", "No thanks."],
    skip: &["I'd rather skip that one.", "Skip that, please."],
    values: [
        "alex.morgan@example.com",
        "+1 415 555 0134",
        "linkedin.com/in/alexmorgan",
        "My name is Alex Morgan",
        "I work at Northwind Traders",
        "I'm a product manager",
        "About twenty people",
    ],
    malformed: ["alex at example dot com", "it's on my business card", "just search my name", "Why do you need that?"],
};

static ITALIAN_PHRASES: PhraseBank = PhraseBank {
    terse: &["Niente di speciale.", "Tutto abbastanza normale.", "Difficile da dire."],
    detailed: &[
        "Sinceramente {topic} è stato un tema centrale quest'anno, soprattutto perché richiede molto tempo al team.",
        "Per quanto riguarda {topic}, all'inizio è stato difficile, ma le cose sono migliorate con una revisione settimanale.",
        "Direi che {topic} funziona abbastanza bene, anche se ogni trimestre ritroviamo lo stesso problema con il budget.",
        "Abbiamo cambiato approccio su {topic} circa 6 mesi fa e da allora i clienti sono molto più soddisfatti.",
    ],
    rambling_tail: &[
        "Scusa, tendo a dilungarmi, c'è tanta storia dietro e non è facile riassumerla in poche parole.",
        "Ci sarebbe molto altro da dire, ma in breve ognuno nel team la vede in modo un po' diverso.",
    ],
    foreshadow: "Tra l'altro questo si collega anche a {topic}.",
    confusion: &["Scusa, non ho capito la domanda.", "In che senso?"],
    offer_accept: &["Sì, volentieri, continuiamo pure.", "Certo, ho ancora qualche minuto."],
    offer_refuse: &["No grazie, devo andare.", "Preferisco di no, ho un'altra riunione."],
    consent_accept: &["Sì, va bene.", "Certo, procediamo."],
    consent_refuse: &["No, preferisco di no.", "No grazie."],
    skip: &["Salta pure questa.", "Passo, grazie."],
    values: [
        "giulia.rossi@example.it",
        "+39 333 123 4567",
        "linkedin.com/in/giuliarossi",
        "Mi chiamo Giulia Rossi",
        "Lavoro presso Rossi Consulting",
        "Lavoro come responsabile marketing",
        "Circa venti persone",
    ],
    malformed: ["giulia chiocciola example punto it", "è sul mio biglietto da visita", "cercami per nome", "Perché ti serve?"],
};
