//! Transcript turns.

use serde::{Deserialize, Serialize};

use super::phase::InterviewPhase;
use super::transition::TransitionMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Assistant,
    User,
}

/// What an assistant turn was trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    TopicQuestion,
    Rephrase,
    DeepOffer,
    ConsentRequest,
    FieldRequest,
    Closing,
}

/// Tags attached to an assistant turn at the time it was uttered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMeta {
    pub phase: InterviewPhase,
    pub topic_index: usize,
    pub topic_label: String,
    /// Anchor roots of the topic, sub-goals included.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchor_roots: Vec<String>,
    pub kind: TurnKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<TransitionMode>,
    pub effective_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<AssistantMeta>,
}

impl Turn {
    pub fn assistant(text: impl Into<String>, meta: AssistantMeta) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            meta: Some(meta),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            meta: None,
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// Ordered, append-only sequence of turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn assistant_turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter().filter(|t| t.is_assistant())
    }

    /// Most recent user reply, if any.
    pub fn last_user_reply(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .map(|t| t.text.as_str())
    }
}

impl From<Vec<Turn>> for Transcript {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> AssistantMeta {
        AssistantMeta {
            phase: InterviewPhase::Scan,
            topic_index: 0,
            topic_label: "Pricing".into(),
            anchor_roots: vec!["pricin".into()],
            kind: TurnKind::TopicQuestion,
            field: None,
            transition: None,
            effective_seconds: 0.0,
        }
    }

    #[test]
    fn transcript_keeps_order_and_finds_last_reply() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::assistant("How is pricing?", meta()));
        transcript.push(Turn::user("Fine"));
        transcript.push(Turn::assistant("Why fine?", meta()));
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.assistant_turns().count(), 2);
        assert_eq!(transcript.last_user_reply(), Some("Fine"));
    }

    #[test]
    fn user_turns_serialize_without_meta() {
        let json = serde_json::to_value(Turn::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "text": "hi"}));
    }
}
