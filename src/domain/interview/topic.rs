//! Topic descriptors and the per-conversation plan derived from them.

use serde::{Deserialize, Serialize};

use super::phase::InterviewPhase;

/// A topic as declared in bot configuration. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicDescriptor {
    pub id: String,
    pub label: String,
    /// Position in the interview; lower goes first.
    #[serde(default)]
    pub order: u32,
    /// Optional cap on SCAN turns for this topic.
    #[serde(default)]
    pub max_turns: Option<u32>,
    #[serde(default)]
    pub sub_goals: Vec<String>,
}

impl TopicDescriptor {
    /// Creates a topic with no sub-goals or turn override.
    pub fn new(id: impl Into<String>, label: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            order,
            max_turns: None,
            sub_goals: Vec::new(),
        }
    }

    /// Sets an explicit SCAN turn cap.
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    /// Adds a sub-goal phrase.
    pub fn with_sub_goal(mut self, sub_goal: impl Into<String>) -> Self {
        self.sub_goals.push(sub_goal.into());
        self
    }
}

/// Turn budget and relevance anchors for one topic.
///
/// Computed once per conversation by the planner and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicPlan {
    pub topic_id: String,
    pub label: String,
    pub sub_goals: Vec<String>,
    /// Seconds of the planned duration assigned to this topic.
    pub seconds_budget: f64,
    pub scan_max_turns: u32,
    pub deep_max_turns: u32,
    pub anchor_roots: Vec<String>,
}

impl TopicPlan {
    /// Returns the turn budget for `phase`.
    ///
    /// Phases outside SCAN/DEEP do not spend topic turns and report zero.
    pub fn max_turns_for(&self, phase: InterviewPhase) -> u32 {
        match phase {
            InterviewPhase::Scan => self.scan_max_turns,
            InterviewPhase::Deep => self.deep_max_turns,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_deserializes_with_defaults() {
        let topic: TopicDescriptor =
            serde_yaml::from_str("id: pricing\nlabel: Pricing strategy\n").unwrap();
        assert_eq!(topic.order, 0);
        assert_eq!(topic.max_turns, None);
        assert!(topic.sub_goals.is_empty());
    }

    #[test]
    fn builder_sets_override_and_sub_goals() {
        let topic = TopicDescriptor::new("ux", "Onboarding UX", 2)
            .with_max_turns(2)
            .with_sub_goal("first login");
        assert_eq!(topic.max_turns, Some(2));
        assert_eq!(topic.sub_goals, vec!["first login".to_string()]);
    }

    #[test]
    fn budget_depends_on_phase() {
        let plan = TopicPlan {
            topic_id: "t".into(),
            label: "Topic".into(),
            sub_goals: vec![],
            seconds_budget: 120.0,
            scan_max_turns: 3,
            deep_max_turns: 2,
            anchor_roots: vec![],
        };
        assert_eq!(plan.max_turns_for(InterviewPhase::Scan), 3);
        assert_eq!(plan.max_turns_for(InterviewPhase::Deep), 2);
        assert_eq!(plan.max_turns_for(InterviewPhase::DataCollection), 0);
    }
}
