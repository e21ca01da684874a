//! Per-topic turn budgeting.
//!
//! The planned duration is split evenly across topics and converted into a
//! SCAN turn budget at an assumed speaking pace. DEEP budgets are a fixed
//! small constant: deep-dives are short add-ons, not full re-explorations.

use crate::domain::foundation::Language;

use super::anchors::extract_anchor_roots;
use super::topic::{TopicDescriptor, TopicPlan};

/// Assumed seconds consumed by one question/answer exchange.
pub const SECONDS_PER_TURN: f64 = 45.0;

/// DEEP-phase turns per topic.
pub const DEEP_MAX_TURNS: u32 = 2;

/// Topics budgeted below this many seconds get exactly one turn.
pub const MIN_SECONDS_FOR_PROBING: f64 = 60.0;

/// Computes [`TopicPlan`]s from topic descriptors and a planned duration.
#[derive(Debug, Clone)]
pub struct TopicPlanner {
    seconds_per_turn: f64,
    deep_max_turns: u32,
}

impl Default for TopicPlanner {
    fn default() -> Self {
        Self {
            seconds_per_turn: SECONDS_PER_TURN,
            deep_max_turns: DEEP_MAX_TURNS,
        }
    }
}

impl TopicPlanner {
    /// Creates a planner with the default pace and DEEP budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the assumed seconds per exchange.
    pub fn with_seconds_per_turn(mut self, seconds: f64) -> Self {
        if seconds > 0.0 {
            self.seconds_per_turn = seconds;
        }
        self
    }

    /// Returns the assumed seconds per exchange.
    pub fn seconds_per_turn(&self) -> f64 {
        self.seconds_per_turn
    }

    /// Plans every topic, preserving input order.
    pub fn plan(
        &self,
        topics: &[TopicDescriptor],
        language: Language,
        planned_seconds: u32,
    ) -> Vec<TopicPlan> {
        if topics.is_empty() {
            return Vec::new();
        }
        let per_topic = f64::from(planned_seconds) / topics.len() as f64;

        topics
            .iter()
            .map(|topic| TopicPlan {
                topic_id: topic.id.clone(),
                label: topic.label.clone(),
                sub_goals: topic.sub_goals.clone(),
                seconds_budget: per_topic,
                scan_max_turns: self.scan_turns(per_topic, topic.max_turns),
                deep_max_turns: self.deep_max_turns,
                anchor_roots: extract_anchor_roots(&topic.label, &topic.sub_goals, language),
            })
            .collect()
    }

    fn scan_turns(&self, per_topic_seconds: f64, override_turns: Option<u32>) -> u32 {
        if per_topic_seconds < MIN_SECONDS_FOR_PROBING {
            return 1;
        }
        let from_time = ((per_topic_seconds / self.seconds_per_turn).floor() as u32).max(1);
        match override_turns {
            Some(cap) => cap.max(1).min(from_time),
            None => from_time,
        }
    }
}
