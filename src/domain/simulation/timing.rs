//! Effective talk time of a simulated exchange.

use serde::{Deserialize, Serialize};

use super::rng::SimRng;

/// Shortest exchange ever recorded, in seconds.
pub const MIN_EXCHANGE_SECONDS: f64 = 1.0;

/// Converts question and answer lengths into effective seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingModel {
    pub question_seconds_per_word: f64,
    pub answer_seconds_per_word: f64,
    /// Thinking and turn-taking time added to every exchange.
    pub base_overhead_seconds: f64,
    pub jitter_seconds: f64,
}

impl Default for TimingModel {
    fn default() -> Self {
        Self {
            question_seconds_per_word: 0.4,
            answer_seconds_per_word: 0.6,
            base_overhead_seconds: 12.0,
            jitter_seconds: 6.0,
        }
    }
}

impl TimingModel {
    /// Seconds spent on one question and its answer. Always positive.
    pub fn exchange_seconds(&self, question: &str, answer: &str, rng: &mut SimRng) -> f64 {
        let q = question.split_whitespace().count() as f64;
        let a = answer.split_whitespace().count() as f64;
        let seconds = q * self.question_seconds_per_word
            + a * self.answer_seconds_per_word
            + self.base_overhead_seconds
            + rng.jitter(self.jitter_seconds);
        if seconds.is_finite() {
            seconds.max(MIN_EXCHANGE_SECONDS)
        } else {
            MIN_EXCHANGE_SECONDS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn longer_answers_take_longer_without_jitter() {
        let model = TimingModel {
            jitter_seconds: 0.0,
            ..TimingModel::default()
        };
        let mut rng = SimRng::from_seed(1);
        let short = model.exchange_seconds("How is it?", "fine", &mut rng);
        let long = model.exchange_seconds("How is it?", "fine but slow and expensive lately", &mut rng);
        assert!(long > short);
        assert!((short - (3.0 * 0.4 + 0.6 + 12.0)).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn exchange_is_always_positive(q in ".{0,200}", a in ".{0,200}", seed in any::<u64>()) {
            let model = TimingModel {
                base_overhead_seconds: 0.0,
                jitter_seconds: 50.0,
                ..TimingModel::default()
            };
            let mut rng = SimRng::from_seed(seed);
            prop_assert!(model.exchange_seconds(&q, &a, &mut rng) > 0.0);
        }
    }
}
