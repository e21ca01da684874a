//! Cleanup of generated text before it enters a transcript.

use thiserror::Error;

/// Longest generated utterance accepted, in bytes.
pub const MAX_UTTERANCE_LENGTH: usize = 2_000;

const INJECTION_MARKERS: &[&str] = &[
    "```system",
    "```assistant",
    "[INST]",
    "[/INST]",
    "<|system|>",
    "<|assistant|>",
    "<|user|>",
    "<|im_start|>",
    "<|im_end|>",
    "<<SYS>>",
    "<</SYS>>",
];

/// Role labels a model sometimes prefixes to its own output.
const SPEAKER_PREFIXES: &[&str] = &["assistant:", "interviewer:", "respondent:", "user:", "intervistatore:"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SanitizationError {
    #[error("utterance too long: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },

    #[error("utterance is empty after sanitization")]
    Empty,
}

/// Strips control characters, prompt-injection markers, speaker labels and
/// wrapping quotes from generated utterances.
#[derive(Debug, Clone, Default)]
pub struct ResponseSanitizer {
    additional_patterns: Vec<String>,
}

impl ResponseSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds patterns to strip on top of the built-in markers.
    pub fn with_additional_patterns(mut self, patterns: Vec<String>) -> Self {
        self.additional_patterns = patterns;
        self
    }

    /// Returns a single-line, trimmed utterance or an error if nothing usable remains.
    pub fn sanitize(&self, raw: &str) -> Result<String, SanitizationError> {
        if raw.len() > MAX_UTTERANCE_LENGTH {
            return Err(SanitizationError::TooLong {
                max: MAX_UTTERANCE_LENGTH,
                actual: raw.len(),
            });
        }

        let mut text: String = raw
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        for marker in INJECTION_MARKERS {
            text = text.replace(marker, "");
        }
        for pattern in &self.additional_patterns {
            text = text.replace(pattern.as_str(), "");
        }

        let mut text = collapse_whitespace(&text);
        let lower = text.to_lowercase();
        if let Some(prefix) = SPEAKER_PREFIXES.iter().find(|p| lower.starts_with(*p)) {
            text = text.get(prefix.len()..).unwrap_or_default().trim().to_string();
        }
        let text = strip_wrapping_quotes(&text).to_string();

        if text.is_empty() {
            return Err(SanitizationError::Empty);
        }
        Ok(text)
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_wrapping_quotes(text: &str) -> &str {
    let mut text = text.trim();
    loop {
        let stripped = ['"', '\'', '\u{201C}', '\u{201D}', '`']
            .iter()
            .find_map(|q| text.strip_prefix(*q))
            .and_then(|rest| {
                ['"', '\'', '\u{201C}', '\u{201D}', '`']
                    .iter()
                    .find_map(|q| rest.strip_suffix(*q))
            });
        match stripped {
            Some(inner) => text = inner.trim(),
            None => return text,
        }
    }
}
