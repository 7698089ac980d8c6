//! Numeric final-answer extraction (GSM8K style).

use regex::Regex;

use super::patterns::{final_answer_pattern, FINAL_ANSWER_PATTERN, NUMBER_PATTERN};
use super::{AnswerExtractor, ExtractionPolicy, ExtractorError};

/// Numeric runs that carry no answer.
const INVALID_NUMBERS: [&str; 2] = ["", "."];

/// Extracts a numeric answer written after a final-answer marker.
///
/// Strict mode takes the first `#### <number>` and drops thousands
/// separators and currency signs. Flexible mode takes the last numeric run
/// anywhere in the text, as written.
#[derive(Debug, Clone)]
pub struct NumericExtractor {
    marker: Regex,
    clip_chars: Option<usize>,
}

impl NumericExtractor {
    /// Create an extractor for a custom final-answer marker.
    pub fn new(marker: &str) -> Result<Self, ExtractorError> {
        if marker.is_empty() {
            return Err(ExtractorError::EmptyMarker);
        }
        Ok(Self {
            marker: final_answer_pattern(marker)?,
            clip_chars: None,
        })
    }

    /// Only search the trailing `chars` characters of the text.
    ///
    /// `chars` must be at least 1.
    pub fn with_clip_chars(mut self, chars: usize) -> Self {
        debug_assert!(chars > 0, "clip_chars must be at least 1");
        self.clip_chars = Some(chars);
        self
    }

    pub fn clip_chars(&self) -> Option<usize> {
        self.clip_chars
    }

    fn extract_strict(&self, text: &str) -> Option<String> {
        self.marker
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().replace([',', '$'], ""))
    }

    fn extract_flexible(&self, text: &str) -> Option<String> {
        NUMBER_PATTERN
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|n| !INVALID_NUMBERS.contains(n))
            .last()
            .map(str::to_string)
    }
}

impl Default for NumericExtractor {
    fn default() -> Self {
        Self {
            marker: FINAL_ANSWER_PATTERN.clone(),
            clip_chars: None,
        }
    }
}

impl AnswerExtractor for NumericExtractor {
    fn kind(&self) -> &'static str {
        "numeric"
    }

    fn extract(&self, text: &str, policy: ExtractionPolicy) -> Option<String> {
        let text = match self.clip_chars {
            Some(chars) => tail_chars(text, chars),
            None => text,
        };
        match policy {
            ExtractionPolicy::Strict => self.extract_strict(text),
            ExtractionPolicy::Flexible => self.extract_flexible(text),
        }
    }
}

/// The trailing `n` characters of `text`, respecting char boundaries.
fn tail_chars(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match text.char_indices().rev().nth(n - 1) {
        Some((start, _)) => &text[start..],
        None => text,
    }
}
