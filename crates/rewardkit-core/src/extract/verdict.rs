//! Verdict extraction over a small enumerated token alphabet.

use std::collections::HashSet;

use regex::Regex;

use super::patterns::{marker_pattern, DEFAULT_VERDICT_TOKENS, VERDICT_MARKER_PATTERN};
use super::{AnswerExtractor, ExtractionPolicy, ExtractorError};

/// Extracts a verdict such as `是`/`否` from generated text.
///
/// Strict mode looks for `<label><delimiter><token>` and takes the first
/// match. Flexible mode looks at the last occurrence of every candidate
/// token and keeps the one written latest.
#[derive(Debug, Clone)]
pub struct VerdictExtractor {
    tokens: Vec<String>,
    marker: Regex,
}

impl VerdictExtractor {
    /// Create an extractor for a custom marker and token alphabet.
    pub fn new<I, S>(label: &str, delimiter: &str, tokens: I) -> Result<Self, ExtractorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            return Err(ExtractorError::EmptyTokenSet);
        }
        if label.is_empty() && delimiter.is_empty() {
            return Err(ExtractorError::EmptyMarker);
        }

        let mut seen = HashSet::new();
        for token in &tokens {
            if token.is_empty() {
                return Err(ExtractorError::EmptyToken);
            }
            if !seen.insert(token.as_str()) {
                return Err(ExtractorError::DuplicateToken(token.clone()));
            }
        }

        let marker = marker_pattern(label, delimiter, &tokens)?;
        Ok(Self { tokens, marker })
    }

    /// Candidate tokens in declaration order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    fn extract_strict(&self, text: &str) -> Option<String> {
        self.marker
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn extract_flexible(&self, text: &str) -> Option<String> {
        let mut latest: Option<(usize, &str)> = None;
        let mut tied = false;

        for token in &self.tokens {
            let Some(index) = text.rfind(token.as_str()) else {
                continue;
            };
            match latest {
                Some((best, _)) if index < best => {}
                Some((best, _)) if index == best => tied = true,
                _ => {
                    latest = Some((index, token.as_str()));
                    tied = false;
                }
            }
        }

        // Equal rightmost positions leave no winner.
        if tied {
            return None;
        }
        latest.map(|(_, token)| token.to_string())
    }
}

impl Default for VerdictExtractor {
    fn default() -> Self {
        Self {
            tokens: DEFAULT_VERDICT_TOKENS.iter().map(|t| t.to_string()).collect(),
            marker: VERDICT_MARKER_PATTERN.clone(),
        }
    }
}

impl AnswerExtractor for VerdictExtractor {
    fn kind(&self) -> &'static str {
        "verdict"
    }

    fn extract(&self, text: &str, policy: ExtractionPolicy) -> Option<String> {
        match policy {
            ExtractionPolicy::Strict => self.extract_strict(text),
            ExtractionPolicy::Flexible => self.extract_flexible(text),
        }
    }
}
