//! Answer extraction from generated text.
//!
//! An extractor recovers a single discrete answer token from free-form
//! model output. Two policies are supported:
//!
//! - [`ExtractionPolicy::Strict`]: the answer must follow a fixed marker.
//! - [`ExtractionPolicy::Flexible`]: best-effort scan of the whole text,
//!   preferring whatever the model wrote last.
//!
//! Extraction never fails. Text without a recoverable answer yields `None`,
//! which callers score as unparseable output.

mod numeric;
mod patterns;
mod verdict;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use numeric::NumericExtractor;
pub use patterns::{
    DEFAULT_FINAL_ANSWER_MARKER, DEFAULT_VERDICT_DELIMITER, DEFAULT_VERDICT_LABEL,
    DEFAULT_VERDICT_TOKENS,
};
pub use verdict::VerdictExtractor;

/// Errors raised while constructing an extractor.
///
/// Extraction itself is infallible; only malformed extractor settings
/// (typically coming from a reward module manifest) end up here.
#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("Extractor needs at least one candidate token")]
    EmptyTokenSet,

    #[error("Candidate tokens must not be empty")]
    EmptyToken,

    #[error("Duplicate candidate token: {0}")]
    DuplicateToken(String),

    #[error("Answer marker must not be empty")]
    EmptyMarker,

    #[error("Invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Strategy used to recover an answer from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionPolicy {
    /// Only an answer written after the fixed marker counts.
    #[default]
    Strict,

    /// Scan the whole text and keep the answer written last.
    Flexible,
}

impl ExtractionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Flexible => "flexible",
        }
    }
}

impl fmt::Display for ExtractionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "flexible" => Ok(Self::Flexible),
            other => Err(format!(
                "Unknown extraction policy: '{}'. Expected 'strict' or 'flexible'",
                other
            )),
        }
    }
}

/// Recovers a discrete answer token from generated text.
///
/// # Contract
/// - MUST be a pure function of `(text, policy)`
/// - MUST NOT panic on arbitrary input
/// - MUST return `None` when no answer can be recovered
pub trait AnswerExtractor: Send + Sync {
    /// Short identifier used in diagnostics (e.g. "verdict", "numeric").
    fn kind(&self) -> &'static str;

    /// Extract the answer token under the given policy.
    fn extract(&self, text: &str, policy: ExtractionPolicy) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_policy_parse() {
        assert_eq!("strict".parse::<ExtractionPolicy>(), Ok(ExtractionPolicy::Strict));
        assert_eq!(" Flexible ".parse::<ExtractionPolicy>(), Ok(ExtractionPolicy::Flexible));
        assert!("fuzzy".parse::<ExtractionPolicy>().is_err());
    }

    #[test]
    fn test_policy_serde() {
        let policy: ExtractionPolicy = serde_yaml::from_str("flexible").unwrap();
        assert_eq!(policy, ExtractionPolicy::Flexible);
        assert_eq!(serde_json::to_string(&ExtractionPolicy::Strict).unwrap(), "\"strict\"");
        assert_eq!(ExtractionPolicy::default(), ExtractionPolicy::Strict);
    }

    fn policy_strategy() -> impl Strategy<Value = ExtractionPolicy> {
        prop_oneof![Just(ExtractionPolicy::Strict), Just(ExtractionPolicy::Flexible)]
    }

    proptest! {
        #[test]
        fn verdict_extraction_is_deterministic(
            text in "(匹配结果|:|是|否|[a-z ]){0,24}",
            policy in policy_strategy(),
        ) {
            let extractor = VerdictExtractor::default();
            prop_assert_eq!(extractor.extract(&text, policy), extractor.extract(&text, policy));
        }

        #[test]
        fn numeric_extraction_is_deterministic(
            text in "(#### |-|[0-9]|\\.|,|[a-z ]){0,32}",
            policy in policy_strategy(),
        ) {
            let extractor = NumericExtractor::default();
            prop_assert_eq!(extractor.extract(&text, policy), extractor.extract(&text, policy));
        }

        #[test]
        fn verdict_answers_come_from_the_token_set(text in "\\PC{0,40}", policy in policy_strategy()) {
            let extractor = VerdictExtractor::default();
            if let Some(answer) = extractor.extract(&text, policy) {
                prop_assert!(extractor.tokens().contains(&answer));
            }
        }
    }
}
