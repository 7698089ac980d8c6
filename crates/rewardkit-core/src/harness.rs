//! Verification harness for reward functions.
//!
//! Before a reward function is trusted inside a training loop it is run
//! against literal cases. Cases run in declared order and the first
//! mismatch aborts the run: one wrong reward invalidates the function.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{is_json_path, ConfigError};
use crate::function::RewardFunction;

/// Characters of the solution shown in trace lines.
const PREVIEW_CHARS: usize = 50;

/// A literal reward expectation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub solution_str: String,
    pub ground_truth: String,

    /// Exact expected reward. `None` runs the case without checking it.
    #[serde(default)]
    pub expected: Option<f64>,
}

impl TestCase {
    pub fn new(
        name: impl Into<String>,
        solution_str: impl Into<String>,
        ground_truth: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            solution_str: solution_str.into(),
            ground_truth: ground_truth.into(),
            expected: None,
        }
    }

    pub fn expecting(mut self, expected: f64) -> Self {
        self.expected = Some(expected);
        self
    }
}

/// A reward diverged from its expected literal.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Test failed: {case} (case {position})\nExpected: {expected}, Got: {actual}")]
pub struct ScoringAssertionFailure {
    /// Name of the failing case
    pub case: String,

    /// 1-based position of the case in the declared sequence
    pub position: usize,

    pub expected: f64,
    pub actual: f64,
}

/// Outcome of one executed case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseOutcome {
    pub name: String,
    pub reward: f64,
    pub expected: Option<f64>,
}

/// Result of a successful verification run.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    /// Executed cases, in declared order
    pub outcomes: Vec<CaseOutcome>,

    /// When the run finished
    pub verified_at: DateTime<Utc>,
}

impl VerificationReport {
    /// Number of cases whose reward was checked against an expectation.
    pub fn checked(&self) -> usize {
        self.outcomes.iter().filter(|o| o.expected.is_some()).count()
    }
}

/// Cases read from a YAML/JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseFile {
    pub cases: Vec<TestCase>,
}

impl CaseFile {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a case file. `.json` files are read as JSON, everything else
    /// as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        if is_json_path(path) {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }
}

/// Compute one reward and emit a trace line for it.
pub fn evaluate_solution(
    reward_fn: &dyn RewardFunction,
    solution_str: &str,
    ground_truth: &str,
) -> f64 {
    let reward = reward_fn.compute(solution_str, ground_truth);
    let shown = format!("{:.2}", reward);
    tracing::info!(
        solution = %preview(solution_str),
        ground_truth,
        reward = %shown,
        "Evaluated solution"
    );
    reward
}

/// Run `cases` in order against `reward_fn`, stopping at the first mismatch.
///
/// Equality is exact. Cases without an expectation are executed and
/// reported but never fail.
pub fn verify(
    reward_fn: &dyn RewardFunction,
    cases: &[TestCase],
) -> Result<VerificationReport, ScoringAssertionFailure> {
    let mut outcomes = Vec::with_capacity(cases.len());

    for (index, case) in cases.iter().enumerate() {
        tracing::info!(case = %case.name, "Running test case");
        let reward = evaluate_solution(reward_fn, &case.solution_str, &case.ground_truth);

        if let Some(expected) = case.expected {
            if reward != expected {
                tracing::error!(case = %case.name, expected, actual = reward, "Reward mismatch");
                return Err(ScoringAssertionFailure {
                    case: case.name.clone(),
                    position: index + 1,
                    expected,
                    actual: reward,
                });
            }
        }

        outcomes.push(CaseOutcome {
            name: case.name.clone(),
            reward,
            expected: case.expected,
        });
    }

    Ok(VerificationReport {
        outcomes,
        verified_at: Utc::now(),
    })
}

/// Built-in GSM8K cases: one correct and one incorrect final answer.
pub fn gsm8k_smoke_cases() -> Vec<TestCase> {
    const WORKING: &str = "Natalia sold 48/2 = <<48/2=24>>24 clips in May.\n\
        Natalia sold 48+24 = <<48+24=72>>72 clips altogether in April and May.\n";

    vec![
        TestCase::new("correct_match", format!("{}#### 72", WORKING), "72").expecting(1.0),
        TestCase::new("incorrect_match", format!("{}#### 24", WORKING), "72").expecting(0.0),
    ]
}

/// First `PREVIEW_CHARS` characters of `text`, with an ellipsis when cut.
fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
