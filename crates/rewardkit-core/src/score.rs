//! Reward scoring.
//!
//! Scores split "unparseable" from "parseable but wrong": a missing answer
//! earns nothing, a well-formed wrong answer earns `format_score`, and a
//! correct answer earns `score`.

use serde::{Deserialize, Serialize};

/// Divisor used by the length baseline.
pub const DEFAULT_LENGTH_DIVISOR: f64 = 100.0;

/// Reward values for wrong-but-parseable and correct answers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Reward for a well-formed but incorrect answer
    #[serde(default)]
    pub format_score: f64,

    /// Reward for a correct answer
    #[serde(default = "default_full_score")]
    pub score: f64,
}

fn default_full_score() -> f64 {
    1.0
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            format_score: 0.0,
            score: default_full_score(),
        }
    }
}

impl ScoreWeights {
    pub fn new(format_score: f64, score: f64) -> Self {
        Self {
            format_score,
            score,
        }
    }
}

/// Score an extracted answer against the ground truth.
///
/// Comparison is exact string equality. No numeric tolerance is applied.
pub fn score(extracted: Option<&str>, ground_truth: &str, weights: &ScoreWeights) -> f64 {
    match extracted {
        None => 0.0,
        Some(answer) if answer == ground_truth => weights.score,
        Some(_) => weights.format_score,
    }
}

/// Baseline reward proportional to output length, in characters.
///
/// Smoke-test only. It ignores the ground truth entirely.
pub fn length_reward(solution: &str, divisor: f64) -> f64 {
    solution.chars().count() as f64 / divisor
}
