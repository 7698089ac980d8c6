//! The reward function capability.
//!
//! A reward function maps `(solution_str, ground_truth)` to a scalar. This
//! is the only surface a training loop integrates with; how the function was
//! resolved is invisible behind [`RewardFunction`].

use std::fmt;
use std::sync::Arc;

use crate::extract::{AnswerExtractor, ExtractionPolicy};
use crate::observe::{ScoreEvent, ScoreObserver, TracingObserver};
use crate::score::{length_reward, score, ScoreWeights, DEFAULT_LENGTH_DIVISOR};

/// A stateless scalar reward over generated text.
///
/// # Contract
/// - MUST NOT hold mutable state; implementations are shared across
///   worker threads for the whole training run
/// - MUST NOT panic on arbitrary text; unparseable output scores `0.0`
pub trait RewardFunction: Send + Sync {
    fn compute(&self, solution_str: &str, ground_truth: &str) -> f64;
}

impl<F> RewardFunction for F
where
    F: Fn(&str, &str) -> f64 + Send + Sync,
{
    fn compute(&self, solution_str: &str, ground_truth: &str) -> f64 {
        self(solution_str, ground_truth)
    }
}

/// Shared handle to a resolved reward function.
pub type SharedRewardFn = Arc<dyn RewardFunction>;

/// Extract an answer, then score it against the ground truth.
#[derive(Clone)]
pub struct ExtractiveReward {
    extractor: Arc<dyn AnswerExtractor>,
    policy: ExtractionPolicy,
    weights: ScoreWeights,
    observer: Arc<dyn ScoreObserver>,
}

impl ExtractiveReward {
    /// Create a reward with default weights that traces through `tracing`.
    pub fn new(extractor: Arc<dyn AnswerExtractor>, policy: ExtractionPolicy) -> Self {
        Self {
            extractor,
            policy,
            weights: ScoreWeights::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Replace the observer that receives every scored sample.
    pub fn with_observer(mut self, observer: Arc<dyn ScoreObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn policy(&self) -> ExtractionPolicy {
        self.policy
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }
}

impl RewardFunction for ExtractiveReward {
    fn compute(&self, solution_str: &str, ground_truth: &str) -> f64 {
        let extracted = self.extractor.extract(solution_str, self.policy);
        let reward = score(extracted.as_deref(), ground_truth, &self.weights);

        self.observer.on_score(&ScoreEvent {
            extractor: self.extractor.kind(),
            policy: self.policy,
            extracted: extracted.as_deref(),
            ground_truth,
            reward,
        });

        reward
    }
}

impl fmt::Debug for ExtractiveReward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractiveReward")
            .field("extractor", &self.extractor.kind())
            .field("policy", &self.policy)
            .field("weights", &self.weights)
            .finish()
    }
}

/// Length-proportional baseline reward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthReward {
    divisor: f64,
}

impl LengthReward {
    /// `divisor` must be finite and positive.
    pub fn new(divisor: f64) -> Self {
        debug_assert!(
            divisor.is_finite() && divisor > 0.0,
            "length divisor must be positive"
        );
        Self { divisor }
    }
}

impl Default for LengthReward {
    fn default() -> Self {
        Self::new(DEFAULT_LENGTH_DIVISOR)
    }
}

impl RewardFunction for LengthReward {
    fn compute(&self, solution_str: &str, _ground_truth: &str) -> f64 {
        length_reward(solution_str, self.divisor)
    }
}
