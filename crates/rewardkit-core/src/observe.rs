//! Observability hook for reward scoring.
//!
//! Scoring itself has no side effects. Reward functions report each scored
//! sample to a [`ScoreObserver`], which decides what to do with it.

use crate::extract::ExtractionPolicy;

/// A single scored sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreEvent<'a> {
    /// Extractor kind (e.g. "verdict", "numeric")
    pub extractor: &'static str,

    /// Policy used for extraction
    pub policy: ExtractionPolicy,

    /// The extracted answer, if any
    pub extracted: Option<&'a str>,

    /// Reference answer
    pub ground_truth: &'a str,

    /// Resulting reward
    pub reward: f64,
}

/// Receives scored samples.
///
/// Observers MUST NOT influence the reward. They are called after the
/// reward is computed and their output is discarded.
pub trait ScoreObserver: Send + Sync {
    fn on_score(&self, event: &ScoreEvent<'_>);
}

/// Emits a `tracing` debug event per scored sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ScoreObserver for TracingObserver {
    fn on_score(&self, event: &ScoreEvent<'_>) {
        tracing::debug!(
            extractor = event.extractor,
            policy = %event.policy,
            extracted = ?event.extracted,
            ground_truth = %event.ground_truth,
            reward = event.reward,
            "Scored solution"
        );
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ScoreObserver for NoopObserver {
    fn on_score(&self, _event: &ScoreEvent<'_>) {}
}
