//! # rewardkit-core
//!
//! Deterministic reward scoring for reinforcement-learning fine-tuning.
//!
//! This crate turns free-form model output into a scalar reward:
//! - Extract a discrete answer from the text (strict or flexible)
//! - Score it against the ground truth (correct / well-formed / unparseable)
//! - Resolve the reward function from configuration, not code
//! - Verify the resolved function against literal cases before training
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same text and policy always extract the same answer
//! 2. **Infallible scoring**: Unparseable output scores `0.0`, never errors
//! 3. **No code loading**: Modules are registered statically or declared
//!    in manifest files
//! 4. **Thread-safe**: Reward functions are stateless `Send + Sync` values
//!
//! ## Example
//!
//! ```rust,ignore
//! use rewardkit_core::{load_and_verify, gsm8k_smoke_cases, RewardConfig};
//!
//! let config = RewardConfig::from_file("train.yaml")?;
//! let (reward_fn, report) = load_and_verify(&config, &gsm8k_smoke_cases())?;
//!
//! // Hand `reward_fn` to the training loop
//! let reward = reward_fn.compute("... #### 72", "72");
//! ```

pub mod config;
pub mod extract;
pub mod function;
pub mod harness;
pub mod observe;
pub mod registry;
pub mod score;

// Re-export main types at crate root
pub use config::{ConfigError, RewardConfig};
pub use extract::{
    AnswerExtractor, ExtractionPolicy, ExtractorError, NumericExtractor, VerdictExtractor,
};
pub use function::{ExtractiveReward, LengthReward, RewardFunction, SharedRewardFn};
pub use harness::{
    evaluate_solution, gsm8k_smoke_cases, verify, CaseFile, CaseOutcome,
    ScoringAssertionFailure, TestCase, VerificationReport,
};
pub use observe::{NoopObserver, ScoreEvent, ScoreObserver, TracingObserver};
pub use registry::{
    load, load_reward_function, LoadError, RewardModule, RewardRegistry, StaticModule,
};
pub use score::{length_reward, score, ScoreWeights};

use thiserror::Error;

/// Errors from loading and verifying a reward function in one step.
#[derive(Error, Debug)]
pub enum RewardError {
    #[error("Failed to load reward function: {0}")]
    Load(#[from] LoadError),

    #[error("Reward function failed verification: {0}")]
    Verification(#[from] ScoringAssertionFailure),
}

/// Load the configured reward function and verify it against `cases`.
///
/// This is the main entry point before training starts: a function that
/// cannot be resolved, or that scores any case wrongly, is never returned.
pub fn load_and_verify(
    config: &RewardConfig,
    cases: &[TestCase],
) -> Result<(SharedRewardFn, VerificationReport), RewardError> {
    load_and_verify_with(&RewardRegistry::with_defaults(), config, cases)
}

/// Like [`load_and_verify`], resolving against a caller-provided registry.
pub fn load_and_verify_with(
    registry: &RewardRegistry,
    config: &RewardConfig,
    cases: &[TestCase],
) -> Result<(SharedRewardFn, VerificationReport), RewardError> {
    let reward_fn = registry.load(config)?;
    let report = verify(reward_fn.as_ref(), cases)?;
    Ok((reward_fn, report))
}
