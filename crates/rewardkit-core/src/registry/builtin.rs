//! Built-in reward modules.

use std::sync::Arc;

use crate::extract::{ExtractionPolicy, NumericExtractor, VerdictExtractor};
use crate::function::{ExtractiveReward, LengthReward};

use super::StaticModule;

/// Prefix reserved for statically registered modules.
pub const BUILTIN_SCHEME: &str = "builtin:";

/// Binary verdict module (`匹配结果:是` / `匹配结果:否`).
pub const VERDICT_MODULE: &str = "builtin:verdict";

/// GSM8K final-answer module (`#### 72`).
pub const GSM8K_MODULE: &str = "builtin:gsm8k";

/// Verdict rewards.
///
/// - `compute_score`: strict marker extraction
/// - `compute_score_flexible`: latest verdict token anywhere in the text
/// - `my_reward_fn`: length baseline, ignores the ground truth
pub fn verdict_module() -> StaticModule {
    let extractor = Arc::new(VerdictExtractor::default());

    StaticModule::new(VERDICT_MODULE, "Binary verdict extraction (是/否)")
        .export(
            "compute_score",
            Arc::new(ExtractiveReward::new(extractor.clone(), ExtractionPolicy::Strict)),
        )
        .export(
            "compute_score_flexible",
            Arc::new(ExtractiveReward::new(extractor, ExtractionPolicy::Flexible)),
        )
        .export("my_reward_fn", Arc::new(LengthReward::default()))
}

/// GSM8K rewards.
///
/// - `compute_score`: strict `#### <number>` extraction
/// - `compute_score_flexible`: last number anywhere in the text
pub fn gsm8k_module() -> StaticModule {
    let extractor = Arc::new(NumericExtractor::default());

    StaticModule::new(GSM8K_MODULE, "GSM8K final-answer extraction (#### N)")
        .export(
            "compute_score",
            Arc::new(ExtractiveReward::new(extractor.clone(), ExtractionPolicy::Strict)),
        )
        .export(
            "compute_score_flexible",
            Arc::new(ExtractiveReward::new(extractor, ExtractionPolicy::Flexible)),
        )
}
