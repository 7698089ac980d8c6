//! Declarative reward module manifests.
//!
//! A manifest is a YAML (or `.json`) file listing the reward functions a
//! module exports. Each function is described, never executed:
//!
//! ```yaml
//! description: "Address matching rewards"
//! functions:
//!   compute_score:
//!     kind: verdict
//!     policy: strict
//!     label: "匹配结果"
//!     delimiter: ":"
//!     tokens: ["是", "否"]
//!     format_score: 0.1
//!   gsm8k_tail:
//!     kind: numeric
//!     policy: flexible
//!     clip_chars: 300
//!   baseline:
//!     kind: length
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::is_json_path;
use crate::extract::{
    ExtractionPolicy, ExtractorError, NumericExtractor, VerdictExtractor,
    DEFAULT_FINAL_ANSWER_MARKER, DEFAULT_VERDICT_DELIMITER, DEFAULT_VERDICT_LABEL,
    DEFAULT_VERDICT_TOKENS,
};
use crate::function::{ExtractiveReward, LengthReward, SharedRewardFn};
use crate::score::{ScoreWeights, DEFAULT_LENGTH_DIVISOR};

use super::{LoadError, StaticModule};

/// Errors from building a function declared in a manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Function '{name}': {source}")]
    Extractor {
        name: String,
        #[source]
        source: ExtractorError,
    },

    #[error("Function '{name}': length divisor must be positive, got {divisor}")]
    InvalidDivisor { name: String, divisor: f64 },

    #[error("Function '{name}': {field} must be finite and non-negative, got {value}")]
    InvalidWeight {
        name: String,
        field: &'static str,
        value: f64,
    },

    #[error("Function '{name}': clip_chars must be at least 1")]
    ZeroClip { name: String },

    #[error("Manifest declares no functions")]
    Empty,
}

/// A reward module manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Free-form module description
    #[serde(default)]
    pub description: Option<String>,

    /// Exported reward functions, by symbol name
    pub functions: BTreeMap<String, FunctionSpec>,
}

/// Declaration of one reward function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FunctionSpec {
    /// Enumerated verdict tokens after a labeled marker
    Verdict {
        #[serde(default)]
        policy: ExtractionPolicy,
        #[serde(default = "default_label")]
        label: String,
        #[serde(default = "default_delimiter")]
        delimiter: String,
        #[serde(default = "default_tokens")]
        tokens: Vec<String>,
        #[serde(default)]
        format_score: f64,
        #[serde(default = "default_full_score")]
        score: f64,
    },

    /// Numeric final answer after a marker
    Numeric {
        #[serde(default)]
        policy: ExtractionPolicy,
        #[serde(default = "default_final_answer_marker")]
        marker: String,
        #[serde(default)]
        clip_chars: Option<usize>,
        #[serde(default)]
        format_score: f64,
        #[serde(default = "default_full_score")]
        score: f64,
    },

    /// Length-proportional baseline
    Length {
        #[serde(default = "default_divisor")]
        divisor: f64,
    },
}

fn default_label() -> String {
    DEFAULT_VERDICT_LABEL.to_string()
}

fn default_delimiter() -> String {
    DEFAULT_VERDICT_DELIMITER.to_string()
}

fn default_tokens() -> Vec<String> {
    DEFAULT_VERDICT_TOKENS.iter().map(|t| t.to_string()).collect()
}

fn default_final_answer_marker() -> String {
    DEFAULT_FINAL_ANSWER_MARKER.to_string()
}

fn default_full_score() -> f64 {
    1.0
}

fn default_divisor() -> f64 {
    DEFAULT_LENGTH_DIVISOR
}

fn checked_weights(
    name: &str,
    format_score: f64,
    score: f64,
) -> Result<ScoreWeights, ManifestError> {
    for (field, value) in [("format_score", format_score), ("score", score)] {
        if !(value.is_finite() && value >= 0.0) {
            return Err(ManifestError::InvalidWeight {
                name: name.to_string(),
                field,
                value,
            });
        }
    }
    Ok(ScoreWeights::new(format_score, score))
}

impl FunctionSpec {
    /// Build the declared reward function.
    pub fn build(&self, name: &str) -> Result<SharedRewardFn, ManifestError> {
        let extractor_error = |source| ManifestError::Extractor {
            name: name.to_string(),
            source,
        };

        match self {
            Self::Verdict {
                policy,
                label,
                delimiter,
                tokens,
                format_score,
                score,
            } => {
                let weights = checked_weights(name, *format_score, *score)?;
                let extractor = VerdictExtractor::new(label, delimiter, tokens.iter().cloned())
                    .map_err(extractor_error)?;
                Ok(Arc::new(
                    ExtractiveReward::new(Arc::new(extractor), *policy).with_weights(weights),
                ))
            }
            Self::Numeric {
                policy,
                marker,
                clip_chars,
                format_score,
                score,
            } => {
                let weights = checked_weights(name, *format_score, *score)?;
                let mut extractor = NumericExtractor::new(marker).map_err(extractor_error)?;
                if let Some(chars) = *clip_chars {
                    if chars == 0 {
                        return Err(ManifestError::ZeroClip {
                            name: name.to_string(),
                        });
                    }
                    extractor = extractor.with_clip_chars(chars);
                }
                Ok(Arc::new(
                    ExtractiveReward::new(Arc::new(extractor), *policy).with_weights(weights),
                ))
            }
            Self::Length { divisor } => {
                if !(divisor.is_finite() && *divisor > 0.0) {
                    return Err(ManifestError::InvalidDivisor {
                        name: name.to_string(),
                        divisor: *divisor,
                    });
                }
                Ok(Arc::new(LengthReward::new(*divisor)))
            }
        }
    }
}

impl Manifest {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build every declared function into a module registered under `path`.
    pub fn into_module(self, path: &str) -> Result<StaticModule, ManifestError> {
        if self.functions.is_empty() {
            return Err(ManifestError::Empty);
        }

        let description = self
            .description
            .unwrap_or_else(|| format!("Reward manifest {}", path));

        let mut module = StaticModule::new(path, description);
        for (name, spec) in &self.functions {
            module = module.export(name.clone(), spec.build(name)?);
        }
        Ok(module)
    }
}

/// Read a manifest file and build its module.
///
/// Every failure (missing file, parse error, invalid declaration) is a
/// [`LoadError::Resolution`] for `path`.
pub fn load_manifest(path: &str) -> Result<StaticModule, LoadError> {
    let resolution = |reason: String| LoadError::Resolution {
        path: path.to_string(),
        reason,
    };

    let contents = fs::read_to_string(path).map_err(|e| resolution(e.to_string()))?;

    let manifest = if is_json_path(Path::new(path)) {
        Manifest::from_json(&contents).map_err(|e| resolution(e.to_string()))?
    } else {
        Manifest::from_yaml(&contents).map_err(|e| resolution(e.to_string()))?
    };

    manifest
        .into_module(path)
        .map_err(|e| resolution(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RewardModule, RewardRegistry};
    use crate::RewardConfig;

    const VERDICT_MANIFEST: &str = r#"
description: "Address matching rewards"
functions:
  compute_score:
    kind: verdict
  compute_score_partial:
    kind: verdict
    format_score: 0.1
  english:
    kind: verdict
    policy: flexible
    label: "Verdict"
    delimiter: ": "
    tokens: ["yes", "no"]
  gsm8k_tail:
    kind: numeric
    clip_chars: 16
  baseline:
    kind: length
    divisor: 10
"#;

    fn write_fixture(name: &str, contents: &str) -> String {
        let path = std::env::temp_dir().join(format!(
            "rewardkit-{}-{}",
            std::process::id(),
            name
        ));
        fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_parse_defaults() {
        let manifest = Manifest::from_yaml(VERDICT_MANIFEST).unwrap();
        assert_eq!(
            manifest.functions["compute_score"],
            FunctionSpec::Verdict {
                policy: ExtractionPolicy::Strict,
                label: "匹配结果".to_string(),
                delimiter: ":".to_string(),
                tokens: vec!["是".to_string(), "否".to_string()],
                format_score: 0.0,
                score: 1.0,
            }
        );
    }

    #[test]
    fn test_into_module_builds_all_functions() {
        let module = Manifest::from_yaml(VERDICT_MANIFEST)
            .unwrap()
            .into_module("rewards/address.yaml")
            .unwrap();

        assert_eq!(module.description(), "Address matching rewards");
        assert_eq!(module.symbols().len(), 5);

        let partial = module.resolve("compute_score_partial").unwrap();
        assert_eq!(partial.compute("匹配结果:否", "是"), 0.1);

        let english = module.resolve("english").unwrap();
        assert_eq!(english.compute("no... actually yes", "yes"), 1.0);

        let tail = module.resolve("gsm8k_tail").unwrap();
        let long = format!("#### 24 {} #### 72", "padding ".repeat(10));
        assert_eq!(tail.compute(&long, "72"), 1.0);

        let baseline = module.resolve("baseline").unwrap();
        assert_eq!(baseline.compute("abcde", ""), 0.5);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let yaml = "functions:\n  f:\n    kind: python\n";
        assert!(Manifest::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_invalid_declarations_rejected() {
        let empty_tokens = "functions:\n  f:\n    kind: verdict\n    tokens: []\n";
        let result = Manifest::from_yaml(empty_tokens).unwrap().into_module("m");
        assert!(matches!(result, Err(ManifestError::Extractor { .. })));

        let zero_divisor = "functions:\n  f:\n    kind: length\n    divisor: 0\n";
        let result = Manifest::from_yaml(zero_divisor).unwrap().into_module("m");
        assert!(matches!(result, Err(ManifestError::InvalidDivisor { .. })));

        let none = "functions: {}\n";
        let result = Manifest::from_yaml(none).unwrap().into_module("m");
        assert!(matches!(result, Err(ManifestError::Empty)));
    }

    #[test]
    fn test_zero_clip_rejected() {
        let yaml = "functions:\n  f:\n    kind: numeric\n    clip_chars: 0\n";
        let result = Manifest::from_yaml(yaml).unwrap().into_module("m");
        assert!(matches!(result, Err(ManifestError::ZeroClip { .. })));
    }

    #[test]
    fn test_non_finite_score_rejected() {
        let yaml = "functions:\n  f:\n    kind: numeric\n    score: .nan\n";
        match Manifest::from_yaml(yaml).unwrap().into_module("m") {
            Err(ManifestError::InvalidWeight { field, value, .. }) => {
                assert_eq!(field, "score");
                assert!(value.is_nan());
            }
            other => panic!("Expected InvalidWeight, got {:?}", other.map(|_| ())),
        }

        let yaml = "functions:\n  f:\n    kind: verdict\n    score: .inf\n";
        let result = Manifest::from_yaml(yaml).unwrap().into_module("m");
        assert!(matches!(result, Err(ManifestError::InvalidWeight { field: "score", .. })));
    }

    #[test]
    fn test_negative_format_score_rejected() {
        let yaml = "functions:\n  f:\n    kind: verdict\n    format_score: -5.0\n";
        match Manifest::from_yaml(yaml).unwrap().into_module("m") {
            Err(ManifestError::InvalidWeight { field, value, .. }) => {
                assert_eq!(field, "format_score");
                assert_eq!(value, -5.0);
            }
            other => panic!("Expected InvalidWeight, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_invalid_declaration_is_resolution_error() {
        let path = write_fixture(
            "empty-tokens.yaml",
            "functions:\n  compute_score:\n    kind: verdict\n    tokens: []\n",
        );

        let result = load_manifest(&path);
        assert!(matches!(result, Err(LoadError::Resolution { .. })));

        let registry = RewardRegistry::with_defaults();
        match registry.load(&RewardConfig::new(path.clone(), "compute_score")) {
            Err(LoadError::Resolution { path: failed, reason }) => {
                assert_eq!(failed, path);
                assert!(reason.contains("compute_score"));
            }
            other => panic!("Expected Resolution, got {:?}", other.map(|_| ())),
        }

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_bad_weight_is_resolution_error() {
        let path = write_fixture(
            "nan-score.yaml",
            "functions:\n  compute_score:\n    kind: numeric\n    score: .nan\n",
        );
        let result = RewardRegistry::with_defaults()
            .load(&RewardConfig::new(path.clone(), "compute_score"));
        assert!(matches!(result, Err(LoadError::Resolution { .. })));
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_manifest_through_registry() {
        let path = write_fixture("address.yaml", VERDICT_MANIFEST);
        let registry = RewardRegistry::with_defaults();

        let reward_fn = registry
            .load(&RewardConfig::new(path.clone(), "compute_score"))
            .unwrap();
        assert_eq!(reward_fn.compute("匹配结果:是", "是"), 1.0);
        assert_eq!(reward_fn.compute("无法判断", "是"), 0.0);

        let missing = registry.load(&RewardConfig::new(path.clone(), "compute_reward"));
        assert!(matches!(missing, Err(LoadError::SymbolNotFound { .. })));

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_json_manifest() {
        let path = write_fixture(
            "gsm8k.json",
            r#"{"functions": {"compute_score": {"kind": "numeric"}}}"#,
        );
        let module = load_manifest(&path).unwrap();
        let reward_fn = module.resolve("compute_score").unwrap();
        assert_eq!(reward_fn.compute("#### 72", "72"), 1.0);
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_unparseable_manifest_is_resolution_error() {
        let path = write_fixture(
            "broken.yaml",
            "def compute_score(solution_str, gt):\n  return 1\n",
        );
        let result = load_manifest(&path);
        assert!(matches!(result, Err(LoadError::Resolution { .. })));
        fs::remove_file(path).ok();
    }
}
