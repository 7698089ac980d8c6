//! Reward configuration parsing from YAML/JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::schema::validate_fragment_schema;

/// Key of the reward function section inside a training configuration.
pub const FRAGMENT_KEY: &str = "custom_reward_function";

/// Errors that can occur when reading reward configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Config validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Selects a reward function: the module to resolve and the symbol to take
/// from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(deny_unknown_fields)]
pub struct RewardConfig {
    path: String,
    name: String,
}

impl RewardConfig {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Module location: a registered module path or a manifest file.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Symbol exported by the module.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extract the reward config from a training configuration value.
    pub fn from_value(fragment: &serde_json::Value) -> Result<Self, ConfigError> {
        validate_fragment_schema(fragment)
            .map_err(|errors| ConfigError::ValidationError(errors.join("; ")))?;

        let section = fragment
            .get(FRAGMENT_KEY)
            .ok_or_else(|| ConfigError::MissingField(FRAGMENT_KEY.to_string()))?;

        let config: RewardConfig = serde_json::from_value(section.clone())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a training configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(&value)
    }

    /// Parse a training configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Parse a training configuration file. `.json` files are read as
    /// JSON, everything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        if is_json_path(path) {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.path.trim().is_empty() {
            return Err(ConfigError::MissingField(format!("{}.path", FRAGMENT_KEY)));
        }

        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingField(format!("{}.name", FRAGMENT_KEY)));
        }

        Ok(())
    }
}

/// Whether a file should be parsed as JSON rather than YAML.
pub(crate) fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CONFIG: &str = r#"
data:
  train_batch_size: 256
custom_reward_function:
  path: "builtin:gsm8k"
  name: compute_score
"#;

    #[test]
    fn test_parse_valid_yaml() {
        let config = RewardConfig::from_yaml(VALID_CONFIG).unwrap();
        assert_eq!(config.path(), "builtin:gsm8k");
        assert_eq!(config.name(), "compute_score");
    }

    #[test]
    fn test_parse_valid_json() {
        let config = RewardConfig::from_json(
            r#"{"custom_reward_function": {"path": "./rewards/tdhc.yaml", "name": "compute_score"}}"#,
        )
        .unwrap();
        assert_eq!(config, RewardConfig::new("./rewards/tdhc.yaml", "compute_score"));
    }

    #[test]
    fn test_scalar_fragment_rejected() {
        let result = RewardConfig::from_yaml("custom_reward_function: invalid_value");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_missing_fragment_rejected() {
        let result = RewardConfig::from_yaml("trainer:\n  total_epochs: 1\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_empty_path_rejected() {
        let yaml = r#"
custom_reward_function:
  path: ""
  name: compute_score
"#;
        match RewardConfig::from_yaml(yaml) {
            Err(ConfigError::MissingField(field)) => {
                assert_eq!(field, "custom_reward_function.path");
            }
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_name_rejected() {
        let yaml = r#"
custom_reward_function:
  path: "builtin:gsm8k"
  name: "  "
"#;
        match RewardConfig::from_yaml(yaml) {
            Err(ConfigError::MissingField(field)) => {
                assert_eq!(field, "custom_reward_function.name");
            }
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        let result = RewardConfig::from_yaml("custom_reward_function: [unclosed");
        assert!(matches!(result, Err(ConfigError::YamlError(_))));
    }

    #[test]
    fn test_from_file_picks_format_by_extension() {
        let dir = std::env::temp_dir();
        let json_path = dir.join(format!("rewardkit-config-{}.json", std::process::id()));
        let yaml_path = dir.join(format!("rewardkit-config-{}.yaml", std::process::id()));

        fs::write(
            &json_path,
            r#"{"custom_reward_function": {"path": "builtin:verdict", "name": "my_reward_fn"}}"#,
        )
        .unwrap();
        fs::write(&yaml_path, VALID_CONFIG).unwrap();

        assert_eq!(RewardConfig::from_file(&json_path).unwrap().name(), "my_reward_fn");
        assert_eq!(RewardConfig::from_file(&yaml_path).unwrap().path(), "builtin:gsm8k");

        fs::remove_file(json_path).ok();
        fs::remove_file(yaml_path).ok();
    }

    #[test]
    fn test_missing_file() {
        let result = RewardConfig::from_file("/nonexistent/rewardkit/train.yaml");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
