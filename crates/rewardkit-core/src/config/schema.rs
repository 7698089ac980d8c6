//! JSON Schema validation for the reward configuration fragment.
//!
//! The fragment must carry `custom_reward_function` with exactly two string
//! fields, `path` and `name`. Other top-level training keys are ignored.

use std::sync::OnceLock;
use thiserror::Error;

/// Embedded fragment schema (loaded at compile time).
const REWARD_CONFIG_SCHEMA_JSON: &str = include_str!("../../schema/reward_config.schema.json");

/// Compiled JSON Schema validator (initialized once, reused).
// Compile errors are not `Clone`, so a failure is cached as its message.
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

/// Errors from schema validation.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to load schema: {0}")]
    LoadError(String),
}

fn get_validator() -> Result<&'static jsonschema::Validator, SchemaError> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: serde_json::Value = match serde_json::from_str(REWARD_CONFIG_SCHEMA_JSON)
        {
            Ok(v) => v,
            Err(e) => return Err(format!("Invalid schema JSON: {}", e)),
        };

        match jsonschema::options().build(&schema_value) {
            Ok(v) => Ok(v),
            Err(e) => Err(format!("Failed to compile schema: {}", e)),
        }
    });

    match result {
        Ok(v) => Ok(v),
        Err(e) => Err(SchemaError::LoadError(e.clone())),
    }
}

/// Validate a configuration fragment against the schema.
///
/// Returns every violation, each suffixed with its instance path.
pub fn validate_fragment_schema(fragment: &serde_json::Value) -> Result<(), Vec<String>> {
    let validator = get_validator().map_err(|e| vec![e.to_string()])?;

    let errors: Vec<String> = validator
        .iter_errors(fragment)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
