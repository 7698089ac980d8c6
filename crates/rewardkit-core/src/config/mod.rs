//! Reward configuration.
//!
//! A training configuration selects its reward function through the
//! `custom_reward_function` fragment. This module parses and validates that
//! fragment from YAML or JSON.

mod parser;
mod schema;

pub(crate) use parser::is_json_path;
pub use parser::{ConfigError, RewardConfig, FRAGMENT_KEY};
pub use schema::{validate_fragment_schema, SchemaError};
