//! Reward function registry and loader.
//!
//! A [`RewardConfig`] names a module path and a symbol. The registry maps
//! module paths to statically registered [`RewardModule`]s; paths that are
//! not registered are read as declarative manifest files. No external code
//! is ever executed.
//!
//! ## Usage
//!
//! ```ignore
//! let registry = RewardRegistry::with_defaults();
//! let config = RewardConfig::new("builtin:gsm8k", "compute_score");
//! let reward_fn = registry.load(&config)?;
//!
//! assert_eq!(reward_fn.compute("#### 72", "72"), 1.0);
//! ```

mod builtin;
mod manifest;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{ConfigError, RewardConfig};
use crate::function::SharedRewardFn;

pub use builtin::{gsm8k_module, verdict_module, BUILTIN_SCHEME, GSM8K_MODULE, VERDICT_MODULE};
pub use manifest::{load_manifest, FunctionSpec, Manifest, ManifestError};

/// Errors raised while resolving a reward function.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Invalid reward config: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot resolve reward module '{path}': {reason}")]
    Resolution { path: String, reason: String },

    #[error("Reward function '{name}' not found in module '{path}'. Available: [{available}]")]
    SymbolNotFound {
        path: String,
        name: String,
        available: String,
    },
}

/// A unit of reward functions addressable by path.
///
/// Implement this trait to expose a new family of reward functions. Each
/// module is responsible for:
/// 1. Providing a unique path
/// 2. Listing the symbols it exports
/// 3. Resolving a symbol to a ready-to-call reward function
pub trait RewardModule: Send + Sync {
    /// Path this module is registered under (e.g. "builtin:gsm8k").
    fn path(&self) -> &str;

    /// Exported symbol names, sorted.
    fn symbols(&self) -> Vec<&str>;

    /// Resolve a symbol. `None` when the module does not export it.
    fn resolve(&self, name: &str) -> Option<SharedRewardFn>;

    /// Human-readable description of this module.
    fn description(&self) -> &str {
        "Reward module"
    }
}

/// A module backed by a fixed table of reward functions.
pub struct StaticModule {
    path: String,
    description: String,
    functions: BTreeMap<String, SharedRewardFn>,
}

impl StaticModule {
    pub fn new(path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
            functions: BTreeMap::new(),
        }
    }

    /// Export a reward function under `name`, replacing any previous one.
    pub fn export(mut self, name: impl Into<String>, function: SharedRewardFn) -> Self {
        self.functions.insert(name.into(), function);
        self
    }
}

impl RewardModule for StaticModule {
    fn path(&self) -> &str {
        &self.path
    }

    fn symbols(&self) -> Vec<&str> {
        self.functions.keys().map(|s| s.as_str()).collect()
    }

    fn resolve(&self, name: &str) -> Option<SharedRewardFn> {
        self.functions.get(name).cloned()
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for StaticModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticModule")
            .field("path", &self.path)
            .field("symbols", &self.symbols())
            .finish()
    }
}

/// Registry of reward modules, keyed by path.
#[derive(Default)]
pub struct RewardRegistry {
    modules: BTreeMap<String, Arc<dyn RewardModule>>,
}

impl RewardRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in modules registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(verdict_module()));
        registry.register(Arc::new(gsm8k_module()));
        registry
    }

    /// Register a module.
    ///
    /// If a module with the same path already exists, it will be replaced.
    pub fn register(&mut self, module: Arc<dyn RewardModule>) {
        self.modules.insert(module.path().to_string(), module);
    }

    /// Resolve a reward function from configuration.
    ///
    /// Registered paths are looked up directly. `builtin:` paths that are not
    /// registered fail; any other path is read as a manifest file.
    ///
    /// The function is returned as the module exported it. Nothing is cached.
    pub fn load(&self, config: &RewardConfig) -> Result<SharedRewardFn, LoadError> {
        let path = config.path();
        let module = self.resolve_module(path)?;

        let function = module
            .resolve(config.name())
            .ok_or_else(|| LoadError::SymbolNotFound {
                path: path.to_string(),
                name: config.name().to_string(),
                available: module.symbols().join(", "),
            })?;

        tracing::info!(path, name = config.name(), "Loaded reward function");
        Ok(function)
    }

    /// Parse the `custom_reward_function` fragment and resolve it.
    pub fn load_fragment(&self, fragment: &serde_json::Value) -> Result<SharedRewardFn, LoadError> {
        let config = RewardConfig::from_value(fragment)?;
        self.load(&config)
    }

    fn resolve_module(&self, path: &str) -> Result<Arc<dyn RewardModule>, LoadError> {
        if let Some(module) = self.modules.get(path) {
            return Ok(Arc::clone(module));
        }

        if path.starts_with(BUILTIN_SCHEME) {
            return Err(LoadError::Resolution {
                path: path.to_string(),
                reason: format!(
                    "no such built-in module. Registered: {:?}",
                    self.available_paths()
                ),
            });
        }

        tracing::debug!(path, "Module not registered, reading manifest");
        Ok(Arc::new(load_manifest(path)?))
    }

    /// List registered module paths.
    pub fn available_paths(&self) -> Vec<&str> {
        self.modules.keys().map(|s| s.as_str()).collect()
    }

    /// Check if a module path is registered.
    pub fn has_module(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }

    /// Get a registered module.
    pub fn get_module(&self, path: &str) -> Option<&Arc<dyn RewardModule>> {
        self.modules.get(path)
    }
}

impl fmt::Debug for RewardRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewardRegistry")
            .field("modules", &self.available_paths())
            .finish()
    }
}

/// Resolve a reward function against the built-in registry.
pub fn load(config: &RewardConfig) -> Result<SharedRewardFn, LoadError> {
    RewardRegistry::with_defaults().load(config)
}

/// Parse a training configuration fragment and resolve its reward function
/// against the built-in registry.
pub fn load_reward_function(fragment: &serde_json::Value) -> Result<SharedRewardFn, LoadError> {
    RewardRegistry::with_defaults().load_fragment(fragment)
}
