//! Configuration loading.
//!
//! Layered the way the rest of this codebase's configuration works:
//! built-in defaults, then an optional config file, then
//! `Environment::with_prefix` overrides, deserialized into a typed
//! struct. The configurable surface here is the engine's own tunables
//! that §4.2/§9 leave as constants-in-principle but which a real
//! deployment wants to override: initial table size, forced-resize
//! ratio, the timed-rehash batch budget, and the opportunistic-resize
//! startup switch.

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::ConfigError;

fn default_initial_size() -> usize {
    4
}

fn default_forced_resize_ratio() -> usize {
    5
}

fn default_rehash_batch_buckets() -> usize {
    100
}

fn default_rehash_budget_ms() -> u64 {
    1
}

fn default_resize_enabled() -> bool {
    true
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Smallest bucket count a `Dict`'s `ht[0]` ever shrinks to.
    #[serde(default = "default_initial_size")]
    pub initial_size: usize,

    /// `used / size` ratio above which resize fires even when
    /// opportunistic resizing is globally disabled (§4.2 "Global resize
    /// switch").
    #[serde(default = "default_forced_resize_ratio")]
    pub forced_resize_ratio: usize,

    /// Buckets migrated per batch by the timed rehash entry point.
    #[serde(default = "default_rehash_batch_buckets")]
    pub rehash_batch_buckets: usize,

    /// Wall-clock budget, in milliseconds, for one timed-rehash call.
    #[serde(default = "default_rehash_budget_ms")]
    pub rehash_budget_ms: u64,

    /// Startup value of the process-wide opportunistic-resize switch.
    #[serde(default = "default_resize_enabled")]
    pub resize_enabled: bool,

    /// `tracing` level filter, e.g. "info", "debug".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            initial_size: default_initial_size(),
            forced_resize_ratio: default_forced_resize_ratio(),
            rehash_batch_buckets: default_rehash_batch_buckets(),
            rehash_budget_ms: default_rehash_budget_ms(),
            resize_enabled: default_resize_enabled(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Loads settings from `config/default.toml` (if present) overlaid
    /// with `CHAINKV_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("initial_size", default_initial_size() as i64)
            .map_err(ConfigError::Load)?
            .set_default("forced_resize_ratio", default_forced_resize_ratio() as i64)
            .map_err(ConfigError::Load)?
            .set_default(
                "rehash_batch_buckets",
                default_rehash_batch_buckets() as i64,
            )
            .map_err(ConfigError::Load)?
            .set_default("rehash_budget_ms", default_rehash_budget_ms() as i64)
            .map_err(ConfigError::Load)?
            .set_default("resize_enabled", default_resize_enabled())
            .map_err(ConfigError::Load)?
            .set_default("log_level", default_log_level())
            .map_err(ConfigError::Load)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::with_prefix("CHAINKV").separator("_"));

        builder
            .build()
            .map_err(ConfigError::Load)?
            .try_deserialize()
            .map_err(ConfigError::Load)
    }
}
