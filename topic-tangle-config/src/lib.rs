use core::fmt::{Debug, Display};
use std::path::Path;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;
use topic_tangle_allocator::AllocatorOptions;

pub const CONFIG_FILE: &str = "topic-tangle.toml";
pub const ENV_PREFIX: &str = "TOPIC_TANGLE_";

#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct IcebreakerConfig {
    pub enabled: bool,
    /// Seed of the built-in question bank. Falls back to the allocator seed.
    pub seed: Option<u64>,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directives, overridden by `RUST_LOG`.
    pub filter: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub allocator: AllocatorOptions,
    pub icebreakers: IcebreakerConfig,
    pub log: LogConfig,
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

pub fn get_config() -> Result<Config, ConfigError> {
    get_config_from(CONFIG_FILE)
}

/// Reads `path` if it exists, then `TOPIC_TANGLE_*` variables with `__` as the
/// nesting separator, e.g. `TOPIC_TANGLE_ALLOCATOR__SEED=7`.
pub fn get_config_from(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    Ok(Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?)
}
