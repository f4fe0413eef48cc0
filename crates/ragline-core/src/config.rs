//! Configuration loader and typed settings.
//!
//! Uses Figment to merge `ragline.toml` + `ragline.<env>.toml` + `RAGLINE_*`
//! env vars, then extracts serde-defaulted sections so every knob has a
//! working default when no config file is present.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::env;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("ragline.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("ragline.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("ragline.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("ragline.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("RAGLINE_").split("__"));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }
}

/// Knobs for the retrieval coordinator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Token budget for assembled context.
    pub max_context_tokens: usize,
    pub cache_ttl_secs: u64,
    pub cache_max_entries: usize,
    /// Minimum trigram similarity for a fuzzy match.
    pub fuzzy_threshold: f32,
    /// Neighbour radius (in chunk positions) for contextual expansion.
    pub context_window: usize,
    pub default_top_k: usize,
    pub default_threshold: f32,
    pub store_timeout_secs: u64,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            max_context_tokens: crate::tokens::DEFAULT_CONTEXT_TOKENS,
            cache_ttl_secs: 300,
            cache_max_entries: 1000,
            fuzzy_threshold: 0.8,
            context_window: 2,
            default_top_k: crate::types::DEFAULT_TOP_K,
            default_threshold: 0.1,
            store_timeout_secs: 5,
        }
    }
}

/// Knobs for strategy execution and multi-strategy coordination.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestratorSettings {
    pub max_concurrent_strategies: usize,
    pub generation_timeout_secs: u64,
    pub heartbeat_interval_secs: u64,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_concurrent_strategies: 3,
            generation_timeout_secs: 10,
            heartbeat_interval_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub retrieval: RetrievalSettings,
    pub orchestrator: OrchestratorSettings,
}

impl Settings {
    /// Missing or unreadable sections fall back to their defaults.
    pub fn from_config(config: &Config) -> Self {
        let retrieval = config
            .get::<RetrievalSettings>("retrieval")
            .unwrap_or_default();
        let orchestrator = config
            .get::<OrchestratorSettings>("orchestrator")
            .unwrap_or_default();
        Self { retrieval, orchestrator }
    }
}
