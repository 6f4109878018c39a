use crate::errors::BenchResult;
use config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:1234/v1/chat/completions";
pub const DEFAULT_API_MODEL: &str = "glm-4.7-v4-fast";

/// Settings for the chat-completions benchmark
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-request ceiling; large prompts can take many minutes to prefill
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
}

impl Settings {
    /// Defaults layered with `PREFILL_BENCH__*` environment variables,
    /// e.g. `PREFILL_BENCH__API__ENDPOINT`.
    pub fn new() -> BenchResult<Self> {
        let config = Config::builder()
            .set_default("api.endpoint", default_endpoint())?
            .set_default("api.model", default_model())?
            .set_default("api.timeout_secs", default_timeout_secs())?
            .set_default("api.max_tokens", default_max_tokens())?
            .add_source(
                Environment::with_prefix("PREFILL_BENCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        tracing::debug!(?settings, "loaded settings");
        Ok(settings)
    }
}

fn default_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_API_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    1800
}

fn default_max_tokens() -> u32 {
    5
}
