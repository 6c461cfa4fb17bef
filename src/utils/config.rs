use serde::Deserialize;

use crate::utils::error::VoxpassError;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Port the API listens on (default 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    pub database_url: String,

    /// Shared secret the web UI sends as a bearer token on every call
    pub api_key: String,

    /// Base URL of the hosted auth provider, e.g. https://xyz.supabase.co
    pub auth_url: String,

    /// Publishable key sent alongside user session tokens
    pub auth_anon_key: String,

    /// Public site base used when building invite links
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Per-request timeout in ms before the server gives up on a handler
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerConfig {
    pub fn load() -> Result<Self, VoxpassError> {
        dotenvy::dotenv().ok();

        let cfg: ServerConfig = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()?;

        if cfg.api_key.is_empty() {
            return Err(VoxpassError::ConfigError(
                "api_key must not be empty".to_string(),
            ));
        }

        Ok(cfg)
    }
}

fn default_port() -> u16 {
    8080
}

fn default_site_url() -> String {
    "https://voxtrav.info".to_string()
}

fn default_timeout_ms() -> u64 {
    5_000
}
