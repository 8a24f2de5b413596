use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub provider: ProviderConfig,
}

/// Upstream marketplace connection settings.
///
/// The token is optional at load time: construction must always succeed and
/// only the first real operation may fail on a missing credential.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_page_cap")]
    pub page_cap: u32,
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

fn default_timeout_seconds() -> u64 {
    30
}

// Safety cap on cursor chains; the upstream contract has no bound of its own.
fn default_page_cap() -> u32 {
    200
}

fn default_page_limit() -> u32 {
    50
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.marketplace.test".to_string(),
            api_token: None,
            timeout_seconds: default_timeout_seconds(),
            page_cap: default_page_cap(),
            page_limit: default_page_limit(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default").required(false))
            // Environment-specific overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in settings from the environment (with a prefix of FARELINK)
            // Eg.. `FARELINK__PROVIDER__API_TOKEN=...` would set the token
            .add_source(config::Environment::with_prefix("FARELINK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
