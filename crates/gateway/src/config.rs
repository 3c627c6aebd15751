//! Gateway configuration

use std::time::Duration;

use anyhow::{Context, Result};
use oplang_lib::DataSourceSettings;
use serde::Deserialize;

/// Config file read when `OPLANG_CONFIG` is unset; missing is fine
pub const DEFAULT_CONFIG_FILE: &str = "oplang-gateway.toml";

/// Gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Port for the data source API and health/metrics endpoints
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Base URL of the OpLang execution API
    pub backend_url: String,

    /// Bearer token for the execution API
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Name the data source logs under
    #[serde(default = "default_datasource_name")]
    pub datasource_name: String,
}

fn default_listen_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_datasource_name() -> String {
    "oplang".to_string()
}

impl GatewayConfig {
    /// Load configuration from the config file and `OPLANG_*` environment variables
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("OPLANG_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(config::Environment::with_prefix("OPLANG"));

        Self::from_builder(builder)
            .with_context(|| format!("failed to load gateway configuration ({})", path))
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let config = builder.build()?;
        let gateway: GatewayConfig = config
            .try_deserialize()
            .context("backend_url must be set (OPLANG_BACKEND_URL)")?;
        Ok(gateway)
    }

    pub fn datasource_settings(&self) -> DataSourceSettings {
        DataSourceSettings::new(self.backend_url.clone())
            .with_name(self.datasource_name.clone())
            .with_api_key(self.api_key.clone())
            .with_timeout(Duration::from_secs(self.request_timeout_secs))
    }
}
