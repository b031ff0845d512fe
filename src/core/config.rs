use crate::core::currency::{Currency, HOME_CURRENCY};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MarketStackConfig {
    pub base_url: String,
    /// Name of the secret holding the API access key.
    #[serde(default = "default_access_key_name")]
    pub access_key_name: String,
}

fn default_access_key_name() -> String {
    crate::core::secrets::SECRET_TOKEN_MARKETSTACK.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RatesConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub marketstack: Option<MarketStackConfig>,
    pub rates: Option<RatesConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            marketstack: Some(MarketStackConfig {
                base_url: "http://api.marketstack.com".to_string(),
                access_key_name: default_access_key_name(),
            }),
            rates: Some(RatesConfig {
                base_url: "https://api.exchangeratesapi.io".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_home_currency")]
    pub home_currency: Currency,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

fn default_home_currency() -> Currency {
    HOME_CURRENCY
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "stockwatch")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
