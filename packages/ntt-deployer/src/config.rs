use std::env;
use std::path::{Path, PathBuf};

use eyre::{eyre, Result, WrapErr};

use crate::registry::Network;
use crate::retry::RetryConfig;

/// Deployer configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub network: Network,
    pub lcd_url: String,
    /// JSON deployment registry
    pub registry_path: PathBuf,
    /// JSON declarative target
    pub target_path: PathBuf,
    /// Denom of storage funding transfers
    pub funding_denom: String,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("deployments.json")
}

fn default_target_path() -> PathBuf {
    PathBuf::from("ntt-target.json")
}

fn default_funding_denom() -> String {
    "uluna".to_string()
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    2000
}

impl Config {
    /// Load configuration from environment variables
    /// Loads .env file if present, then reads from environment
    pub fn load() -> Result<Self> {
        Self::load_from_file(".env").or_else(|_| Self::load_from_env())
    }

    /// Load from a specific .env file path
    pub fn load_from_file(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            dotenvy::from_filename(path)
                .wrap_err_with(|| format!("Failed to load .env file from {}", path))?;
        }
        Self::load_from_env()
    }

    /// Load configuration from environment variables
    fn load_from_env() -> Result<Self> {
        let network = env::var("NTT_NETWORK")
            .map_err(|_| eyre!("NTT_NETWORK environment variable is required"))?
            .parse()?;

        let config = Config {
            network,
            lcd_url: env::var("NTT_LCD_URL")
                .map_err(|_| eyre!("NTT_LCD_URL environment variable is required"))?,
            registry_path: env::var("NTT_REGISTRY_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_registry_path()),
            target_path: env::var("NTT_TARGET_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_target_path()),
            funding_denom: env::var("NTT_FUNDING_DENOM")
                .unwrap_or_else(|_| default_funding_denom()),
            retry_attempts: env::var("NTT_RETRY_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default_retry_attempts()),
            retry_backoff_ms: env::var("NTT_RETRY_BACKOFF_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default_retry_backoff()),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.lcd_url.starts_with("http://") && !self.lcd_url.starts_with("https://") {
            return Err(eyre!("NTT_LCD_URL must be an http(s) URL"));
        }
        if self.funding_denom.is_empty() {
            return Err(eyre!("NTT_FUNDING_DENOM cannot be empty"));
        }
        Ok(())
    }

    pub fn retry(&self) -> RetryConfig {
        RetryConfig::new(self.retry_attempts, self.retry_backoff_ms)
    }
}
