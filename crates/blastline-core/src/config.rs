//! Blastline configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlastlineConfig {
    /// User whose campaigns the scheduler runs when none is given on the CLI.
    #[serde(default = "default_user")]
    pub default_user: String,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
}

fn default_user() -> String { "default".into() }

impl Default for BlastlineConfig {
    fn default() -> Self {
        Self {
            default_user: default_user(),
            scheduler: SchedulerConfig::default(),
            store: StoreConfig::default(),
            channel: ChannelConfig::default(),
        }
    }
}

impl BlastlineConfig {
    /// Load config from the default path (~/.blastline/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::BlastlineError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| crate::error::BlastlineError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Blastline home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".blastline")
    }
}

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between due-campaign scans.
    #[serde(default = "default_tick_secs")]
    pub tick_interval_secs: u64,
}

fn default_tick_secs() -> u64 { 60 }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { tick_interval_secs: default_tick_secs() }
    }
}

/// Campaign store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the campaigns JSON file. `~` is expanded.
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_path() -> String { "~/.blastline/campaigns.json".into() }

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: default_store_path() }
    }
}

/// Channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelConfig {
    #[serde(default)]
    pub whatsapp: Option<WhatsAppChannelConfig>,
}

/// WhatsApp Business Cloud API channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppChannelConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    /// Permanent access token for the Business account.
    pub access_token: String,
    /// Sender phone number ID (not the raw number).
    pub phone_number_id: String,
}

fn bool_true() -> bool { true }
