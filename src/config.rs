use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::notify::slack::DEFAULT_SLACK_API_URL;

/// Main configuration structure for Baton
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BatonConfig {
    /// Where project state lives
    pub store: StoreConfig,
    /// Clock sampler settings
    pub sampler: SamplerConfig,
    /// Hand-off notification settings
    pub notifications: NotificationsConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    File,
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Directory for the file backend
    pub directory: PathBuf,
    /// SQLite URL for the sqlite backend
    pub database_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::File,
            directory: PathBuf::from(".baton/projects"),
            database_url: "sqlite://.baton/baton.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SamplerConfig {
    /// Seconds between two ticks
    pub tick_interval_seconds: u64,
    /// Lock file that keeps a second sampler off the same store
    pub lock_file: PathBuf,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            tick_interval_seconds: 60,
            lock_file: PathBuf::from(".baton/sampler.lock"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NotificationsConfig {
    /// Post hand-offs to Slack instead of only logging them
    pub slack_enabled: bool,
    /// Bot token (can be set via SLACK_BOT_TOKEN)
    pub slack_bot_token: Option<String>,
    /// Channel id or name (can be set via SLACK_CHANNEL_ID)
    pub slack_channel: Option<String>,
    pub slack_api_url: String,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            slack_enabled: false,
            slack_bot_token: None, // Will be read from env var
            slack_channel: None,
            slack_api_url: DEFAULT_SLACK_API_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl BatonConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (baton.toml, .baton-rc, or an explicit path)
    /// 3. Environment variables (prefixed with BATON_, sections split by `__`)
    pub fn load_with(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&BatonConfig::default())?);

        match config_file {
            Some(path) => {
                builder = builder.add_source(File::from(path));
            }
            None => {
                if Path::new("baton.toml").exists() {
                    builder = builder.add_source(File::with_name("baton"));
                }

                if Path::new(".baton-rc").exists() {
                    builder = builder
                        .add_source(File::with_name(".baton-rc").format(config::FileFormat::Toml));
                }
            }
        }

        // Override with environment variables, e.g. BATON_STORE__BACKEND=memory
        builder = builder.add_source(
            Environment::with_prefix("BATON")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut baton_config: BatonConfig = builder.build()?.try_deserialize()?;

        // Slack credentials keep their conventional names as fallbacks
        if baton_config.notifications.slack_bot_token.is_none() {
            if let Ok(token) = std::env::var("SLACK_BOT_TOKEN") {
                baton_config.notifications.slack_bot_token = Some(token);
            }
        }
        if baton_config.notifications.slack_channel.is_none() {
            if let Ok(channel) = std::env::var("SLACK_CHANNEL_ID") {
                baton_config.notifications.slack_channel = Some(channel);
            }
        }

        Ok(baton_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }

    /// Copy with secrets blanked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.notifications.slack_bot_token.is_some() {
            copy.notifications.slack_bot_token = Some("<redacted>".to_string());
        }
        copy
    }
}
