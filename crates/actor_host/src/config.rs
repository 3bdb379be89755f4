//! Configuration management for the actor host.
//!
//! Settings are read from a TOML file; a default file is written when none
//! exists. Missing keys fall back to their defaults.

use actor_event_system::RuntimeConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Actor runtime tunables
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Actor population and periodic tasks
    #[serde(default)]
    pub host: HostSettings,
}

/// Logging system configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

/// Host process settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSettings {
    /// Actors spawned at startup
    #[serde(default = "default_actor_count")]
    pub actor_count: usize,
    /// Actor ids are `<prefix>-<index>`
    #[serde(default = "default_actor_id_prefix")]
    pub actor_id_prefix: String,
    /// Seconds between health reports
    #[serde(default = "default_health_interval_secs")]
    pub health_interval_secs: u64,
    /// Milliseconds between experience ticks (0 to disable)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Experience granted to every actor on each tick
    #[serde(default = "default_exp_per_tick")]
    pub exp_per_tick: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_actor_count() -> usize {
    8
}

fn default_actor_id_prefix() -> String {
    "player".to_string()
}

fn default_health_interval_secs() -> u64 {
    60
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_exp_per_tick() -> u64 {
    25
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            actor_count: default_actor_count(),
            actor_id_prefix: default_actor_id_prefix(),
            health_interval_secs: default_health_interval_secs(),
            tick_interval_ms: default_tick_interval_ms(),
            exp_per_tick: default_exp_per_tick(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from `path`, writing the defaults there first if
    /// the file does not exist.
    pub async fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.runtime.validate()?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        if self.host.actor_id_prefix.is_empty() {
            return Err("host.actor_id_prefix cannot be empty".to_string());
        }

        if self.host.health_interval_secs == 0 {
            return Err("host.health_interval_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}
