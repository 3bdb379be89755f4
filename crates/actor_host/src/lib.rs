//! # Actor Host - Main Entry Point
//!
//! Runs a population of per-entity actors on `actor_event_system`, each with
//! its own mailbox, private event bus and the built-in level and mail
//! systems. This entry point handles CLI parsing, configuration loading and
//! the application lifecycle.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run with default configuration
//! actor_host
//!
//! # Specify custom configuration
//! actor_host --config production.toml
//!
//! # Override specific settings
//! actor_host --actors 64 --mailbox-capacity 1024 --log-level debug
//!
//! # JSON logging for production
//! actor_host --json-logs
//! ```
//!
//! ## Configuration
//!
//! The host loads configuration from a TOML file (default: `config.toml`).
//! If the file doesn't exist, a default configuration will be created.
//!
//! ## Signal Handling
//!
//! The host shuts down gracefully on SIGINT (Ctrl+C) and SIGTERM. A second
//! signal exits immediately.

mod app;
mod cli;
mod config;
mod logging;
mod signals;
mod systems;

use app::Application;
use cli::CliArgs;
use config::AppConfig;

/// Main entry point for the actor host.
///
/// Called from `main` under `#[tokio::main]`.
pub async fn init() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Logging comes up before the real load so that load errors are visible
    let mut config = AppConfig::load_from_file(&args.config_path)
        .await
        .unwrap_or_default();
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }

    if let Err(e) = logging::setup_logging(&config.logging, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        return Err(e);
    }

    let app = Application::new(args).await?;
    app.run().await
}

pub use config::{HostSettings, LoggingSettings};
pub use systems::{
    install as install_systems, LevelSystem, MailSystem, PlayerProgress, WorldState, ADD_EXP,
    EXP_PER_LEVEL, LEVEL_UP, MAIL_RECEIVED, MAX_LEVEL, SERVER_STARTED,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.host.actor_count, 8);
        assert_eq!(config.runtime.mailbox_capacity, 256);
    }

    #[test]
    fn test_cli_parsing() {
        let args = CliArgs::parse_from(["actor_host"]).unwrap();
        assert_eq!(args.config_path, PathBuf::from("config.toml"));
        assert_eq!(args.log_level, None);
        assert!(!args.json_logs);
        assert_eq!(args.actors, None);

        let args = CliArgs::parse_from([
            "actor_host",
            "--config",
            "prod.toml",
            "-l",
            "debug",
            "--json-logs",
            "--actors",
            "3",
            "-m",
            "16",
        ])
        .unwrap();
        assert_eq!(args.config_path, PathBuf::from("prod.toml"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.json_logs);
        assert_eq!(args.actors, Some(3));
        assert_eq!(args.mailbox_capacity, Some(16));

        assert!(CliArgs::parse_from(["actor_host", "--actors", "many"]).is_err());
    }

    #[tokio::test]
    async fn test_application_applies_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("host.toml");
        let args = CliArgs::parse_from([
            "actor_host".to_string(),
            "--config".to_string(),
            path.display().to_string(),
            "--actors".to_string(),
            "3".to_string(),
            "--mailbox-capacity".to_string(),
            "16".to_string(),
        ])
        .unwrap();

        let app = Application::new(args).await.unwrap();
        assert_eq!(app.config().host.actor_count, 3);
        assert_eq!(app.runtime().config().mailbox_capacity, 16);
        assert_eq!(app.runtime().factories().len(), 2);

        let actors = app.spawn_actors().unwrap();
        assert_eq!(actors.len(), 3);
        assert_eq!(app.world().player_count(), 3);
        assert!(app.runtime().registry().has_actor("player-2"));
        assert_eq!(actors[0].mailbox().capacity(), 16);

        for actor in &actors {
            actor.close().await;
        }
        assert_eq!(app.runtime().registry().actor_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_override_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("host.toml");
        let args = CliArgs::parse_from([
            "actor_host".to_string(),
            "--config".to_string(),
            path.display().to_string(),
            "--log-level".to_string(),
            "loud".to_string(),
        ])
        .unwrap();

        assert!(Application::new(args).await.is_err());
    }
}
