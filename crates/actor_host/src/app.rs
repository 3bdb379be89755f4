//! Main application logic and lifecycle management.
//!
//! [`Application`] owns the runtime context, spawns the configured actor
//! population, drives the periodic tasks and performs the ordered shutdown.

use crate::{
    cli::CliArgs,
    config::AppConfig,
    logging::display_banner,
    signals::{wait_for_shutdown_signal, wait_for_shutdown_signal_silent},
    systems::{self, WorldState, ADD_EXP, MAIL_RECEIVED, SERVER_STARTED},
};
use actor_event_system::{legacy, Actor, Event, EventArg, RuntimeContext};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Upper bound on closing every actor during shutdown.
const ACTOR_CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// The actor host process.
///
/// Built from CLI arguments merged over the configuration file. Running it
/// spawns `host.actor_count` actors with the level and mail systems
/// installed, then waits for a termination signal.
pub struct Application {
    config: AppConfig,
    runtime: Arc<RuntimeContext>,
    world: Arc<WorldState>,
}

impl Application {
    /// Loads configuration, applies CLI overrides, validates the result and
    /// builds the runtime.
    ///
    /// # Process
    ///
    /// 1. Load configuration from file (creating default if missing)
    /// 2. Apply command-line argument overrides
    /// 3. Validate merged configuration
    /// 4. Display startup banner
    /// 5. Build the runtime context and install the gameplay systems
    pub async fn new(args: CliArgs) -> anyhow::Result<Self> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Some(actors) = args.actors {
            config.host.actor_count = actors;
        }

        if let Some(capacity) = args.mailbox_capacity {
            config.runtime.mailbox_capacity = capacity;
        }

        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Configuration validation failed: {e}"))?;
        info!("✅ Configuration loaded and validated successfully");

        display_banner();

        let runtime = Arc::new(RuntimeContext::new(config.runtime.clone()));
        let world = WorldState::new();
        systems::install(&runtime, &world);

        Ok(Self {
            config,
            runtime,
            world,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn runtime(&self) -> &Arc<RuntimeContext> {
        &self.runtime
    }

    pub fn world(&self) -> &Arc<WorldState> {
        &self.world
    }

    /// Spawns one actor per configured slot, named `<prefix>-<index>`.
    pub fn spawn_actors(&self) -> anyhow::Result<Vec<Actor>> {
        let prefix = &self.config.host.actor_id_prefix;
        let mut actors = Vec::with_capacity(self.config.host.actor_count);
        for index in 0..self.config.host.actor_count {
            actors.push(self.runtime.spawn_actor(format!("{prefix}-{index}"))?);
        }
        Ok(actors)
    }

    /// Runs until a termination signal arrives, then shuts down in order:
    /// periodic tasks, actors, runtime.
    pub async fn run(self) -> anyhow::Result<()> {
        info!("🌟 Starting actor host");
        self.log_configuration_summary();

        legacy::subscribe(SERVER_STARTED, |_ctx, event| {
            let actors = event.arg::<usize>(0).copied().unwrap_or_default();
            info!("📣 Server started with {} actors", actors);
        });

        let actors = self.spawn_actors()?;
        info!("🎭 Spawned {} actors", actors.len());

        let announcement = vec![Arc::new(actors.len()) as EventArg];
        if let Err(e) = legacy::publish(SERVER_STARTED, announcement).await {
            warn!("Startup announcement failed: {e}");
        }

        let welcomed = self
            .runtime
            .broadcast(Event::new(MAIL_RECEIVED).with_source("host"));
        info!("📬 Welcome mail delivered to {} actors", welcomed);

        let tick_handle = self.spawn_tick_task();
        let monitoring_handle = self.spawn_monitoring_task();

        info!("✅ Actor host is now running!");
        info!("🛑 Press Ctrl+C to gracefully shutdown");

        wait_for_shutdown_signal().await?;

        // merciless shutdown
        tokio::spawn(async move {
            if let Err(e) = wait_for_shutdown_signal_silent().await {
                error!("Failed to set up merciless shutdown signal handler: {e}");
                return;
            }

            warn!("Shutdown handler received again! I'll make this quick.");
            std::process::exit(1);
        });

        info!("📡 Phase 1: Stopping periodic tasks...");
        if let Some(handle) = tick_handle {
            handle.abort();
        }
        monitoring_handle.abort();

        info!("⏳ Phase 2: Closing {} actors...", actors.len());
        let closing = join_all(actors.iter().map(|actor| actor.close()));
        if tokio::time::timeout(ACTOR_CLOSE_TIMEOUT, closing).await.is_err() {
            warn!(
                "⏰ Actors did not close within {:?}, proceeding with shutdown",
                ACTOR_CLOSE_TIMEOUT
            );
        } else {
            info!("✅ All actors closed");
        }

        info!("🧹 Phase 3: Shutting down runtime...");
        self.runtime.shutdown();

        self.log_final_statistics();
        info!("✅ Actor host shutdown complete");

        Ok(())
    }

    /// Grants experience to every actor on each tick. `None` when ticking is
    /// disabled.
    fn spawn_tick_task(&self) -> Option<tokio::task::JoinHandle<()>> {
        let interval_ms = self.config.host.tick_interval_ms;
        if interval_ms == 0 {
            return None;
        }

        let runtime = Arc::clone(&self.runtime);
        let amount = self.config.host.exp_per_tick;
        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
            // first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let tick = Event::new(ADD_EXP).with_source("tick").with_arg(amount);
                let delivered = runtime.broadcast(tick);
                tracing::trace!(delivered, amount, "Experience tick");
            }
        }))
    }

    fn spawn_monitoring_task(&self) -> tokio::task::JoinHandle<()> {
        let runtime = Arc::clone(&self.runtime);
        let world = Arc::clone(&self.world);
        let period = Duration::from_secs(self.config.host.health_interval_secs);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            let mut last_delivered = 0u64;

            loop {
                interval.tick().await;

                let stats = runtime.registry_stats();
                let delivered_this_period = stats.delivered - last_delivered;
                last_delivered = stats.delivered;

                info!(
                    "📊 System Health - {} actors | {} delivered | {} dropped | level {} | {} mail",
                    stats.registered,
                    delivered_this_period,
                    stats.dropped,
                    world.highest_level(),
                    world.total_mail()
                );

                if stats.dropped > 0 {
                    warn!("📭 {} events dropped on full or closed mailboxes", stats.dropped);
                }
            }
        })
    }

    fn log_configuration_summary(&self) {
        info!("📋 Configuration Summary:");
        info!(
            "  🎭 Actors: {} ({}-N)",
            self.config.host.actor_count, self.config.host.actor_id_prefix
        );
        info!("  📮 Mailbox capacity: {}", self.config.runtime.mailbox_capacity);
        info!("  ⏱️ Event timeout: {}ms", self.config.runtime.event_timeout_ms);
        info!("  🧹 Drain timeout: {}ms", self.config.runtime.drain_timeout_ms);
        if self.config.host.tick_interval_ms == 0 {
            info!("  ⏸️ Experience ticks disabled");
        } else {
            info!(
                "  ⭐ {} exp every {}ms",
                self.config.host.exp_per_tick, self.config.host.tick_interval_ms
            );
        }
    }

    fn log_final_statistics(&self) {
        let stats = self.runtime.registry_stats();
        info!("📊 Final Statistics:");
        info!("  - Events delivered: {}", stats.delivered);
        info!("  - Events dropped: {}", stats.dropped);
        info!("  - Players: {}", self.world.player_count());
        info!("  - Highest level: {}", self.world.highest_level());
        info!("  - Mail sent: {}", self.world.total_mail());
    }
}
