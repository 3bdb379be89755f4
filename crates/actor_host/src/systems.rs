//! Built-in gameplay systems.
//!
//! Two small systems wired through the capability contract:
//!
//! - [`LevelSystem`] turns `ADD_EXP` into levels and emits `LEVEL_UP` through
//!   the actor's local publisher
//! - [`MailSystem`] counts mail and sends a reward mail on every `LEVEL_UP`,
//!   running after any other `LEVEL_UP` handler
//!
//! Progress is mirrored into a shared [`WorldState`] so the host can report
//! on it without touching actors.

use actor_event_system::{Actor, Event, EventError, EventType, RuntimeContext, System, SystemError};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

pub const ADD_EXP: EventType = EventType::new(1);
pub const LEVEL_UP: EventType = EventType::new(2);
pub const MAIL_RECEIVED: EventType = EventType::new(3);
pub const SERVER_STARTED: EventType = EventType::new(100);

/// Experience needed to leave level `n` is `n * EXP_PER_LEVEL`.
pub const EXP_PER_LEVEL: u64 = 100;

/// Level cap. Experience keeps accumulating past it, saturating at `u64::MAX`.
pub const MAX_LEVEL: u32 = 1_000;

/// Level and unspent experience of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerProgress {
    pub level: u32,
    pub exp: u64,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self { level: 1, exp: 0 }
    }
}

impl PlayerProgress {
    /// Adds experience and returns every level reached on the way.
    pub fn gain(&mut self, amount: u64) -> Vec<u32> {
        self.exp = self.exp.saturating_add(amount);
        let mut reached = Vec::new();
        while self.level < MAX_LEVEL {
            let cost = u64::from(self.level) * EXP_PER_LEVEL;
            if self.exp < cost {
                break;
            }
            self.exp -= cost;
            self.level += 1;
            reached.push(self.level);
        }
        reached
    }
}

/// Read-only view of every player's progress and mail.
#[derive(Debug, Default)]
pub struct WorldState {
    progress: DashMap<String, PlayerProgress>,
    mail: DashMap<String, u64>,
}

impl WorldState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn progress(&self, actor_id: &str) -> Option<PlayerProgress> {
        self.progress.get(actor_id).map(|entry| *entry)
    }

    pub fn mail_count(&self, actor_id: &str) -> u64 {
        self.mail.get(actor_id).map(|entry| *entry).unwrap_or(0)
    }

    pub fn player_count(&self) -> usize {
        self.progress.len()
    }

    pub fn highest_level(&self) -> u32 {
        self.progress.iter().map(|entry| entry.level).max().unwrap_or(0)
    }

    pub fn total_mail(&self) -> u64 {
        self.mail.iter().map(|entry| *entry).sum()
    }

    fn add_mail(&self, actor_id: &str) -> u64 {
        let mut count = self.mail.entry(actor_id.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}

pub struct LevelSystem {
    world: Arc<WorldState>,
}

impl LevelSystem {
    pub fn new(world: Arc<WorldState>) -> Self {
        Self { world }
    }
}

impl System for LevelSystem {
    fn name(&self) -> &str {
        "level"
    }

    fn init(&mut self, actor: &Actor) -> Result<(), SystemError> {
        self.world
            .progress
            .insert(actor.id().to_string(), PlayerProgress::default());

        let world = Arc::clone(&self.world);
        let publisher = actor.publisher();
        actor.subscribe_async(ADD_EXP, 10, move |_ctx, event| {
            let world = Arc::clone(&world);
            let publisher = publisher.clone();
            async move {
                let amount = event.arg::<u64>(0).copied().unwrap_or_default();
                // the map guard must be gone before publishing
                let reached = match world.progress.get_mut(publisher.actor_id()) {
                    Some(mut progress) => progress.gain(amount),
                    None => Vec::new(),
                };

                for level in reached {
                    let level_up = Event::new(LEVEL_UP)
                        .with_source(publisher.actor_id())
                        .with_arg(level);
                    publisher.publish(&level_up).await?;
                }
                Ok::<(), EventError>(())
            }
        });
        Ok(())
    }

    fn on_close(&self) {
        debug!(players = self.world.player_count(), "Level system closing");
    }
}

pub struct MailSystem {
    world: Arc<WorldState>,
}

impl MailSystem {
    pub fn new(world: Arc<WorldState>) -> Self {
        Self { world }
    }
}

impl System for MailSystem {
    fn name(&self) -> &str {
        "mail"
    }

    fn init(&mut self, actor: &Actor) -> Result<(), SystemError> {
        let world = Arc::clone(&self.world);
        let id = actor.id().to_string();
        actor.subscribe(MAIL_RECEIVED, 0, move |_ctx, _event| {
            world.add_mail(&id);
            Ok(())
        });

        let world = Arc::clone(&self.world);
        let id = actor.id().to_string();
        actor.subscribe(LEVEL_UP, -10, move |_ctx, event| {
            let level = event.arg::<u32>(0).copied().unwrap_or_default();
            let total = world.add_mail(&id);
            info!(actor_id = %id, level, mail = total, "Level-up reward mailed");
            Ok(())
        });
        Ok(())
    }
}

/// Registers both systems on `runtime`.
pub fn install(runtime: &RuntimeContext, world: &Arc<WorldState>) {
    let level_world = Arc::clone(world);
    runtime.register_system_factory(move || Box::new(LevelSystem::new(Arc::clone(&level_world))));

    let mail_world = Arc::clone(world);
    runtime.register_system_factory(move || Box::new(MailSystem::new(Arc::clone(&mail_world))));
}
