use super::*;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const ON_ADD_EXP: EventType = EventType::new(1);
const ON_LEVEL_UP: EventType = EventType::new(2);
const ON_ANNOUNCE: EventType = EventType::new(3);

/// Leveling logic used across these tests: 100 exp per level.
struct LevelSystem {
    exp: Arc<AtomicU64>,
    level_ups: Arc<AtomicUsize>,
}

impl System for LevelSystem {
    fn name(&self) -> &str {
        "level"
    }

    fn init(&mut self, actor: &Actor) -> Result<(), SystemError> {
        let exp = Arc::clone(&self.exp);
        let publisher = actor.publisher();
        actor.subscribe_async(ON_ADD_EXP, 10, move |_ctx, event| {
            let exp = Arc::clone(&exp);
            let publisher = publisher.clone();
            async move {
                let gained = event.arg::<u64>(0).copied().unwrap_or_default();
                let before = exp.fetch_add(gained, Ordering::SeqCst);
                let after = before + gained;
                if after / 100 > before / 100 {
                    let level_up = Event::new(ON_LEVEL_UP)
                        .with_source(publisher.actor_id())
                        .with_arg(after / 100);
                    return publisher.publish(&level_up).await;
                }
                Ok(())
            }
        });

        let level_ups = Arc::clone(&self.level_ups);
        actor.subscribe(ON_LEVEL_UP, 0, move |_ctx, _event| {
            level_ups.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        Ok(())
    }
}

/// Handler implemented directly against the trait.
struct AnnouncementCounter {
    seen: Arc<AtomicUsize>,
}

#[async_trait]
impl EventHandler for AnnouncementCounter {
    async fn handle(&self, ctx: &EventContext, _event: &Event) -> Result<(), EventError> {
        ctx.check()?;
        self.seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn handler_name(&self) -> &str {
        "announcement_counter"
    }
}

#[tokio::test]
async fn test_broadcast_reaches_every_actor_system() {
    let runtime = RuntimeContext::default();
    let level_ups = Arc::new(AtomicUsize::new(0));
    let exp_totals: Arc<parking_lot::Mutex<Vec<Arc<AtomicU64>>>> = Arc::default();

    let (ups, totals) = (Arc::clone(&level_ups), Arc::clone(&exp_totals));
    runtime.register_system_factory(move || {
        let exp = Arc::new(AtomicU64::new(0));
        totals.lock().push(Arc::clone(&exp));
        Box::new(LevelSystem {
            exp,
            level_ups: Arc::clone(&ups),
        })
    });

    let actors: Vec<Actor> = (0..10)
        .map(|i| runtime.spawn_actor(format!("player-{i}")).unwrap())
        .collect();
    assert_eq!(runtime.registry().actor_count(), 10);

    assert_eq!(runtime.broadcast(Event::new(ON_ADD_EXP).with_arg(60u64)), 10);
    assert_eq!(runtime.broadcast(Event::new(ON_ADD_EXP).with_arg(60u64)), 10);

    for actor in &actors {
        actor.close().await;
    }

    // every actor crossed 100 exp exactly once
    assert_eq!(level_ups.load(Ordering::SeqCst), 10);
    for exp in exp_totals.lock().iter() {
        assert_eq!(exp.load(Ordering::SeqCst), 120);
    }
    assert_eq!(runtime.registry().actor_count(), 0);
    assert_eq!(runtime.registry_stats().delivered, 20);
}

#[tokio::test]
async fn test_targeted_broadcast() {
    let runtime = RuntimeContext::default();
    let seen = Arc::new(AtomicUsize::new(0));
    runtime.template().subscribe_handler(
        ON_ANNOUNCE,
        0,
        Arc::new(AnnouncementCounter {
            seen: Arc::clone(&seen),
        }),
    );

    let actors: Vec<Actor> = ["a", "b", "c"]
        .iter()
        .map(|id| runtime.spawn_actor(*id).unwrap())
        .collect();

    let delivered = runtime.broadcast_to_actors(Event::new(ON_ANNOUNCE), ["a", "c", "missing"]);
    assert_eq!(delivered, 2);

    for actor in &actors {
        actor.close().await;
    }
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_shutdown_detaches_running_actors() {
    let runtime = RuntimeContext::default();
    let actor = runtime.spawn_actor("hero").unwrap();

    runtime.shutdown();
    assert!(runtime.registry().is_closed());
    assert!(!runtime.send_to_actor("hero", Event::new(ON_ANNOUNCE)));
    assert_eq!(runtime.broadcast(Event::new(ON_ANNOUNCE)), 0);

    // still reachable directly until closed
    assert!(actor.is_running());
    assert!(actor.send(Event::new(ON_ANNOUNCE)).is_ok());
    actor.close().await;
    assert_eq!(actor.state(), ActorState::Closed);
}

#[tokio::test]
async fn test_independent_runtimes_do_not_share_state() {
    let first = RuntimeContext::default();
    let second = RuntimeContext::default();
    first.register_system_factory(|| {
        Box::new(LevelSystem {
            exp: Arc::default(),
            level_ups: Arc::default(),
        })
    });

    let a = first.spawn_actor("shared-id").unwrap();
    let b = second.spawn_actor("shared-id").unwrap();

    assert_eq!(a.system_names(), vec!["level"]);
    assert!(b.system_names().is_empty());
    assert_eq!(first.registry().actor_count(), 1);
    assert_eq!(second.registry().actor_count(), 1);

    a.close().await;
    assert!(second.registry().has_actor("shared-id"));
    b.close().await;
}

#[tokio::test]
async fn test_facade_uses_default_runtime() {
    facade::register_system_factory(|| {
        Box::new(LevelSystem {
            exp: Arc::default(),
            level_ups: Arc::default(),
        })
    });

    let actor = facade::new_actor("facade-hero", 8).unwrap();
    assert!(actor.get_system("level").is_some());
    assert!(facade::runtime().registry().has_actor("facade-hero"));

    assert!(facade::send_to_actor("facade-hero", Event::new(ON_ADD_EXP).with_arg(5u64)));
    assert_eq!(
        facade::broadcast_to_actors(Event::new(ON_ADD_EXP).with_arg(5u64), ["facade-hero"]),
        1
    );
    assert!(facade::broadcast(Event::new(ON_ANNOUNCE)) >= 1);

    actor.close().await;
    assert!(!facade::send_to_actor("facade-hero", Event::new(ON_ANNOUNCE)));
}

#[tokio::test]
async fn test_legacy_bus_is_separate() {
    // a type id no other test uses, the legacy bus is process-wide
    const LEGACY_PING: EventType = EventType::new(9_001);

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    legacy::subscribe(LEGACY_PING, move |_ctx, event| {
        if event.arg::<&str>(0) == Some(&"ping") {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });
    assert_eq!(legacy::subscriber_count(LEGACY_PING), 1);

    let args: Vec<EventArg> = vec![Arc::new("ping") as EventArg];
    legacy::publish(LEGACY_PING, args).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // actor buses never see legacy subscriptions
    let runtime = RuntimeContext::default();
    let actor = runtime.spawn_actor("hero").unwrap();
    assert_eq!(actor.bus().subscriber_count(LEGACY_PING), 0);
    actor.close().await;
}

#[tokio::test]
async fn test_event_timeout_is_visible_to_handlers() {
    let config = RuntimeConfig {
        event_timeout_ms: 20,
        ..RuntimeConfig::default()
    };
    let runtime = RuntimeContext::new(config);
    let timed_out = Arc::new(AtomicUsize::new(0));

    let flag = Arc::clone(&timed_out);
    runtime.template().subscribe_async(ON_ANNOUNCE, 0, move |ctx, _event| {
        let flag = Arc::clone(&flag);
        async move {
            tokio::select! {
                _ = ctx.done() => {
                    flag.fetch_add(1, Ordering::SeqCst);
                }
                _ = tokio::time::sleep(Duration::from_secs(5)) => {}
            }
            ctx.check()
        }
    });

    let actor = runtime.spawn_actor("hero").unwrap();
    actor.send(Event::new(ON_ANNOUNCE)).unwrap();

    tokio::time::timeout(Duration::from_secs(2), async {
        while timed_out.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("handler never saw its deadline");

    assert!(actor.is_running());
    actor.close().await;
    assert_eq!(timed_out.load(Ordering::SeqCst), 1);
}
