#[cfg(test)]
mod tests {
    use crate::bus::{EventBus, ReplayEntry};
    use crate::context::EventContext;
    use crate::error::EventError;
    use crate::event::{Event, EventType};
    use crate::handler::{EventHandler, FnHandler};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const T1: EventType = EventType::new(1);
    const T2: EventType = EventType::new(2);
    const T3: EventType = EventType::new(3);

    fn recorder(
        bus: &EventBus,
        event_type: EventType,
        priority: i32,
        label: &'static str,
        log: &Arc<Mutex<Vec<&'static str>>>,
    ) {
        let log = Arc::clone(log);
        bus.subscribe(event_type, priority, move |_ctx, _event| {
            log.lock().unwrap().push(label);
            Ok(())
        });
    }

    #[tokio::test]
    async fn test_publish_runs_in_descending_priority() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        recorder(&bus, T1, 5, "h1", &log);
        recorder(&bus, T1, 10, "h2", &log);
        recorder(&bus, T1, 1, "h3", &log);

        bus.publish(&EventContext::background(), &Event::new(T1)).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["h2", "h1", "h3"]);
    }

    #[tokio::test]
    async fn test_equal_priorities_keep_registration_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        recorder(&bus, T1, 0, "first", &log);
        recorder(&bus, T1, 3, "high", &log);
        recorder(&bus, T1, 0, "second", &log);
        recorder(&bus, T1, 0, "third", &log);

        bus.publish(&EventContext::background(), &Event::new(T1)).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["high", "first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_first_error_stops_dispatch() {
        let bus = EventBus::new();
        let a_calls = Arc::new(AtomicUsize::new(0));
        let b_calls = Arc::new(AtomicUsize::new(0));

        let a = Arc::clone(&a_calls);
        bus.subscribe(T1, 1, move |_ctx, _event| {
            a.fetch_add(1, Ordering::SeqCst);
            Err(EventError::handler("A always fails"))
        });
        let b = Arc::clone(&b_calls);
        bus.subscribe(T1, 0, move |_ctx, _event| {
            b.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let result = bus.publish(&EventContext::background(), &Event::new(T1)).await;

        match result {
            Err(EventError::HandlerExecution(message)) => assert_eq!(message, "A always fails"),
            other => panic!("expected A's error, got {other:?}"),
        }
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);

        let stats = bus.stats();
        assert_eq!(stats.handler_invocations, 1);
        assert_eq!(stats.handler_failures, 1);
    }

    #[tokio::test]
    async fn test_panicking_handler_is_contained() {
        let bus = EventBus::new();
        let after = Arc::new(AtomicUsize::new(0));

        bus.subscribe_handler(
            T1,
            5,
            Arc::new(FnHandler::new(
                "exploding",
                |_ctx: &EventContext, _event: &Event| -> Result<(), EventError> { panic!("boom") },
            )),
        );
        let counter = Arc::clone(&after);
        bus.subscribe(T1, 0, move |_ctx, _event| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let result = bus.publish(&EventContext::background(), &Event::new(T1)).await;
        assert!(
            matches!(result, Err(EventError::HandlerPanicked(ref name)) if name == "exploding")
        );
        assert_eq!(after.load(Ordering::SeqCst), 0);

        // the bus is still usable afterwards
        bus.unsubscribe(T1);
        bus.publish(&EventContext::background(), &Event::new(T1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = EventBus::new();
        bus.publish(&EventContext::background(), &Event::new(T3)).await.unwrap();
        assert_eq!(bus.stats().events_published, 0);
    }

    #[tokio::test]
    async fn test_handlers_see_event_arguments() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(None));

        let slot = Arc::clone(&seen);
        bus.subscribe(T2, 0, move |_ctx, event| {
            *slot.lock().unwrap() = event.arg::<u64>(0).copied();
            Ok(())
        });

        let event = Event::new(T2).with_arg(250u64);
        bus.publish(&EventContext::background(), &event).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), Some(250));
    }

    #[tokio::test]
    async fn test_clone_by_replay_is_independent() {
        let template = EventBus::new();
        template.subscribe(T1, 0, |_ctx, _event| Ok(()));
        template.subscribe(T1, 3, |_ctx, _event| Ok(()));
        template.subscribe(T2, 0, |_ctx, _event| Ok(()));

        let clone = template.clone_by_replay();
        assert_eq!(clone.subscriber_count(T1), 2);
        assert_eq!(clone.subscriber_count(T2), 1);
        assert_eq!(clone.replay_len(), template.replay_len());

        clone.subscribe(T1, 0, |_ctx, _event| Ok(()));
        clone.subscribe(T3, 0, |_ctx, _event| Ok(()));
        assert_eq!(template.subscriber_count(T1), 2);
        assert_eq!(template.subscriber_count(T3), 0);

        template.subscribe(T2, 0, |_ctx, _event| Ok(()));
        assert_eq!(clone.subscriber_count(T2), 1);
        assert_eq!(template.subscriber_count(T2), 2);
    }

    #[tokio::test]
    async fn test_clone_preserves_dispatch_order() {
        let template = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&template, T1, 1, "low", &log);
        recorder(&template, T1, 9, "high", &log);
        recorder(&template, T1, 1, "low-later", &log);

        let clone = template.clone_by_replay();
        clone.publish(&EventContext::background(), &Event::new(T1)).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["high", "low", "low-later"]);
    }

    #[tokio::test]
    async fn test_unsubscribe_is_replayed() {
        let template = EventBus::new();
        template.subscribe(T1, 0, |_ctx, _event| Ok(()));
        template.subscribe(T2, 0, |_ctx, _event| Ok(()));
        template.unsubscribe(T1);
        template.subscribe(T1, 0, |_ctx, _event| Ok(()));

        let records = template.records();
        assert_eq!(records.len(), 4);
        assert!(matches!(records[2], ReplayEntry::Unsubscribe(t) if t == T1));

        let clone = template.clone_by_replay();
        assert_eq!(clone.subscriber_count(T1), 1);
        assert_eq!(clone.subscriber_count(T2), 1);
        assert_eq!(clone.event_types(), vec![T1, T2]);
    }

    #[tokio::test]
    async fn test_clear_resets_table_and_log() {
        let bus = EventBus::new();
        bus.subscribe(T1, 0, |_ctx, _event| Ok(()));
        bus.publish(&EventContext::background(), &Event::new(T1)).await.unwrap();

        bus.clear();

        assert_eq!(bus.subscriber_count(T1), 0);
        assert_eq!(bus.replay_len(), 0);
        assert!(bus.event_types().is_empty());
        assert_eq!(bus.stats().events_published, 0);
        assert_eq!(bus.clone_by_replay().subscriber_count(T1), 0);
    }

    #[tokio::test]
    async fn test_handler_may_subscribe_during_dispatch() {
        let bus = Arc::new(EventBus::new());
        let weak = Arc::downgrade(&bus);

        bus.subscribe(T1, 0, move |_ctx, _event| {
            if let Some(bus) = weak.upgrade() {
                bus.subscribe(T2, 0, |_ctx, _event| Ok(()));
            }
            Ok(())
        });

        bus.publish(&EventContext::background(), &Event::new(T1)).await.unwrap();
        assert_eq!(bus.subscriber_count(T2), 1);
    }

    #[tokio::test]
    async fn test_publish_async_runs_every_handler() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for priority in 0..4 {
            let calls = Arc::clone(&calls);
            bus.subscribe_async(T1, priority, move |_ctx, _event| {
                let calls = Arc::clone(&calls);
                async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            });
        }
        bus.subscribe(T1, 10, |_ctx, _event| Err(EventError::handler("ignored")));

        bus.publish_async(&EventContext::background(), Arc::new(Event::new(T1))).await;

        // failure of one handler does not prevent the others
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        let stats = bus.stats();
        assert_eq!(stats.events_fanned_out, 1);
        assert_eq!(stats.handler_invocations, 5);
        assert_eq!(stats.handler_failures, 1);
    }

    #[tokio::test]
    async fn test_async_handler_observes_context() {
        let bus = EventBus::new();
        let saw_cancel = Arc::new(AtomicUsize::new(0));

        let flag = Arc::clone(&saw_cancel);
        bus.subscribe_async(T1, 0, move |ctx, _event| {
            let flag = Arc::clone(&flag);
            async move {
                ctx.done().await;
                flag.fetch_add(1, Ordering::SeqCst);
                ctx.check()
            }
        });

        let ctx = EventContext::background().child_with_timeout(Duration::from_millis(20));
        let result = bus.publish(&ctx, &Event::new(T1)).await;

        assert!(matches!(result, Err(EventError::DeadlineExceeded)));
        assert_eq!(saw_cancel.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stats_snapshot() {
        let bus = EventBus::new();
        bus.subscribe(T1, 0, |_ctx, _event| Ok(()));
        bus.subscribe(T1, 1, |_ctx, _event| Ok(()));
        bus.subscribe(T2, 0, |_ctx, _event| Ok(()));

        bus.publish(&EventContext::background(), &Event::new(T1)).await.unwrap();

        let stats = bus.stats();
        assert_eq!(stats.subscribed_types, 2);
        assert_eq!(stats.total_subscribers, 3);
        assert_eq!(stats.events_published, 1);
        assert_eq!(stats.handler_invocations, 2);
        assert_eq!(stats.replay_len, 3);
    }

    #[test]
    fn test_records_name_handlers() {
        let bus = EventBus::new();
        let handler: Arc<dyn EventHandler> =
            Arc::new(FnHandler::new("named", |_ctx: &EventContext, _event: &Event| Ok(())));
        bus.subscribe_handler(T1, 7, handler);

        match &bus.records()[0] {
            ReplayEntry::Subscribe(record) => {
                assert_eq!(record.priority, 7);
                assert_eq!(record.event_type, T1);
                assert_eq!(record.handler.handler_name(), "named");
            }
            other => panic!("unexpected entry {other:?}"),
        }
    }
}
