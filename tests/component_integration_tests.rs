//! Component integration tests for the notification channel.
//!
//! A real engine produces the events, a manual clock stands in for wall
//! time and a recording capability tracks what the user would see.

use std::sync::Arc;

use tokio::sync::mpsc;

use cookflow::config::NotificationConfig;
use cookflow::notification::{
    dispatcher, ManualClock, MockNotificationCapability, NotificationChannel,
    NotificationDispatcher, NotificationKind, UrgencyTier,
};
use cookflow::session::{total_progress, SessionEngine, SessionEvent};
use cookflow::types::{SessionSpec, Step};

// ============================================================================
// Test Helpers
// ============================================================================

struct Rig {
    engine: SessionEngine,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    channel: NotificationChannel<ManualClock>,
    dispatcher: NotificationDispatcher<Arc<MockNotificationCapability>>,
    clock: ManualClock,
    mock: Arc<MockNotificationCapability>,
}

impl Rig {
    fn new(spec: SessionSpec) -> Self {
        let spec = Arc::new(spec);
        let mock = Arc::new(MockNotificationCapability::new());
        let (sender, dispatcher) = dispatcher(Some(Arc::clone(&mock)));
        let clock = ManualClock::new(1_700_000_000_000);
        let channel = NotificationChannel::new(
            Arc::clone(&spec),
            sender,
            clock.clone(),
            NotificationConfig::default(),
        );
        let (tx, events) = mpsc::unbounded_channel();
        let mut engine = SessionEngine::new(tx);
        engine.start(spec).unwrap();

        Self {
            engine,
            events,
            channel,
            dispatcher,
            clock,
            mock,
        }
    }

    /// Feeds queued engine events to the channel and executes the result.
    async fn sync(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.channel.handle_event(&event);
        }
        self.dispatcher.pump().await;
    }

    /// One tick, `step_ms` of wall time after the previous one.
    async fn tick(&mut self, step_ms: u64) {
        self.clock.advance_ms(step_ms);
        self.engine.tick().unwrap();
        self.sync().await;
    }

    fn countdown_remaining(&self) -> Vec<u32> {
        self.mock
            .scheduled()
            .iter()
            .filter_map(|request| match request.content.kind {
                NotificationKind::Countdown {
                    remaining_seconds, ..
                } => Some(remaining_seconds),
                _ => None,
            })
            .collect()
    }
}

fn single_step(seconds: u32) -> SessionSpec {
    SessionSpec::new("Rice", vec![Step::new(1, "Simmer", "Simmer covered", seconds)]).unwrap()
}

// ============================================================================
// Throttling
// ============================================================================

#[tokio::test]
async fn test_throttle_at_one_hertz() {
    let mut rig = Rig::new(single_step(120));
    rig.engine.resume().unwrap();
    rig.sync().await;

    for _ in 0..120 {
        rig.tick(1_000).await;
    }

    let emitted = rig.countdown_remaining();
    let urgent: Vec<u32> = emitted.iter().copied().filter(|r| *r <= 60).collect();
    let relaxed: Vec<u32> = emitted.iter().copied().filter(|r| *r > 60).collect();

    assert_eq!(urgent, (1..=60).rev().collect::<Vec<_>>());
    assert!(!relaxed.is_empty() && relaxed.len() <= 60);
    assert!(emitted.contains(&61));
    assert!(emitted.contains(&60));
}

#[tokio::test]
async fn test_throttle_with_fast_ticks() {
    let mut rig = Rig::new(single_step(120));
    rig.engine.resume().unwrap();
    rig.sync().await;

    for _ in 0..120 {
        rig.tick(250).await;
    }

    let emitted = rig.countdown_remaining();
    let relaxed = emitted.iter().filter(|r| **r > 60).count();
    let urgent = emitted.iter().filter(|r| **r <= 60).count();

    // 59 non-urgent ticks a quarter second apart
    assert!(relaxed >= 1 && relaxed <= 15, "relaxed emissions: {}", relaxed);
    assert_eq!(urgent, 60);
}

#[tokio::test]
async fn test_urgency_tiers_follow_remaining_time() {
    let mut rig = Rig::new(single_step(90));
    rig.engine.resume().unwrap();
    rig.sync().await;

    for _ in 0..90 {
        rig.tick(1_000).await;
    }

    for request in rig.mock.scheduled() {
        if let NotificationKind::Countdown {
            remaining_seconds, ..
        } = request.content.kind
        {
            assert_eq!(
                request.content.priority,
                UrgencyTier::from_remaining(remaining_seconds)
            );
        }
    }
}

// ============================================================================
// Handle discipline
// ============================================================================

#[tokio::test]
async fn test_at_most_one_live_notification() {
    let spec = SessionSpec::new(
        "Soup",
        vec![
            Step::new(1, "Sweat", "Sweat the onions", 70),
            Step::new(2, "Simmer", "Simmer the stock", 65),
        ],
    )
    .unwrap();
    let mut rig = Rig::new(spec);

    rig.engine.resume().unwrap();
    rig.sync().await;
    for i in 0..70 {
        rig.tick(1_000).await;
        assert!(rig.mock.live_handles().len() <= 1, "tick {}", i);
        if i == 20 {
            rig.engine.pause().unwrap();
            rig.sync().await;
            assert_eq!(rig.mock.live_handles().len(), 1);
            rig.engine.resume().unwrap();
            rig.sync().await;
        }
    }

    // the "tap to continue" alert is the only thing left
    let live = rig.mock.live_handles();
    assert_eq!(live.len(), 1);
    assert_eq!(rig.channel.alert_handle().map(|h| live.contains(&h)), Some(true));

    rig.engine.advance_step().unwrap();
    rig.sync().await;
    assert!(rig.mock.live_handles().is_empty());

    rig.engine.resume().unwrap();
    rig.sync().await;
    for _ in 0..65 {
        rig.tick(1_000).await;
        assert!(rig.mock.live_handles().len() <= 1);
    }

    let last = rig.mock.scheduled().pop().unwrap();
    assert_eq!(last.content.kind, NotificationKind::SessionComplete);
    assert_eq!(total_progress(rig.engine.state(), rig.engine.spec().unwrap()), 1.0);
}

#[tokio::test]
async fn test_abort_is_idempotent_and_sweeps_once_or_more() {
    let mut rig = Rig::new(single_step(120));
    rig.engine.resume().unwrap();
    rig.sync().await;
    rig.tick(1_000).await;

    rig.engine.abort().unwrap();
    rig.engine.abort().unwrap();
    rig.sync().await;
    rig.channel.stop();
    rig.dispatcher.pump().await;

    assert!(rig.mock.cancel_all_count() >= 1);
    assert!(rig.mock.live_handles().is_empty());
}

#[tokio::test]
async fn test_partial_schedule_failure_cleared_by_stop() {
    let mut rig = Rig::new(single_step(120));
    rig.mock.set_should_fail(true);
    rig.engine.resume().unwrap();
    rig.sync().await;

    for _ in 0..5 {
        rig.tick(1_000).await;
    }
    assert!(!rig.mock.live_handles().is_empty());

    rig.channel.stop();
    rig.dispatcher.pump().await;

    assert!(rig.mock.live_handles().is_empty());
    assert!(rig.dispatcher.is_enabled());
}

#[tokio::test]
async fn test_revoked_permission_disables_without_touching_engine() {
    let mut rig = Rig::new(single_step(10));
    rig.engine.resume().unwrap();
    rig.sync().await;
    rig.tick(1_000).await;

    rig.mock.set_deny_permission(true);
    for _ in 0..9 {
        rig.tick(1_000).await;
    }

    assert!(!rig.dispatcher.is_enabled());
    assert_eq!(rig.engine.state().total_elapsed_seconds, 10);
    assert!(rig.engine.status().is_terminal());
}
