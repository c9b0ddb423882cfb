//! Fire-and-forget dispatch of notification commands.
//!
//! The channel never awaits the capability: it queues commands on a
//! [`DispatchSender`] and moves on. The [`NotificationDispatcher`] drains the
//! queue in order, so a `Cancel` always reaches the capability before the
//! `Schedule` that replaces it. Every capability failure stops here.
//!
//! Each capability call is bounded by a timeout. A capability that stops
//! answering is disabled for the rest of the session, but `CancelAll` is
//! still attempted so teardown sweeps whatever the host managed to display.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use super::{NotificationCapability, NotificationError, NotificationHandle, NotificationRequest};

/// A queued capability call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchCommand {
    /// Display a notification
    Schedule(NotificationRequest),
    /// Dismiss one notification
    Cancel(NotificationHandle),
    /// Dismiss every notification
    CancelAll,
}

/// Non-blocking producer side of the dispatch queue.
#[derive(Debug, Clone)]
pub struct DispatchSender {
    tx: mpsc::UnboundedSender<DispatchCommand>,
}

impl DispatchSender {
    /// Queues a command. Never blocks and never fails.
    pub fn send(&self, command: DispatchCommand) {
        if self.tx.send(command).is_err() {
            tracing::debug!("notification dispatcher is gone; command dropped");
        }
    }
}

/// Default upper bound for a single capability call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Consumer side of the dispatch queue, owning the capability.
pub struct NotificationDispatcher<C> {
    capability: Option<C>,
    disabled: bool,
    call_timeout: Duration,
    rx: mpsc::UnboundedReceiver<DispatchCommand>,
}

/// Creates a dispatch queue in front of `capability`.
///
/// With `None` every command is dropped, which is how a denied or missing
/// notification capability degrades.
pub fn dispatcher<C>(capability: Option<C>) -> (DispatchSender, NotificationDispatcher<C>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        DispatchSender { tx },
        NotificationDispatcher {
            capability,
            disabled: false,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            rx,
        },
    )
}

/// Initializes a capability, falling back to `None` on failure.
///
/// Failures are logged so the session can continue without notifications.
pub async fn initialize_with_fallback<C: NotificationCapability>(capability: C) -> Option<C> {
    match capability.initialize().await {
        Ok(()) => Some(capability),
        Err(NotificationError::PermissionDenied) => {
            tracing::warn!("notification permission denied; continuing without notifications");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "notifications unavailable: {}", e.suggestion());
            None
        }
    }
}

impl<C: NotificationCapability> NotificationDispatcher<C> {
    /// Sets the upper bound for a single capability call.
    #[must_use]
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Returns true if commands still reach a capability.
    pub fn is_enabled(&self) -> bool {
        self.capability.is_some() && !self.disabled
    }

    /// Executes commands until every [`DispatchSender`] is dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            self.execute(command).await;
        }
        tracing::debug!("notification dispatcher finished");
    }

    /// Executes the commands queued so far and returns how many ran.
    pub async fn pump(&mut self) -> usize {
        let mut executed = 0;
        while let Ok(command) = self.rx.try_recv() {
            self.execute(command).await;
            executed += 1;
        }
        executed
    }

    /// Removes queued commands without executing them.
    #[cfg(test)]
    pub(crate) fn drain_queued(&mut self) -> Vec<DispatchCommand> {
        let mut drained = Vec::new();
        while let Ok(command) = self.rx.try_recv() {
            drained.push(command);
        }
        drained
    }

    async fn execute(&mut self, command: DispatchCommand) {
        let Some(capability) = self.capability.as_ref() else {
            tracing::trace!(?command, "notifications disabled; command dropped");
            return;
        };
        // a disabled capability only gets the teardown sweep
        if self.disabled && command != DispatchCommand::CancelAll {
            tracing::trace!(?command, "notifications disabled; command dropped");
            return;
        }

        let call = async {
            match &command {
                DispatchCommand::Schedule(request) => capability.schedule(request).await,
                DispatchCommand::Cancel(handle) => capability.cancel(*handle).await,
                DispatchCommand::CancelAll => capability.cancel_all().await,
            }
        };
        let result = match timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(NotificationError::TimedOut(self.call_timeout)),
        };

        if let Err(e) = result {
            if e.disables_capability() {
                if !self.disabled {
                    tracing::warn!(error = %e, "disabling notifications for this session");
                }
                self.disabled = true;
            } else {
                tracing::debug!(error = %e, ?command, "notification command failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::notification::{
        MockNotificationCapability, NotificationCall, NotificationContent, NotificationKind,
    };

    fn request() -> NotificationRequest {
        NotificationRequest {
            handle: NotificationHandle::new(),
            content: NotificationContent::new(NotificationKind::SessionComplete, "Done", ""),
        }
    }

    #[tokio::test]
    async fn test_commands_execute_in_order() {
        let mock = Arc::new(MockNotificationCapability::new());
        let (sender, mut dispatcher) = dispatcher(Some(Arc::clone(&mock)));
        let first = request();
        let second = request();

        sender.send(DispatchCommand::Schedule(first.clone()));
        sender.send(DispatchCommand::Cancel(first.handle));
        sender.send(DispatchCommand::Schedule(second.clone()));

        assert_eq!(dispatcher.pump().await, 3);
        assert_eq!(
            mock.calls(),
            vec![
                NotificationCall::Schedule(first.clone()),
                NotificationCall::Cancel(first.handle),
                NotificationCall::Schedule(second),
            ]
        );
    }

    #[tokio::test]
    async fn test_disabled_dispatcher_drops_commands() {
        let (sender, mut dispatcher) = dispatcher::<MockNotificationCapability>(None);

        sender.send(DispatchCommand::CancelAll);

        assert!(!dispatcher.is_enabled());
        assert_eq!(dispatcher.pump().await, 1);
    }

    #[tokio::test]
    async fn test_schedule_failure_is_contained() {
        let mock = Arc::new(MockNotificationCapability::new());
        mock.set_should_fail(true);
        let (sender, mut dispatcher) = dispatcher(Some(Arc::clone(&mock)));

        sender.send(DispatchCommand::Schedule(request()));
        sender.send(DispatchCommand::CancelAll);
        dispatcher.pump().await;

        assert!(dispatcher.is_enabled());
        assert_eq!(mock.cancel_all_count(), 1);
    }

    #[tokio::test]
    async fn test_permission_revoked_disables() {
        let mock = Arc::new(MockNotificationCapability::new());
        let (sender, mut dispatcher) = dispatcher(Some(Arc::clone(&mock)));
        mock.set_deny_permission(true);

        sender.send(DispatchCommand::Schedule(request()));
        dispatcher.pump().await;

        assert!(!dispatcher.is_enabled());
    }

    #[tokio::test]
    async fn test_initialize_with_fallback() {
        let granted = MockNotificationCapability::new();
        assert!(initialize_with_fallback(granted).await.is_some());

        let denied = MockNotificationCapability::new();
        denied.set_deny_permission(true);
        assert!(initialize_with_fallback(denied).await.is_none());
    }

    #[tokio::test]
    async fn test_run_finishes_when_senders_dropped() {
        let mock = Arc::new(MockNotificationCapability::new());
        let (sender, dispatcher) = dispatcher(Some(Arc::clone(&mock)));

        sender.send(DispatchCommand::CancelAll);
        drop(sender);
        dispatcher.run().await;

        assert_eq!(mock.cancel_all_count(), 1);
    }

    /// Capability whose `schedule` never completes.
    struct HangingCapability {
        inner: MockNotificationCapability,
    }

    impl NotificationCapability for HangingCapability {
        async fn schedule(&self, _request: &NotificationRequest) -> Result<(), NotificationError> {
            std::future::pending().await
        }

        async fn cancel(&self, handle: NotificationHandle) -> Result<(), NotificationError> {
            self.inner.cancel(handle).await
        }

        async fn cancel_all(&self) -> Result<(), NotificationError> {
            self.inner.cancel_all().await
        }
    }

    #[tokio::test]
    async fn test_hung_schedule_still_reaches_cancel_all() {
        let hanging = Arc::new(HangingCapability {
            inner: MockNotificationCapability::new(),
        });
        let (sender, dispatcher) = dispatcher(Some(Arc::clone(&hanging)));
        let dispatcher = dispatcher.with_call_timeout(Duration::from_millis(20));

        sender.send(DispatchCommand::Schedule(request()));
        sender.send(DispatchCommand::Schedule(request()));
        sender.send(DispatchCommand::CancelAll);
        drop(sender);

        let finished = timeout(Duration::from_secs(2), dispatcher.run()).await;

        assert!(finished.is_ok());
        assert_eq!(hanging.inner.cancel_all_count(), 1);
    }

    #[tokio::test]
    async fn test_timeout_disables_everything_but_cancel_all() {
        let hanging = Arc::new(HangingCapability {
            inner: MockNotificationCapability::new(),
        });
        let (sender, dispatcher) = dispatcher(Some(Arc::clone(&hanging)));
        let mut dispatcher = dispatcher.with_call_timeout(Duration::from_millis(20));
        let stale = request();

        sender.send(DispatchCommand::Schedule(stale.clone()));
        dispatcher.pump().await;
        assert!(!dispatcher.is_enabled());

        sender.send(DispatchCommand::Cancel(stale.handle));
        sender.send(DispatchCommand::CancelAll);
        assert_eq!(dispatcher.pump().await, 2);

        assert_eq!(hanging.inner.calls(), vec![NotificationCall::CancelAll]);
    }

    #[test]
    fn test_send_after_dispatcher_dropped_does_not_panic() {
        let (sender, dispatcher) = dispatcher::<MockNotificationCapability>(None);
        drop(dispatcher);
        sender.send(DispatchCommand::CancelAll);
    }
}
