//! Persistent cooking notification.
//!
//! This module mirrors the session timer into an external notification
//! capability. It includes:
//!
//! - The [`NotificationCapability`] contract (`schedule` / `cancel` / `cancel_all`)
//! - A synchronization channel applying the urgency and throttling policy
//! - A fire-and-forget dispatcher that contains every capability failure
//! - Console and (on macOS) system notification backends
//!
//! # Architecture
//!
//! ```text
//! SessionEvent ──▶ NotificationChannel ──▶ DispatchSender ─(queue)─▶ NotificationDispatcher ──▶ capability
//!                  (tier, throttle,                                  (no-op when disabled,
//!                   at most one handle)                               errors logged)
//! ```
//!
//! The capability has no in-place update: every content change is a
//! `cancel(previous)` followed by `schedule(next)`.

mod channel;
mod clock;
mod console;
mod content;
mod dispatch;
pub mod error;
#[cfg(target_os = "macos")]
mod macos;

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

pub use self::channel::{NotificationChannel, NotificationRecord};
pub use self::clock::{Clock, ManualClock, SystemClock};
pub use self::console::ConsoleNotifier;
pub use self::content::{
    countdown_content, paused_content, sanitize_title, session_complete_content,
    step_complete_content, NotificationContent, NotificationKind, UrgencyTier,
};
pub use self::dispatch::{
    dispatcher, initialize_with_fallback, DispatchCommand, DispatchSender, NotificationDispatcher,
    DEFAULT_CALL_TIMEOUT,
};
pub use self::error::NotificationError;
#[cfg(target_os = "macos")]
pub use self::macos::SystemNotifier;

// ============================================================================
// Handles and requests
// ============================================================================

/// Identifier of one displayed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationHandle(Uuid);

impl NotificationHandle {
    /// Mints a fresh handle.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NotificationHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A notification to display under a caller-chosen handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// Handle used to cancel the notification later
    pub handle: NotificationHandle,
    /// What to display
    pub content: NotificationContent,
}

// ============================================================================
// NotificationCapability
// ============================================================================

/// Host-specific persistent-notification service.
///
/// Implementations must treat cancelling an unknown handle as success.
#[allow(async_fn_in_trait)]
pub trait NotificationCapability {
    /// Asks the host for permission to display notifications.
    async fn initialize(&self) -> Result<(), NotificationError> {
        Ok(())
    }

    /// Displays a notification immediately.
    async fn schedule(&self, request: &NotificationRequest) -> Result<(), NotificationError>;

    /// Dismisses one notification.
    async fn cancel(&self, handle: NotificationHandle) -> Result<(), NotificationError>;

    /// Dismisses every notification this application has displayed.
    async fn cancel_all(&self) -> Result<(), NotificationError>;
}

impl<C: NotificationCapability> NotificationCapability for Arc<C> {
    async fn initialize(&self) -> Result<(), NotificationError> {
        (**self).initialize().await
    }

    async fn schedule(&self, request: &NotificationRequest) -> Result<(), NotificationError> {
        (**self).schedule(request).await
    }

    async fn cancel(&self, handle: NotificationHandle) -> Result<(), NotificationError> {
        (**self).cancel(handle).await
    }

    async fn cancel_all(&self) -> Result<(), NotificationError> {
        (**self).cancel_all().await
    }
}

// ============================================================================
// MockNotificationCapability
// ============================================================================

/// A call recorded by [`MockNotificationCapability`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationCall {
    /// `schedule` was called
    Schedule(NotificationRequest),
    /// `cancel` was called
    Cancel(NotificationHandle),
    /// `cancel_all` was called
    CancelAll,
}

/// Recording capability for tests.
///
/// Tracks which handles would still be visible on a real host.
#[derive(Debug, Default)]
pub struct MockNotificationCapability {
    calls: Mutex<Vec<NotificationCall>>,
    live: Mutex<HashSet<NotificationHandle>>,
    deny_permission: AtomicBool,
    should_fail: AtomicBool,
}

impl MockNotificationCapability {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `initialize` (and later calls) fail with `PermissionDenied`.
    pub fn set_deny_permission(&self, deny: bool) {
        self.deny_permission.store(deny, Ordering::SeqCst);
    }

    /// Makes `schedule` fail after recording the call.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<NotificationCall> {
        self.calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn scheduled(&self) -> Vec<NotificationRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                NotificationCall::Schedule(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn schedule_count(&self) -> usize {
        self.scheduled().len()
    }

    #[must_use]
    pub fn cancel_all_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| matches!(call, NotificationCall::CancelAll))
            .count()
    }

    /// Handles scheduled and not yet cancelled.
    #[must_use]
    pub fn live_handles(&self) -> HashSet<NotificationHandle> {
        self.live.lock().unwrap().clone()
    }

    pub fn clear_recorded(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn check_permission(&self) -> Result<(), NotificationError> {
        if self.deny_permission.load(Ordering::SeqCst) {
            return Err(NotificationError::PermissionDenied);
        }
        Ok(())
    }
}

impl NotificationCapability for MockNotificationCapability {
    async fn initialize(&self) -> Result<(), NotificationError> {
        self.check_permission()
    }

    async fn schedule(&self, request: &NotificationRequest) -> Result<(), NotificationError> {
        self.check_permission()?;
        self.calls
            .lock()
            .unwrap()
            .push(NotificationCall::Schedule(request.clone()));
        if self.should_fail.load(Ordering::SeqCst) {
            // the platform may have displayed it anyway
            self.live.lock().unwrap().insert(request.handle);
            return Err(NotificationError::ScheduleFailed("Mock failure".to_string()));
        }
        self.live.lock().unwrap().insert(request.handle);
        Ok(())
    }

    async fn cancel(&self, handle: NotificationHandle) -> Result<(), NotificationError> {
        self.check_permission()?;
        self.calls.lock().unwrap().push(NotificationCall::Cancel(handle));
        self.live.lock().unwrap().remove(&handle);
        Ok(())
    }

    async fn cancel_all(&self) -> Result<(), NotificationError> {
        self.check_permission()?;
        self.calls.lock().unwrap().push(NotificationCall::CancelAll);
        self.live.lock().unwrap().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NotificationRequest {
        NotificationRequest {
            handle: NotificationHandle::new(),
            content: NotificationContent::new(NotificationKind::SessionComplete, "Done", "All done"),
        }
    }

    #[test]
    fn test_handles_are_unique() {
        assert_ne!(NotificationHandle::new(), NotificationHandle::new());
    }

    #[test]
    fn test_handle_display_is_request_identifier() {
        let handle = NotificationHandle::new();
        let identifier = handle.to_string();

        let parsed = Uuid::parse_str(&identifier).unwrap();
        assert_eq!(NotificationHandle(parsed), handle);
    }

    #[tokio::test]
    async fn test_mock_tracks_live_handles() {
        let mock = MockNotificationCapability::new();
        let first = request();
        let second = request();

        mock.schedule(&first).await.unwrap();
        mock.schedule(&second).await.unwrap();
        mock.cancel(first.handle).await.unwrap();

        assert_eq!(mock.schedule_count(), 2);
        assert_eq!(mock.live_handles(), HashSet::from([second.handle]));

        mock.cancel_all().await.unwrap();
        assert!(mock.live_handles().is_empty());
        assert_eq!(mock.cancel_all_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_cancel_unknown_handle_is_ok() {
        let mock = MockNotificationCapability::new();
        assert!(mock.cancel(NotificationHandle::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_failure_leaves_untracked_notification() {
        let mock = MockNotificationCapability::new();
        mock.set_should_fail(true);

        let result = mock.schedule(&request()).await;

        assert!(result.is_err());
        assert_eq!(mock.live_handles().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_permission_denied() {
        let mock = MockNotificationCapability::new();
        mock.set_deny_permission(true);

        assert_eq!(mock.initialize().await, Err(NotificationError::PermissionDenied));
        assert!(mock.schedule(&request()).await.is_err());
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_arc_capability_delegates() {
        let mock = Arc::new(MockNotificationCapability::new());
        let shared = Arc::clone(&mock);

        shared.schedule(&request()).await.unwrap();

        assert_eq!(mock.schedule_count(), 1);
    }
}
