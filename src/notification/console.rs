//! Terminal notification backend.
//!
//! Writes notifications to the log instead of a platform service. Useful on
//! hosts without a notification center and for watching the channel's
//! decisions with `--verbose`.

use std::collections::HashSet;
use std::sync::Mutex;

use super::{NotificationCapability, NotificationError, NotificationHandle, NotificationRequest};

/// Notification capability that logs through `tracing`.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    live: Mutex<HashSet<NotificationHandle>>,
}

impl ConsoleNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of notifications currently shown.
    pub fn live_count(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }

    fn with_live<R>(
        &self,
        f: impl FnOnce(&mut HashSet<NotificationHandle>) -> R,
    ) -> Result<R, NotificationError> {
        let mut live = self
            .live
            .lock()
            .map_err(|_| NotificationError::InitializationFailed("state poisoned".to_string()))?;
        Ok(f(&mut live))
    }
}

impl NotificationCapability for ConsoleNotifier {
    async fn schedule(&self, request: &NotificationRequest) -> Result<(), NotificationError> {
        self.with_live(|live| live.insert(request.handle))?;

        let content = &request.content;
        tracing::info!(
            handle = %request.handle,
            priority = content.priority.as_str(),
            sound = content.sound,
            "[notification] {} | {}",
            content.title,
            content.body.replace('\n', " | ")
        );
        Ok(())
    }

    async fn cancel(&self, handle: NotificationHandle) -> Result<(), NotificationError> {
        if self.with_live(|live| live.remove(&handle))? {
            tracing::debug!(%handle, "[notification] dismissed");
        }
        Ok(())
    }

    async fn cancel_all(&self) -> Result<(), NotificationError> {
        let dismissed = self.with_live(|live| {
            let count = live.len();
            live.clear();
            count
        })?;
        tracing::debug!(dismissed, "[notification] dismissed all");
        Ok(())
    }
}
