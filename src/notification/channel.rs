//! Synchronization of session events into the persistent notification.
//!
//! [`NotificationChannel`] consumes [`SessionEvent`]s and decides what the
//! notification should show. It never talks to the capability directly:
//! every decision becomes a queued [`DispatchCommand`], so a slow or failing
//! capability cannot delay the timer.
//!
//! Policy per countdown tick:
//! - The urgency tier follows the remaining seconds.
//! - Inside the urgent window every tick is mirrored.
//! - Outside it, updates are spaced by at least the throttle window.
//! - An update is `cancel(previous)` followed by `schedule(next)`, so at most
//!   one countdown handle is tracked.

use std::sync::Arc;

use crate::config::NotificationConfig;
use crate::session::SessionEvent;
use crate::types::{SessionSpec, SessionSummary};

use super::clock::{Clock, SystemClock};
use super::content::{
    countdown_content, paused_content, session_complete_content, step_complete_content,
    NotificationContent,
};
use super::dispatch::{DispatchCommand, DispatchSender};
use super::{NotificationHandle, NotificationRequest};

/// Throttling state of the live countdown notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationRecord {
    /// Handle of the countdown notification currently displayed
    pub active_handle: Option<NotificationHandle>,
    /// Wall-clock time of the last countdown emission
    pub last_emit_ms: Option<u64>,
}

/// Mirrors one cooking session into a notification capability.
pub struct NotificationChannel<K = SystemClock> {
    spec: Arc<SessionSpec>,
    config: NotificationConfig,
    clock: K,
    sender: DispatchSender,
    /// Created lazily on the first countdown emission
    record: Option<NotificationRecord>,
    /// One-shot "tap to continue" alert, not throttled
    alert_handle: Option<NotificationHandle>,
    closed: bool,
}

impl<K: Clock> NotificationChannel<K> {
    /// Creates a channel for `spec` that queues commands on `sender`.
    pub fn new(
        spec: Arc<SessionSpec>,
        sender: DispatchSender,
        clock: K,
        config: NotificationConfig,
    ) -> Self {
        Self {
            spec,
            config,
            clock,
            sender,
            record: None,
            alert_handle: None,
            closed: false,
        }
    }

    /// Returns the throttling record, if a countdown was ever emitted.
    pub fn record(&self) -> Option<&NotificationRecord> {
        self.record.as_ref()
    }

    /// Returns the handle of the pending step-complete alert.
    pub fn alert_handle(&self) -> Option<NotificationHandle> {
        self.alert_handle
    }

    /// Returns true once the session ended or [`stop`](Self::stop) was called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Applies one engine event. Events after the channel closed are ignored.
    pub fn handle_event(&mut self, event: &SessionEvent) {
        if self.closed {
            return;
        }

        match event {
            SessionEvent::Started { .. } => {}
            SessionEvent::Resumed { .. } => {
                // first tick after a resume replaces the paused rendering
                if let Some(record) = self.record.as_mut() {
                    record.last_emit_ms = None;
                }
            }
            SessionEvent::Paused {
                step_index,
                remaining_seconds,
            } => self.on_paused(*step_index, *remaining_seconds),
            SessionEvent::Tick {
                step_index,
                remaining_seconds,
                ..
            } => self.on_tick(*step_index, *remaining_seconds),
            SessionEvent::StepExpired { step_index } => self.on_step_expired(*step_index),
            SessionEvent::StepChanged { .. } => self.on_step_changed(),
            SessionEvent::SessionCompleted(summary) => self.on_session_completed(summary),
            SessionEvent::SessionAborted(_) => self.stop(),
        }
    }

    /// Dismisses every notification and closes the channel.
    ///
    /// Always sweeps with `cancel_all`, even when nothing is tracked, because
    /// a partially failed `schedule` may have left an untracked notification.
    /// Safe to call repeatedly.
    pub fn stop(&mut self) {
        tracing::debug!(session = %self.spec.session_name, "notification channel stopped");
        self.sender.send(DispatchCommand::CancelAll);
        self.record = None;
        self.alert_handle = None;
        self.closed = true;
    }

    // ------------------------------------------------------------------------
    // Event handlers
    // ------------------------------------------------------------------------

    fn on_tick(&mut self, step_index: usize, remaining_seconds: u32) {
        // a zero tick is always followed by expiry or completion
        if remaining_seconds == 0 {
            return;
        }

        let now = self.clock.now_ms();
        if !self.should_emit(remaining_seconds, now) {
            tracing::trace!(remaining_seconds, "countdown update throttled");
            return;
        }

        let Some(step) = self.spec.step(step_index) else {
            return;
        };
        let tier = self.config.urgency(remaining_seconds);
        let content = countdown_content(
            &self.spec.session_name,
            step,
            step_index,
            self.spec.len(),
            remaining_seconds,
            tier,
            self.config.progress_bar_width,
        );

        self.dismiss_alert();
        let handle = self.replace_active(content);
        self.record = Some(NotificationRecord {
            active_handle: Some(handle),
            last_emit_ms: Some(now),
        });
    }

    fn on_paused(&mut self, step_index: usize, remaining_seconds: u32) {
        let has_active = self
            .record
            .as_ref()
            .is_some_and(|record| record.active_handle.is_some());
        if !has_active {
            return;
        }
        let Some(step) = self.spec.step(step_index) else {
            return;
        };

        let content = paused_content(
            &self.spec.session_name,
            step,
            step_index,
            self.spec.len(),
            remaining_seconds,
            self.config.progress_bar_width,
        );
        let handle = self.replace_active(content);
        if let Some(record) = self.record.as_mut() {
            record.active_handle = Some(handle);
        }
    }

    fn on_step_changed(&mut self) {
        self.dismiss_alert();
        if let Some(mut record) = self.record.take() {
            if let Some(handle) = record.active_handle.take() {
                self.sender.send(DispatchCommand::Cancel(handle));
            }
        }
    }

    fn on_step_expired(&mut self, step_index: usize) {
        self.cancel_active();
        self.dismiss_alert();

        let Some(step) = self.spec.step(step_index) else {
            return;
        };
        let content = step_complete_content(
            &self.spec.session_name,
            step,
            step_index,
            self.spec.step(step_index + 1),
        );
        self.alert_handle = Some(self.schedule(content));
    }

    fn on_session_completed(&mut self, summary: &SessionSummary) {
        self.cancel_active();
        self.dismiss_alert();

        let content = session_complete_content(summary, self.config.progress_bar_width);
        self.schedule(content);

        // the final notification stays up for the user
        self.record = None;
        self.closed = true;
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn should_emit(&self, remaining_seconds: u32, now_ms: u64) -> bool {
        if self.config.is_urgent(remaining_seconds) {
            return true;
        }
        match self.record.as_ref().and_then(|record| record.last_emit_ms) {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.config.throttle_window_ms,
        }
    }

    /// Cancels the tracked countdown and schedules `content` in its place.
    fn replace_active(&mut self, content: NotificationContent) -> NotificationHandle {
        self.cancel_active();
        self.schedule(content)
    }

    fn cancel_active(&mut self) {
        if let Some(handle) = self
            .record
            .as_mut()
            .and_then(|record| record.active_handle.take())
        {
            self.sender.send(DispatchCommand::Cancel(handle));
        }
    }

    fn dismiss_alert(&mut self) {
        if let Some(handle) = self.alert_handle.take() {
            self.sender.send(DispatchCommand::Cancel(handle));
        }
    }

    fn schedule(&self, content: NotificationContent) -> NotificationHandle {
        let handle = NotificationHandle::new();
        tracing::trace!(%handle, kind = ?content.kind, "scheduling notification");
        self.sender.send(DispatchCommand::Schedule(NotificationRequest {
            handle,
            content,
        }));
        handle
    }
}
