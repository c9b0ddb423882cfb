//! Notification capability error types.
//!
//! These errors never leave the notification dispatcher: every failure is
//! logged and degraded to a no-op so the session timer keeps running.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur in a notification capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    /// Failed to request notification authorization from the host.
    #[error("failed to request notification permission: {0}")]
    AuthorizationFailed(String),

    /// Notification permission was denied by the user.
    #[error("notification permission denied")]
    PermissionDenied,

    /// Failed to display a notification.
    #[error("failed to schedule notification: {0}")]
    ScheduleFailed(String),

    /// Failed to dismiss a notification.
    #[error("failed to cancel notification: {0}")]
    CancelFailed(String),

    /// Failed to initialize the notification capability.
    #[error("failed to initialize notifications: {0}")]
    InitializationFailed(String),

    /// The host has no notification service.
    #[error("notifications are not available on this host")]
    NotAvailable,

    /// The host did not answer a call in time.
    #[error("notification service did not respond within {0:?}")]
    TimedOut(Duration),
}

impl NotificationError {
    /// Returns true if this error is related to permissions.
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::AuthorizationFailed(_))
    }

    /// Returns true if the capability cannot be used at all.
    #[must_use]
    pub fn disables_capability(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied | Self::NotAvailable | Self::TimedOut(_)
        )
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::AuthorizationFailed(_) | Self::PermissionDenied => {
                "allow notifications for cookflow in the system settings"
            }
            Self::ScheduleFailed(_) | Self::CancelFailed(_) => "check the notification center",
            Self::InitializationFailed(_) => "restart the cooking session",
            Self::NotAvailable => "use --notify console on this host",
            Self::TimedOut(_) => "raise notification.call_timeout_ms or use --notify console",
        }
    }
}
