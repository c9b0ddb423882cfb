//! Cookflow Library
//!
//! This library provides the core functionality for the cookflow CLI.
//! It includes:
//! - Step model and session state types
//! - Session timer engine, progress aggregation and the host runner
//! - Notification synchronization with throttling and cleanup
//! - Configuration loading
//! - CLI command parsing and display utilities

pub mod cli;
pub mod config;
pub mod notification;
pub mod session;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{SessionSpec, SessionState, SessionStatus, SessionSummary, Step};

pub use config::{AppConfig, NotificationConfig};

pub use session::{
    IntervalTickSource, ManualTickSource, ManualTicker, RunnerConfig, SessionCommand,
    SessionEngine, SessionError, SessionEvent, SessionOutcome, SessionRunner, TickSource,
};

pub use notification::{
    dispatcher, initialize_with_fallback, Clock, ConsoleNotifier, DispatchCommand,
    ManualClock, MockNotificationCapability, NotificationCall, NotificationCapability,
    NotificationChannel, NotificationError, NotificationHandle, NotificationRecord,
    NotificationRequest, SystemClock, UrgencyTier,
};
