//! Guided cooking session.
//!
//! - `engine`: step state machine and its events
//! - `progress`: pure progress aggregation and rendering
//! - `ticker`: tick sources driving the countdown
//! - `runner`: host loop tying engine, ticks and notifications together

pub mod engine;
pub mod error;
pub mod progress;
pub mod runner;
pub mod ticker;

pub use engine::{SessionEngine, SessionEvent};
pub use error::SessionError;
pub use progress::{render_progress_bar, step_progress, total_progress};
pub use runner::{RunnerConfig, SessionCommand, SessionOutcome, SessionRunner};
pub use ticker::{IntervalTickSource, ManualTickSource, ManualTicker, TickSource};
