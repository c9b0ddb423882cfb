//! Notification content construction.
//!
//! Renders the persistent cooking notification: urgency tier, status glyph,
//! step title, progress bar and `mm:ss` countdown.

use serde::{Deserialize, Serialize};

use crate::session::progress::{format_remaining, render_progress_bar, step_fraction};
use crate::types::{SessionSummary, Step};

/// Maximum length for titles shown in notifications.
const MAX_TITLE_LENGTH: usize = 100;

/// Default remaining-time threshold for the `High` tier.
pub const DEFAULT_URGENT_WINDOW_SECONDS: u32 = 60;

/// Default remaining-time threshold for the `Max` tier.
pub const DEFAULT_MAX_URGENCY_SECONDS: u32 = 30;

// ============================================================================
// UrgencyTier
// ============================================================================

/// Classification of remaining time, used as notification priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyTier {
    /// More than a minute left
    Normal,
    /// Final minute
    High,
    /// Final seconds
    Max,
}

impl UrgencyTier {
    /// Classifies remaining seconds with the default thresholds
    /// (`≤30s` Max, `31–60s` High, `>60s` Normal).
    pub fn from_remaining(remaining_seconds: u32) -> Self {
        Self::classify(
            remaining_seconds,
            DEFAULT_URGENT_WINDOW_SECONDS,
            DEFAULT_MAX_URGENCY_SECONDS,
        )
    }

    /// Classifies remaining seconds with custom thresholds.
    pub fn classify(remaining_seconds: u32, urgent_window: u32, max_urgency: u32) -> Self {
        if remaining_seconds <= max_urgency {
            UrgencyTier::Max
        } else if remaining_seconds <= urgent_window {
            UrgencyTier::High
        } else {
            UrgencyTier::Normal
        }
    }

    /// Status glyph shown in front of the step title.
    pub fn glyph(&self) -> &'static str {
        match self {
            UrgencyTier::Normal => "🍳",
            UrgencyTier::High => "⏰",
            UrgencyTier::Max => "🔥",
        }
    }

    /// Short status label.
    pub fn label(&self) -> &'static str {
        match self {
            UrgencyTier::Normal => "Cooking",
            UrgencyTier::High => "Almost there",
            UrgencyTier::Max => "Final seconds",
        }
    }

    /// Returns the string representation of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyTier::Normal => "normal",
            UrgencyTier::High => "high",
            UrgencyTier::Max => "max",
        }
    }
}

// ============================================================================
// NotificationContent
// ============================================================================

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Live countdown of a running step
    Countdown {
        /// Step index
        step_index: usize,
        /// Remaining seconds shown
        remaining_seconds: u32,
    },
    /// Countdown of a paused step
    Paused {
        /// Step index
        step_index: usize,
    },
    /// A step ran out; tap to continue
    StepComplete {
        /// Step index
        step_index: usize,
    },
    /// The whole recipe is done
    SessionComplete,
}

impl NotificationKind {
    /// Category identifier used by platform backends.
    pub fn category_id(&self) -> &'static str {
        match self {
            NotificationKind::Countdown { .. } => "COOKING_COUNTDOWN",
            NotificationKind::Paused { .. } => "COOKING_PAUSED",
            NotificationKind::StepComplete { .. } => "STEP_COMPLETE",
            NotificationKind::SessionComplete => "SESSION_COMPLETE",
        }
    }
}

/// Rendered notification, independent of any platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    /// What the notification is about
    pub kind: NotificationKind,
    /// Title line
    pub title: String,
    /// Body text
    pub body: String,
    /// Priority
    pub priority: UrgencyTier,
    /// Whether the notification plays a sound
    pub sound: bool,
}

impl NotificationContent {
    /// Creates silent, normal-priority content.
    pub fn new(kind: NotificationKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: body.into(),
            priority: UrgencyTier::Normal,
            sound: false,
        }
    }

    /// Sets the priority.
    #[must_use]
    pub fn priority(mut self, priority: UrgencyTier) -> Self {
        self.priority = priority;
        self
    }

    /// Enables the notification sound.
    #[must_use]
    pub fn with_sound(mut self) -> Self {
        self.sound = true;
        self
    }
}

/// Sanitizes a title for use in notifications.
///
/// Truncates to a maximum length and removes control characters.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_TITLE_LENGTH)
        .collect()
}

fn session_title(session_name: &str, step_index: usize, step_count: usize) -> String {
    format!(
        "{} · step {}/{}",
        sanitize_title(session_name),
        step_index + 1,
        step_count
    )
}

/// Creates content for a running step's countdown.
pub fn countdown_content(
    session_name: &str,
    step: &Step,
    step_index: usize,
    step_count: usize,
    remaining_seconds: u32,
    tier: UrgencyTier,
    bar_width: usize,
) -> NotificationContent {
    let bar = render_progress_bar(
        step_fraction(step.planned_duration_seconds, remaining_seconds),
        bar_width,
    );
    let body = format!(
        "{} {}\n{} {} · {}",
        tier.glyph(),
        sanitize_title(&step.title),
        bar,
        format_remaining(remaining_seconds),
        tier.label()
    );

    NotificationContent::new(
        NotificationKind::Countdown {
            step_index,
            remaining_seconds,
        },
        session_title(session_name, step_index, step_count),
        body,
    )
    .priority(tier)
}

/// Creates content for a paused step.
pub fn paused_content(
    session_name: &str,
    step: &Step,
    step_index: usize,
    step_count: usize,
    remaining_seconds: u32,
    bar_width: usize,
) -> NotificationContent {
    let bar = render_progress_bar(
        step_fraction(step.planned_duration_seconds, remaining_seconds),
        bar_width,
    );
    let body = format!(
        "⏸ {}\n{} {} · Paused",
        sanitize_title(&step.title),
        bar,
        format_remaining(remaining_seconds)
    );

    NotificationContent::new(
        NotificationKind::Paused { step_index },
        session_title(session_name, step_index, step_count),
        body,
    )
}

/// Creates the one-shot "step complete, tap to continue" alert.
pub fn step_complete_content(
    session_name: &str,
    step: &Step,
    step_index: usize,
    next_step: Option<&Step>,
) -> NotificationContent {
    let body = match next_step {
        Some(next) => format!("Tap to continue with: {}", sanitize_title(&next.title)),
        None => "Tap to continue".to_string(),
    };

    NotificationContent::new(
        NotificationKind::StepComplete { step_index },
        format!(
            "✅ {} done · {}",
            sanitize_title(&step.title),
            sanitize_title(session_name)
        ),
        body,
    )
    .priority(UrgencyTier::Max)
    .with_sound()
}

/// Creates the final "session complete" notification.
pub fn session_complete_content(summary: &SessionSummary, bar_width: usize) -> NotificationContent {
    let elapsed = u32::try_from(summary.total_elapsed_seconds).unwrap_or(u32::MAX);
    let body = format!(
        "{} 100% · cooked in {}",
        render_progress_bar(1.0, bar_width),
        format_remaining(elapsed)
    );

    NotificationContent::new(
        NotificationKind::SessionComplete,
        format!("🎉 {} is ready", sanitize_title(&summary.session_name)),
        body,
    )
    .priority(UrgencyTier::Max)
    .with_sound()
}
