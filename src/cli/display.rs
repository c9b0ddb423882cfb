//! Display utilities for the cookflow CLI.
//!
//! This module provides formatted output for:
//! - Recipe plans
//! - Live session events
//! - Session summaries
//! - Error messages

use crate::session::progress::{
    format_percent, format_remaining, render_progress_bar, step_fraction, total_fraction,
};
use crate::session::{SessionEvent, SessionOutcome};
use crate::types::{SessionSpec, Step};

/// Width of the progress bars printed in the terminal.
const BAR_WIDTH: usize = 20;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the steps and planned durations of a recipe.
    pub fn show_plan(spec: &SessionSpec) {
        println!("{}", spec.session_name);
        println!("─────────────────────────────");
        for step in &spec.steps {
            println!("{}", Self::plan_line(step));
            if let Some(tip) = &step.tip {
                println!("       tip: {}", tip);
            }
        }
        println!("─────────────────────────────");
        println!("Total: {}", Self::format_duration(spec.total_planned_seconds()));
    }

    /// Shows the plan of a recipe as JSON.
    pub fn show_plan_json(spec: &SessionSpec) -> serde_json::Result<()> {
        let plan = serde_json::json!({
            "sessionName": spec.session_name,
            "totalPlannedSeconds": spec.total_planned_seconds(),
            "steps": spec.steps,
        });
        println!("{}", serde_json::to_string_pretty(&plan)?);
        Ok(())
    }

    /// Shows a success message for recipe validation.
    pub fn show_valid(spec: &SessionSpec) {
        println!(
            "* {} is valid: {} steps, {}",
            spec.session_name,
            spec.len(),
            Self::format_duration(spec.total_planned_seconds())
        );
    }

    /// Shows the keys accepted during a session.
    pub fn show_controls() {
        println!("Commands: [Enter] start/pause/continue  s start  p pause  n next  b back  q quit");
    }

    /// Shows one session event, if it is worth a line.
    pub fn show_event(spec: &SessionSpec, event: &SessionEvent) {
        if let Some(line) = Self::event_line(spec, event) {
            println!("{}", line);
        }
    }

    /// Shows how a session ended.
    pub fn show_outcome(outcome: &SessionOutcome) {
        let summary = outcome.summary();
        let elapsed = u32::try_from(summary.total_elapsed_seconds).unwrap_or(u32::MAX);
        match outcome {
            SessionOutcome::Completed(_) => {
                println!(
                    "* {} is ready (cooked in {})",
                    summary.session_name,
                    format_remaining(elapsed)
                );
            }
            SessionOutcome::Aborted(_) => {
                println!(
                    "[] {} aborted after {}",
                    summary.session_name,
                    format_remaining(elapsed)
                );
            }
        }
    }

    /// Shows how a session ended as JSON.
    pub fn show_outcome_json(outcome: &SessionOutcome) -> serde_json::Result<()> {
        let value = serde_json::json!({
            "completed": outcome.is_completed(),
            "summary": outcome.summary(),
        });
        println!("{}", serde_json::to_string(&value)?);
        Ok(())
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    fn plan_line(step: &Step) -> String {
        format!(
            "{:>3}. {:<30} {:>8}",
            step.ordinal,
            step.title,
            Self::format_duration(u64::from(step.planned_duration_seconds))
        )
    }

    fn event_line(spec: &SessionSpec, event: &SessionEvent) -> Option<String> {
        let line = match event {
            SessionEvent::Started {
                session_name,
                step_count,
            } => format!(
                "Cooking {} ({} steps)\n{}",
                session_name,
                step_count,
                Self::step_block(spec, 0)?
            ),
            SessionEvent::StepChanged { step_index, .. } => {
                format!("\n{}", Self::step_block(spec, *step_index)?)
            }
            SessionEvent::Resumed { remaining_seconds, .. } => {
                format!("> running, {} left", format_remaining(*remaining_seconds))
            }
            SessionEvent::Paused { remaining_seconds, .. } => {
                format!("|| paused, {} left", format_remaining(*remaining_seconds))
            }
            SessionEvent::Tick {
                step_index,
                remaining_seconds,
                ..
            } => Self::tick_line(spec, *step_index, *remaining_seconds)?,
            SessionEvent::StepExpired { step_index } => {
                let step = spec.step(*step_index)?;
                format!("* {} done. Press Enter to continue", step.title)
            }
            SessionEvent::SessionCompleted(_) | SessionEvent::SessionAborted(_) => return None,
        };
        Some(line)
    }

    fn step_block(spec: &SessionSpec, step_index: usize) -> Option<String> {
        let step = spec.step(step_index)?;
        let mut block = format!(
            "Step {}/{}: {}\n  {}",
            step_index + 1,
            spec.len(),
            step.title,
            step.instruction
        );
        if let Some(tip) = &step.tip {
            block.push_str(&format!("\n  tip: {}", tip));
        }
        Some(block)
    }

    fn tick_line(spec: &SessionSpec, step_index: usize, remaining_seconds: u32) -> Option<String> {
        let step = spec.step(step_index)?;
        let step_bar = render_progress_bar(
            step_fraction(step.planned_duration_seconds, remaining_seconds),
            BAR_WIDTH,
        );
        let total = total_fraction(spec, step_index, remaining_seconds);
        Some(format!(
            "  {} {}  total {}",
            step_bar,
            format_remaining(remaining_seconds),
            format_percent(total)
        ))
    }

    /// Formats seconds as a short human duration.
    fn format_duration(total_seconds: u64) -> String {
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;
        match (hours, minutes, seconds) {
            (0, 0, s) => format!("{}s", s),
            (0, m, 0) => format!("{}m", m),
            (0, m, s) => format!("{}m {}s", m, s),
            (h, m, _) => format!("{}h {}m", h, m),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
