//! Core data types for guided cooking sessions.
//!
//! This module defines the data structures used for:
//! - Recipe steps and session specifications (the JSON recipe format)
//! - Session state owned by the timer engine
//! - Completion summaries handed to streak/analytics collaborators

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::SessionError;

// ============================================================================
// Step
// ============================================================================

/// One preparation step of a recipe.
///
/// Steps are supplied by the recipe provider and are read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// 1-based position of the step within the recipe
    pub ordinal: u32,
    /// Short title shown in notifications
    pub title: String,
    /// Full instruction text
    pub instruction: String,
    /// Optional cooking tip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
    /// Planned duration of the step in seconds
    pub planned_duration_seconds: u32,
}

impl Step {
    /// Creates a new step without a tip.
    pub fn new(
        ordinal: u32,
        title: impl Into<String>,
        instruction: impl Into<String>,
        planned_duration_seconds: u32,
    ) -> Self {
        Self {
            ordinal,
            title: title.into(),
            instruction: instruction.into(),
            tip: None,
            planned_duration_seconds,
        }
    }

    /// Attaches a tip to the step.
    #[must_use]
    pub fn with_tip(mut self, tip: impl Into<String>) -> Self {
        self.tip = Some(tip.into());
        self
    }
}

// ============================================================================
// SessionSpec
// ============================================================================

/// Input description of one cooking session: a name plus ordered steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSpec {
    /// Recipe name, reported back on completion
    pub session_name: String,
    /// Ordered preparation steps
    pub steps: Vec<Step>,
}

impl SessionSpec {
    /// Creates a validated session spec.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidSpec` if the step list is empty, an
    /// ordinal is zero or not strictly increasing, or a duration is zero.
    pub fn new(session_name: impl Into<String>, steps: Vec<Step>) -> Result<Self, SessionError> {
        let spec = Self {
            session_name: session_name.into(),
            steps,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Checks the recipe-provider guarantees: non-empty, ordinals unique and
    /// strictly increasing, positive durations.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.steps.is_empty() {
            return Err(SessionError::InvalidSpec(format!(
                "recipe '{}' has no steps",
                self.session_name
            )));
        }

        let mut previous = 0;
        for step in &self.steps {
            if step.ordinal == 0 {
                return Err(SessionError::InvalidSpec(format!(
                    "step '{}' has ordinal 0 (ordinals start at 1)",
                    step.title
                )));
            }
            if step.ordinal <= previous {
                return Err(SessionError::InvalidSpec(format!(
                    "step ordinal {} does not follow {}",
                    step.ordinal, previous
                )));
            }
            if step.planned_duration_seconds == 0 {
                return Err(SessionError::InvalidSpec(format!(
                    "step {} ('{}') has no planned duration",
                    step.ordinal, step.title
                )));
            }
            previous = step.ordinal;
        }

        Ok(())
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the spec has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the last step (0 for an empty spec).
    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Returns the step at `index`, if any.
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Sum of all planned durations in seconds.
    pub fn total_planned_seconds(&self) -> u64 {
        self.steps
            .iter()
            .map(|step| u64::from(step.planned_duration_seconds))
            .sum()
    }

    /// Sum of the planned durations of the steps strictly before `index`.
    pub fn planned_seconds_before(&self, index: usize) -> u64 {
        self.steps
            .iter()
            .take(index)
            .map(|step| u64::from(step.planned_duration_seconds))
            .sum()
    }
}

// ============================================================================
// SessionStatus
// ============================================================================

/// Lifecycle status of a cooking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No session has been started on the engine yet
    #[default]
    NotStarted,
    /// A step is current and may be counting down
    Active,
    /// The current (non-last) step ran out; waiting for the caller to advance
    StepJustCompleted,
    /// Every step is done
    SessionComplete,
    /// The session was abandoned
    Aborted,
}

impl SessionStatus {
    /// Returns the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::NotStarted => "not_started",
            SessionStatus::Active => "active",
            SessionStatus::StepJustCompleted => "step_just_completed",
            SessionStatus::SessionComplete => "session_complete",
            SessionStatus::Aborted => "aborted",
        }
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::SessionComplete | SessionStatus::Aborted)
    }

    /// Returns true if a session is in progress.
    pub fn is_live(&self) -> bool {
        matches!(self, SessionStatus::Active | SessionStatus::StepJustCompleted)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SessionState
// ============================================================================

/// Mutable state of one cooking session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Index of the current step
    pub current_step_index: usize,
    /// Countdown for the current step only
    pub remaining_seconds: u32,
    /// Whether the countdown is running
    pub is_running: bool,
    /// Seconds actually counted down across the whole session
    pub total_elapsed_seconds: u64,
    /// Lifecycle status
    pub status: SessionStatus,
}

impl SessionState {
    /// Creates the state of a freshly started session positioned on step 0.
    pub fn begin(first_step_seconds: u32) -> Self {
        let mut state = Self {
            status: SessionStatus::Active,
            ..Self::default()
        };
        state.enter_step(0, first_step_seconds);
        state
    }

    /// Moves to the given step with a full, stopped countdown.
    pub fn enter_step(&mut self, index: usize, planned_seconds: u32) {
        self.current_step_index = index;
        self.remaining_seconds = planned_seconds;
        self.is_running = false;
        self.status = SessionStatus::Active;
    }

    /// Counts down one second.
    ///
    /// Returns true if the step countdown has reached 0.
    pub fn tick(&mut self) -> bool {
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
        }
        self.total_elapsed_seconds += 1;
        self.remaining_seconds == 0
    }
}

// ============================================================================
// SessionSummary
// ============================================================================

/// Data handed to the caller when a session ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Recipe name
    pub session_name: String,
    /// Seconds actually counted down
    pub total_elapsed_seconds: u64,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_steps() -> Vec<Step> {
        vec![
            Step::new(1, "Boil water", "Bring a large pot of salted water to a boil", 300),
            Step::new(2, "Cook pasta", "Add the spaghetti and stir", 540).with_tip("Save a cup of pasta water"),
            Step::new(3, "Toss", "Toss with the sauce", 60),
        ]
    }

    // ------------------------------------------------------------------------
    // SessionSpec Tests
    // ------------------------------------------------------------------------

    mod session_spec_tests {
        use super::*;

        #[test]
        fn test_new_valid() {
            let spec = SessionSpec::new("Carbonara", sample_steps()).unwrap();
            assert_eq!(spec.len(), 3);
            assert_eq!(spec.last_index(), 2);
            assert_eq!(spec.step(1).unwrap().tip.as_deref(), Some("Save a cup of pasta water"));
        }

        #[test]
        fn test_empty_steps_rejected() {
            let err = SessionSpec::new("Nothing", vec![]).unwrap_err();
            assert!(matches!(err, SessionError::InvalidSpec(_)));
            assert!(err.to_string().contains("no steps"));
        }

        #[test]
        fn test_zero_ordinal_rejected() {
            let steps = vec![Step::new(0, "Prep", "Chop", 10)];
            assert!(SessionSpec::new("Bad", steps).is_err());
        }

        #[test]
        fn test_duplicate_ordinal_rejected() {
            let steps = vec![Step::new(1, "A", "a", 10), Step::new(1, "B", "b", 10)];
            let err = SessionSpec::new("Bad", steps).unwrap_err();
            assert!(err.to_string().contains("does not follow"));
        }

        #[test]
        fn test_decreasing_ordinal_rejected() {
            let steps = vec![Step::new(2, "A", "a", 10), Step::new(1, "B", "b", 10)];
            assert!(SessionSpec::new("Bad", steps).is_err());
        }

        #[test]
        fn test_gaps_in_ordinals_allowed() {
            let steps = vec![Step::new(1, "A", "a", 10), Step::new(5, "B", "b", 10)];
            assert!(SessionSpec::new("Gappy", steps).is_ok());
        }

        #[test]
        fn test_zero_duration_rejected() {
            let steps = vec![Step::new(1, "A", "a", 0)];
            let err = SessionSpec::new("Bad", steps).unwrap_err();
            assert!(err.to_string().contains("no planned duration"));
        }

        #[test]
        fn test_duration_sums() {
            let spec = SessionSpec::new("Carbonara", sample_steps()).unwrap();
            assert_eq!(spec.total_planned_seconds(), 900);
            assert_eq!(spec.planned_seconds_before(0), 0);
            assert_eq!(spec.planned_seconds_before(2), 840);
            assert_eq!(spec.planned_seconds_before(10), 900);
        }

        #[test]
        fn test_recipe_json_format() {
            let json = r#"{
                "sessionName": "Soft boiled egg",
                "steps": [
                    {"ordinal": 1, "title": "Boil", "instruction": "Boil water", "plannedDurationSeconds": 240},
                    {"ordinal": 2, "title": "Cook", "instruction": "Add egg", "tip": "Use a spoon", "plannedDurationSeconds": 390}
                ]
            }"#;

            let spec: SessionSpec = serde_json::from_str(json).unwrap();
            assert_eq!(spec.session_name, "Soft boiled egg");
            assert_eq!(spec.steps[1].tip.as_deref(), Some("Use a spoon"));
            assert_eq!(spec.steps[1].planned_duration_seconds, 390);
            assert!(spec.validate().is_ok());
        }

        #[test]
        fn test_tip_omitted_when_serializing() {
            let step = Step::new(1, "Boil", "Boil water", 240);
            let json = serde_json::to_string(&step).unwrap();
            assert!(!json.contains("tip"));
            assert!(json.contains("plannedDurationSeconds"));
        }
    }

    // ------------------------------------------------------------------------
    // SessionStatus Tests
    // ------------------------------------------------------------------------

    mod session_status_tests {
        use super::*;

        #[test]
        fn test_default_is_not_started() {
            assert_eq!(SessionStatus::default(), SessionStatus::NotStarted);
        }

        #[test]
        fn test_is_terminal() {
            assert!(!SessionStatus::NotStarted.is_terminal());
            assert!(!SessionStatus::Active.is_terminal());
            assert!(!SessionStatus::StepJustCompleted.is_terminal());
            assert!(SessionStatus::SessionComplete.is_terminal());
            assert!(SessionStatus::Aborted.is_terminal());
        }

        #[test]
        fn test_display() {
            assert_eq!(SessionStatus::StepJustCompleted.to_string(), "step_just_completed");
            let json = serde_json::to_string(&SessionStatus::SessionComplete).unwrap();
            assert_eq!(json, "\"session_complete\"");
        }
    }

    // ------------------------------------------------------------------------
    // SessionState Tests
    // ------------------------------------------------------------------------

    mod session_state_tests {
        use super::*;

        #[test]
        fn test_begin() {
            let state = SessionState::begin(300);
            assert_eq!(state.current_step_index, 0);
            assert_eq!(state.remaining_seconds, 300);
            assert!(!state.is_running);
            assert_eq!(state.total_elapsed_seconds, 0);
            assert_eq!(state.status, SessionStatus::Active);
        }

        #[test]
        fn test_tick_counts_down_and_accumulates() {
            let mut state = SessionState::begin(2);
            assert!(!state.tick());
            assert_eq!(state.remaining_seconds, 1);
            assert!(state.tick());
            assert_eq!(state.remaining_seconds, 0);
            assert_eq!(state.total_elapsed_seconds, 2);
        }

        #[test]
        fn test_enter_step_resets_countdown() {
            let mut state = SessionState::begin(10);
            state.is_running = true;
            state.tick();
            state.enter_step(1, 45);
            assert_eq!(state.current_step_index, 1);
            assert_eq!(state.remaining_seconds, 45);
            assert!(!state.is_running);
            assert_eq!(state.total_elapsed_seconds, 1);
        }
    }
}
