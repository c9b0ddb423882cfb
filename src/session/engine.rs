//! Session timer engine for guided cooking.
//!
//! This module provides the core state machine over a recipe's steps:
//! - Per-step countdown driven by an external 1 Hz tick
//! - Pause/resume of the current step
//! - Manual navigation (previous / skip / next)
//! - Completion and abort transitions
//! - Event firing for notifications and the caller's UI
//!
//! The engine never advances on its own when a step runs out: the caller
//! confirms with [`SessionEngine::advance_step`]. The last step is the
//! exception and completes the session directly.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::types::{SessionSpec, SessionState, SessionStatus, SessionSummary, Step};

use super::error::SessionError;

// ============================================================================
// SessionEvent
// ============================================================================

/// Session events for notifications and external subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session was started and positioned on its first step
    Started {
        /// Recipe name
        session_name: String,
        /// Number of steps in the recipe
        step_count: usize,
    },
    /// The current step's countdown started or resumed
    Resumed {
        /// Current step index
        step_index: usize,
        /// Remaining seconds of the step
        remaining_seconds: u32,
    },
    /// The current step's countdown was paused
    Paused {
        /// Current step index
        step_index: usize,
        /// Remaining seconds of the step
        remaining_seconds: u32,
    },
    /// One second elapsed
    Tick {
        /// Current step index
        step_index: usize,
        /// Remaining seconds after this tick
        remaining_seconds: u32,
        /// Seconds counted down across the session
        total_elapsed_seconds: u64,
    },
    /// A non-last step ran out and waits for confirmation
    StepExpired {
        /// Index of the expired step
        step_index: usize,
    },
    /// The current step changed through navigation
    StepChanged {
        /// New step index
        step_index: usize,
        /// Full planned duration of the new step
        remaining_seconds: u32,
    },
    /// Every step is done
    SessionCompleted(SessionSummary),
    /// The session was abandoned
    SessionAborted(SessionSummary),
}

impl SessionEvent {
    /// Returns true if the event ends the session.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionEvent::SessionCompleted(_) | SessionEvent::SessionAborted(_)
        )
    }
}

// ============================================================================
// SessionEngine
// ============================================================================

/// Timer engine that manages one cooking session at a time.
pub struct SessionEngine {
    /// Recipe of the current (or last) session
    spec: Option<Arc<SessionSpec>>,
    /// Current session state
    state: SessionState,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionEngine {
    /// Creates an engine with no session, publishing events on `event_tx`.
    pub fn new(event_tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            spec: None,
            state: SessionState::default(),
            event_tx,
        }
    }

    /// Starts a new session on step 0 with a stopped countdown.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSpec` if the recipe has no steps, and
    /// `IllegalTransition` if another session on this engine is still live.
    pub fn start(&mut self, spec: impl Into<Arc<SessionSpec>>) -> Result<(), SessionError> {
        if self.state.status.is_live() {
            return Err(SessionError::illegal("start", self.state.status));
        }

        let spec = spec.into();
        let first = spec.steps.first().ok_or_else(|| {
            SessionError::InvalidSpec(format!("recipe '{}' has no steps", spec.session_name))
        })?;

        self.state = SessionState::begin(first.planned_duration_seconds);
        self.spec = Some(Arc::clone(&spec));

        tracing::info!(
            session = %spec.session_name,
            steps = spec.len(),
            "cooking session started"
        );

        self.emit(SessionEvent::Started {
            session_name: spec.session_name.clone(),
            step_count: spec.len(),
        });

        Ok(())
    }

    /// Starts or resumes the current step's countdown.
    ///
    /// A no-op if the countdown is already running.
    ///
    /// # Errors
    ///
    /// Returns `IllegalTransition` if no session is live or the current step
    /// has already run out.
    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.live_spec("resume")?;

        if self.state.status == SessionStatus::StepJustCompleted {
            return Err(SessionError::illegal("resume", self.state.status));
        }
        if self.state.is_running {
            return Ok(());
        }

        self.state.is_running = true;
        self.emit(SessionEvent::Resumed {
            step_index: self.state.current_step_index,
            remaining_seconds: self.state.remaining_seconds,
        });

        Ok(())
    }

    /// Pauses the current step's countdown.
    ///
    /// A no-op if the countdown is not running.
    ///
    /// # Errors
    ///
    /// Returns `IllegalTransition` if no session is live.
    pub fn pause(&mut self) -> Result<(), SessionError> {
        self.live_spec("pause")?;

        if !self.state.is_running {
            return Ok(());
        }

        self.state.is_running = false;
        self.emit(SessionEvent::Paused {
            step_index: self.state.current_step_index,
            remaining_seconds: self.state.remaining_seconds,
        });

        Ok(())
    }

    /// Counts the running step down by one second.
    ///
    /// Stray ticks while paused are ignored. When the countdown reaches 0 the
    /// step stops; the last step completes the session, any other step
    /// waits in `StepJustCompleted`.
    ///
    /// # Errors
    ///
    /// Returns `IllegalTransition` if no session is live.
    pub fn tick(&mut self) -> Result<(), SessionError> {
        let spec = self.live_spec("tick")?;

        if !self.state.is_running {
            tracing::trace!("tick ignored while paused");
            return Ok(());
        }

        let expired = self.state.tick();

        self.emit(SessionEvent::Tick {
            step_index: self.state.current_step_index,
            remaining_seconds: self.state.remaining_seconds,
            total_elapsed_seconds: self.state.total_elapsed_seconds,
        });

        if expired {
            self.state.is_running = false;

            if self.state.current_step_index >= spec.last_index() {
                self.complete(&spec);
            } else {
                self.state.status = SessionStatus::StepJustCompleted;
                tracing::debug!(step = self.state.current_step_index, "step expired");
                self.emit(SessionEvent::StepExpired {
                    step_index: self.state.current_step_index,
                });
            }
        }

        Ok(())
    }

    /// Moves to the next step, or completes the session from the last step.
    ///
    /// Valid mid-countdown (manual skip) and after a step expired. Skipped
    /// time is not added to the elapsed total.
    ///
    /// # Errors
    ///
    /// Returns `IllegalTransition` if no session is live.
    pub fn advance_step(&mut self) -> Result<(), SessionError> {
        let spec = self.live_spec("advance")?;

        let index = self.state.current_step_index;
        if index >= spec.last_index() {
            self.complete(&spec);
            return Ok(());
        }

        self.enter_step(&spec, index + 1);
        Ok(())
    }

    /// Moves back to the previous step with a fresh, stopped countdown.
    ///
    /// A no-op on the first step.
    ///
    /// # Errors
    ///
    /// Returns `IllegalTransition` if no session is live.
    pub fn retreat_step(&mut self) -> Result<(), SessionError> {
        let spec = self.live_spec("go back")?;

        let index = self.state.current_step_index;
        if index == 0 {
            return Ok(());
        }

        self.enter_step(&spec, index - 1);
        Ok(())
    }

    /// Abandons the session.
    ///
    /// Calling it again on an aborted session is a no-op. Before `start`
    /// there is no session to abandon and no summary to report, so
    /// `NotStarted` is rejected like a terminal state.
    ///
    /// # Errors
    ///
    /// Returns `IllegalTransition` if no session was started or the session
    /// already completed.
    pub fn abort(&mut self) -> Result<(), SessionError> {
        match self.state.status {
            SessionStatus::Aborted => {
                tracing::debug!("session already aborted");
                Ok(())
            }
            SessionStatus::NotStarted | SessionStatus::SessionComplete => {
                Err(SessionError::illegal("abort", self.state.status))
            }
            SessionStatus::Active | SessionStatus::StepJustCompleted => {
                self.state.status = SessionStatus::Aborted;
                self.state.is_running = false;

                let summary = self.build_summary();
                tracing::info!(
                    session = %summary.session_name,
                    elapsed = summary.total_elapsed_seconds,
                    "cooking session aborted"
                );
                self.emit(SessionEvent::SessionAborted(summary));
                Ok(())
            }
        }
    }

    /// Returns a reference to the current session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns the recipe of the current (or last) session.
    pub fn spec(&self) -> Option<&SessionSpec> {
        self.spec.as_deref()
    }

    /// Returns the current step, if a session was started.
    pub fn current_step(&self) -> Option<&Step> {
        self.spec
            .as_ref()
            .and_then(|spec| spec.step(self.state.current_step_index))
    }

    /// Returns the current status.
    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    /// Returns true if the countdown is running.
    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    /// Returns the completion summary once the session has ended.
    pub fn summary(&self) -> Option<SessionSummary> {
        if self.state.status.is_terminal() {
            Some(self.build_summary())
        } else {
            None
        }
    }

    /// Returns a mutable reference to the session state (for testing).
    #[cfg(test)]
    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    fn live_spec(&self, operation: &'static str) -> Result<Arc<SessionSpec>, SessionError> {
        match &self.spec {
            Some(spec) if self.state.status.is_live() => Ok(Arc::clone(spec)),
            _ => Err(SessionError::illegal(operation, self.state.status)),
        }
    }

    fn enter_step(&mut self, spec: &SessionSpec, index: usize) {
        let planned = spec.steps[index].planned_duration_seconds;
        self.state.enter_step(index, planned);

        self.emit(SessionEvent::StepChanged {
            step_index: index,
            remaining_seconds: planned,
        });
    }

    fn complete(&mut self, spec: &SessionSpec) {
        self.state.status = SessionStatus::SessionComplete;
        self.state.is_running = false;

        let summary = self.build_summary();
        tracing::info!(
            session = %spec.session_name,
            elapsed = summary.total_elapsed_seconds,
            "cooking session complete"
        );
        self.emit(SessionEvent::SessionCompleted(summary));
    }

    fn build_summary(&self) -> SessionSummary {
        SessionSummary {
            session_name: self
                .spec
                .as_ref()
                .map(|spec| spec.session_name.clone())
                .unwrap_or_default(),
            total_elapsed_seconds: self.state.total_elapsed_seconds,
        }
    }

    fn emit(&self, event: SessionEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::debug!("session event dropped: no subscriber");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
