//! Host loop driving one cooking session.
//!
//! [`SessionRunner`] owns the engine, the notification channel and the tick
//! source. User commands and ticks are serialized through a single
//! `select!`, so the engine never sees concurrent calls. The tick source is
//! only polled while the countdown runs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::notification::{Clock, NotificationChannel};
use crate::types::{SessionSpec, SessionStatus, SessionSummary};

use super::engine::{SessionEngine, SessionEvent};
use super::error::SessionError;
use super::ticker::TickSource;

/// User command for a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Start or resume the countdown
    Resume,
    /// Pause the countdown
    Pause,
    /// Pause if running, resume if paused, continue after an expired step
    Toggle,
    /// Skip to the next step
    Advance,
    /// Go back to the previous step
    Retreat,
    /// Abandon the session
    Abort,
}

/// Host policies applied on top of the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Start each step's countdown as soon as the step is entered.
    #[serde(default)]
    pub auto_resume: bool,
    /// Continue automatically when a step runs out.
    #[serde(default)]
    pub auto_advance: bool,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every step was done
    Completed(SessionSummary),
    /// The session was abandoned
    Aborted(SessionSummary),
}

impl SessionOutcome {
    /// Returns the summary handed to the caller.
    pub fn summary(&self) -> &SessionSummary {
        match self {
            SessionOutcome::Completed(summary) | SessionOutcome::Aborted(summary) => summary,
        }
    }

    /// Returns true if the session completed.
    pub fn is_completed(&self) -> bool {
        matches!(self, SessionOutcome::Completed(_))
    }
}

/// Drives a started session until it completes or is aborted.
pub struct SessionRunner<T, K> {
    engine: SessionEngine,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    ticks: T,
    channel: NotificationChannel<K>,
    observer: Option<mpsc::UnboundedSender<SessionEvent>>,
    config: RunnerConfig,
}

impl<T: TickSource, K: Clock> SessionRunner<T, K> {
    /// Starts a session on `spec`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSpec` if the recipe has no steps.
    pub fn new(
        spec: Arc<SessionSpec>,
        ticks: T,
        channel: NotificationChannel<K>,
        config: RunnerConfig,
    ) -> Result<Self, SessionError> {
        let (event_tx, events) = mpsc::unbounded_channel();
        let mut engine = SessionEngine::new(event_tx);
        engine.start(spec)?;

        Ok(Self {
            engine,
            events,
            ticks,
            channel,
            observer: None,
            config,
        })
    }

    /// Also forwards every engine event to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Returns the engine.
    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    /// Runs until the session ends.
    ///
    /// Once `commands` is closed the session keeps going only while the
    /// countdown runs; a session that would wait for user input forever is
    /// aborted. An exhausted tick source also aborts.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    ) -> SessionOutcome {
        let mut commands_open = true;
        self.process_events();

        loop {
            if let Some(outcome) = self.outcome() {
                return outcome;
            }

            let running = self.engine.is_running();
            tokio::select! {
                biased;

                command = commands.recv(), if commands_open => match command {
                    Some(command) => self.apply(command),
                    None => {
                        tracing::debug!("command stream closed");
                        commands_open = false;
                    }
                },
                alive = self.ticks.next_tick(), if running => {
                    if alive {
                        if let Err(e) = self.engine.tick() {
                            tracing::warn!(error = %e, "tick rejected");
                        }
                    } else {
                        tracing::warn!("tick source exhausted; aborting session");
                        self.abort();
                    }
                }
                else => {
                    tracing::info!("no more input while waiting; aborting session");
                    self.abort();
                }
            }

            self.process_events();
        }
    }

    fn apply(&mut self, command: SessionCommand) {
        tracing::debug!(?command, "session command");

        let result = match command {
            SessionCommand::Resume => self.engine.resume(),
            SessionCommand::Pause => self.engine.pause(),
            SessionCommand::Toggle => match self.engine.status() {
                SessionStatus::StepJustCompleted => self.engine.advance_step(),
                _ if self.engine.is_running() => self.engine.pause(),
                _ => self.engine.resume(),
            },
            SessionCommand::Advance => self.engine.advance_step(),
            SessionCommand::Retreat => self.engine.retreat_step(),
            SessionCommand::Abort => self.engine.abort(),
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, "{}", e.suggestion());
        }
    }

    fn abort(&mut self) {
        if let Err(e) = self.engine.abort() {
            tracing::warn!(error = %e, "abort rejected");
        }
    }

    /// Forwards queued engine events and applies the host policies, which
    /// may queue more events.
    fn process_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.channel.handle_event(&event);

            if let Some(observer) = &self.observer {
                if observer.send(event.clone()).is_err() {
                    tracing::debug!("session observer is gone");
                    self.observer = None;
                }
            }

            match event {
                SessionEvent::Resumed { .. } => self.ticks.reset(),
                SessionEvent::Started { .. } | SessionEvent::StepChanged { .. }
                    if self.config.auto_resume =>
                {
                    if let Err(e) = self.engine.resume() {
                        tracing::warn!(error = %e, "auto resume rejected");
                    }
                }
                SessionEvent::StepExpired { .. } if self.config.auto_advance => {
                    if let Err(e) = self.engine.advance_step() {
                        tracing::warn!(error = %e, "auto advance rejected");
                    }
                }
                _ => {}
            }
        }
    }

    fn outcome(&self) -> Option<SessionOutcome> {
        let summary = self.engine.summary()?;
        match self.engine.status() {
            SessionStatus::SessionComplete => Some(SessionOutcome::Completed(summary)),
            SessionStatus::Aborted => Some(SessionOutcome::Aborted(summary)),
            _ => None,
        }
    }
}
