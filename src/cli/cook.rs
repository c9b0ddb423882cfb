//! Interactive cooking host.
//!
//! Wires a recipe file, the session runner, a notification backend and the
//! terminal together:
//! - stdin lines become [`SessionCommand`]s
//! - Ctrl-C aborts the session
//! - engine events are printed as they happen

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::time::Duration;

use crate::cli::commands::{CookArgs, NotifyMode};
use crate::cli::display::Display;
use crate::config::AppConfig;
use crate::notification::{
    dispatcher, initialize_with_fallback, ConsoleNotifier, NotificationCapability,
    NotificationChannel, SystemClock,
};
use crate::session::{
    IntervalTickSource, RunnerConfig, SessionCommand, SessionEvent, SessionOutcome, SessionRunner,
};
use crate::types::SessionSpec;

/// Reads and validates a recipe file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if the recipe
/// breaks a step rule.
pub fn load_recipe(path: &Path) -> Result<SessionSpec> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read recipe: {:?}", path))?;
    let spec: SessionSpec = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse recipe: {:?}", path))?;
    spec.validate()
        .with_context(|| format!("Invalid recipe: {:?}", path))?;
    Ok(spec)
}

/// Maps one line of user input to a command.
///
/// An empty line toggles. Unknown input yields `None`.
pub fn parse_command(line: &str) -> Option<SessionCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" => Some(SessionCommand::Toggle),
        "s" | "r" | "start" | "resume" => Some(SessionCommand::Resume),
        "p" | "pause" => Some(SessionCommand::Pause),
        "n" | "next" | "skip" => Some(SessionCommand::Advance),
        "b" | "back" | "prev" => Some(SessionCommand::Retreat),
        "q" | "quit" | "abort" => Some(SessionCommand::Abort),
        _ => None,
    }
}

/// Runs an interactive cooking session and returns how it ended.
///
/// # Errors
///
/// Returns an error if the recipe cannot be loaded.
pub async fn cook(args: &CookArgs, config: &AppConfig) -> Result<SessionOutcome> {
    let spec = Arc::new(load_recipe(&args.recipe)?);
    let runner_config = RunnerConfig {
        auto_resume: args.auto_resume || config.runner.auto_resume,
        auto_advance: args.auto_advance || config.runner.auto_advance,
    };

    let mode = if config.notification.enabled {
        args.notify
    } else {
        NotifyMode::Off
    };

    match mode {
        NotifyMode::Off => {
            run_session(spec, None::<ConsoleNotifier>, runner_config, args, config).await
        }
        NotifyMode::Console => {
            let capability = initialize_with_fallback(ConsoleNotifier::new()).await;
            run_session(spec, capability, runner_config, args, config).await
        }
        #[cfg(target_os = "macos")]
        NotifyMode::System => {
            let capability =
                initialize_with_fallback(crate::notification::SystemNotifier::new()).await;
            run_session(spec, capability, runner_config, args, config).await
        }
        #[cfg(not(target_os = "macos"))]
        NotifyMode::System => {
            tracing::warn!("system notifications are only available on macOS; using the console");
            let capability = initialize_with_fallback(ConsoleNotifier::new()).await;
            run_session(spec, capability, runner_config, args, config).await
        }
    }
}

async fn run_session<C: NotificationCapability>(
    spec: Arc<SessionSpec>,
    capability: Option<C>,
    runner_config: RunnerConfig,
    args: &CookArgs,
    config: &AppConfig,
) -> Result<SessionOutcome> {
    let (sender, dispatcher) = dispatcher(capability);
    let dispatcher = dispatcher.with_call_timeout(config.notification.call_timeout());
    let channel = NotificationChannel::new(
        Arc::clone(&spec),
        sender,
        SystemClock,
        config.notification.clone(),
    );
    let ticks = IntervalTickSource::with_period(Duration::from_millis(args.tick_ms));

    let (observer_tx, observer_rx) = mpsc::unbounded_channel();
    let runner = SessionRunner::new(Arc::clone(&spec), ticks, channel, runner_config)?
        .with_observer(observer_tx);

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let fully_automatic = runner_config.auto_resume && runner_config.auto_advance;
    spawn_stdin_reader(command_tx.clone(), fully_automatic);
    spawn_ctrl_c_handler(command_tx);

    if !args.json {
        Display::show_controls();
    }

    let (outcome, (), ()) = tokio::join!(
        runner.run(command_rx),
        dispatcher.run(),
        print_events(Arc::clone(&spec), observer_rx, args.json),
    );
    Ok(outcome)
}

/// Reads commands from stdin on a dedicated thread.
///
/// On end of input the session is aborted unless it can finish on its own.
fn spawn_stdin_reader(commands: mpsc::UnboundedSender<SessionCommand>, fully_automatic: bool) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match parse_command(&line) {
                Some(command) => {
                    if commands.send(command).is_err() {
                        return;
                    }
                }
                None => Display::show_error(&format!("unknown command: {}", line.trim())),
            }
        }

        if !fully_automatic {
            tracing::debug!("stdin closed; aborting session");
            let _ = commands.send(SessionCommand::Abort);
        }
    });
}

fn spawn_ctrl_c_handler(commands: mpsc::UnboundedSender<SessionCommand>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted");
            let _ = commands.send(SessionCommand::Abort);
        }
    });
}

async fn print_events(
    spec: Arc<SessionSpec>,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    quiet: bool,
) {
    while let Some(event) = events.recv().await {
        if !quiet {
            Display::show_event(&spec, &event);
        }
    }
}
