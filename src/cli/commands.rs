//! Command definitions for the cookflow CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ============================================================================
// CLI Structure
// ============================================================================

/// Cookflow - guided cooking timer
#[derive(Parser, Debug)]
#[command(
    name = "cookflow",
    version,
    about = "Guided cooking timer with a live notification",
    long_about = "Walks through a recipe step by step with a countdown per step.\n\
                  The countdown is mirrored into a persistent notification.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Cook a recipe step by step
    Cook(CookArgs),

    /// Show the steps and planned durations of a recipe
    Plan {
        /// Recipe file (JSON)
        recipe: PathBuf,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a recipe file
    Validate {
        /// Recipe file (JSON)
        recipe: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Where notifications are shown.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyMode {
    /// Log notifications to the terminal
    #[default]
    Console,
    /// Use the system notification center (macOS)
    System,
    /// Disable notifications
    Off,
}

// ============================================================================
// Cook Command Arguments
// ============================================================================

/// Arguments for the cook command
#[derive(Args, Debug, Clone)]
pub struct CookArgs {
    /// Recipe file (JSON)
    pub recipe: PathBuf,

    /// Start each step's countdown automatically
    #[arg(long)]
    pub auto_resume: bool,

    /// Continue automatically when a step runs out
    #[arg(long)]
    pub auto_advance: bool,

    /// Notification backend
    #[arg(long, value_enum, default_value_t = NotifyMode::Console)]
    pub notify: NotifyMode,

    /// Milliseconds per cooking second (10-60000)
    #[arg(
        long,
        default_value = "1000",
        value_parser = clap::value_parser!(u64).range(10..=60000)
    )]
    pub tick_ms: u64,

    /// Print the session summary as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// Tests
// ============================================================================
