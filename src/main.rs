//! Cookflow CLI - guided cooking timer
//!
//! Walks through a recipe one step at a time:
//! - a countdown per step, started and confirmed by the cook
//! - overall progress across all steps
//! - a persistent notification mirroring the countdown

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use cookflow::cli::{cook, load_recipe, Cli, Commands, Display};
use cookflow::config::AppConfig;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Cook(args)) => {
            let config = AppConfig::load(cli.config.as_deref())?;
            let outcome = cook(&args, &config).await?;
            if args.json {
                Display::show_outcome_json(&outcome).context("Failed to write summary")?;
            } else {
                Display::show_outcome(&outcome);
            }
        }
        Some(Commands::Plan { recipe, json }) => {
            let spec = load_recipe(&recipe)?;
            if json {
                Display::show_plan_json(&spec).context("Failed to write plan")?;
            } else {
                Display::show_plan(&spec);
            }
        }
        Some(Commands::Validate { recipe }) => {
            let spec = load_recipe(&recipe)?;
            Display::show_valid(&spec);
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["cookflow"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_validate() {
        let cli = Cli::parse_from(["cookflow", "validate", "recipe.json"]);
        assert!(matches!(cli.command, Some(Commands::Validate { .. })));
    }

    #[test]
    fn test_cli_parse_verbose() {
        let cli = Cli::parse_from(["cookflow", "--verbose", "plan", "recipe.json"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
