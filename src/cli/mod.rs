//! CLI module for cookflow.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `cook`: Interactive cooking host
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod cook;
pub mod display;

pub use commands::{Cli, Commands, CookArgs, NotifyMode};
pub use cook::{cook, load_recipe, parse_command};
pub use display::Display;
