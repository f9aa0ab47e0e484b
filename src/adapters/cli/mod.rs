//! CLI Adapter
//!
//! Command-line interface for the reverter bot.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CliApp, Command, QuoteCmd, RunCmd, Side, StatusCmd, SwapCmd};
