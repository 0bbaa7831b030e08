//! Command line interface for manifest_release.
//!
//! Argument parsing, task execution and colored user feedback.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::config::EnvConfig;
use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let env = EnvConfig::from_env();
    execute_command(args, &env).await
}
