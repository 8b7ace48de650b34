//! Command line interface for prebuilt_publish.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::config::EnvConfig;
use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args, &EnvConfig::from_process()).await
}
