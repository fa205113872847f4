//! Command line interface for go-build-tool.
//!
//! Parses flags, merges them with the config file and runs the build.

mod args;
pub mod commands;
mod output;

pub use args::{Args, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}
