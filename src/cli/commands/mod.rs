//! Command execution.
//!
//! Resolves the immutable [`BuildConfig`] once, runs the build and turns
//! failures into an exit code after printing them.

mod build;

pub use build::{BuildSummary, execute_build};

use crate::cli::{Args, RuntimeConfig};
use crate::config::{BuildConfig, FileConfig};
use crate::error::{CliError, Result};

/// Merge command line, config file and defaults into a [`BuildConfig`].
pub fn resolve_config(args: &Args) -> Result<BuildConfig> {
    let file = FileConfig::discover(args.config.as_deref())?;
    Ok(BuildConfig::from_section(args.build_section().or(file.build))?)
}

/// Execute a build run based on parsed arguments.
///
/// Argument and configuration errors are returned to the caller; a failed
/// build is reported here and turned into exit code 1.
pub async fn execute_command(args: Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let runtime = RuntimeConfig::from(&args);
    let config = resolve_config(&args)?;
    log::debug!("Resolved configuration: {:?}", config);

    match execute_build(&config, &runtime).await {
        Ok(_) => Ok(0),
        Err(e) => {
            runtime.error_println(&format!("Build failed: {}", e));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() && !runtime.is_quiet() {
                runtime.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    runtime.println(&format!("  • {}", suggestion));
                }
            }

            Ok(1)
        }
    }
}
