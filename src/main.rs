//! go-build-tool - cross-compile Go packages and pack the binaries.

use go_build_tool::cli;
use go_build_tool::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Never quiet for fatal errors
            let output = OutputManager::new(false, false);
            output.error(&format!("Fatal error: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                eprintln!("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    eprintln!("    {suggestion}");
                }
            }

            process::exit(1);
        }
    }
}
