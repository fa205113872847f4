//! Error types for go-build-tool operations.
//!
//! Every routine returns one of these instead of exiting; `main` prints the
//! error with recovery suggestions and chooses the exit status.

use crate::target::TargetOs;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for go-build-tool operations
pub type Result<T> = std::result::Result<T, BuildError>;

/// Main error type for all go-build-tool operations
#[derive(Error, Debug)]
pub enum BuildError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Toolchain invocation errors
    #[error("Toolchain error: {0}")]
    Toolchain(#[from] ToolchainError),

    /// Archive packing errors
    #[error("Pack error: {0}")]
    Pack(#[from] crate::pack::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicitly requested config file is missing
    #[error("Config file not found: {path}")]
    NotFound {
        /// Requested path
        path: PathBuf,
    },

    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has unknown keys
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Parser error
        #[source]
        source: toml::de::Error,
    },

    /// Host default cannot be mapped to a Go target
    #[error("Host {what} '{value}' is not a supported target; pass it explicitly")]
    UnsupportedHost {
        /// "operating system" or "architecture"
        what: &'static str,
        /// Host value from `std::env::consts`
        value: &'static str,
    },

    /// A setting has an unusable value
    #[error("Invalid configuration: {reason}")]
    Invalid {
        /// Reason for the error
        reason: String,
    },
}

/// Toolchain errors
#[derive(Error, Debug)]
pub enum ToolchainError {
    /// No `go` binary could be located
    #[error("Go toolchain not found: {reason}")]
    NotFound {
        /// What was tried
        reason: String,
    },

    /// The toolchain process could not be started
    #[error("Failed to run {command}: {source}")]
    SpawnFailed {
        /// Command line
        command: String,
        /// Spawn error
        #[source]
        source: std::io::Error,
    },

    /// The toolchain exited unsuccessfully
    #[error("Build for {target} failed with {}: {command}", exit_status(.code))]
    BuildFailed {
        /// Target being built
        target: TargetOs,
        /// Command line
        command: String,
        /// Exit code, `None` if terminated by a signal
        code: Option<i32>,
    },

    /// The per-platform output directory could not be prepared
    #[error("Failed to prepare output directory {path}: {source}")]
    OutputDir {
        /// Directory path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "termination by signal".to_string(),
    }
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl BuildError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            BuildError::Toolchain(ToolchainError::NotFound { .. }) => vec![
                "Install Go from https://go.dev/dl/ and make sure `go` is on PATH".to_string(),
                "Set GOROOT to your Go installation".to_string(),
                "Point at a toolchain explicitly: --go /path/to/go".to_string(),
            ],
            BuildError::Toolchain(ToolchainError::BuildFailed { target, .. }) => vec![
                format!("Check the compiler output above for the {target} build"),
                "Cross-compiling with --cgo true needs a C cross-compiler; try --cgo false"
                    .to_string(),
            ],
            BuildError::Config(ConfigError::UnsupportedHost { .. }) => vec![
                "Pass --os and --arch explicitly".to_string(),
            ],
            BuildError::Config(ConfigError::Parse { path, .. }) => vec![
                format!("Fix the syntax in {}", path.display()),
                "Only the [build] table with known keys is accepted".to_string(),
            ],
            BuildError::Cli(CliError::InvalidArguments { .. }) => vec![
                "Run go-build-tool --help to see accepted flags".to_string(),
            ],
            BuildError::Pack(e)
                if matches!(e.innermost(), crate::pack::Error::SourceMissing { .. }) =>
            {
                vec![
                    "No binaries were produced; check the package selector (-p)".to_string(),
                ]
            }
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
