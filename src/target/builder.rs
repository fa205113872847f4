//! Per-platform `go build` invocation.
//!
//! Each target gets its own compiler run with `GOOS`, `GOARCH`, `GOBIN` and
//! `CGO_ENABLED` overridden; the rest of the environment is inherited. The
//! compiler's output is streamed straight to the terminal and a non-zero exit
//! status fails the whole run.

use crate::cli::RuntimeConfig;
use crate::config::BuildConfig;
use crate::error::ToolchainError;
use crate::target::TargetOs;
use path_absolutize::Absolutize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Locate the `go` binary.
///
/// Order: explicit path or name, `$GOROOT/bin/go`, then `go` on `PATH`.
/// An explicit path naming an existing file is made absolute so a bare
/// relative name runs that file instead of a `PATH` lookup.
pub fn resolve_go(explicit: Option<&Path>) -> Result<PathBuf, ToolchainError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return path
                .absolutize()
                .map(|absolute| absolute.into_owned())
                .map_err(|e| ToolchainError::NotFound {
                    reason: format!("cannot resolve {}: {}", path.display(), e),
                });
        }
        return which::which(path).map_err(|e| ToolchainError::NotFound {
            reason: format!("{} is not an executable: {}", path.display(), e),
        });
    }

    if let Some(goroot) = std::env::var_os("GOROOT") {
        let candidate = Path::new(&goroot)
            .join("bin")
            .join(format!("go{}", std::env::consts::EXE_SUFFIX));
        if candidate.is_file() {
            return Ok(candidate);
        }
        log::debug!(
            "GOROOT is set but {} does not exist, falling back to PATH",
            candidate.display()
        );
    }

    which::which("go").map_err(|e| ToolchainError::NotFound {
        reason: format!("`go` not found in PATH: {}", e),
    })
}

/// A fully composed compiler run for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInvocation {
    /// Target OS
    pub target: TargetOs,
    /// Toolchain binary
    pub program: PathBuf,
    /// Arguments after the program
    pub args: Vec<OsString>,
    /// Environment overrides, applied on top of the inherited environment
    pub envs: Vec<(&'static str, OsString)>,
    /// Directory the binaries land in
    pub output_dir: PathBuf,
}

impl BuildInvocation {
    /// Compose `go build -o <bin>/<os>/ -v <package>` for `target`.
    pub fn for_target(
        config: &BuildConfig,
        go: &Path,
        target: TargetOs,
    ) -> Result<Self, ToolchainError> {
        let output_dir = config.target_dir(target);

        let bin_dir = config.bin_dir();
        let gobin = bin_dir
            .absolutize()
            .map_err(|source| ToolchainError::OutputDir {
                path: bin_dir.clone(),
                source,
            })?
            .into_owned();

        // Trailing separator makes `go build` treat -o as a directory even
        // when the selector matches a single main package.
        let mut output_arg = output_dir.clone().into_os_string();
        output_arg.push(std::path::MAIN_SEPARATOR_STR);

        let cgo = if config.cgo { "1" } else { "0" };

        Ok(Self {
            target,
            program: go.to_path_buf(),
            args: vec![
                OsString::from("build"),
                OsString::from("-o"),
                output_arg,
                OsString::from("-v"),
                OsString::from(&config.package),
            ],
            envs: vec![
                ("GOBIN", gobin.into_os_string()),
                ("GOOS", OsString::from(target.as_str())),
                ("GOARCH", OsString::from(config.arch.as_str())),
                ("CGO_ENABLED", OsString::from(cgo)),
            ],
            output_dir,
        })
    }

    /// Printable command line.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Create the output directory and run the compiler to completion.
    pub async fn run(&self) -> Result<(), ToolchainError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| ToolchainError::OutputDir {
                path: self.output_dir.clone(),
                source,
            })?;

        let status = Command::new(&self.program)
            .args(&self.args)
            .envs(self.envs.iter().map(|(key, value)| (*key, value)))
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| ToolchainError::SpawnFailed {
                command: self.command_line(),
                source,
            })?;

        if !status.success() {
            return Err(ToolchainError::BuildFailed {
                target: self.target,
                command: self.command_line(),
                code: status.code(),
            });
        }

        Ok(())
    }
}

/// Runs the toolchain once per target platform.
#[derive(Debug)]
pub struct TargetBuilder<'a> {
    config: &'a BuildConfig,
    go: PathBuf,
}

impl<'a> TargetBuilder<'a> {
    /// Resolve the toolchain for `config`.
    pub fn new(config: &'a BuildConfig) -> Result<Self, ToolchainError> {
        let go = resolve_go(config.go.as_deref())?;
        log::debug!("Using Go toolchain at {}", go.display());
        Ok(Self { config, go })
    }

    /// Toolchain binary in use.
    pub fn go(&self) -> &Path {
        &self.go
    }

    /// Invocation for `target` without running it.
    pub fn invocation(&self, target: TargetOs) -> Result<BuildInvocation, ToolchainError> {
        BuildInvocation::for_target(self.config, &self.go, target)
    }

    /// Build `target` and return the directory its binaries were written to.
    pub async fn build(
        &self,
        target: TargetOs,
        runtime: &RuntimeConfig,
    ) -> Result<PathBuf, ToolchainError> {
        let invocation = self.invocation(target)?;

        for (key, value) in &invocation.envs {
            runtime.println(&format!(">>> {}={}", key, value.to_string_lossy()));
        }
        runtime.println(&format!(">>> {}", invocation.command_line()));

        invocation.run().await?;
        log::info!("built {} into {}", target, invocation.output_dir.display());

        Ok(invocation.output_dir)
    }
}
