//! Command line argument parsing and validation.
//!
//! Every build setting is optional here so that unset flags fall through to
//! the config file and then to built-in defaults.

use crate::config::BuildSection;
use crate::pack::Compression;
use crate::target::{TargetArch, TargetSelection};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Cross-compile Go packages and pack the binaries into a release tarball
#[derive(Parser, Debug)]
#[command(
    name = "go-build-tool",
    version,
    about = "Cross-compile Go packages per target OS and optionally pack the results",
    long_about = "Cross-compile Go packages per target OS and optionally pack the results.

Binaries are written to <build-dir>/bin/<os>/ and, with --pack, archived into
<build-dir>/pack/release_<os>.tar.gz.

Usage:
  go-build-tool --os linux
  go-build-tool --os all --arch arm64 --cgo false --pack
  go-build-tool -p ./bin/... --pack --compression none"
)]
pub struct Args {
    /// Target OS [default: host OS]
    #[arg(long = "os", value_enum, env = "GO_BUILD_TOOL_OS")]
    pub os: Option<TargetSelection>,

    /// Target architecture as a GOARCH name, e.g. amd64, arm64, mips64le [default: host architecture]
    #[arg(long, value_name = "GOARCH", env = "GO_BUILD_TOOL_ARCH")]
    pub arch: Option<TargetArch>,

    /// Package selector passed to `go build` [default: ./cmd/...]
    #[arg(short = 'p', long = "package", value_name = "PATTERN", env = "GO_BUILD_TOOL_PACKAGE")]
    pub package: Option<String>,

    /// Enable cgo [default: true]
    #[arg(long, value_name = "BOOL", action = ArgAction::Set, env = "GO_BUILD_TOOL_CGO")]
    pub cgo: Option<bool>,

    /// Pack the output tree into an archive after building
    #[arg(long, env = "GO_BUILD_TOOL_PACK")]
    pub pack: bool,

    /// Archive compression [default: gzip]
    #[arg(long, value_enum, env = "GO_BUILD_TOOL_COMPRESSION")]
    pub compression: Option<Compression>,

    /// Write deterministic archive headers (fixed mtime, owner and permissions)
    #[arg(long, env = "GO_BUILD_TOOL_REPRODUCIBLE")]
    pub reproducible: bool,

    /// Write a SHA-256 sidecar file next to the archive
    #[arg(long, env = "GO_BUILD_TOOL_CHECKSUM")]
    pub checksum: bool,

    /// Build root, removed before every run [default: ./build/]
    #[arg(long, value_name = "DIR", env = "GO_BUILD_TOOL_BUILD_DIR")]
    pub build_dir: Option<PathBuf>,

    /// Go toolchain binary [default: $GOROOT/bin/go, then go on PATH]
    #[arg(long, value_name = "PATH", env = "GO_BUILD_TOOL_GO")]
    pub go: Option<PathBuf>,

    /// Config file [default: ./go-build-tool.toml if present]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Some(package) = &self.package
            && package.trim().is_empty()
        {
            return Err("Package selector (-p) must not be empty".to_string());
        }

        Ok(())
    }

    /// Settings given on the command line; flags that are off stay unset.
    pub fn build_section(&self) -> BuildSection {
        BuildSection {
            os: self.os,
            arch: self.arch.clone(),
            package: self.package.clone(),
            cgo: self.cgo,
            pack: self.pack.then_some(true),
            compression: self.compression,
            reproducible: self.reproducible.then_some(true),
            checksum: self.checksum.then_some(true),
            build_dir: self.build_dir.clone(),
            go: self.go.clone(),
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print verbose message (only with --verbose)
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print progress message
    pub fn progress(&self, message: &str) {
        let _ = self.output.progress(message);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("go-build-tool").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_original_flag_set() {
        let args = parse(&["--os", "all", "--arch", "amd64", "-p", "./bin/...", "--cgo", "false", "--pack"]);
        assert_eq!(args.os, Some(TargetSelection::All));
        assert_eq!(args.arch.as_ref().map(TargetArch::as_str), Some("amd64"));
        assert_eq!(args.package.as_deref(), Some("./bin/..."));
        assert_eq!(args.cgo, Some(false));
        assert!(args.pack);
    }

    #[test]
    fn test_unset_flags_fall_through() {
        let section = parse(&[]).build_section();
        assert_eq!(section.pack, None);
        assert_eq!(section.reproducible, None);
        assert_eq!(section.checksum, None);
        assert_eq!(section.compression, None);
    }

    #[test]
    fn test_set_flags_become_overrides() {
        let section = parse(&["--pack", "--checksum", "--compression", "none"]).build_section();
        assert_eq!(section.pack, Some(true));
        assert_eq!(section.checksum, Some(true));
        assert_eq!(section.compression, Some(Compression::None));
    }

    #[test]
    fn test_arch_accepts_any_goarch_name() {
        for name in ["ppc64", "mips64le", "mipsle", "wasm"] {
            let args = parse(&["--arch", name]);
            assert_eq!(args.arch.as_ref().map(TargetArch::as_str), Some(name));
        }
        assert!(Args::try_parse_from(["go-build-tool", "--arch", "arm 64"]).is_err());
        assert!(Args::try_parse_from(["go-build-tool", "--arch", ""]).is_err());
    }

    #[test]
    fn test_unknown_os_rejected() {
        let result = Args::try_parse_from(["go-build-tool", "--os", "plan9"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_package_invalid() {
        let args = parse(&["-p", " "]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Args::try_parse_from(["go-build-tool", "-v", "-q"]).is_err());
    }
}
