//! Target platforms understood by the Go toolchain.
//!
//! Names follow `GOOS` / `GOARCH` spelling so values can be passed through
//! to the compiler environment unchanged.

use crate::error::ConfigError;
use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Operating systems a build can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetOs {
    /// macOS
    Darwin,
    /// Linux
    Linux,
    /// Windows
    Windows,
}

impl TargetOs {
    /// Every supported OS, in build order.
    pub const ALL: [TargetOs; 3] = [TargetOs::Darwin, TargetOs::Linux, TargetOs::Windows];

    /// `GOOS` value.
    pub fn as_str(self) -> &'static str {
        match self {
            TargetOs::Darwin => "darwin",
            TargetOs::Linux => "linux",
            TargetOs::Windows => "windows",
        }
    }

    /// The OS this binary runs on, if it is a supported target.
    pub fn host() -> Option<Self> {
        match std::env::consts::OS {
            "macos" => Some(TargetOs::Darwin),
            "linux" => Some(TargetOs::Linux),
            "windows" => Some(TargetOs::Windows),
            _ => None,
        }
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of the `--os` flag: one OS, or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TargetSelection {
    /// macOS only
    Darwin,
    /// Linux only
    Linux,
    /// Windows only
    Windows,
    /// darwin, linux and windows
    All,
}

impl TargetSelection {
    /// Selection matching the host OS.
    pub fn host() -> Option<Self> {
        TargetOs::host().map(Self::from)
    }

    /// Operating systems to build, in order.
    pub fn targets(self) -> Vec<TargetOs> {
        match self {
            TargetSelection::Darwin => vec![TargetOs::Darwin],
            TargetSelection::Linux => vec![TargetOs::Linux],
            TargetSelection::Windows => vec![TargetOs::Windows],
            TargetSelection::All => TargetOs::ALL.to_vec(),
        }
    }

    /// Name used in archive file names (`release_<name>.tar.gz`).
    pub fn as_str(self) -> &'static str {
        match self {
            TargetSelection::Darwin => "darwin",
            TargetSelection::Linux => "linux",
            TargetSelection::Windows => "windows",
            TargetSelection::All => "all",
        }
    }
}

impl From<TargetOs> for TargetSelection {
    fn from(os: TargetOs) -> Self {
        match os {
            TargetOs::Darwin => TargetSelection::Darwin,
            TargetOs::Linux => TargetSelection::Linux,
            TargetOs::Windows => TargetSelection::Windows,
        }
    }
}

impl fmt::Display for TargetSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target architecture, passed to the compiler as `GOARCH` unchanged.
///
/// Any name the installed toolchain knows is accepted; only values that
/// cannot form a single environment entry are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct TargetArch(String);

impl TargetArch {
    /// `GOARCH` value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The architecture this binary runs on, if Go has a name for it.
    pub fn host() -> Option<Self> {
        Self::from_rust_arch(std::env::consts::ARCH)
    }

    fn from_rust_arch(arch: &str) -> Option<Self> {
        let goarch = match arch {
            "x86" => "386",
            "x86_64" => "amd64",
            "arm" => "arm",
            "aarch64" => "arm64",
            "powerpc64" if cfg!(target_endian = "little") => "ppc64le",
            "powerpc64" => "ppc64",
            "riscv64" => "riscv64",
            "s390x" => "s390x",
            "loongarch64" => "loong64",
            "mips" if cfg!(target_endian = "little") => "mipsle",
            "mips" => "mips",
            "mips64" if cfg!(target_endian = "little") => "mips64le",
            "mips64" => "mips64",
            _ => return None,
        };
        Some(Self(goarch.to_string()))
    }
}

impl FromStr for TargetArch {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "architecture must not be empty".to_string(),
            });
        }
        if value.chars().any(|c| c.is_whitespace() || c == '=') {
            return Err(ConfigError::Invalid {
                reason: format!("architecture '{value}' contains whitespace or '='"),
            });
        }
        Ok(Self(value.to_string()))
    }
}

impl TryFrom<String> for TargetArch {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TargetArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
