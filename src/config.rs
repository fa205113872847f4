//! Build configuration.
//!
//! Settings come from three layers, highest priority first: command line
//! (including `GO_BUILD_TOOL_*` environment variables), an optional
//! `go-build-tool.toml` file, and built-in defaults. The layers are merged once
//! at startup into an immutable [`BuildConfig`] that is passed by reference to
//! the builder and the packer.
//!
//! ```toml
//! [build]
//! package = "./cmd/..."
//! arch = "arm64"
//! cgo = false
//! compression = "gzip"
//! ```

use crate::error::ConfigError;
use crate::pack::{Compression, PackOptions};
use crate::target::{TargetArch, TargetOs, TargetSelection};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "go-build-tool.toml";

/// Default build root.
pub const DEFAULT_BUILD_DIR: &str = "./build/";

/// Default package selector handed to `go build`.
pub const DEFAULT_PACKAGE: &str = "./cmd/...";

/// Contents of a config file.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// `[build]` table
    #[serde(default)]
    pub build: BuildSection,
}

impl FileConfig {
    /// Parse the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `explicit` if given (it must exist), else the default file in the
    /// working directory if present, else an empty config.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            return Self::load(path);
        }

        let default = Path::new(DEFAULT_CONFIG_FILE);
        if default.is_file() {
            log::debug!("Using config file {}", default.display());
            Self::load(default)
        } else {
            Ok(Self::default())
        }
    }
}

/// One layer of build settings; unset fields fall through to the next layer.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// Target OS selection
    pub os: Option<TargetSelection>,
    /// Target architecture
    pub arch: Option<TargetArch>,
    /// Package selector
    pub package: Option<String>,
    /// Enable cgo
    pub cgo: Option<bool>,
    /// Pack the output tree after building
    pub pack: Option<bool>,
    /// Archive compression
    pub compression: Option<Compression>,
    /// Deterministic archive headers
    pub reproducible: Option<bool>,
    /// Write a SHA-256 sidecar next to the archive
    pub checksum: Option<bool>,
    /// Build root
    pub build_dir: Option<PathBuf>,
    /// Toolchain binary
    pub go: Option<PathBuf>,
}

impl BuildSection {
    /// Fill every unset field of `self` from `lower`.
    pub fn or(self, lower: BuildSection) -> BuildSection {
        BuildSection {
            os: self.os.or(lower.os),
            arch: self.arch.or(lower.arch),
            package: self.package.or(lower.package),
            cgo: self.cgo.or(lower.cgo),
            pack: self.pack.or(lower.pack),
            compression: self.compression.or(lower.compression),
            reproducible: self.reproducible.or(lower.reproducible),
            checksum: self.checksum.or(lower.checksum),
            build_dir: self.build_dir.or(lower.build_dir),
            go: self.go.or(lower.go),
        }
    }
}

/// Immutable configuration of one run.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Root of everything the run writes; removed before building
    pub build_dir: PathBuf,
    /// Which operating systems to build
    pub selection: TargetSelection,
    /// `GOARCH`
    pub arch: TargetArch,
    /// Package selector passed to `go build`
    pub package: String,
    /// `CGO_ENABLED`
    pub cgo: bool,
    /// Toolchain override; resolved by the builder when unset
    pub go: Option<PathBuf>,
    /// Pack `bin/` after building
    pub pack: bool,
    /// How to write the archive
    pub pack_options: PackOptions,
    /// Write a SHA-256 sidecar next to the archive
    pub checksum: bool,
}

impl BuildConfig {
    /// Resolve a merged settings layer against built-in defaults.
    pub fn from_section(section: BuildSection) -> Result<Self, ConfigError> {
        let selection = match section.os {
            Some(selection) => selection,
            None => TargetSelection::host().ok_or(ConfigError::UnsupportedHost {
                what: "operating system",
                value: std::env::consts::OS,
            })?,
        };
        let arch = match section.arch {
            Some(arch) => arch,
            None => TargetArch::host().ok_or(ConfigError::UnsupportedHost {
                what: "architecture",
                value: std::env::consts::ARCH,
            })?,
        };

        let package = section
            .package
            .unwrap_or_else(|| DEFAULT_PACKAGE.to_string());
        if package.trim().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "package selector must not be empty".to_string(),
            });
        }

        let header_mode = if section.reproducible.unwrap_or(false) {
            tar::HeaderMode::Deterministic
        } else {
            tar::HeaderMode::Complete
        };

        Ok(Self {
            build_dir: section
                .build_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR)),
            selection,
            arch,
            package,
            cgo: section.cgo.unwrap_or(true),
            go: section.go,
            pack: section.pack.unwrap_or(false),
            pack_options: PackOptions {
                compression: section.compression.unwrap_or_default(),
                header_mode,
            },
            checksum: section.checksum.unwrap_or(false),
        })
    }

    /// Output tree root (`<build_dir>/bin`).
    pub fn bin_dir(&self) -> PathBuf {
        self.build_dir.join("bin")
    }

    /// Directory receiving archives (`<build_dir>/pack`).
    pub fn pack_dir(&self) -> PathBuf {
        self.build_dir.join("pack")
    }

    /// Per-platform output directory.
    pub fn target_dir(&self, os: TargetOs) -> PathBuf {
        self.bin_dir().join(os.as_str())
    }

    /// Operating systems to build, in order.
    pub fn targets(&self) -> Vec<TargetOs> {
        self.selection.targets()
    }

    /// Archive destination, e.g. `build/pack/release_linux.tar.gz`.
    pub fn archive_path(&self) -> PathBuf {
        self.pack_dir().join(format!(
            "release_{}.{}",
            self.selection,
            self.pack_options.compression.extension()
        ))
    }
}
