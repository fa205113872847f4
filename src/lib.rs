//! # go-build-tool
//!
//! A small cross-compilation driver for Go projects.
//!
//! For every requested target OS the Go toolchain is invoked with `GOOS`,
//! `GOARCH`, `GOBIN` and `CGO_ENABLED` overridden, writing binaries into
//! `build/bin/<os>/`. The resulting tree can then be packed into a single
//! tar archive, gzip-compressed by default.
//!
//! ## Usage
//!
//! ```bash
//! go-build-tool --os linux                    # build ./cmd/... for linux
//! go-build-tool --os all --cgo false --pack   # all targets, then release_all.tar.gz
//! go-build-tool -p ./bin/... --pack --compression none
//! ```
//!
//! The packer is usable on its own:
//!
//! ```no_run
//! use go_build_tool::pack::{pack_dir, PackOptions};
//! use std::path::Path;
//!
//! pack_dir(Path::new("out"), Path::new("release.tar.gz"), &PackOptions::default())?;
//! # Ok::<(), go_build_tool::pack::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod config;
pub mod error;
pub mod pack;
pub mod target;
pub mod utils;

// Re-export main types for public API
pub use cli::Args;
pub use config::{BuildConfig, BuildSection, FileConfig};
pub use error::{BuildError, CliError, ConfigError, Result, ToolchainError};
pub use pack::{Compression, PackOptions, PackedArchive};
pub use target::{BuildInvocation, TargetArch, TargetBuilder, TargetOs, TargetSelection};
