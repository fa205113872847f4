//! Archive packing of the per-platform output tree.
//!
//! The packer walks a directory and writes every file and directory below it
//! into a single tar archive, optionally gzip-compressed:
//!
//! ```no_run
//! use go_build_tool::pack::{pack_dir, PackOptions};
//! use std::path::Path;
//!
//! let packed = pack_dir(
//!     Path::new("build/bin"),
//!     Path::new("build/pack/release_linux.tar.gz"),
//!     &PackOptions::default(),
//! )?;
//! println!("{} entries, {} bytes", packed.entries, packed.size);
//! # Ok::<(), go_build_tool::pack::Error>(())
//! ```
//!
//! Entry names are relative to the packed directory and always use `/`
//! separators; the directory itself never appears as an entry.

#![warn(missing_docs)]

mod archive;
mod checksum;
mod error;

pub use archive::{pack_dir, write_archive, PackStats};
pub use checksum::{sha256_file, write_checksum_file};
pub use error::{Context, Error, ErrorExt, Result};

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Compression applied around the tar stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Plain tar
    None,
    /// gzip-wrapped tar
    #[default]
    Gzip,
}

impl Compression {
    /// File extension of archives written with this compression.
    pub fn extension(self) -> &'static str {
        match self {
            Compression::None => "tar",
            Compression::Gzip => "tar.gz",
        }
    }
}

/// Options controlling how an archive is written.
#[derive(Debug, Clone, Copy)]
pub struct PackOptions {
    /// Compression layer
    pub compression: Compression,
    /// How much filesystem metadata goes into each header
    pub header_mode: tar::HeaderMode,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            compression: Compression::Gzip,
            header_mode: tar::HeaderMode::Complete,
        }
    }
}

/// Summary of a written archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedArchive {
    /// Final archive location
    pub path: PathBuf,
    /// Number of entries in the archive
    pub entries: usize,
    /// Number of regular-file entries
    pub files: usize,
    /// Total bytes of file content archived
    pub payload_bytes: u64,
    /// Size of the archive on disk
    pub size: u64,
}

/// Runs [`pack_dir`] on the blocking thread pool.
pub async fn pack(source: &Path, destination: &Path, options: PackOptions) -> Result<PackedArchive> {
    let source = source.to_path_buf();
    let destination = destination.to_path_buf();

    tokio::task::spawn_blocking(move || pack_dir(&source, &destination, &options))
        .await
        .map_err(|e| Error::TaskFailed(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(Compression::Gzip.extension(), "tar.gz");
        assert_eq!(Compression::None.extension(), "tar");
    }

    #[tokio::test]
    async fn test_pack_runs_on_blocking_pool() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("bin");
        std::fs::create_dir_all(source.join("linux")).unwrap();
        std::fs::write(source.join("linux/app"), b"0123456789").unwrap();
        let destination = temp.path().join("pack/release_linux.tar.gz");

        let packed = pack(&source, &destination, PackOptions::default())
            .await
            .unwrap();

        assert_eq!(packed.path, destination);
        assert_eq!(packed.entries, 2);
        assert_eq!(packed.files, 1);
        assert_eq!(packed.payload_bytes, 10);
        assert!(packed.size > 0);
    }
}
