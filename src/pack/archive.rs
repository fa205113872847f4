//! Tar serialization of an output tree.
//!
//! The tree is walked depth-first with each directory's children visited in
//! lexical file-name order, so the same tree packed with the same
//! [`HeaderMode`](tar::HeaderMode) always yields the same archive bytes.

use crate::pack::error::{Error, ErrorExt, Result};
use crate::pack::{Compression, PackOptions, PackedArchive};
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path};
use tar::{Builder, Header};
use tempfile::NamedTempFile;
use walkdir::{DirEntry, WalkDir};

/// Counters collected while writing entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackStats {
    /// Archive entries written (files, directories and other types)
    pub entries: usize,
    /// Entries that carried a payload
    pub files: usize,
    /// Sum of all payload sizes
    pub payload_bytes: u64,
}

/// Byte sink below the tar writer: the destination, optionally gzip-wrapped.
enum ArchiveSink<W: Write> {
    Plain(W),
    Gzip(GzEncoder<W>),
}

impl<W: Write> ArchiveSink<W> {
    fn new(inner: W, compression: Compression) -> Self {
        match compression {
            Compression::None => Self::Plain(inner),
            Compression::Gzip => Self::Gzip(GzEncoder::new(inner, flate2::Compression::default())),
        }
    }

    /// Writes the gzip trailer, if any, and returns the destination writer.
    fn finish(self) -> io::Result<W> {
        match self {
            Self::Plain(inner) => Ok(inner),
            Self::Gzip(encoder) => encoder.finish(),
        }
    }
}

impl<W: Write> Write for ArchiveSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(inner) => inner.write(buf),
            Self::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(inner) => inner.flush(),
            Self::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// Packs every entry strictly under `source` into an archive at `destination`.
///
/// Missing parent directories of `destination` are created. The archive is
/// staged in a temporary file next to the destination and renamed into place
/// only after the tar writer, the compressor and the file have all been
/// closed. On failure the staging file is removed and `destination` is left
/// as it was.
pub fn pack_dir(source: &Path, destination: &Path, options: &PackOptions) -> Result<PackedArchive> {
    if !source.is_dir() {
        log::error!("source directory missing - {}", source.display());
        return Err(Error::SourceMissing {
            path: source.to_path_buf(),
        });
    }

    let parent = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).fs_context("creating destination directory", parent)?;

    let staging =
        NamedTempFile::new_in(parent).fs_context("creating staging file in", parent)?;
    let (writer, stats) = write_archive(source, BufWriter::new(staging), options)?;
    let staging = writer
        .into_inner()
        .map_err(io::IntoInnerError::into_error)
        .fs_context("flushing archive", destination)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staging
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .fs_context("setting permissions on", destination)?;
    }
    staging
        .as_file()
        .sync_all()
        .fs_context("syncing archive", destination)?;

    let file = staging.persist(destination)?;
    let size = file
        .metadata()
        .fs_context("reading archive metadata", destination)?
        .len();

    log::info!(
        "packed {} entries ({} files, {} bytes) into {}",
        stats.entries,
        stats.files,
        stats.payload_bytes,
        destination.display()
    );

    Ok(PackedArchive {
        path: destination.to_path_buf(),
        entries: stats.entries,
        files: stats.files,
        payload_bytes: stats.payload_bytes,
        size,
    })
}

/// Streams the archive of `source` into `sink` and returns the sink once the
/// tar end-of-archive blocks and any compressed trailer have been written.
pub fn write_archive<W: Write>(
    source: &Path,
    sink: W,
    options: &PackOptions,
) -> Result<(W, PackStats)> {
    let mut builder = Builder::new(ArchiveSink::new(sink, options.compression));
    let mut stats = PackStats::default();

    for entry in WalkDir::new(source).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            log::error!("walk error - {}", e);
            Error::from(e)
        })?;

        // The root contributes no entry.
        if entry.depth() == 0 {
            continue;
        }

        if let Err(e) = append_entry(&mut builder, source, &entry, options, &mut stats) {
            log::error!("failed to pack {} - {}", entry.path().display(), e);
            return Err(e);
        }
    }

    let sink = builder
        .into_inner()
        .fs_context("finishing archive for", source)?;
    let inner = sink
        .finish()
        .fs_context("finishing compression for", source)?;

    Ok((inner, stats))
}

fn append_entry<W: Write>(
    builder: &mut Builder<W>,
    source: &Path,
    entry: &DirEntry,
    options: &PackOptions,
    stats: &mut PackStats,
) -> Result<()> {
    let path = entry.path();
    let name = archive_name(source, path)?;
    let metadata = entry.metadata()?;

    let mut header = Header::new_ustar();
    header.set_metadata_in_mode(&metadata, options.header_mode);

    let file_type = entry.file_type();
    if file_type.is_file() {
        let file = File::open(path).fs_context("opening source file", path)?;
        builder
            .append_data(&mut header, &name, file)
            .fs_context("writing archive entry for", path)?;
        stats.files += 1;
        stats.payload_bytes += metadata.len();
    } else if file_type.is_symlink() {
        let target = fs::read_link(path).fs_context("reading symlink", path)?;
        header.set_size(0);
        builder
            .append_link(&mut header, &name, &target)
            .fs_context("writing archive entry for", path)?;
    } else {
        header.set_size(0);
        builder
            .append_data(&mut header, &name, io::empty())
            .fs_context("writing archive entry for", path)?;
    }

    stats.entries += 1;
    log::debug!("packed {}", name);
    Ok(())
}

/// Archive name of `path`: its components below `root` joined with `/`.
///
/// `./` markers are dropped; anything that would escape the root or name the
/// root itself is rejected.
pub(crate) fn archive_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root)?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| Error::InvalidEntryName {
                    path: path.to_path_buf(),
                    reason: "name is not valid UTF-8",
                })?;
                parts.push(part);
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::InvalidEntryName {
                    path: path.to_path_buf(),
                    reason: "path is not below the source root",
                });
            }
        }
    }

    if parts.is_empty() {
        crate::bail!("{} is the source root and has no archive name", path.display());
    }

    Ok(parts.join("/"))
}
