//! SHA-256 sidecar files for packed archives.

use crate::pack::error::{ErrorExt, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Hex-encoded SHA-256 of the file at `path`.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).fs_context("opening archive for hashing", path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .fs_context("reading archive for hash calculation", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Writes `<archive>.sha256` in `sha256sum` format and returns its path and the digest.
pub fn write_checksum_file(archive: &Path) -> Result<(PathBuf, String)> {
    let digest = sha256_file(archive)?;

    let mut sidecar = archive.as_os_str().to_owned();
    sidecar.push(".sha256");
    let sidecar = PathBuf::from(sidecar);

    let file_name = archive
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    std::fs::write(&sidecar, format!("{digest}  {file_name}\n"))
        .fs_context("writing checksum file", &sidecar)?;

    Ok((sidecar, digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_digest() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("abc.bin");
        std::fs::write(&path, b"abc").unwrap();

        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sidecar_format() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("release_linux.tar.gz");
        std::fs::write(&path, b"abc").unwrap();

        let (sidecar, digest) = write_checksum_file(&path).unwrap();
        assert_eq!(sidecar, temp.path().join("release_linux.tar.gz.sha256"));

        let contents = std::fs::read_to_string(&sidecar).unwrap();
        assert_eq!(contents, format!("{digest}  release_linux.tar.gz\n"));
    }
}
