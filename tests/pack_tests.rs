use flate2::read::GzDecoder;
use go_build_tool::pack::{Compression, Error, PackOptions, pack_dir};
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

/// Name, is-directory and content of every entry, in archive order.
fn read_entries(archive_path: &Path, compression: Compression) -> Vec<(String, bool, Vec<u8>)> {
    let file = fs::File::open(archive_path).unwrap();
    let reader: Box<dyn Read> = match compression {
        Compression::Gzip => Box::new(GzDecoder::new(file)),
        Compression::None => Box::new(file),
    };

    let mut archive = tar::Archive::new(reader);
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let name = String::from_utf8(entry.path_bytes().into_owned()).unwrap();
            let is_dir = entry.header().entry_type().is_dir();
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            (name, is_dir, content)
        })
        .collect()
}

fn sample_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    fs::create_dir_all(out.join("linux")).unwrap();
    fs::create_dir_all(out.join("windows")).unwrap();
    fs::write(out.join("linux/app"), b"0123456789").unwrap();
    fs::write(out.join("windows/app.exe"), b"ABCDE").unwrap();
    temp
}

#[test]
fn test_release_scenario() {
    let temp = sample_tree();
    let destination = temp.path().join("release.tar.gz");

    let packed = pack_dir(&temp.path().join("out"), &destination, &PackOptions::default()).unwrap();
    assert_eq!(packed.entries, 4);
    assert_eq!(packed.files, 2);
    assert_eq!(packed.payload_bytes, 15);
    assert_eq!(packed.size, fs::metadata(&destination).unwrap().len());

    let files: Vec<(String, Vec<u8>)> = read_entries(&destination, Compression::Gzip)
        .into_iter()
        .filter(|(_, is_dir, _)| !is_dir)
        .map(|(name, _, content)| (name, content))
        .collect();

    assert_eq!(
        files,
        vec![
            ("linux/app".to_string(), b"0123456789".to_vec()),
            ("windows/app.exe".to_string(), b"ABCDE".to_vec()),
        ]
    );
}

#[test]
fn test_round_trip_reproduces_tree() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("bin");
    fs::create_dir_all(source.join("darwin/tools/nested")).unwrap();
    fs::create_dir_all(source.join("linux/empty")).unwrap();
    fs::write(source.join("darwin/server"), b"mach-o").unwrap();
    fs::write(source.join("darwin/tools/nested/helper"), vec![7u8; 70_000]).unwrap();
    fs::write(source.join("linux/server"), b"").unwrap();

    let destination = temp.path().join("pack/release.tar.gz");
    pack_dir(&source, &destination, &PackOptions::default()).unwrap();

    let extracted = temp.path().join("extracted");
    let file = fs::File::open(&destination).unwrap();
    tar::Archive::new(GzDecoder::new(file)).unpack(&extracted).unwrap();

    assert_eq!(snapshot(&source), snapshot(&extracted));
}

/// Relative path -> `None` for directories, `Some(content)` for files.
fn snapshot(root: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
    walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap();
            let rel = entry.path().strip_prefix(root).unwrap();
            let rel = rel.to_string_lossy().replace('\\', "/");
            let content = entry
                .file_type()
                .is_file()
                .then(|| fs::read(entry.path()).unwrap());
            (rel, content)
        })
        .collect()
}

#[test]
fn test_entry_names_are_relative() {
    let temp = sample_tree();
    let destination = temp.path().join("release.tar");
    let options = PackOptions {
        compression: Compression::None,
        ..PackOptions::default()
    };
    pack_dir(&temp.path().join("out/"), &destination, &options).unwrap();

    let entries = read_entries(&destination, Compression::None);
    assert!(!entries.is_empty());
    for (name, _, _) in &entries {
        assert!(!name.is_empty());
        assert!(name != "." && name != "./" && name != "out");
        assert!(!name.starts_with('/'));
        assert!(!name.starts_with("./"));
        assert!(!name.contains('\\'));
        assert!(!name.contains(':'));
    }
}

#[test]
fn test_missing_source_leaves_no_destination() {
    let temp = TempDir::new().unwrap();
    let destination = temp.path().join("pack/release.tar.gz");

    let err = pack_dir(&temp.path().join("missing"), &destination, &PackOptions::default())
        .unwrap_err();

    assert!(matches!(err, Error::SourceMissing { .. }));
    assert!(!destination.exists());
    assert!(!temp.path().join("pack").exists());
}

#[test]
fn test_source_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("app");
    fs::write(&source, b"bin").unwrap();

    let err = pack_dir(&source, &temp.path().join("release.tar"), &PackOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::SourceMissing { .. }));
}

#[test]
fn test_empty_directories_only() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("bin");
    for os in ["darwin", "linux", "windows"] {
        fs::create_dir_all(source.join(os)).unwrap();
    }

    let destination = temp.path().join("release.tar.gz");
    let packed = pack_dir(&source, &destination, &PackOptions::default()).unwrap();
    assert_eq!(packed.entries, 3);
    assert_eq!(packed.files, 0);

    let entries = read_entries(&destination, Compression::Gzip);
    let names: Vec<&str> = entries.iter().map(|(name, _, _)| name.as_str()).collect();
    assert_eq!(names, vec!["darwin", "linux", "windows"]);
    assert!(entries.iter().all(|(_, is_dir, content)| *is_dir && content.is_empty()));
}

#[test]
fn test_gzip_magic() {
    let temp = sample_tree();
    let destination = temp.path().join("release.tar.gz");
    pack_dir(&temp.path().join("out"), &destination, &PackOptions::default()).unwrap();

    let bytes = fs::read(&destination).unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
}

#[test]
fn test_plain_tar_magic() {
    let temp = sample_tree();
    let destination = temp.path().join("release.tar");
    let options = PackOptions {
        compression: Compression::None,
        ..PackOptions::default()
    };
    pack_dir(&temp.path().join("out"), &destination, &options).unwrap();

    let bytes = fs::read(&destination).unwrap();
    assert_eq!(&bytes[257..263], b"ustar\0");
    assert_eq!(bytes.len() % 512, 0);
    // Two zero blocks terminate the archive.
    assert!(bytes[bytes.len() - 1024..].iter().all(|b| *b == 0));
}

#[test]
fn test_overwrites_previous_archive_without_leftovers() {
    let temp = sample_tree();
    let pack_dir_path = temp.path().join("pack");
    let destination = pack_dir_path.join("release.tar.gz");
    fs::create_dir_all(&pack_dir_path).unwrap();
    fs::write(&destination, b"stale").unwrap();

    pack_dir(&temp.path().join("out"), &destination, &PackOptions::default()).unwrap();

    let remaining: Vec<_> = fs::read_dir(&pack_dir_path)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(remaining, vec![std::ffi::OsString::from("release.tar.gz")]);
    assert_ne!(fs::read(&destination).unwrap(), b"stale");
}

#[test]
fn test_reproducible_archives_are_identical() {
    let first = sample_tree();
    let second = sample_tree();
    let options = PackOptions {
        compression: Compression::Gzip,
        header_mode: tar::HeaderMode::Deterministic,
    };

    let a = first.path().join("a.tar.gz");
    let b = second.path().join("b.tar.gz");
    pack_dir(&first.path().join("out"), &a, &options).unwrap();
    pack_dir(&second.path().join("out"), &b, &options).unwrap();

    assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
}

#[cfg(target_os = "linux")]
#[test]
fn test_failure_mid_walk_keeps_previous_archive() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp = TempDir::new().unwrap();
    let source = temp.path().join("bin");
    fs::create_dir_all(source.join("a")).unwrap();
    fs::create_dir_all(source.join("b")).unwrap();
    fs::write(source.join("a/ok"), b"fine").unwrap();
    fs::write(source.join("b").join(OsStr::from_bytes(b"\xff")), b"bad").unwrap();

    let pack_dir_path = temp.path().join("pack");
    let destination = pack_dir_path.join("release.tar.gz");
    fs::create_dir_all(&pack_dir_path).unwrap();
    fs::write(&destination, b"stale").unwrap();

    let err = pack_dir(&source, &destination, &PackOptions::default()).unwrap_err();

    assert!(matches!(err, Error::InvalidEntryName { .. }));
    assert_eq!(fs::read(&destination).unwrap(), b"stale");
    let remaining: Vec<_> = fs::read_dir(&pack_dir_path)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(remaining, vec![std::ffi::OsString::from("release.tar.gz")]);
}
