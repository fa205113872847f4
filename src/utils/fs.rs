//! File system utilities for the build root.

use std::{io, path::Path};
use tokio::fs;

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> io::Result<()> {
    if fs::try_exists(path).await? {
        fs::remove_dir_all(path).await
    } else {
        Ok(())
    }
}
