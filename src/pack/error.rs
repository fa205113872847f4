//! Error types for archive packing.
//!
//! Every failure carries the operation and the path that triggered it, so the
//! top-level handler can print a single actionable line.
//!
//! # Example
//!
//! ```no_run
//! use go_build_tool::pack::{ErrorExt, Result};
//! use std::path::Path;
//!
//! fn open_source(path: &Path) -> Result<std::fs::File> {
//!     std::fs::File::open(path).fs_context("opening source file", path)
//! }
//! ```

use std::{
    fmt::Display,
    io,
    path::{self, PathBuf},
};
use thiserror::Error as DeriveError;

/// Errors returned by the archive packer.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Operation that failed (e.g., "opening source file")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// The source root does not exist or is not a directory.
    #[error("source directory {path} does not exist or is not a directory")]
    SourceMissing {
        /// Path given as the source root
        path: PathBuf,
    },

    /// An entry name could not be expressed as a relative archive path.
    #[error("cannot archive {path}: {reason}")]
    InvalidEntryName {
        /// Walked path
        path: PathBuf,
        /// Why the name was rejected
        reason: &'static str,
    },

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Error walking the source tree.
    #[error("{0}")]
    WalkdirError(#[from] walkdir::Error),

    /// Path prefix stripping error.
    #[error("{0}")]
    StripError(#[from] path::StripPrefixError),

    /// Staging file could not be moved into place.
    #[error("{0}")]
    PersistError(#[from] tempfile::PersistError),

    /// Blocking pack task panicked or was cancelled.
    #[error("pack task failed: {0}")]
    TaskFailed(String),

    /// Any other failure, raised through [`bail!`](crate::bail).
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// The error beneath any [`Error::Context`] layers.
    pub fn innermost(&self) -> &Self {
        match self {
            Error::Context(_, inner) => inner.innermost(),
            other => other,
        }
    }
}

/// Convenient type alias of Result type for the packer.
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait adding context to packer results.
pub trait Context<T> {
    /// Wrap the error with a context message.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Wrap the error with a lazily built context message.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

/// Filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Map an I/O error into [`Error::Fs`] naming the operation and path.
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Early return with a [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::pack::Error::GenericError($msg.into()))
    };
    ($err:expr $(,)?) => {
        return Err($crate::pack::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::pack::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
