//! Error types for dependency resolution.
//!
//! Every failure in the resolver is fatal to the whole run, so the variants
//! here describe *what* failed rather than how to recover. Callers (the CLI,
//! tests) receive them through [`Result`] and decide whether to halt.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A manifest is missing, unreadable, malformed or fails validation.
    ///
    /// Transitive manifests report the path of the dependency's own
    /// manifest inside its working copy.
    #[error("failed to read manifest {}: {message}", path.display())]
    ManifestRead { path: PathBuf, message: String },

    /// Cloning a dependency's repository failed.
    #[error("failed to fetch '{name}' from {url}: {message}")]
    Fetch {
        name: String,
        url: String,
        message: String,
    },

    /// A branch, tag or revision could not be resolved in the working copy.
    #[error("failed to check out {target} for '{name}': {message}")]
    Ref {
        name: String,
        target: String,
        message: String,
    },

    /// Copying, scanning or relocating files failed.
    #[error("layout I/O error at {}: {source}", path.display())]
    LayoutIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Two declarations asked for the same dependency at different refs
    /// and strict mode is enabled.
    #[error("conflicting requests for '{name}': vendored {vendored}, requested {requested}")]
    RefConflict {
        name: String,
        vendored: String,
        requested: String,
    },

    /// The lockfile could not be read or written.
    #[error("lockfile error at {}: {message}", path.display())]
    Lock { path: PathBuf, message: String },

    /// The build toolchain failed to start or reported failure.
    #[error("`{command}` failed: {message}")]
    Toolchain { command: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn manifest(path: &Path, message: impl Into<String>) -> Self {
        Error::ManifestRead {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub(crate) fn layout(path: &Path, source: std::io::Error) -> Self {
        Error::LayoutIo {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Wraps a directory-walk failure, keeping the offending path when
    /// walkdir knows it.
    pub(crate) fn walk(root: &Path, err: walkdir::Error) -> Self {
        let path = err.path().unwrap_or(root).to_path_buf();
        Error::LayoutIo {
            path,
            source: err.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
