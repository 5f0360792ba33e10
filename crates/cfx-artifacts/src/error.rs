//! Error types for the artifacts crate.

use std::path::PathBuf;

/// Errors that can occur while producing or patching artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// Reading or writing an artifact file failed.
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Serializing an XML document failed.
    #[error("xml error: {0}")]
    Xml(String),

    /// The root descriptor could not be patched.
    #[error("cannot patch descriptor {path}: {message}")]
    Descriptor { path: PathBuf, message: String },
}

impl ArtifactError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn xml(err: impl std::fmt::Display) -> Self {
        Self::Xml(err.to_string())
    }
}

/// Convenience alias for artifact results.
pub type ArtifactResult<T> = Result<T, ArtifactError>;
