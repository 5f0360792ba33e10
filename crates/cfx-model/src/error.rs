//! Error types for the model crate.

use std::path::PathBuf;

/// Errors that can occur while reading or persisting a configuration export.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A file or directory of the export could not be read or written.
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The root descriptor could not be parsed.
    #[error("malformed descriptor {path}: {message}")]
    Descriptor { path: PathBuf, message: String },

    /// A `ChildObjects` entry used a type tag this model does not know.
    #[error("unknown object type tag: {0}")]
    UnknownObjectType(String),

    /// A subprogram header was never closed by its end keyword.
    #[error("subprogram {name} starting at line {line} has no closing keyword")]
    UnterminatedSubprogram { name: String, line: usize },
}

impl ModelError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for model results.
pub type ModelResult<T> = Result<T, ModelError>;
