//! Error types for the merge engine.
//!
//! [`MergeError`] is the domain error: the extension itself is wrong and
//! only its own run is lost. Everything else surfaces as another
//! [`EngineError`] variant and points at the environment.

use std::path::PathBuf;

use cfx_artifacts::ArtifactError;
use cfx_model::{DirectiveMode, ModelError};

/// A directive that cannot be applied. Aborts the current extension's run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// The directive's shape violates a merge rule.
    #[error("cannot apply {mode} directive of {subprogram}: {rule}")]
    UnsupportedDirective {
        subprogram: String,
        mode: DirectiveMode,
        rule: &'static str,
    },

    /// The directive names a subprogram the matched base module lacks.
    #[error("merging {source_module} into {receiver_module}: subprogram {target} not found")]
    TargetNotFound {
        receiver_module: String,
        source_module: String,
        target: String,
    },
}

/// Errors that end a merge run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Only domain errors let a batch continue with the next extension.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EngineError::Merge(_))
    }
}

/// Convenience alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_merge_errors_are_recoverable() {
        let merge = EngineError::from(MergeError::TargetNotFound {
            receiver_module: "a".into(),
            source_module: "b".into(),
            target: "c".into(),
        });
        assert!(merge.is_recoverable());

        let io = EngineError::io("x", std::io::Error::other("disk"));
        assert!(!io.is_recoverable());
    }

    #[test]
    fn messages_name_the_offender() {
        let err = MergeError::UnsupportedDirective {
            subprogram: "Расш_Сумма".into(),
            mode: DirectiveMode::Before,
            rule: "functions support only the Replace directive",
        };
        let msg = err.to_string();
        assert!(msg.contains("Before"));
        assert!(msg.contains("Расш_Сумма"));
        assert!(msg.contains("only the Replace"));
    }
}
