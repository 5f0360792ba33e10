use std::path::PathBuf;

use cfx_artifacts::ArtifactConfig;
use serde::{Deserialize, Serialize};

/// Prefix given to a base subprogram that an extension replaces but still
/// calls through to.
pub const DEFAULT_ALIAS_PREFIX: &str = "changed_";

/// Options for one merge run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Overrides the extension name taken from the export directory.
    pub extension_name: Option<String>,
    pub alias_prefix: String,
    /// Where the artifacts are written.
    pub output_dir: PathBuf,
    pub artifacts: ArtifactConfig,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            extension_name: None,
            alias_prefix: DEFAULT_ALIAS_PREFIX.into(),
            output_dir: PathBuf::from("."),
            artifacts: ArtifactConfig::default(),
        }
    }
}

impl MergeOptions {
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let o = MergeOptions::default();
        assert_eq!(o.alias_prefix, "changed_");
        assert!(o.extension_name.is_none());
        assert_eq!(o.output_dir, PathBuf::from("."));
    }
}
