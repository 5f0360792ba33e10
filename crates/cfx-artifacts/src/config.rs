use serde::{Deserialize, Serialize};

/// Versions stamped into the merge settings document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Schema version of the merge settings document.
    pub settings_version: String,
    /// Platform version the downstream build tool targets.
    pub platform_version: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            settings_version: "1.2".into(),
            platform_version: "8.3.11".into(),
        }
    }
}
