//! The `cfx.toml` settings file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use cfx_artifacts::ArtifactConfig;
use cfx_merge::{MergeOptions, DEFAULT_ALIAS_PREFIX};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CfxConfig {
    pub paths: PathsConfig,
    pub platform: PlatformConfig,
    pub merge: MergeConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory whose sub-directories are extension exports.
    pub extension_dir: PathBuf,
    /// Receives working copies and artifacts.
    pub work_dir: PathBuf,
    /// The base configuration export.
    pub base: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            extension_dir: PathBuf::from("extensions"),
            work_dir: PathBuf::from("work"),
            base: PathBuf::from("base"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub version: String,
    pub settings_version: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        let artifacts = ArtifactConfig::default();
        Self {
            version: artifacts.platform_version,
            settings_version: artifacts.settings_version,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub alias_prefix: String,
    /// Merge into the base export instead of a per-extension clone.
    pub in_place: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            alias_prefix: DEFAULT_ALIAS_PREFIX.into(),
            in_place: false,
        }
    }
}

impl CfxConfig {
    /// Reads a settings file. Relative paths inside it are resolved
    /// against the file's directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: CfxConfig = toml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        if let Some(dir) = path.parent() {
            config.paths.resolve_against(dir);
        }
        Ok(config)
    }

    pub fn artifacts(&self) -> ArtifactConfig {
        ArtifactConfig {
            settings_version: self.platform.settings_version.clone(),
            platform_version: self.platform.version.clone(),
        }
    }

    /// Merge options writing artifacts into `output_dir`.
    pub fn merge_options(&self, extension_name: Option<String>, output_dir: &Path) -> MergeOptions {
        MergeOptions {
            extension_name,
            alias_prefix: self.merge.alias_prefix.clone(),
            output_dir: output_dir.to_path_buf(),
            artifacts: self.artifacts(),
        }
    }
}

impl PathsConfig {
    fn resolve_against(&mut self, dir: &Path) {
        for path in [&mut self.extension_dir, &mut self.work_dir, &mut self.base] {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
    }
}
