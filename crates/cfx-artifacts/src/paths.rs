use std::path::{Path, PathBuf};

use serde::Serialize;

/// Output locations of one extension's artifacts.
///
/// Every extension gets its own file names so runs for different
/// extensions can share an output directory without overwriting each other.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    pub merge_settings: PathBuf,
    pub object_list: PathBuf,
    pub changed_files: PathBuf,
}

impl ArtifactPaths {
    pub fn for_extension(output_dir: &Path, extension_name: &str) -> Self {
        Self {
            merge_settings: output_dir.join(format!("{extension_name}_merge_settings.xml")),
            object_list: output_dir.join(format!("{extension_name}_object_list.xml")),
            changed_files: output_dir.join(format!("{extension_name}_changed_files.lst")),
        }
    }
}
