//! Writing one merge run's artifacts in a single batch.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::changed_files::ChangedFiles;
use crate::error::{ArtifactError, ArtifactResult};
use crate::object_list::ObjectList;
use crate::paths::ArtifactPaths;
use crate::settings::MergeSettings;

/// The three documents a merge run hands to the downstream build tool.
#[derive(Clone, Debug)]
pub struct ArtifactBundle {
    pub settings: MergeSettings,
    pub object_list: ObjectList,
    pub changed_files: ChangedFiles,
}

impl ArtifactBundle {
    /// Serializes every document first and only then writes the files, so
    /// a serialization failure leaves no partial artifact behind.
    pub fn write(&self, paths: &ArtifactPaths) -> ArtifactResult<()> {
        let settings = self.settings.to_xml()?;
        let object_list = self.object_list.to_xml()?;
        let changed_files = self.changed_files.render();

        write_file(&paths.merge_settings, &settings)?;
        write_file(&paths.object_list, &object_list)?;
        write_file(&paths.changed_files, changed_files.as_bytes())?;

        info!(
            objects = self.settings.objects().len(),
            files = self.changed_files.len(),
            settings = %paths.merge_settings.display(),
            "artifacts written"
        );
        Ok(())
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> ArtifactResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ArtifactError::io(parent, e))?;
    }
    fs::write(path, bytes).map_err(|e| ArtifactError::io(path, e))
}
