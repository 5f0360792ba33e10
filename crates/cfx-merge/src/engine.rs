//! One extension's merge run, from reading both trees to writing artifacts.

use std::path::{Path, PathBuf};

use cfx_artifacts::{register_child_objects, ArtifactPaths, ObjectEntry};
use cfx_model::Configuration;
use serde::Serialize;

use crate::config::MergeOptions;
use crate::diagnostics::{Diagnostics, MergeEvent};
use crate::error::EngineResult;
use crate::importer::import_object;
use crate::matcher::{classify, MatchOutcome};
use crate::module_merger::ModuleMerger;
use crate::record::MergeRecord;

/// What a successful run produced.
#[derive(Clone, Debug, Serialize)]
pub struct MergeSummary {
    pub extension: String,
    /// Full names of merged objects, in processing order.
    pub merged: Vec<String>,
    /// Full names of imported objects, in processing order.
    pub imported: Vec<String>,
    pub changed_files: Vec<PathBuf>,
    pub artifacts: ArtifactPaths,
}

/// Merges one extension export into one base export.
///
/// The base tree is modified in place and nothing is rolled back on
/// failure; run against a disposable copy.
pub struct Merger<'d> {
    base_root: PathBuf,
    extension_root: PathBuf,
    options: MergeOptions,
    diagnostics: &'d dyn Diagnostics,
    base: Option<Configuration>,
    extension: Option<Configuration>,
}

impl<'d> Merger<'d> {
    pub fn new(
        base_root: impl Into<PathBuf>,
        extension_root: impl Into<PathBuf>,
        options: MergeOptions,
        diagnostics: &'d dyn Diagnostics,
    ) -> Self {
        Self {
            base_root: base_root.into(),
            extension_root: extension_root.into(),
            options,
            diagnostics,
            base: None,
            extension: None,
        }
    }

    /// Reads both trees. Later calls are no-ops.
    pub fn read_data(&mut self) -> EngineResult<()> {
        load(&mut self.base, &self.base_root)?;
        load(&mut self.extension, &self.extension_root)?;
        Ok(())
    }

    /// The base tree, once read.
    pub fn base(&self) -> Option<&Configuration> {
        self.base.as_ref()
    }

    /// The extension tree, once read.
    pub fn extension(&self) -> Option<&Configuration> {
        self.extension.as_ref()
    }

    /// The configured name, or the extension export directory's name.
    pub fn extension_name(&mut self) -> EngineResult<String> {
        if let Some(name) = &self.options.extension_name {
            return Ok(name.clone());
        }
        Ok(load(&mut self.extension, &self.extension_root)?.dir_name())
    }

    /// Runs the merge and writes the artifacts.
    pub fn merge(mut self) -> EngineResult<MergeSummary> {
        let name = self.extension_name()?;
        let base = load(&mut self.base, &self.base_root)?;
        let extension = load(&mut self.extension, &self.extension_root)?;
        let diagnostics = self.diagnostics;
        let modules = ModuleMerger::new(&name, &self.options.alias_prefix, diagnostics);

        let mut record = MergeRecord::new();
        let mut merged = Vec::new();
        let mut imported = Vec::new();

        for index in 0..extension.objects().len() {
            let Some(object) = extension.object_mut(index) else {
                continue;
            };
            let full_name = object.full_name();
            match classify(base, object) {
                MatchOutcome::Skipped(reason) => {
                    diagnostics.report(MergeEvent::ObjectSkipped { full_name, reason });
                }
                MatchOutcome::Existing(target) => {
                    let Some(target) = base.object_mut(target) else {
                        continue;
                    };
                    modules.merge_objects(target, object, &mut record)?;
                    record.record_object(ObjectEntry::existing(target.full_name()));
                    diagnostics.report(MergeEvent::ObjectMerged {
                        full_name: full_name.clone(),
                    });
                    merged.push(full_name);
                }
                MatchOutcome::New => {
                    let files = import_object(base, object, &mut record)?;
                    diagnostics.report(MergeEvent::ObjectImported {
                        full_name: full_name.clone(),
                        files,
                    });
                    imported.push(full_name);
                }
            }
        }

        if !record.new_objects().is_empty() {
            let descriptor = base.descriptor_path();
            register_child_objects(&descriptor, record.new_objects())?;
            record.record_file(&descriptor);
            diagnostics.report(MergeEvent::DescriptorPatched {
                path: descriptor,
                added: record.new_objects().len(),
            });
        }

        let artifacts = ArtifactPaths::for_extension(&self.options.output_dir, &name);
        let summary = MergeSummary {
            extension: name.clone(),
            merged,
            imported,
            changed_files: record.changed_files().paths().to_vec(),
            artifacts: artifacts.clone(),
        };
        let objects = record.objects().len();
        record
            .into_bundle(self.options.artifacts.clone())
            .write(&artifacts)?;
        diagnostics.report(MergeEvent::ArtifactsWritten {
            extension: name,
            objects,
            changed_files: summary.changed_files.len(),
        });
        Ok(summary)
    }
}

fn load<'a>(slot: &'a mut Option<Configuration>, root: &Path) -> EngineResult<&'a mut Configuration> {
    let configuration = match slot.take() {
        Some(configuration) => configuration,
        None => Configuration::read(root)?,
    };
    Ok(slot.insert(configuration))
}
