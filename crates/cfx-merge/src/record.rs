//! The per-run accumulator that becomes the artifact bundle.

use std::path::PathBuf;

use cfx_artifacts::{
    ArtifactBundle, ArtifactConfig, ChangedFiles, ChildObject, MergeSettings, ObjectEntry,
    ObjectList,
};

/// Everything one merge run touched, in the order it was touched.
#[derive(Clone, Debug, Default)]
pub struct MergeRecord {
    objects: Vec<ObjectEntry>,
    changed_files: ChangedFiles,
    new_objects: Vec<ChildObject>,
}

impl MergeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an object once; later records of the same name are ignored.
    pub fn record_object(&mut self, entry: ObjectEntry) {
        if !self.objects.iter().any(|o| o.full_name == entry.full_name) {
            self.objects.push(entry);
        }
    }

    /// Records an object introduced by the extension, which must also be
    /// registered in the base root descriptor.
    pub fn record_new_object(&mut self, tag: &str, name: &str) {
        self.record_object(ObjectEntry::new_object(format!("{tag}.{name}")));
        let child = ChildObject::new(tag, name);
        if !self.new_objects.contains(&child) {
            self.new_objects.push(child);
        }
    }

    pub fn record_file(&mut self, path: impl Into<PathBuf>) {
        self.changed_files.push(path);
    }

    pub fn objects(&self) -> &[ObjectEntry] {
        &self.objects
    }

    pub fn new_objects(&self) -> &[ChildObject] {
        &self.new_objects
    }

    pub fn changed_files(&self) -> &ChangedFiles {
        &self.changed_files
    }

    /// Consumes the record into the documents written at the end of a run.
    pub fn into_bundle(self, config: ArtifactConfig) -> ArtifactBundle {
        let mut settings = MergeSettings::new(config);
        let mut object_list = ObjectList::new();
        object_list.include_configuration();
        for entry in self.objects {
            object_list.push(entry.full_name.clone());
            settings.push(entry);
        }
        ArtifactBundle {
            settings,
            object_list,
            changed_files: self.changed_files,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objects_are_deduplicated_in_first_seen_order() {
        let mut record = MergeRecord::new();
        record.record_object(ObjectEntry::existing("Catalog.A"));
        record.record_new_object("Document", "B");
        record.record_object(ObjectEntry::existing("Catalog.A"));
        record.record_new_object("Document", "B");

        let names: Vec<&str> = record.objects().iter().map(|o| o.full_name.as_str()).collect();
        assert_eq!(names, vec!["Catalog.A", "Document.B"]);
        assert_eq!(record.new_objects(), &[ChildObject::new("Document", "B")]);
    }

    #[test]
    fn bundle_lists_every_object_once() {
        let mut record = MergeRecord::new();
        record.record_object(ObjectEntry::existing("Catalog.A"));
        record.record_new_object("Document", "B");
        record.record_new_object("Report", "C");
        record.record_file("/base/Catalogs/A/Ext/ManagerModule.bsl");

        let bundle = record.into_bundle(ArtifactConfig::default());
        assert_eq!(bundle.settings.objects().len(), 3);
        assert!(bundle.settings.objects()[1].is_new);
        assert_eq!(bundle.object_list.objects(), &["Catalog.A", "Document.B", "Report.C"]);
        assert_eq!(bundle.changed_files.len(), 1);

        let xml = String::from_utf8(bundle.object_list.to_xml().unwrap()).unwrap();
        assert_eq!(xml.matches("<Configuration ").count(), 1);
    }
}
