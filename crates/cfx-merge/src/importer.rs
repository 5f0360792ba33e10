//! Importing objects the base configuration does not have.

use std::fs;
use std::path::{Path, PathBuf};

use cfx_model::{ConfObject, Configuration};
use walkdir::WalkDir;

use crate::error::{EngineError, EngineResult};
use crate::record::MergeRecord;

/// Copies `object`'s descriptor and, when the base lacks it, its auxiliary
/// directory into `base`, then registers it as new. Returns the number of
/// files copied.
pub fn import_object(
    base: &mut Configuration,
    object: &ConfObject,
    record: &mut MergeRecord,
) -> EngineResult<usize> {
    let target = ConfObject::new(&base.root, object.object_type, object.name.clone());
    let mut copied = Vec::new();

    copy_file(&object.file_path, &target.file_path)?;
    copied.push(target.file_path.clone());

    if object.directory.is_dir() && !target.directory.exists() {
        copied.extend(copy_tree(&object.directory, &target.directory)?);
    }

    base.add_object(object.object_type, object.name.clone());
    record.record_new_object(object.object_type.tag(), &object.name);
    for path in &copied {
        record.record_file(path);
    }
    Ok(copied.len())
}

pub(crate) fn copy_file(from: &Path, to: &Path) -> EngineResult<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
    }
    fs::copy(from, to).map_err(|e| EngineError::io(from, e))?;
    Ok(())
}

/// Recursively copies `from` into `to`; returns the copied files in walk order.
pub(crate) fn copy_tree(from: &Path, to: &Path) -> EngineResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(from).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(from).to_path_buf();
            EngineError::io(path, e.into())
        })?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| EngineError::io(&target, e))?;
        } else if entry.file_type().is_file() {
            copy_file(entry.path(), &target)?;
            files.push(target);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use cfx_model::ObjectType;

    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn configuration(root: &Path, children: &str) -> Configuration {
        write(
            root,
            "Configuration.xml",
            &format!(
                "<MetaDataObject><Configuration><Properties><Name>C</Name></Properties>\
                 <ChildObjects>{children}</ChildObjects></Configuration></MetaDataObject>"
            ),
        );
        Configuration::read(root).unwrap()
    }

    #[test]
    fn copies_descriptor_and_auxiliary_tree() {
        let base_dir = tempfile::tempdir().unwrap();
        let ext_dir = tempfile::tempdir().unwrap();
        let mut base = configuration(base_dir.path(), "<Catalog>A</Catalog>");
        let ext = configuration(ext_dir.path(), "<Document>Заказ</Document>");
        write(ext_dir.path(), "Documents/Заказ.xml", "<MetaDataObject/>");
        write(ext_dir.path(), "Documents/Заказ/Ext/ObjectModule.bsl", "Процедура А()\nКонецПроцедуры\n");
        write(ext_dir.path(), "Documents/Заказ/Forms/Форма/Ext/Form.xml", "<Form/>");

        let mut record = MergeRecord::new();
        let files = import_object(&mut base, &ext.objects()[0], &mut record).unwrap();

        assert_eq!(files, 3);
        let root = &base.root;
        assert!(root.join("Documents/Заказ.xml").is_file());
        assert!(root.join("Documents/Заказ/Ext/ObjectModule.bsl").is_file());
        assert!(root.join("Documents/Заказ/Forms/Форма/Ext/Form.xml").is_file());

        assert!(base.find_object("Заказ", ObjectType::Document).is_some());
        assert_eq!(record.objects()[0].full_name, "Document.Заказ");
        assert!(record.objects()[0].is_new);
        assert_eq!(record.new_objects().len(), 1);
        assert_eq!(record.changed_files().paths()[0], root.join("Documents/Заказ.xml"));
    }

    #[test]
    fn existing_auxiliary_directory_is_left_alone() {
        let base_dir = tempfile::tempdir().unwrap();
        let ext_dir = tempfile::tempdir().unwrap();
        let mut base = configuration(base_dir.path(), "");
        write(base_dir.path(), "Reports/Отчет/keep.txt", "base");
        let ext = configuration(ext_dir.path(), "<Report>Отчет</Report>");
        write(ext_dir.path(), "Reports/Отчет.xml", "<MetaDataObject/>");
        write(ext_dir.path(), "Reports/Отчет/keep.txt", "ext");

        let mut record = MergeRecord::new();
        let files = import_object(&mut base, &ext.objects()[0], &mut record).unwrap();

        assert_eq!(files, 1);
        assert_eq!(fs::read_to_string(base.root.join("Reports/Отчет/keep.txt")).unwrap(), "base");
    }

    #[test]
    fn missing_descriptor_is_an_io_error() {
        let base_dir = tempfile::tempdir().unwrap();
        let ext_dir = tempfile::tempdir().unwrap();
        let mut base = configuration(base_dir.path(), "");
        let ext = configuration(ext_dir.path(), "<Catalog>Нет</Catalog>");

        let err = import_object(&mut base, &ext.objects()[0], &mut MergeRecord::new()).unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
        assert!(!err.is_recoverable());
    }
}
