//! Configuration export trees and their top-level objects.
//!
//! A [`Configuration`] is read once from an export directory. Object
//! modules and forms are only parsed when first asked for
//! ([`ConfObject::load_modules`]) and are cached afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::descriptor::{RootDescriptor, ROOT_DESCRIPTOR};
use crate::error::{ModelError, ModelResult};
use crate::module::Module;
use crate::object_type::ObjectType;

/// Name of the per-object directory holding module sources.
pub const EXT_DIR: &str = "Ext";
/// Name of the per-object directory holding forms.
pub const FORMS_DIR: &str = "Forms";

/// An in-memory configuration tree loaded from an export directory.
#[derive(Clone, Debug)]
pub struct Configuration {
    /// `Configuration/Properties/Name` of the root descriptor.
    pub name: String,
    /// Canonical path of the export directory.
    pub root: PathBuf,
    objects: Vec<ConfObject>,
}

impl Configuration {
    /// Reads the root descriptor of an export and enumerates its objects.
    pub fn read(root: &Path) -> ModelResult<Self> {
        let root = fs::canonicalize(root).map_err(|e| ModelError::io(root, e))?;
        let descriptor = RootDescriptor::read(&root.join(ROOT_DESCRIPTOR))?;
        let objects = descriptor
            .children
            .into_iter()
            .map(|(object_type, name)| ConfObject::new(&root, object_type, name))
            .collect::<Vec<_>>();
        debug!(root = %root.display(), objects = objects.len(), "configuration read");
        Ok(Self {
            name: descriptor.name,
            root,
            objects,
        })
    }

    /// Path of the root descriptor.
    pub fn descriptor_path(&self) -> PathBuf {
        self.root.join(ROOT_DESCRIPTOR)
    }

    /// The export directory's own name; used as the extension name.
    pub fn dir_name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }

    /// Top-level objects in descriptor order.
    pub fn objects(&self) -> &[ConfObject] {
        &self.objects
    }

    pub fn object_mut(&mut self, index: usize) -> Option<&mut ConfObject> {
        self.objects.get_mut(index)
    }

    /// Looks an object up by its identity, `(name, type)`. Exact match.
    pub fn find_object(&self, name: &str, object_type: ObjectType) -> Option<usize> {
        self.objects
            .iter()
            .position(|o| o.object_type == object_type && o.name == name)
    }

    /// Registers an object that now exists under this tree's root.
    pub fn add_object(&mut self, object_type: ObjectType, name: impl Into<String>) -> usize {
        self.objects.push(ConfObject::new(&self.root, object_type, name));
        self.objects.len() - 1
    }
}

/// A form owned by an object, with its module if it has one.
#[derive(Clone, Debug)]
pub struct Form {
    pub name: String,
    pub directory: PathBuf,
    pub module: Option<Module>,
}

/// A named, typed top-level object of a configuration tree.
#[derive(Clone, Debug)]
pub struct ConfObject {
    pub name: String,
    pub object_type: ObjectType,
    /// The object's descriptor file (`Catalogs/Goods.xml`).
    pub file_path: PathBuf,
    /// The object's auxiliary directory (`Catalogs/Goods`).
    pub directory: PathBuf,
    modules: Option<Vec<Module>>,
    forms: Option<Vec<Form>>,
}

impl ConfObject {
    pub fn new(root: &Path, object_type: ObjectType, name: impl Into<String>) -> Self {
        let name = name.into();
        let type_dir = root.join(object_type.directory());
        Self {
            file_path: type_dir.join(format!("{name}.xml")),
            directory: type_dir.join(&name),
            name,
            object_type,
            modules: None,
            forms: None,
        }
    }

    /// Type-qualified identifier, e.g. `Catalog.Goods`.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.object_type.tag(), self.name)
    }

    /// Where module sources of this object are stored.
    pub fn extension_subpath(&self) -> PathBuf {
        self.directory.join(EXT_DIR)
    }

    /// Parses the object's modules and form modules on first call.
    pub fn load_modules(&mut self) -> ModelResult<()> {
        if self.modules.is_none() {
            self.modules = Some(read_object_modules(&self.extension_subpath())?);
        }
        if self.forms.is_none() {
            self.forms = Some(if self.object_type.supports_forms() {
                read_forms(&self.directory.join(FORMS_DIR))?
            } else {
                Vec::new()
            });
        }
        Ok(())
    }

    /// Direct modules; empty until [`load_modules`](Self::load_modules).
    pub fn modules(&self) -> &[Module] {
        self.modules.as_deref().unwrap_or_default()
    }

    /// Forms; empty until loaded or when the type has none.
    pub fn forms(&self) -> &[Form] {
        self.forms.as_deref().unwrap_or_default()
    }

    /// Direct modules followed by form modules.
    pub fn all_modules(&self) -> Vec<&Module> {
        self.modules()
            .iter()
            .chain(self.forms().iter().filter_map(|f| f.module.as_ref()))
            .collect()
    }

    /// Mutable access to direct modules followed by form modules.
    pub fn all_modules_mut(&mut self) -> Vec<&mut Module> {
        let direct = self.modules.iter_mut().flatten();
        let forms = self
            .forms
            .iter_mut()
            .flatten()
            .filter_map(|f| f.module.as_mut());
        direct.chain(forms).collect()
    }
}

/// Module identity for a form's module.
pub fn form_module_name(form: &str) -> String {
    format!("Form.{form}")
}

/// The form owning module `module`, if it is a form module.
pub fn form_of_module(module: &str) -> Option<&str> {
    module.strip_prefix("Form.")
}

fn read_object_modules(ext_dir: &Path) -> ModelResult<Vec<Module>> {
    if !ext_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut modules = Vec::new();
    for entry in WalkDir::new(ext_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(ext_dir).to_path_buf();
            ModelError::io(path, e.into())
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |e| e != "bsl") {
            continue;
        }
        let name = path
            .strip_prefix(ext_dir)
            .unwrap_or(path)
            .with_extension("")
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        modules.push(Module::read(name, path)?);
    }
    Ok(modules)
}

fn read_forms(forms_dir: &Path) -> ModelResult<Vec<Form>> {
    if !forms_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in fs::read_dir(forms_dir).map_err(|e| ModelError::io(forms_dir, e))? {
        let entry = entry.map_err(|e| ModelError::io(forms_dir, e))?;
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();

    let mut forms = Vec::new();
    for directory in dirs {
        let name = directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let module_path = directory.join(EXT_DIR).join("Form").join("Module.bsl");
        let module = if module_path.is_file() {
            Some(Module::read(form_module_name(&name), &module_path)?)
        } else {
            None
        };
        forms.push(Form {
            name,
            directory,
            module,
        });
    }
    Ok(forms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn descriptor(children: &str) -> String {
        format!(
            "<MetaDataObject><Configuration><Properties><Name>Base</Name></Properties>\
             <ChildObjects>{children}</ChildObjects></Configuration></MetaDataObject>"
        )
    }

    #[test]
    fn reads_objects_and_lazily_loads_modules() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "Configuration.xml", &descriptor("<Catalog>Goods</Catalog><Role>Admin</Role>"));
        write(root, "Catalogs/Goods.xml", "<MetaDataObject/>");
        write(root, "Catalogs/Goods/Ext/ManagerModule.bsl", "Процедура А()\nКонецПроцедуры\n");
        write(root, "Catalogs/Goods/Ext/ObjectModule.bsl", "");
        write(root, "Catalogs/Goods/Forms/Item/Ext/Form/Module.bsl", "&НаКлиенте\nПроцедура Б()\nКонецПроцедуры\n");
        write(root, "Catalogs/Goods/Forms/Item/Ext/Form.xml", "<Form/>");

        let mut conf = Configuration::read(root).unwrap();
        assert_eq!(conf.name, "Base");
        assert_eq!(conf.objects().len(), 2);

        let idx = conf.find_object("Goods", ObjectType::Catalog).unwrap();
        assert!(conf.find_object("Goods", ObjectType::Document).is_none());

        let obj = conf.object_mut(idx).unwrap();
        assert_eq!(obj.full_name(), "Catalog.Goods");
        assert!(obj.modules().is_empty());
        obj.load_modules().unwrap();

        let names: Vec<&str> = obj.all_modules().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["ManagerModule", "ObjectModule", "Form.Item"]);
        assert_eq!(obj.forms().len(), 1);
        assert_eq!(form_of_module(names[2]), Some("Item"));
        assert_eq!(form_of_module(names[0]), None);
    }

    #[test]
    fn types_without_forms_get_an_empty_form_list() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "Configuration.xml", &descriptor("<CommonModule>Utils</CommonModule>"));
        write(root, "CommonModules/Utils/Ext/Module.bsl", "Процедура А() Экспорт\nКонецПроцедуры\n");
        write(root, "CommonModules/Utils/Forms/Bogus/Ext/Form/Module.bsl", "");

        let mut conf = Configuration::read(root).unwrap();
        let obj = conf.object_mut(0).unwrap();
        obj.load_modules().unwrap();
        assert!(obj.forms().is_empty());
        assert_eq!(obj.modules().len(), 1);
        assert_eq!(obj.modules()[0].name, "Module");
    }

    #[test]
    fn missing_descriptor_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Configuration::read(dir.path()).unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
    }
}
