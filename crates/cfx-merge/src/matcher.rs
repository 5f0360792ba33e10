//! Pairing extension objects with base objects.

use std::fmt;

use cfx_model::{ConfObject, Configuration, ObjectType};
use serde::Serialize;

/// Why an extension object takes no part in the merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Language pseudo-objects are never merged.
    Language,
    /// Roles are only merged into roles the base already has.
    RoleNotInBase,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Language => f.write_str("language object"),
            SkipReason::RoleNotInBase => f.write_str("role absent from base"),
        }
    }
}

/// Where an extension object goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The base object at this index has the same identity.
    Existing(usize),
    /// No counterpart; the object is imported.
    New,
    Skipped(SkipReason),
}

/// Classifies `object` against `base` by exact `(name, type)` identity.
pub fn classify(base: &Configuration, object: &ConfObject) -> MatchOutcome {
    if object.object_type == ObjectType::Language {
        return MatchOutcome::Skipped(SkipReason::Language);
    }
    match base.find_object(&object.name, object.object_type) {
        Some(index) => MatchOutcome::Existing(index),
        None if object.object_type == ObjectType::Role => {
            MatchOutcome::Skipped(SkipReason::RoleNotInBase)
        }
        None => MatchOutcome::New,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;

    fn base(root: &Path) -> Configuration {
        fs::write(
            root.join("Configuration.xml"),
            "<MetaDataObject><Configuration><Properties><Name>Base</Name></Properties><ChildObjects>\
             <Language>Русский</Language><Role>Admin</Role><Catalog>Goods</Catalog>\
             </ChildObjects></Configuration></MetaDataObject>",
        )
        .unwrap();
        Configuration::read(root).unwrap()
    }

    #[test]
    fn classifies_every_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let base = base(dir.path());
        let ext = Path::new("/ext");

        let goods = ConfObject::new(ext, ObjectType::Catalog, "Goods");
        assert_eq!(classify(&base, &goods), MatchOutcome::Existing(2));

        let goods_doc = ConfObject::new(ext, ObjectType::Document, "Goods");
        assert_eq!(classify(&base, &goods_doc), MatchOutcome::New);

        let admin = ConfObject::new(ext, ObjectType::Role, "Admin");
        assert_eq!(classify(&base, &admin), MatchOutcome::Existing(1));

        let auditor = ConfObject::new(ext, ObjectType::Role, "Auditor");
        assert_eq!(
            classify(&base, &auditor),
            MatchOutcome::Skipped(SkipReason::RoleNotInBase)
        );

        let lang = ConfObject::new(ext, ObjectType::Language, "Русский");
        assert_eq!(
            classify(&base, &lang),
            MatchOutcome::Skipped(SkipReason::Language)
        );
    }

    #[test]
    fn identity_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let base = base(dir.path());
        let goods = ConfObject::new(Path::new("/ext"), ObjectType::Catalog, "goods");
        assert_eq!(classify(&base, &goods), MatchOutcome::New);
    }
}
