//! The object list document: every object touched by a merge, used by the
//! downstream tool to lock and commit only the affected subset.

use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Writer;

use crate::error::{ArtifactError, ArtifactResult};
use crate::settings::end;

pub const OBJECTS_NAMESPACE: &str = "http://v8.1c.ru/8.3/config/objects";
const OBJECTS_VERSION: &str = "1.0";

/// Builder for the object list document.
///
/// The root configuration entry is a flag, not a list item, so it can be
/// requested any number of times and is still written once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectList {
    configuration: bool,
    objects: Vec<String>,
}

impl ObjectList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the `<Configuration includeChildObjects="false"/>` entry.
    pub fn include_configuration(&mut self) {
        self.configuration = true;
    }

    pub fn push(&mut self, full_name: impl Into<String>) {
        self.objects.push(full_name.into());
    }

    pub fn objects(&self) -> &[String] {
        &self.objects
    }

    pub fn to_xml(&self) -> ArtifactResult<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(ArtifactError::xml)?;

        let mut root = BytesStart::new("Objects");
        root.push_attribute(("xmlns", OBJECTS_NAMESPACE));
        root.push_attribute(("version", OBJECTS_VERSION));
        writer.write_event(Event::Start(root)).map_err(ArtifactError::xml)?;

        if self.configuration {
            let mut entry = BytesStart::new("Configuration");
            entry.push_attribute(("includeChildObjects", "false"));
            writer.write_event(Event::Empty(entry)).map_err(ArtifactError::xml)?;
        }
        for full_name in &self.objects {
            let mut entry = BytesStart::new("Object");
            entry.push_attribute(("fullName", full_name.as_str()));
            entry.push_attribute(("includeChildObjects", "true"));
            writer.write_event(Event::Empty(entry)).map_err(ArtifactError::xml)?;
        }

        end(&mut writer, "Objects")?;
        Ok(writer.into_inner())
    }
}
