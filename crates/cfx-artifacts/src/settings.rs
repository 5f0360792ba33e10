//! The merge settings document.
//!
//! Tells the downstream build tool which objects to take from the merged
//! ("second") configuration. Element and attribute names are fixed by the
//! tool and must match byte for byte.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::config::ArtifactConfig;
use crate::error::{ArtifactError, ArtifactResult};

pub const SETTINGS_NAMESPACE: &str = "http://v8.1c.ru/8.3/config/merge/settings";
const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Merge rule applied to every listed object.
pub const MERGE_RULE: &str = "GetFromSecondConfiguration";

/// Fixed parameter block, in document order.
const PARAMETERS: [(&str, &str); 3] = [
    (
        "ConfigurationsRelation",
        "SecondConfigurationIsDescendantOfMainConfiguration",
    ),
    ("AllowMainConfigurationObjectDeletion", "true"),
    ("CopyObjectsMode", "false"),
];

/// An object taking part in the merge.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectEntry {
    /// Type-qualified name (`Catalog.Goods`).
    pub full_name: String,
    /// `true` if the object was introduced by the extension.
    pub is_new: bool,
}

impl ObjectEntry {
    pub fn existing(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            is_new: false,
        }
    }

    pub fn new_object(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            is_new: true,
        }
    }

    /// Pre-existing objects are keyed by `fullName`, new ones by
    /// `fullNameInSecondConfiguration`.
    fn key_attribute(&self) -> &'static str {
        if self.is_new {
            "fullNameInSecondConfiguration"
        } else {
            "fullName"
        }
    }
}

/// Builder for the merge settings document.
#[derive(Clone, Debug, Default)]
pub struct MergeSettings {
    config: ArtifactConfig,
    objects: Vec<ObjectEntry>,
}

impl MergeSettings {
    pub fn new(config: ArtifactConfig) -> Self {
        Self {
            config,
            objects: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: ObjectEntry) {
        self.objects.push(entry);
    }

    pub fn objects(&self) -> &[ObjectEntry] {
        &self.objects
    }

    /// Serializes the document as UTF-8 XML.
    pub fn to_xml(&self) -> ArtifactResult<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(ArtifactError::xml)?;

        let mut root = BytesStart::new("Settings");
        root.push_attribute(("xmlns", SETTINGS_NAMESPACE));
        root.push_attribute(("xmlns:xs", XS_NAMESPACE));
        root.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
        root.push_attribute(("version", self.config.settings_version.as_str()));
        root.push_attribute(("platformVersion", self.config.platform_version.as_str()));
        writer.write_event(Event::Start(root)).map_err(ArtifactError::xml)?;

        start(&mut writer, BytesStart::new("Parameters"))?;
        for (name, value) in PARAMETERS {
            text_element(&mut writer, name, value)?;
        }
        end(&mut writer, "Parameters")?;

        start(&mut writer, BytesStart::new("Objects"))?;
        for entry in &self.objects {
            let mut object = BytesStart::new("Object");
            object.push_attribute((entry.key_attribute(), entry.full_name.as_str()));
            start(&mut writer, object)?;
            text_element(&mut writer, "MergeRule", MERGE_RULE)?;
            end(&mut writer, "Object")?;
        }
        end(&mut writer, "Objects")?;

        end(&mut writer, "Settings")?;
        Ok(writer.into_inner())
    }
}

pub(crate) fn start(writer: &mut Writer<Vec<u8>>, element: BytesStart<'_>) -> ArtifactResult<()> {
    writer
        .write_event(Event::Start(element))
        .map_err(ArtifactError::xml)
}

pub(crate) fn end(writer: &mut Writer<Vec<u8>>, name: &str) -> ArtifactResult<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(ArtifactError::xml)
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &str) -> ArtifactResult<()> {
    start(writer, BytesStart::new(name))?;
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(ArtifactError::xml)?;
    end(writer, name)
}
