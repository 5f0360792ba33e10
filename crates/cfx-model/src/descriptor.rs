//! Reading the root descriptor (`Configuration.xml`) of an export tree.

use std::fs;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{ModelError, ModelResult};
use crate::object_type::ObjectType;

/// File name of the root descriptor inside an export directory.
pub const ROOT_DESCRIPTOR: &str = "Configuration.xml";

/// What the model needs from the root descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RootDescriptor {
    /// `Configuration/Properties/Name`.
    pub name: String,
    /// `Configuration/ChildObjects` entries in document order.
    pub children: Vec<(ObjectType, String)>,
}

impl RootDescriptor {
    pub fn read(path: &Path) -> ModelResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| ModelError::io(path, e))?;
        Self::parse(&text).map_err(|message| ModelError::Descriptor {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parses descriptor XML. Errors are returned as plain messages so the
    /// caller can attach the file path.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(text.trim_start_matches('\u{feff}'));
        let mut stack: Vec<String> = Vec::new();
        let mut descriptor = RootDescriptor::default();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    stack.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                }
                Ok(Event::End(_)) => {
                    stack.pop();
                }
                Ok(Event::Text(e)) => {
                    let value = e.unescape().map_err(|e| e.to_string())?;
                    let value = value.trim();
                    if value.is_empty() {
                        continue;
                    }
                    if ends_with(&stack, &["Configuration", "Properties", "Name"]) {
                        descriptor.name = value.to_string();
                    } else if stack.len() >= 2 && stack[stack.len() - 2] == "ChildObjects" {
                        let tag = &stack[stack.len() - 1];
                        let object_type = tag.parse::<ObjectType>().map_err(|e| e.to_string())?;
                        descriptor.children.push((object_type, value.to_string()));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(format!(
                        "at position {}: {e}",
                        reader.buffer_position()
                    ))
                }
            }
        }

        if descriptor.name.is_empty() {
            return Err("missing Configuration/Properties/Name".into());
        }
        Ok(descriptor)
    }
}

fn ends_with(stack: &[String], suffix: &[&str]) -> bool {
    stack.len() >= suffix.len()
        && stack[stack.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(a, b)| a == b)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<MetaDataObject xmlns="http://v8.1c.ru/8.3/MDClasses" xmlns:v8="http://v8.1c.ru/8.1/data/core" version="2.7">
	<Configuration uuid="0b1e">
		<Properties>
			<Name>Торговля</Name>
			<Synonym>
				<v8:item><v8:lang>ru</v8:lang><v8:content>Торговля</v8:content></v8:item>
			</Synonym>
		</Properties>
		<ChildObjects>
			<Language>Русский</Language>
			<Role>Администратор</Role>
			<Catalog>Товары</Catalog>
			<Document>Заказ</Document>
		</ChildObjects>
	</Configuration>
</MetaDataObject>"#;

    #[test]
    fn reads_name_and_children_in_order() {
        let d = RootDescriptor::parse(DESCRIPTOR).unwrap();
        assert_eq!(d.name, "Торговля");
        assert_eq!(
            d.children,
            vec![
                (ObjectType::Language, "Русский".to_string()),
                (ObjectType::Role, "Администратор".to_string()),
                (ObjectType::Catalog, "Товары".to_string()),
                (ObjectType::Document, "Заказ".to_string()),
            ]
        );
    }

    #[test]
    fn reads_external_sources_and_bots() {
        let xml = DESCRIPTOR.replace(
            "<Document>Заказ</Document>",
            "<ExternalDataSource>Склад</ExternalDataSource><Bot>Помощник</Bot>",
        );
        let d = RootDescriptor::parse(&xml).unwrap();
        assert_eq!(d.children[3], (ObjectType::ExternalDataSource, "Склад".to_string()));
        assert_eq!(d.children[4], (ObjectType::Bot, "Помощник".to_string()));
    }

    #[test]
    fn unknown_child_tag_is_reported() {
        let xml = DESCRIPTOR.replace("<Document>Заказ</Document>", "<Gizmo>X</Gizmo>");
        let err = RootDescriptor::parse(&xml).unwrap_err();
        assert!(err.contains("Gizmo"));
    }

    #[test]
    fn missing_name_is_an_error() {
        let err = RootDescriptor::parse("<MetaDataObject><Configuration/></MetaDataObject>").unwrap_err();
        assert!(err.contains("Name"));
    }
}
