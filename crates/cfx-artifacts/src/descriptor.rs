//! Registering new objects in the root descriptor's `ChildObjects` index.
//!
//! The descriptor is streamed through unchanged except for the inserted
//! entries, so namespace declarations, attributes, comments and whitespace
//! of the original file survive. A new entry is placed after the last
//! existing entry with the same type tag, or after the last entry of any
//! kind when its tag is not present yet.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::debug;

use crate::error::{ArtifactError, ArtifactResult};

const SECTION: &str = "ChildObjects";
const DEFAULT_INDENT: &str = "\t\t\t";

/// An entry of the `ChildObjects` index: `<Catalog>Goods</Catalog>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildObject {
    pub tag: String,
    pub name: String,
}

impl ChildObject {
    pub fn new(tag: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            name: name.into(),
        }
    }
}

/// Adds `additions` to the descriptor at `path`. Entries already present
/// are skipped. Returns `true` if the file was rewritten.
pub fn register_child_objects(path: &Path, additions: &[ChildObject]) -> ArtifactResult<bool> {
    let text = fs::read_to_string(path).map_err(|e| ArtifactError::io(path, e))?;
    let patched = patch_child_objects(&text, additions).map_err(|message| {
        ArtifactError::Descriptor {
            path: path.to_path_buf(),
            message,
        }
    })?;
    match patched {
        Some(out) => {
            fs::write(path, out).map_err(|e| ArtifactError::io(path, e))?;
            debug!(path = %path.display(), added = additions.len(), "root descriptor patched");
            Ok(true)
        }
        None => Ok(false),
    }
}

/// What the first pass learns about the `ChildObjects` section.
#[derive(Debug, Default)]
struct Layout {
    found: bool,
    /// Existing entries in order; empty-element entries have an empty name.
    children: Vec<ChildObject>,
    /// Whitespace prefix of the first entry's line.
    child_indent: Option<String>,
}

/// Returns the patched descriptor text, or `None` when nothing needed adding.
pub fn patch_child_objects(text: &str, additions: &[ChildObject]) -> Result<Option<String>, String> {
    let bom = text.starts_with('\u{feff}');
    let body = text.trim_start_matches('\u{feff}');
    let newline = if body.contains("\r\n") { "\r\n" } else { "\n" };

    let layout = scan(body)?;
    if !layout.found {
        return Err(format!("no {SECTION} section"));
    }

    let mut pending: Vec<&ChildObject> = Vec::new();
    for addition in additions {
        if !layout.children.contains(addition) && !pending.contains(&addition) {
            pending.push(addition);
        }
    }
    if pending.is_empty() {
        return Ok(None);
    }

    let indent = layout
        .child_indent
        .clone()
        .unwrap_or_else(|| DEFAULT_INDENT.to_string());
    let closing_indent = indent.strip_suffix('\t').unwrap_or("").to_string();

    // Anchor each addition to the index of the entry it follows.
    let mut after: BTreeMap<usize, Vec<&ChildObject>> = BTreeMap::new();
    let mut unanchored: Vec<&ChildObject> = Vec::new();
    for addition in pending {
        let anchor = layout.children.iter().rposition(|c| c.tag == addition.tag);
        match anchor.or_else(|| layout.children.len().checked_sub(1)) {
            Some(index) => after.entry(index).or_default().push(addition),
            None => unanchored.push(addition),
        }
    }

    let mut reader = Reader::from_str(body);
    let mut writer = Writer::new(Vec::new());
    let mut stack: Vec<String> = Vec::new();
    let mut child_index = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("at position {}: {e}", reader.buffer_position()))?;
        match event {
            Event::Eof => break,
            Event::Start(e) => {
                stack.push(local_name(&e));
                write(&mut writer, Event::Start(e))?;
            }
            Event::End(e) => {
                let closes_section = stack.last().is_some_and(|s| s == SECTION);
                let closes_child = in_section(&stack, 1);
                if closes_section && !unanchored.is_empty() {
                    write_children(&mut writer, &unanchored, newline, &indent)?;
                    write(&mut writer, Event::Text(BytesText::new(&format!("{newline}{closing_indent}"))))?;
                }
                write(&mut writer, Event::End(e))?;
                stack.pop();
                if closes_child {
                    if let Some(list) = after.get(&child_index) {
                        write_children(&mut writer, list, newline, &indent)?;
                    }
                    child_index += 1;
                }
            }
            Event::Empty(e) if local_name(&e) == SECTION => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                write(&mut writer, Event::Start(e))?;
                write_children(&mut writer, &unanchored, newline, &indent)?;
                write(&mut writer, Event::Text(BytesText::new(&format!("{newline}{closing_indent}"))))?;
                write(&mut writer, Event::End(BytesEnd::new(name)))?;
            }
            Event::Empty(e) => {
                let is_child = in_section(&stack, 0);
                write(&mut writer, Event::Empty(e))?;
                if is_child {
                    if let Some(list) = after.get(&child_index) {
                        write_children(&mut writer, list, newline, &indent)?;
                    }
                    child_index += 1;
                }
            }
            // An empty section gets its whitespace rewritten around the new entries.
            Event::Text(_) if !unanchored.is_empty() && in_section(&stack, 0) => {}
            other => write(&mut writer, other)?,
        }
    }

    let mut out = String::from_utf8(writer.into_inner()).map_err(|e| e.to_string())?;
    if bom {
        out.insert(0, '\u{feff}');
    }
    Ok(Some(out))
}

fn scan(body: &str) -> Result<Layout, String> {
    let mut reader = Reader::from_str(body);
    let mut stack: Vec<String> = Vec::new();
    let mut layout = Layout::default();
    let mut last_whitespace = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("at position {}: {e}", reader.buffer_position()))?;
        match event {
            Event::Eof => break,
            Event::Start(e) => {
                let name = local_name(&e);
                if name == SECTION {
                    layout.found = true;
                }
                if in_section(&stack, 0) {
                    note_indent(&mut layout, &last_whitespace);
                    layout.children.push(ChildObject::new(name.clone(), String::new()));
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = local_name(&e);
                if name == SECTION {
                    layout.found = true;
                } else if in_section(&stack, 0) {
                    note_indent(&mut layout, &last_whitespace);
                    layout.children.push(ChildObject::new(name, String::new()));
                }
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(e) => {
                let value = e.unescape().map_err(|e| e.to_string())?;
                if in_section(&stack, 1) {
                    if let Some(child) = layout.children.last_mut() {
                        child.name = value.trim().to_string();
                    }
                } else if value.trim().is_empty() {
                    last_whitespace = value.into_owned();
                }
            }
            _ => {}
        }
    }
    Ok(layout)
}

fn note_indent(layout: &mut Layout, whitespace: &str) {
    if layout.child_indent.is_none() {
        let indent = whitespace.rsplit('\n').next().unwrap_or_default();
        if !indent.is_empty() {
            layout.child_indent = Some(indent.to_string());
        }
    }
}

/// `true` when the element `depth` levels below the top of `stack` is the
/// `ChildObjects` section (0: directly inside it, 1: inside one of its entries).
fn in_section(stack: &[String], depth: usize) -> bool {
    stack.len() > depth && stack[stack.len() - 1 - depth] == SECTION
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), String> {
    writer.write_event(event).map_err(|e| e.to_string())
}

fn write_children(
    writer: &mut Writer<Vec<u8>>,
    children: &[&ChildObject],
    newline: &str,
    indent: &str,
) -> Result<(), String> {
    for child in children {
        write(writer, Event::Text(BytesText::new(&format!("{newline}{indent}"))))?;
        write(writer, Event::Start(BytesStart::new(child.tag.as_str())))?;
        write(writer, Event::Text(BytesText::new(&child.name)))?;
        write(writer, Event::End(BytesEnd::new(child.tag.as_str())))?;
    }
    Ok(())
}
