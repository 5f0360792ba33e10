//! Module elements: raw text blocks and subprogram definitions.

use crate::range::TextRange;
use crate::subprogram::Subprogram;

/// Opening keyword of a named region.
pub const REGION_START: &str = "#Область";
/// Closing keyword of a named region.
pub const REGION_END: &str = "#КонецОбласти";

/// One entry of a module's (or subprogram body's) ordered element list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Element {
    Text(TextBlock),
    Subprogram(Subprogram),
}

impl Element {
    pub fn range(&self) -> TextRange {
        match self {
            Element::Text(block) => block.range,
            Element::Subprogram(sub) => sub.range,
        }
    }

    pub fn as_subprogram(&self) -> Option<&Subprogram> {
        match self {
            Element::Subprogram(sub) => Some(sub),
            Element::Text(_) => None,
        }
    }

    pub fn as_subprogram_mut(&mut self) -> Option<&mut Subprogram> {
        match self {
            Element::Subprogram(sub) => Some(sub),
            Element::Text(_) => None,
        }
    }

    pub(crate) fn line_count(&self) -> usize {
        match self {
            Element::Text(block) => block.lines.len(),
            Element::Subprogram(sub) => sub.line_count(),
        }
    }

    pub(crate) fn render_into(&self, out: &mut Vec<String>) {
        match self {
            Element::Text(block) => out.extend(block.lines.iter().cloned()),
            Element::Subprogram(sub) => sub.render_into(out),
        }
    }

    /// Assigns ranges starting at `start`; returns the next free line.
    pub(crate) fn renumber(&mut self, start: usize) -> usize {
        match self {
            Element::Text(block) => {
                block.range = TextRange::spanning(start, block.lines.len());
                start + block.lines.len()
            }
            Element::Subprogram(sub) => sub.renumber(start),
        }
    }
}

/// A run of raw source lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub range: TextRange,
    /// Set for module-level variable declarations.
    pub declaration: bool,
}

impl TextBlock {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            range: TextRange::default(),
            declaration: false,
        }
    }

    pub fn declaration(lines: Vec<String>) -> Self {
        Self {
            declaration: true,
            ..Self::new(lines)
        }
    }

    /// A named region wrapping `body`, indented by `level` tabs.
    ///
    /// ```
    /// use cfx_model::TextBlock;
    ///
    /// let block = TextBlock::region("Proc_Import", "Call();", 1);
    /// assert_eq!(block.lines, vec!["\t#Область Proc_Import", "\tCall();", "\t#КонецОбласти"]);
    /// ```
    pub fn region(name: &str, body: &str, level: usize) -> Self {
        let tabs = "\t".repeat(level);
        let mut lines = Vec::with_capacity(body.lines().count() + 2);
        lines.push(format!("{tabs}{REGION_START} {name}"));
        for line in body.lines() {
            if line.is_empty() {
                lines.push(String::new());
            } else {
                lines.push(format!("{tabs}{line}"));
            }
        }
        lines.push(format!("{tabs}{REGION_END}"));
        Self::new(lines)
    }

    /// Prepends an empty separator line.
    pub fn with_blank_line_before(mut self) -> Self {
        self.lines.insert(0, String::new());
        self
    }

    /// Appends an empty separator line.
    pub fn with_blank_line_after(mut self) -> Self {
        self.lines.push(String::new());
        self
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Name of the region this block opens, if it is one.
    pub fn region_name(&self) -> Option<&str> {
        self.lines
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
            .and_then(|l| l.strip_prefix(REGION_START))
            .map(str::trim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_indents_non_empty_lines() {
        let block = TextBlock::region("R", "a();\n\nb();", 1);
        assert_eq!(
            block.lines,
            vec!["\t#Область R", "\ta();", "", "\tb();", "\t#КонецОбласти"]
        );
        assert_eq!(block.region_name(), Some("R"));
    }

    #[test]
    fn padded_region_keeps_its_name() {
        let block = TextBlock::region("Outer", "x = 1;", 0).with_blank_line_before();
        assert_eq!(block.lines[0], "");
        assert_eq!(block.region_name(), Some("Outer"));
    }

    #[test]
    fn renumber_text_block() {
        let mut el = Element::Text(TextBlock::new(vec!["a".into(), "b".into()]));
        assert_eq!(el.renumber(3), 5);
        assert_eq!(el.range(), TextRange::new(3, 4));
    }
}
