//! Source modules: parsing, rendering, lookup and persistence.

use std::fs;
use std::path::{Path, PathBuf};

use crate::element::{Element, TextBlock};
use crate::error::{ModelError, ModelResult};
use crate::parser::parse_elements;
use crate::range::TextRange;
use crate::subprogram::Subprogram;

const BOM: char = '\u{feff}';

/// A BSL source module owned by an object or one of its forms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    /// Identity of the module within its owner (`ManagerModule`,
    /// `Form.Item`). Matching modules across trees compares this, never
    /// the file name.
    pub name: String,
    pub file_path: PathBuf,
    pub elements: Vec<Element>,
    pub range: TextRange,
    bom: bool,
    crlf: bool,
    trailing_newline: bool,
}

impl Module {
    /// Parses module source text.
    pub fn parse(
        name: impl Into<String>,
        file_path: impl Into<PathBuf>,
        source: &str,
    ) -> ModelResult<Self> {
        let bom = source.starts_with(BOM);
        let text = source.strip_prefix(BOM).unwrap_or(source);
        let crlf = text.contains("\r\n");
        let trailing_newline = text.ends_with('\n');

        let body = text.strip_suffix('\n').unwrap_or(text);
        let lines: Vec<&str> = if text.is_empty() {
            Vec::new()
        } else {
            body.split('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l))
                .collect()
        };

        let mut module = Self {
            name: name.into(),
            file_path: file_path.into(),
            elements: parse_elements(&lines)?,
            range: TextRange::default(),
            bom,
            crlf,
            trailing_newline,
        };
        module.renumber();
        Ok(module)
    }

    /// Reads and parses a module file.
    pub fn read(name: impl Into<String>, path: &Path) -> ModelResult<Self> {
        let source = fs::read_to_string(path).map_err(|e| ModelError::io(path, e))?;
        Self::parse(name, path, &source)
    }

    /// Renders the module back to source text, keeping the BOM and line
    /// endings it was read with.
    pub fn render(&self) -> String {
        let lines = self.render_lines();
        let newline = if self.crlf { "\r\n" } else { "\n" };
        let mut out = String::new();
        if self.bom {
            out.push(BOM);
        }
        out.push_str(&lines.join(newline));
        if self.trailing_newline && !lines.is_empty() {
            out.push_str(newline);
        }
        out
    }

    fn render_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for el in &self.elements {
            el.render_into(&mut lines);
        }
        lines
    }

    /// Writes the rendered module to its file path.
    pub fn save(&self) -> ModelResult<()> {
        fs::write(&self.file_path, self.render()).map_err(|e| ModelError::io(&self.file_path, e))
    }

    /// Everything except module-level variable declarations, `\n`-joined.
    pub fn main_text(&self) -> String {
        self.text_where(|block| !block.declaration)
    }

    /// The module-level variable declarations, `\n`-joined.
    pub fn variable_declarations_text(&self) -> String {
        let mut lines = Vec::new();
        for el in &self.elements {
            if let Element::Text(block) = el {
                if block.declaration {
                    lines.extend(block.lines.iter().cloned());
                }
            }
        }
        lines.join("\n")
    }

    fn text_where(&self, keep: impl Fn(&TextBlock) -> bool) -> String {
        let mut lines = Vec::new();
        for el in &self.elements {
            match el {
                Element::Text(block) if !keep(block) => {}
                other => other.render_into(&mut lines),
            }
        }
        lines.join("\n")
    }

    pub fn subprograms(&self) -> impl Iterator<Item = &Subprogram> {
        self.elements.iter().filter_map(Element::as_subprogram)
    }

    /// Index of the element defining subprogram `name` (case-insensitive,
    /// as platform identifiers are).
    pub fn find_subprogram(&self, name: &str) -> Option<usize> {
        let wanted = name.to_lowercase();
        self.elements.iter().position(|el| {
            el.as_subprogram()
                .is_some_and(|sub| sub.name.to_lowercase() == wanted)
        })
    }

    pub fn subprogram(&self, index: usize) -> Option<&Subprogram> {
        self.elements.get(index).and_then(Element::as_subprogram)
    }

    pub fn subprogram_mut(&mut self, index: usize) -> Option<&mut Subprogram> {
        self.elements
            .get_mut(index)
            .and_then(Element::as_subprogram_mut)
    }

    /// Indices of every subprogram carrying an extension directive, in
    /// source order.
    pub fn directive_indices(&self) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.as_subprogram().is_some_and(|s| s.directive.is_some()))
            .map(|(i, _)| i)
            .collect()
    }

    /// Inserts an element at `index` and renumbers the module.
    pub fn insert_element(&mut self, index: usize, element: Element) {
        let index = index.min(self.elements.len());
        self.elements.insert(index, element);
        self.renumber();
    }

    /// Appends an element and renumbers the module.
    pub fn push_element(&mut self, element: Element) {
        self.elements.push(element);
        self.renumber();
    }

    /// Reassigns every element range from the content, top to bottom.
    pub fn renumber(&mut self) {
        let mut next = 1;
        for el in &mut self.elements {
            next = el.renumber(next);
        }
        self.range = TextRange::spanning(1, next - 1);
    }

    /// Total number of rendered lines.
    pub fn line_count(&self) -> usize {
        self.elements.iter().map(Element::line_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SOURCE: &str = "\u{feff}Перем Счетчик;\r\n\r\n&Перед(\"Записать\")\r\nПроцедура Расш_Записать()\r\n\tСчетчик = 1;\r\nКонецПроцедуры\r\n\r\nСчетчик = 0;\r\n";

    #[test]
    fn render_round_trips_bom_and_crlf() {
        let module = Module::parse("ObjectModule", "m.bsl", SOURCE).unwrap();
        assert_eq!(module.render(), SOURCE);
    }

    #[test]
    fn main_text_excludes_declarations() {
        let module = Module::parse("ObjectModule", "m.bsl", SOURCE).unwrap();
        assert_eq!(module.variable_declarations_text(), "Перем Счетчик;");
        let main = module.main_text();
        assert!(main.starts_with("\n&Перед(\"Записать\")\nПроцедура Расш_Записать()"));
        assert!(main.ends_with("Счетчик = 0;"));
        assert!(!main.contains("Перем"));
    }

    #[test]
    fn consumed_directive_disappears_from_render() {
        let mut module = Module::parse("ObjectModule", "m.bsl", SOURCE).unwrap();
        let idx = module.find_subprogram("расш_записать").unwrap();
        assert_eq!(module.directive_indices(), vec![idx]);
        module.subprogram_mut(idx).unwrap().take_directive();
        module.renumber();
        assert!(!module.render().contains("&Перед"));
        assert!(module.directive_indices().is_empty());
        assert_eq!(module.line_count(), module.range.end_line);
    }

    #[test]
    fn ranges_follow_content_after_head_insertion() {
        let mut module = Module::parse("ObjectModule", "m.bsl", SOURCE).unwrap();
        let before = module.elements[1].range();
        module.insert_element(0, Element::Text(TextBlock::region("R", "x = 1;", 0)));
        let after = module.elements[2].range();
        assert_eq!(after.start_line, before.start_line + 3);
        assert_eq!(after.end_line, before.end_line + 3);
    }

    #[test]
    fn empty_module() {
        let module = Module::parse("Module", "m.bsl", "").unwrap();
        assert!(module.elements.is_empty());
        assert_eq!(module.render(), "");
    }

    fn arb_block() -> impl Strategy<Value = Element> {
        prop::collection::vec("[a-z]{0,6}", 1..4)
            .prop_map(|lines| Element::Text(TextBlock::new(lines)))
    }

    fn source_with(procs: &[usize]) -> String {
        let mut src = String::new();
        for (i, body) in procs.iter().enumerate() {
            src.push_str(&format!("Процедура П{i}()\n"));
            for _ in 0..*body {
                src.push_str("\tx();\n");
            }
            src.push_str("КонецПроцедуры\n");
        }
        src
    }

    proptest! {
        #[test]
        fn ranges_stay_contiguous_after_insertions(
            procs in prop::collection::vec(0usize..4, 1..5),
            inserts in prop::collection::vec((0usize..8, arb_block()), 0..6),
            body_inserts in prop::collection::vec((0usize..5, any::<bool>(), arb_block()), 0..6),
        ) {
            let mut module = Module::parse("Module", "m.bsl", &source_with(&procs)).unwrap();
            for (at, el) in inserts {
                module.insert_element(at, el);
            }
            for (which, head, el) in body_inserts {
                let subs: Vec<usize> = (0..module.elements.len())
                    .filter(|&i| module.subprogram(i).is_some())
                    .collect();
                let idx = subs[which % subs.len()];
                let sub = module.subprogram_mut(idx).unwrap();
                if head { sub.elements.insert(0, el) } else { sub.elements.push(el) }
                module.renumber();
            }

            let mut prev_end = 0;
            for el in &module.elements {
                let r = el.range();
                prop_assert_eq!(r.start_line, prev_end + 1);
                prop_assert!(r.end_line >= r.start_line);
                if let Element::Subprogram(sub) = el {
                    let mut inner_prev = r.start_line;
                    for inner in &sub.elements {
                        prop_assert!(inner.range().follows(&TextRange::new(r.start_line, inner_prev)));
                        inner_prev = inner.range().end_line;
                    }
                    prop_assert!(inner_prev < r.end_line);
                }
                prev_end = r.end_line;
            }
            prop_assert_eq!(prev_end, module.render_lines().len());
        }
    }
}
