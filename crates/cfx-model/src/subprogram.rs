//! Procedures, functions, and the extension directives attached to them.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::range::TextRange;

/// Whether a subprogram is a procedure or a function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubprogramKind {
    Procedure,
    Function,
}

/// The keyword language a subprogram was written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    Russian,
    English,
}

impl Dialect {
    /// Detects the dialect of a keyword by its script.
    pub fn of(keyword: &str) -> Self {
        if keyword.chars().any(|c| ('\u{0400}'..='\u{04FF}').contains(&c)) {
            Dialect::Russian
        } else {
            Dialect::English
        }
    }

    fn export_keyword(self) -> &'static str {
        match self {
            Dialect::Russian => "Экспорт",
            Dialect::English => "Export",
        }
    }

    fn return_keyword(self) -> &'static str {
        match self {
            Dialect::Russian => "Возврат",
            Dialect::English => "Return",
        }
    }
}

/// How extension code relates to the base subprogram it names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectiveMode {
    /// Run the extension code before the base body.
    Before,
    /// Run the extension code after the base body.
    After,
    /// Replace the base body, optionally calling through to it.
    Replace,
    /// Patch the base body with inline insert/delete markers.
    ChangeAndValidate,
}

impl DirectiveMode {
    /// Maps an annotation keyword (either dialect, any case) to a mode.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_lowercase().as_str() {
            "перед" | "before" => Some(DirectiveMode::Before),
            "после" | "after" => Some(DirectiveMode::After),
            "вместо" | "around" => Some(DirectiveMode::Replace),
            "изменениеиконтроль" | "changeandvalidate" => Some(DirectiveMode::ChangeAndValidate),
            _ => None,
        }
    }
}

impl fmt::Display for DirectiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DirectiveMode::Before => "Before",
            DirectiveMode::After => "After",
            DirectiveMode::Replace => "Replace",
            DirectiveMode::ChangeAndValidate => "ChangeAndValidate",
        };
        f.write_str(s)
    }
}

/// An `&Before("Target")`-style annotation on an extension subprogram.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionDirective {
    pub mode: DirectiveMode,
    /// Name of the base subprogram this one extends.
    pub target: String,
    /// The annotation line as written in the source.
    pub source_line: String,
}

/// A procedure or function definition inside a module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subprogram {
    pub kind: SubprogramKind,
    pub dialect: Dialect,
    pub name: String,
    /// Raw parameter list between the parentheses; may span lines.
    pub params: String,
    pub export: bool,
    /// Leading whitespace and keyword of the header line, as written.
    pub indent: String,
    /// `Асинх `/`Async ` with its following whitespace, or empty.
    pub modifier: String,
    pub keyword: String,
    /// Whatever followed the parameter list (and export marker) on the header line.
    pub trailing: String,
    /// Annotation lines other than the extension directive (`&AtServer`).
    pub annotations: Vec<String>,
    pub directive: Option<ExtensionDirective>,
    /// Body elements between the header and the closing keyword.
    pub elements: Vec<Element>,
    /// The closing keyword line, as written.
    pub footer: String,
    pub range: TextRange,
}

impl Subprogram {
    /// Renders the header line(s).
    pub fn header(&self) -> String {
        let export = if self.export {
            format!(" {}", self.dialect.export_keyword())
        } else {
            String::new()
        };
        format!(
            "{}{}{} {}({}){}{}",
            self.indent, self.modifier, self.keyword, self.name, self.params, export, self.trailing
        )
    }

    fn header_line_count(&self) -> usize {
        1 + self.params.matches('\n').count()
    }

    /// Parameter names usable as call arguments.
    pub fn argument_names(&self) -> Vec<String> {
        split_top_level(&self.params)
            .into_iter()
            .filter_map(|param| {
                let param = param.split('=').next().unwrap_or_default().trim();
                let lower = param.to_lowercase();
                let name = if lower.starts_with("знач ") || lower.starts_with("val ") {
                    param
                        .split_once(char::is_whitespace)
                        .map(|(_, rest)| rest.trim())
                        .unwrap_or(param)
                } else {
                    param
                };
                (!name.is_empty()).then(|| name.to_string())
            })
            .collect()
    }

    /// An invocation of this subprogram under its current name.
    ///
    /// Functions are invoked through a return statement so that the
    /// spliced call keeps the caller's result.
    pub fn call_text(&self) -> String {
        let call = format!("{}({});", self.name, self.argument_names().join(", "));
        match self.kind {
            SubprogramKind::Procedure => call,
            SubprogramKind::Function => format!("{} {}", self.dialect.return_keyword(), call),
        }
    }

    /// Removes and returns the directive so it cannot be applied twice.
    pub fn take_directive(&mut self) -> Option<ExtensionDirective> {
        self.directive.take()
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Drops the whole body.
    pub fn clear_elements(&mut self) {
        self.elements.clear();
    }

    /// Whether any body text contains `needle`, ignoring case.
    pub fn body_contains(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.elements.iter().any(|el| match el {
            Element::Text(block) => block.text().to_lowercase().contains(&needle),
            Element::Subprogram(_) => false,
        })
    }

    /// Replaces every case-insensitive occurrence of `needle` in the body
    /// text with `replacement`. Returns the number of replacements.
    pub fn replace_in_body(&mut self, needle: &str, replacement: &str) -> usize {
        let pattern = match Regex::new(&format!("(?i){}", regex::escape(needle))) {
            Ok(p) => p,
            Err(_) => return 0,
        };
        let mut count = 0;
        for el in &mut self.elements {
            if let Element::Text(block) = el {
                for line in &mut block.lines {
                    let hits = pattern.find_iter(line).count();
                    if hits > 0 {
                        count += hits;
                        *line = pattern
                            .replace_all(line, regex::NoExpand(replacement))
                            .into_owned();
                    }
                }
            }
        }
        count
    }

    pub(crate) fn line_count(&self) -> usize {
        self.annotations.len()
            + usize::from(self.directive.is_some())
            + self.header_line_count()
            + self.elements.iter().map(Element::line_count).sum::<usize>()
            + 1
    }

    pub(crate) fn render_into(&self, out: &mut Vec<String>) {
        out.extend(self.annotations.iter().cloned());
        if let Some(directive) = &self.directive {
            out.push(directive.source_line.clone());
        }
        out.extend(self.header().split('\n').map(str::to_string));
        for el in &self.elements {
            el.render_into(out);
        }
        out.push(self.footer.clone());
    }

    pub(crate) fn renumber(&mut self, start: usize) -> usize {
        let mut next = start
            + self.annotations.len()
            + usize::from(self.directive.is_some())
            + self.header_line_count();
        for el in &mut self.elements {
            next = el.renumber(next);
        }
        self.range = TextRange::new(start, next);
        next + 1
    }
}

/// Splits a parameter list on commas outside quotes and parentheses.
fn split_top_level(params: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut start = 0;
    for (i, c) in params.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth = depth.saturating_sub(1),
            ',' if !in_string && depth == 0 => {
                parts.push(&params[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&params[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::TextBlock;

    fn sample(kind: SubprogramKind, keyword: &str, params: &str) -> Subprogram {
        Subprogram {
            kind,
            dialect: Dialect::of(keyword),
            name: "Calc".into(),
            params: params.into(),
            export: false,
            indent: String::new(),
            modifier: String::new(),
            keyword: keyword.into(),
            trailing: String::new(),
            annotations: Vec::new(),
            directive: None,
            elements: vec![Element::Text(TextBlock::new(vec![
                "\tResult = ПродолжитьВызов(A);".into(),
                "\tпродолжитьвызов(B);".into(),
            ]))],
            footer: "EndFunction".into(),
            range: TextRange::default(),
        }
    }

    #[test]
    fn argument_names_strip_val_and_defaults() {
        let sub = sample(
            SubprogramKind::Procedure,
            "Процедура",
            "Знач Ссылка, Отказ = Ложь, Режим = \"a,b\"",
        );
        assert_eq!(sub.argument_names(), vec!["Ссылка", "Отказ", "Режим"]);
    }

    #[test]
    fn call_text_for_procedure_and_function() {
        let proc_ = sample(SubprogramKind::Procedure, "Procedure", "Val A, B");
        assert_eq!(proc_.call_text(), "Calc(A, B);");

        let func = sample(SubprogramKind::Function, "Функция", "");
        assert_eq!(func.call_text(), "Возврат Calc();");
    }

    #[test]
    fn replace_in_body_ignores_case() {
        let mut sub = sample(SubprogramKind::Function, "Function", "A");
        assert!(sub.body_contains("ПРОДОЛЖИТЬВЫЗОВ("));
        let n = sub.replace_in_body("ПродолжитьВызов(", "changed_Calc(");
        assert_eq!(n, 2);
        assert!(!sub.body_contains("ПродолжитьВызов("));
        assert!(sub.body_contains("changed_Calc(A)"));
    }

    #[test]
    fn header_renders_export_in_dialect() {
        let mut sub = sample(SubprogramKind::Procedure, "Процедура", "А");
        sub.export = true;
        assert_eq!(sub.header(), "Процедура Calc(А) Экспорт");
    }

    #[test]
    fn directive_keywords() {
        assert_eq!(DirectiveMode::from_keyword("ПЕРЕД"), Some(DirectiveMode::Before));
        assert_eq!(DirectiveMode::from_keyword("Around"), Some(DirectiveMode::Replace));
        assert_eq!(
            DirectiveMode::from_keyword("ИзменениеИКонтроль"),
            Some(DirectiveMode::ChangeAndValidate)
        );
        assert_eq!(DirectiveMode::from_keyword("НаСервере"), None);
    }
}
