//! Line-oriented BSL module parser.
//!
//! Splits module source into top-level text blocks and subprogram
//! definitions. Subprogram bodies are kept as a single raw text block; only
//! the structure needed for merging is recognised: headers, closing
//! keywords, annotations (including extension directives) and module-level
//! variable declarations.

use std::sync::LazyLock;

use regex::Regex;

use crate::element::{Element, TextBlock};
use crate::error::{ModelError, ModelResult};
use crate::range::TextRange;
use crate::subprogram::{Dialect, DirectiveMode, ExtensionDirective, Subprogram, SubprogramKind};

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\s*)((?:асинх|async)\s+)?(процедура|функция|procedure|function)\s+([\w]+)\s*\((.*)$")
        .expect("valid header pattern")
});

static PROCEDURE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(конецпроцедуры|endprocedure)\b").expect("valid footer pattern")
});

static FUNCTION_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(конецфункции|endfunction)\b").expect("valid footer pattern")
});

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*&\s*([\w]+)\s*\(\s*"([^"]*)"\s*\)"#).expect("valid directive pattern")
});

static VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(перем|var)\s").expect("valid variable pattern"));

static EXPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(экспорт|export)\b").expect("valid export pattern"));

/// Parses module source lines into elements.
pub(crate) fn parse_elements(lines: &[&str]) -> ModelResult<Vec<Element>> {
    let mut elements = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some(caps) = HEADER.captures(lines[i]) else {
            pending.push(lines[i].to_string());
            i += 1;
            continue;
        };

        let annotation_start = pending
            .iter()
            .rposition(|l| !is_annotation(l))
            .map_or(0, |p| p + 1);
        let annotation_lines = pending.split_off(annotation_start);
        flush_text(&mut pending, &mut elements);

        let header_line = i + 1;
        let indent = caps[1].to_string();
        let modifier = caps.get(2).map_or_else(String::new, |m| m.as_str().to_string());
        let keyword = caps[3].to_string();
        let name = caps[4].to_string();
        let kind = match keyword.to_lowercase().as_str() {
            "функция" | "function" => SubprogramKind::Function,
            _ => SubprogramKind::Procedure,
        };

        let (params, after_params, next) = read_params(lines, i, &caps[5]).ok_or_else(|| {
            ModelError::UnterminatedSubprogram {
                name: name.clone(),
                line: header_line,
            }
        })?;
        let (export, trailing) = match EXPORT.find(&after_params) {
            Some(m) => (true, after_params[m.end()..].to_string()),
            None => (false, after_params),
        };

        let footer_pattern = match kind {
            SubprogramKind::Procedure => &*PROCEDURE_END,
            SubprogramKind::Function => &*FUNCTION_END,
        };
        let footer_index = (next..lines.len())
            .find(|&j| footer_pattern.is_match(lines[j]))
            .ok_or_else(|| ModelError::UnterminatedSubprogram {
                name: name.clone(),
                line: header_line,
            })?;

        let mut body = Vec::new();
        if footer_index > next {
            let block: Vec<String> = lines[next..footer_index].iter().map(|l| l.to_string()).collect();
            body.push(Element::Text(TextBlock::new(block)));
        }

        let mut annotations = Vec::new();
        let mut directive = None;
        for line in annotation_lines {
            match parse_directive(&line) {
                Some((mode, target)) if directive.is_none() => {
                    directive = Some(ExtensionDirective {
                        mode,
                        target,
                        source_line: line,
                    });
                }
                _ => annotations.push(line),
            }
        }

        elements.push(Element::Subprogram(Subprogram {
            kind,
            dialect: Dialect::of(&keyword),
            name,
            params,
            export,
            indent,
            modifier,
            keyword,
            trailing,
            annotations,
            directive,
            elements: body,
            footer: lines[footer_index].to_string(),
            range: TextRange::default(),
        }));
        i = footer_index + 1;
    }

    flush_text(&mut pending, &mut elements);
    Ok(elements)
}

/// Reads the parameter list starting after the opening parenthesis on line
/// `start`. Returns the raw parameters, the header remainder after the
/// closing parenthesis, and the index of the first body line.
fn read_params(lines: &[&str], start: usize, first: &str) -> Option<(String, String, usize)> {
    let mut params = String::new();
    let mut in_string = false;
    let mut depth = 0usize;
    let mut current = first;
    let mut index = start;

    loop {
        for (pos, c) in current.char_indices() {
            match c {
                '"' => in_string = !in_string,
                '(' if !in_string => depth += 1,
                ')' if !in_string && depth > 0 => depth -= 1,
                ')' if !in_string => {
                    params.push_str(&current[..pos]);
                    return Some((params, current[pos + 1..].to_string(), index + 1));
                }
                _ => {}
            }
        }
        params.push_str(current);
        params.push('\n');
        index += 1;
        current = *lines.get(index)?;
        // String literals do not continue across a line break without `|`.
        in_string = false;
    }
}

fn parse_directive(line: &str) -> Option<(DirectiveMode, String)> {
    let caps = DIRECTIVE.captures(line)?;
    let mode = DirectiveMode::from_keyword(&caps[1])?;
    Some((mode, caps[2].to_string()))
}

fn is_annotation(line: &str) -> bool {
    line.trim_start().starts_with('&')
}

/// Moves pending top-level lines into text blocks, separating variable
/// declarations (with the annotations directly above them) from other text.
fn flush_text(pending: &mut Vec<String>, elements: &mut Vec<Element>) {
    if pending.is_empty() {
        return;
    }
    let lines = std::mem::take(pending);
    let mut marks = vec![false; lines.len()];

    let mut i = 0;
    while i < lines.len() {
        if VARIABLE.is_match(&lines[i]) {
            let mut first = i;
            while first > 0 && is_annotation(&lines[first - 1]) && !marks[first - 1] {
                first -= 1;
            }
            let mut last = i;
            while !statement_closed(&lines[last]) && last + 1 < lines.len() {
                last += 1;
            }
            for mark in &mut marks[first..=last] {
                *mark = true;
            }
            i = last + 1;
        } else {
            i += 1;
        }
    }

    let mut run: Vec<String> = Vec::new();
    let mut run_is_declaration = false;
    for (line, is_declaration) in lines.into_iter().zip(marks) {
        if !run.is_empty() && is_declaration != run_is_declaration {
            elements.push(Element::Text(block(std::mem::take(&mut run), run_is_declaration)));
        }
        run_is_declaration = is_declaration;
        run.push(line);
    }
    if !run.is_empty() {
        elements.push(Element::Text(block(run, run_is_declaration)));
    }
}

fn block(lines: Vec<String>, declaration: bool) -> TextBlock {
    if declaration {
        TextBlock::declaration(lines)
    } else {
        TextBlock::new(lines)
    }
}

fn statement_closed(line: &str) -> bool {
    let code = line.split("//").next().unwrap_or_default();
    code.contains(';')
}
