//! Applying one extension directive to one base subprogram.
//!
//! | mode    | procedure                         | function         |
//! |---------|-----------------------------------|------------------|
//! | Before  | region inserted at body head      | structural error |
//! | After   | region appended to body           | structural error |
//! | Replace | body replaced, or call-through    | same             |
//! | ChangeAndValidate | structural error        | structural error |
//!
//! Call-through happens when the extension body contains a continue-call
//! marker: the base subprogram moves to an alias and the extension
//! subprogram takes over its public name.

use cfx_model::{DirectiveMode, Element, ExtensionDirective, Subprogram, SubprogramKind, TextBlock};
use serde::Serialize;

use crate::error::MergeError;

/// Literal tokens that call the replaced implementation from extension code.
pub const CONTINUE_CALL_MARKERS: [&str; 2] = ["ПродолжитьВызов(", "ProceedWithCall("];

const IMPORT_TAG: &str = "ИмпортИзРасширения";

const FUNCTION_RULE: &str = "functions support only the Replace directive";
const CHANGE_AND_VALIDATE_RULE: &str = "inline change-and-validate patches are not supported";

/// Name of a region spliced into subprogram `anchor`.
pub fn region_name(anchor: &str, extension: &str) -> String {
    format!("{anchor}_{IMPORT_TAG}_{extension}")
}

/// Name of the region carrying an extension module's main text.
pub fn module_region_name(extension: &str) -> String {
    format!("{IMPORT_TAG}_{extension}")
}

/// Name of the region carrying an extension module's variable declarations.
pub fn variables_region_name(extension: &str) -> String {
    format!("Переменные_{IMPORT_TAG}_{extension}")
}

/// What a directive did to its target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SpliceOutcome {
    InsertedBefore,
    InsertedAfter,
    Replaced,
    /// The base subprogram now lives under `alias`.
    CalledThrough { alias: String },
}

/// Applies directives on behalf of one extension.
#[derive(Clone, Debug)]
pub struct Splicer<'a> {
    extension: &'a str,
    alias_prefix: &'a str,
}

impl<'a> Splicer<'a> {
    pub fn new(extension: &'a str, alias_prefix: &'a str) -> Self {
        Self {
            extension,
            alias_prefix,
        }
    }

    /// Applies `directive`, already taken from `source`, to `receiver`.
    ///
    /// Ranges inside both subprograms are stale afterwards; the owning
    /// modules must be renumbered.
    pub fn apply(
        &self,
        directive: &ExtensionDirective,
        receiver: &mut Subprogram,
        source: &mut Subprogram,
    ) -> Result<SpliceOutcome, MergeError> {
        match directive.mode {
            DirectiveMode::ChangeAndValidate => {
                Err(unsupported(directive.mode, source, CHANGE_AND_VALIDATE_RULE))
            }
            DirectiveMode::Before | DirectiveMode::After
                if source.kind == SubprogramKind::Function =>
            {
                Err(unsupported(directive.mode, source, FUNCTION_RULE))
            }
            DirectiveMode::Before => {
                let region = self.call_region(receiver, source);
                receiver.elements.insert(0, region);
                Ok(SpliceOutcome::InsertedBefore)
            }
            DirectiveMode::After => {
                let region = self.call_region(receiver, source);
                receiver.elements.push(region);
                Ok(SpliceOutcome::InsertedAfter)
            }
            DirectiveMode::Replace if has_continue_call(source) => {
                Ok(self.call_through(receiver, source))
            }
            DirectiveMode::Replace => {
                let region = self.call_region(receiver, source);
                receiver.clear_elements();
                receiver.elements.push(region);
                Ok(SpliceOutcome::Replaced)
            }
        }
    }

    fn call_region(&self, receiver: &Subprogram, source: &Subprogram) -> Element {
        Element::Text(TextBlock::region(
            &region_name(&receiver.name, self.extension),
            &source.call_text(),
            1,
        ))
    }

    fn call_through(&self, receiver: &mut Subprogram, source: &mut Subprogram) -> SpliceOutcome {
        let original = receiver.name.clone();
        let alias = format!("{}{}", self.alias_prefix, original);
        receiver.rename(alias.clone());
        source.rename(original);

        let invocation = format!("{alias}(");
        for marker in CONTINUE_CALL_MARKERS {
            source.replace_in_body(marker, &invocation);
        }
        if receiver.export {
            source.export = true;
        }
        SpliceOutcome::CalledThrough { alias }
    }
}

fn unsupported(mode: DirectiveMode, source: &Subprogram, rule: &'static str) -> MergeError {
    MergeError::UnsupportedDirective {
        subprogram: source.name.clone(),
        mode,
        rule,
    }
}

fn has_continue_call(source: &Subprogram) -> bool {
    CONTINUE_CALL_MARKERS
        .iter()
        .any(|marker| source.body_contains(marker))
}
