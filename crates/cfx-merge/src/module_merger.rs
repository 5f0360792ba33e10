//! Merging the modules of one matched object pair.

use std::path::{Path, PathBuf};

use cfx_model::{form_of_module, ConfObject, Element, Module, TextBlock, EXT_DIR, FORMS_DIR};

use crate::diagnostics::{Diagnostics, MergeEvent};
use crate::error::{EngineResult, MergeError};
use crate::importer::{copy_file, copy_tree};
use crate::record::MergeRecord;
use crate::splicer::{module_region_name, variables_region_name, Splicer};

/// Pairs modules by identity and splices or copies them into the base.
pub struct ModuleMerger<'a> {
    extension: &'a str,
    splicer: Splicer<'a>,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> ModuleMerger<'a> {
    pub fn new(extension: &'a str, alias_prefix: &'a str, diagnostics: &'a dyn Diagnostics) -> Self {
        Self {
            extension,
            splicer: Splicer::new(extension, alias_prefix),
            diagnostics,
        }
    }

    /// Merges every module of `source` into `base`. Matched modules are
    /// spliced and saved; unmatched ones are copied as files, together with
    /// their form when the base object does not have it.
    pub fn merge_objects(
        &self,
        base: &mut ConfObject,
        source: &mut ConfObject,
        record: &mut MergeRecord,
    ) -> EngineResult<()> {
        base.load_modules()?;
        source.load_modules()?;

        let base_dir = base.directory.clone();
        let source_dir = source.directory.clone();
        let mut receivers = base.all_modules_mut();

        for module in source.all_modules_mut() {
            match receivers.iter_mut().find(|r| r.name == module.name) {
                Some(receiver) => {
                    self.merge_module(receiver, module)?;
                    receiver.save()?;
                    record.record_file(&receiver.file_path);
                    self.diagnostics.report(MergeEvent::ModuleSpliced {
                        module: receiver.name.clone(),
                        path: receiver.file_path.clone(),
                    });
                }
                None => {
                    let path = relocate(module, &source_dir, &base_dir);
                    let copied = match form_of_module(&module.name) {
                        Some(form) if !base_dir.join(FORMS_DIR).join(form).exists() => {
                            copy_form(form, &source_dir, &base_dir)?
                        }
                        _ => {
                            copy_file(&module.file_path, &path)?;
                            vec![path.clone()]
                        }
                    };
                    for file in &copied {
                        record.record_file(file);
                    }
                    self.diagnostics.report(MergeEvent::ModuleCopied {
                        module: module.name.clone(),
                        path,
                    });
                }
            }
        }
        Ok(())
    }

    /// Applies every directive of `source` to `receiver`, then carries the
    /// extension module's main text and variable declarations over as
    /// regions.
    pub fn merge_module(&self, receiver: &mut Module, source: &mut Module) -> Result<(), MergeError> {
        for index in source.directive_indices() {
            let Some(subprogram) = source.subprogram_mut(index) else {
                continue;
            };
            let Some(directive) = subprogram.take_directive() else {
                continue;
            };
            let target = receiver.find_subprogram(&directive.target).ok_or_else(|| {
                MergeError::TargetNotFound {
                    receiver_module: receiver.file_path.display().to_string(),
                    source_module: source.file_path.display().to_string(),
                    target: directive.target.clone(),
                }
            })?;
            let (Some(base_sub), Some(ext_sub)) =
                (receiver.subprogram_mut(target), source.subprogram_mut(index))
            else {
                continue;
            };
            let outcome = self.splicer.apply(&directive, base_sub, ext_sub)?;
            self.diagnostics.report(MergeEvent::DirectiveApplied {
                subprogram: ext_sub.name.clone(),
                target: directive.target.clone(),
                mode: directive.mode,
                outcome,
            });
        }
        receiver.renumber();
        source.renumber();

        let main_text = source.main_text();
        if !main_text.trim().is_empty() {
            let region = TextBlock::region(&module_region_name(self.extension), &main_text, 0)
                .with_blank_line_before();
            receiver.push_element(Element::Text(region));
        }

        let variables = source.variable_declarations_text();
        if !variables.trim().is_empty() {
            let mut region =
                TextBlock::region(&variables_region_name(self.extension), &variables, 0)
                    .with_blank_line_after();
            region.declaration = true;
            receiver.insert_element(0, Element::Text(region));
        }
        Ok(())
    }
}

/// Where an extension module lands under the base object: the same
/// relative path it has under the extension object.
fn relocate(module: &Module, source_dir: &Path, base_dir: &Path) -> PathBuf {
    let relative = match module.file_path.strip_prefix(source_dir) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => Path::new(EXT_DIR).join(module.file_path.file_name().unwrap_or_default()),
    };
    base_dir.join(relative)
}

/// Copies a whole form the base object lacks: `Forms/<form>.xml` and the
/// `Forms/<form>` directory, module included. The owning object's
/// descriptor is left as is, so the form is not listed among its children.
fn copy_form(form: &str, source_dir: &Path, base_dir: &Path) -> EngineResult<Vec<PathBuf>> {
    let from = source_dir.join(FORMS_DIR);
    let to = base_dir.join(FORMS_DIR);
    let mut copied = Vec::new();

    let descriptor = format!("{form}.xml");
    if from.join(&descriptor).is_file() {
        copy_file(&from.join(&descriptor), &to.join(&descriptor))?;
        copied.push(to.join(&descriptor));
    }
    copied.extend(copy_tree(&from.join(form), &to.join(form))?);
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingDiagnostics;

    const BASE: &str = "\
Перем Кэш;

Процедура ПриЗаписи(Отказ) Экспорт
\tЗаписать();
КонецПроцедуры
";

    fn merge(ext_source: &str) -> Result<(Module, Module, CollectingDiagnostics), MergeError> {
        let mut receiver = Module::parse("ObjectModule", "base.bsl", BASE).unwrap();
        let mut source = Module::parse("ObjectModule", "ext.bsl", ext_source).unwrap();
        let diagnostics = CollectingDiagnostics::new();
        ModuleMerger::new("Доработки", "changed_", &diagnostics)
            .merge_module(&mut receiver, &mut source)?;
        Ok((receiver, source, diagnostics))
    }

    #[test]
    fn main_text_and_variables_become_regions() {
        let (merged, _, diagnostics) = merge(
            "Перем Флаг;\n\n&Перед(\"ПриЗаписи\")\nПроцедура Расш_ПриЗаписи(Отказ)\n\tФлаг = Истина;\nКонецПроцедуры\n",
        )
        .unwrap();

        let text = merged.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "#Область Переменные_ИмпортИзРасширения_Доработки");
        assert_eq!(lines[1], "Перем Флаг;");
        assert_eq!(lines[2], "#КонецОбласти");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "Перем Кэш;");

        assert!(text.contains("\t#Область ПриЗаписи_ИмпортИзРасширения_Доработки\n\tРасш_ПриЗаписи(Отказ);\n\t#КонецОбласти\n\tЗаписать();"));
        assert!(text.contains("\n\n#Область ИмпортИзРасширения_Доработки\n"));
        assert!(text.contains("Процедура Расш_ПриЗаписи(Отказ)\n\tФлаг = Истина;"));
        assert!(!text.contains("&Перед"), "applied directives are not carried over");
        assert!(text.trim_end().ends_with("#КонецОбласти"));

        assert_eq!(diagnostics.events().len(), 1);
    }

    #[test]
    fn ranges_stay_contiguous_after_merge() {
        let (merged, _, _) = merge(
            "&После(\"ПриЗаписи\")\nПроцедура Расш_ПриЗаписи(Отказ)\nКонецПроцедуры\n",
        )
        .unwrap();

        let mut expected = 1;
        for el in &merged.elements {
            assert_eq!(el.range().start_line, expected);
            expected = el.range().end_line + 1;
        }
        assert_eq!(expected - 1, merged.line_count());
    }

    #[test]
    fn empty_extension_module_adds_nothing() {
        let (merged, _, _) = merge("\n").unwrap();
        assert_eq!(merged.render(), BASE);
    }

    #[test]
    fn missing_target_names_both_modules() {
        let err = merge("&Перед(\"НетТакой\")\nПроцедура Расш()\nКонецПроцедуры\n").unwrap_err();
        assert_eq!(
            err,
            MergeError::TargetNotFound {
                receiver_module: "base.bsl".into(),
                source_module: "ext.bsl".into(),
                target: "НетТакой".into(),
            }
        );
    }

    #[test]
    fn target_lookup_ignores_case() {
        let (merged, _, _) = merge(
            "&Перед(\"призаписи\")\nПроцедура Расш_ПриЗаписи(Отказ)\nКонецПроцедуры\n",
        )
        .unwrap();
        assert!(merged.render().contains("#Область ПриЗаписи_ИмпортИзРасширения_Доработки"));
    }
}
