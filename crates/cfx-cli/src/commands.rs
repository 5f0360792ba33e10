use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use cfx_merge::{EngineError, MergeSummary, Merger, TracingDiagnostics};
use cfx_model::{Configuration, ROOT_DESCRIPTOR};
use colored::Colorize;
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::*;
use crate::config::CfxConfig;
use crate::workspace::{clear_dir, clone_tree};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Merge(args) => cmd_merge(args, cli.format),
        Command::Batch(args) => cmd_batch(args, cli.format),
        Command::Inspect(args) => cmd_inspect(args, cli.format),
        Command::Clean(args) => cmd_clean(args),
    }
}

/// One extension to merge and where its results go.
struct MergeJob<'a> {
    base: &'a Path,
    extension: &'a Path,
    name: String,
    out: &'a Path,
    in_place: bool,
}

fn run_merge(job: &MergeJob<'_>, config: &CfxConfig) -> anyhow::Result<MergeSummary> {
    let base = if job.in_place {
        job.base.to_path_buf()
    } else {
        let copy = job.out.join(&job.name).join("base");
        let files = clone_tree(job.base, &copy)?;
        info!(extension = %job.name, files, copy = %copy.display(), "base cloned");
        copy
    };
    let options = config.merge_options(Some(job.name.clone()), job.out);
    let summary = Merger::new(base, job.extension, options, &TracingDiagnostics).merge()?;
    Ok(summary)
}

fn directory_name(path: &Path) -> anyhow::Result<String> {
    let canonical = fs::canonicalize(path)
        .with_context(|| format!("failed to resolve {}", path.display()))?;
    match canonical.file_name() {
        Some(name) => Ok(name.to_string_lossy().into_owned()),
        None => bail!("cannot derive an extension name from {}", path.display()),
    }
}

fn cmd_merge(args: MergeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => CfxConfig::load(path)?,
        None => CfxConfig::default(),
    };
    let name = match args.name {
        Some(name) => name,
        None => directory_name(&args.extension)?,
    };
    let job = MergeJob {
        base: &args.base,
        extension: &args.extension,
        name,
        out: &args.out,
        in_place: args.in_place,
    };
    let summary = run_merge(&job, &config)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print_summary(&summary),
    }
    Ok(())
}

fn print_summary(summary: &MergeSummary) {
    println!("{} Merged extension {}", "✓".green().bold(), summary.extension.yellow().bold());
    for name in &summary.merged {
        println!("  {} {}", "merged:".green(), name);
    }
    for name in &summary.imported {
        println!("  {} {}", "new:".cyan(), name);
    }
    println!("  Changed files: {}", summary.changed_files.len().to_string().bold());
    println!("  Settings: {}", summary.artifacts.merge_settings.display());
    println!("  Objects: {}", summary.artifacts.object_list.display());
    println!("  File list: {}", summary.artifacts.changed_files.display());
}

#[derive(Debug, Default, Serialize)]
struct BatchReport {
    merged: Vec<MergeSummary>,
    failed: Vec<BatchFailure>,
}

#[derive(Debug, Serialize)]
struct BatchFailure {
    extension: String,
    error: String,
}

/// Sub-directories of `dir` holding an export, sorted by name.
fn discover_extensions(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() && path.join(ROOT_DESCRIPTOR).is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

fn run_batch(config: &CfxConfig) -> anyhow::Result<BatchReport> {
    let mut report = BatchReport::default();
    for extension in discover_extensions(&config.paths.extension_dir)? {
        let name = directory_name(&extension)?;
        let job = MergeJob {
            base: &config.paths.base,
            extension: &extension,
            name: name.clone(),
            out: &config.paths.work_dir,
            in_place: config.merge.in_place,
        };
        match run_merge(&job, config) {
            Ok(summary) => report.merged.push(summary),
            Err(err) if err.downcast_ref::<EngineError>().is_some_and(EngineError::is_recoverable) => {
                warn!(extension = %name, error = %err, "extension skipped");
                report.failed.push(BatchFailure {
                    extension: name,
                    error: err.to_string(),
                });
            }
            Err(err) => return Err(err.context(format!("merging extension {name}"))),
        }
    }
    Ok(report)
}

fn cmd_batch(args: BatchArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = CfxConfig::load(&args.config)?;
    let report = run_batch(&config)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            for summary in &report.merged {
                print_summary(summary);
            }
            for failure in &report.failed {
                println!("{} {}: {}", "✗".red().bold(), failure.extension.yellow(), failure.error);
            }
            println!(
                "\n{} merged, {} failed",
                report.merged.len().to_string().green().bold(),
                report.failed.len().to_string().red().bold()
            );
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ObjectReport {
    full_name: String,
    modules: Vec<ModuleReport>,
}

#[derive(Debug, Serialize)]
struct ModuleReport {
    name: String,
    path: PathBuf,
    subprograms: usize,
    directives: Vec<DirectiveReport>,
}

#[derive(Debug, Serialize)]
struct DirectiveReport {
    subprogram: String,
    mode: String,
    target: String,
}

fn inspect(root: &Path) -> anyhow::Result<(String, Vec<ObjectReport>)> {
    let mut configuration = Configuration::read(root)?;
    let mut objects = Vec::new();
    for index in 0..configuration.objects().len() {
        let Some(object) = configuration.object_mut(index) else {
            continue;
        };
        object.load_modules()?;
        let modules = object
            .all_modules()
            .into_iter()
            .map(|module| ModuleReport {
                name: module.name.clone(),
                path: module.file_path.clone(),
                subprograms: module.subprograms().count(),
                directives: module
                    .subprograms()
                    .filter_map(|sub| {
                        sub.directive.as_ref().map(|d| DirectiveReport {
                            subprogram: sub.name.clone(),
                            mode: d.mode.to_string(),
                            target: d.target.clone(),
                        })
                    })
                    .collect(),
            })
            .collect();
        objects.push(ObjectReport {
            full_name: object.full_name(),
            modules,
        });
    }
    Ok((configuration.name, objects))
}

fn cmd_inspect(args: InspectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (name, objects) = inspect(&args.path)?;
    match format {
        OutputFormat::Json => {
            let doc = serde_json::json!({ "configuration": name, "objects": objects });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Text => {
            println!("Configuration {} ({} objects)", name.yellow().bold(), objects.len());
            for object in &objects {
                println!("  {}", object.full_name.bold());
                for module in &object.modules {
                    println!("    {} ({} subprograms)", module.name.cyan(), module.subprograms);
                    for d in &module.directives {
                        println!("      {} &{} -> {}", d.subprogram, d.mode.green(), d.target.yellow());
                    }
                }
            }
        }
    }
    Ok(())
}

fn cmd_clean(args: CleanArgs) -> anyhow::Result<()> {
    let removed = clear_dir(&args.path)?;
    println!("{} Removed {} entries from {}", "✓".green(), removed, args.path.display().to_string().bold());
    Ok(())
}
