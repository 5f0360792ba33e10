use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cfx",
    about = "cfx: merge configuration extensions into a base configuration export",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge one extension export into a base export
    Merge(MergeArgs),
    /// Merge every extension found under the configured directory
    Batch(BatchArgs),
    /// List the objects and extension directives of an export
    Inspect(InspectArgs),
    /// Empty a work directory, keeping .gitkeep files
    Clean(CleanArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// Base configuration export directory
    #[arg(long)]
    pub base: PathBuf,
    /// Extension export directory
    #[arg(long)]
    pub extension: PathBuf,
    /// Output directory for artifacts and the working copy
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
    /// Extension name; defaults to the extension directory name
    #[arg(long)]
    pub name: Option<String>,
    /// Merge into the base export itself instead of a clone
    #[arg(long)]
    pub in_place: bool,
    /// Settings file supplying platform versions and the alias prefix
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct BatchArgs {
    #[arg(short, long, default_value = "cfx.toml")]
    pub config: PathBuf,
}

#[derive(Args)]
pub struct InspectArgs {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct CleanArgs {
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_merge() {
        let cli = Cli::try_parse_from([
            "cfx", "merge", "--base", "base", "--extension", "ext/Fixes", "--out", "out",
        ])
        .unwrap();
        if let Command::Merge(args) = cli.command {
            assert_eq!(args.base, PathBuf::from("base"));
            assert_eq!(args.extension, PathBuf::from("ext/Fixes"));
            assert_eq!(args.out, PathBuf::from("out"));
            assert!(args.name.is_none());
            assert!(!args.in_place);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_merge_in_place_with_name() {
        let cli = Cli::try_parse_from([
            "cfx", "merge", "--base", "b", "--extension", "e", "--name", "Fixes", "--in-place",
        ])
        .unwrap();
        if let Command::Merge(args) = cli.command {
            assert_eq!(args.name.as_deref(), Some("Fixes"));
            assert!(args.in_place);
            assert_eq!(args.out, PathBuf::from("."));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn merge_requires_base_and_extension() {
        assert!(Cli::try_parse_from(["cfx", "merge", "--base", "b"]).is_err());
    }

    #[test]
    fn parse_batch_default_config() {
        let cli = Cli::try_parse_from(["cfx", "batch"]).unwrap();
        if let Command::Batch(args) = cli.command {
            assert_eq!(args.config, PathBuf::from("cfx.toml"));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_inspect_and_clean() {
        let cli = Cli::try_parse_from(["cfx", "inspect", "base"]).unwrap();
        assert!(matches!(cli.command, Command::Inspect(_)));
        let cli = Cli::try_parse_from(["cfx", "clean", "work"]).unwrap();
        assert!(matches!(cli.command, Command::Clean(_)));
    }

    #[test]
    fn parse_verbose_and_json() {
        let cli = Cli::try_parse_from(["cfx", "--verbose", "--format", "json", "inspect", "x"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
