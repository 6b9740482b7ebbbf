use std::path::PathBuf;

use clap::{value_parser, ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate conda environment files from spkg metadata",
    long_about = "Scan build/pkgs, classify each package, and write one conda environment \
                  file per flavor and Python version.",
    after_help = "Examples:\n  spkgenv generate\n  BOOTSTRAP_VERBOSE=1 spkgenv generate --dry-run\n  spkgenv list :standard: --has-file requirements.txt"
)]
pub struct SpkgenvCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)",
        global = true
    )]
    pub quiet: bool,
    #[arg(short, long, action = ArgAction::Count, help = "Increase logging (-vv reaches trace)", global = true)]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[arg(
        long,
        value_parser = value_parser!(PathBuf),
        default_value = ".",
        help = "Top of the source tree (outputs are written here)",
        global = true
    )]
    pub sage_root: PathBuf,
    #[arg(
        long,
        value_parser = value_parser!(PathBuf),
        help = "Package metadata directory (defaults to <sage-root>/build/pkgs)",
        global = true
    )]
    pub pkgs: Option<PathBuf>,
    #[command(subcommand)]
    pub command: CommandGroupCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandGroupCli {
    #[command(
        about = "Write environment files for every flavor and Python version.",
        override_usage = "spkgenv generate [--python VERSION]... [--translator PROGRAM] [--dry-run]",
        after_help = "Examples:\n  spkgenv generate\n  spkgenv generate --python 3.12 --dry-run\n"
    )]
    Generate(GenerateArgs),
    #[command(
        about = "List package identifiers matching type and file filters.",
        override_usage = "spkgenv list [:TYPE:]... [--has-file PATH]... [--no-file PATH]... [--exclude NAME]...",
        after_help = "Examples:\n  spkgenv list --has-file distros/conda.txt --exclude _sagemath\n  spkgenv list :standard: :optional: --has-file requirements.txt --no-file distros/conda.txt\n"
    )]
    List(ListArgs),
    #[command(
        about = "Show which environment group each package lands in.",
        after_help = "Example:\n  spkgenv classify\n"
    )]
    Classify(ClassifyArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[arg(
        long,
        default_value = "conda",
        help = "Distribution whose package names are used"
    )]
    pub ecosystem: String,
    #[arg(
        long = "python",
        value_name = "VERSION",
        action = ArgAction::Append,
        help = "Python version to pin (repeatable; defaults to 3.9, 3.10, 3.11)"
    )]
    pub python: Vec<String>,
    #[arg(
        long,
        value_name = "PROGRAM",
        help = "External name translator, run as PROGRAM <ecosystem> <pkg>..."
    )]
    pub translator: Option<String>,
    #[arg(long, help = "Compute the output plan without writing files")]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(value_name = ":TYPE:", help = "Type filters such as :standard: or :optional:")]
    pub types: Vec<String>,
    #[arg(long = "has-file", value_name = "PATH", action = ArgAction::Append)]
    pub has_file: Vec<PathBuf>,
    #[arg(long = "no-file", value_name = "PATH", action = ArgAction::Append)]
    pub no_file: Vec<PathBuf>,
    #[arg(long, value_name = "NAME", action = ArgAction::Append)]
    pub exclude: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    #[arg(long, default_value = "conda")]
    pub ecosystem: String,
}
