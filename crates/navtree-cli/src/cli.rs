use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::OutputFormat;

#[derive(Parser)]
#[command(
    name = "navdiff",
    about = "Diff, validate and inspect navigation trees",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format; overrides the config file
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Config file (defaults to ./navdiff.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the actions that turn one tree into another
    Diff(DiffArgs),
    /// Check tree files against the structural invariants
    Validate(ValidateArgs),
    /// Print a tree outline and its active path
    Show(ShowArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    /// Last state as a JSON tree file, or `-` for an empty tree
    pub last: String,
    /// Current state as a JSON tree file, or `-` for an empty tree
    pub current: String,
    /// Also print a line diff of the two tree outlines
    #[arg(long)]
    pub outline: bool,
    /// Replay the actions on a view model of the last state and check the result
    #[arg(long)]
    pub verify: bool,
    /// Skip actions the view model cannot apply instead of failing
    #[arg(long, requires = "verify")]
    pub lenient: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub file: PathBuf,
}
