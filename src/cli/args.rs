//! CLI argument definitions using clap derive

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    baseline::BaselineCommands, init::InitArgs, resolve::ResolveArgs, rollup::RollupArgs,
};
use crate::entities::effectivity::ItemUnit;

#[derive(Parser)]
#[command(name = "tps")]
#[command(author, version, about = "Tessera Product Structure")]
#[command(long_about = "Resolves configured product structures (bills of materials) from versioned parts stored as plain YAML files.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .tps/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new TPS project
    Init(InitArgs),

    /// Resolve the configured structure below a part
    Resolve(ResolveArgs),

    /// Total quantity of every part below a part
    Rollup(RollupArgs),

    /// Baseline management (frozen resolutions)
    #[command(subcommand)]
    Baseline(BaselineCommands),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Use the configured default (tree if none)
    #[default]
    Auto,
    /// Indented tree (for humans)
    Tree,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
    /// Tab-separated values (for piping)
    Tsv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyKind {
    /// Latest iteration of the latest revision, as the principal sees it
    Wip,
    /// Revisions in effect for a date, serial number or lot
    Effectivity,
    /// Choices frozen in a baseline
    Baseline,
}

impl std::str::FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

/// How a traversal is configured; shared by every command that resolves
#[derive(clap::Args, Clone, Debug, Default)]
pub struct TraversalArgs {
    /// Configuration policy (default: from config, else wip)
    #[arg(long, short = 'p')]
    pub policy: Option<PolicyKind>,

    /// Maximum depth to expand; the root is at depth 1
    #[arg(long, short = 'd')]
    pub depth: Option<usize>,

    /// Effectivity date (default: today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Effectivity serial number, as CONFIGURATION_ITEM:SERIAL
    #[arg(long)]
    pub serial: Option<ItemUnit>,

    /// Effectivity lot, as CONFIGURATION_ITEM:LOT
    #[arg(long)]
    pub lot: Option<ItemUnit>,

    /// Product configuration file or name under configurations/
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    /// Baseline name or ID (baseline policy)
    #[arg(long, short = 'b')]
    pub baseline: Option<String>,

    /// Principal for the wip policy (default: from config, else $USER)
    #[arg(long)]
    pub principal: Option<String>,
}
