//! `tps baseline` command - Baselines (frozen resolutions)

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::args::{OutputFormat, TraversalArgs};
use crate::cli::helpers::{
    format_short_id, open_project, output_format, run_traversal, truncate_str,
};
use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::loader;
use crate::entities::baseline::Baseline;
use crate::structure::StructureDiagnostic;

#[derive(Subcommand, Debug)]
pub enum BaselineCommands {
    /// Resolve a structure and freeze the choices made
    Create(CreateArgs),

    /// List all baselines
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Baseline name
    pub name: String,

    /// Root part (NUMBER or WORKSPACE/NUMBER)
    pub part: String,

    #[command(flatten)]
    pub traversal: TraversalArgs,

    /// Description stored with the baseline
    #[arg(long, short = 'm')]
    pub message: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only baselines of this root part
    #[arg(long)]
    pub root: Option<String>,
}

pub fn run(cmd: BaselineCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        BaselineCommands::Create(args) => run_create(args, global),
        BaselineCommands::List(args) => run_list(args, global),
    }
}

fn run_create(args: CreateArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let existing: Vec<Baseline> = loader::load_all(&project.baselines_dir())?;
    if existing.iter().any(|b| b.name == args.name) {
        return Err(miette::miette!("baseline '{}' already exists", args.name));
    }

    let traversal = run_traversal(global, &args.part, &args.traversal)?;
    let author = args
        .traversal
        .principal
        .clone()
        .unwrap_or_else(|| traversal.config.principal());

    let ambiguous = traversal
        .collector
        .diagnostics
        .iter()
        .filter(|d| matches!(d, StructureDiagnostic::IndeterminateVersion { .. }))
        .count();
    if ambiguous > 0 && !global.quiet {
        eprintln!(
            "{} {} part(s) had several visible iterations; all of them are frozen",
            style("!").yellow(),
            ambiguous
        );
    }

    let mut baseline = Baseline::from_audit(
        args.name,
        traversal.root.clone(),
        traversal.policy,
        author,
        traversal.resolution.audit,
    );
    baseline.description = args.message;

    let path = traversal.project.baseline_path(&baseline.id);
    loader::save_entity(&path, &baseline)?;
    tracing::info!(baseline = %baseline.id, path = %path.display(), "baseline saved");

    match output_format(global, &traversal.config) {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&baseline).into_diagnostic()?),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&baseline).into_diagnostic()?),
        OutputFormat::Tsv => println!("{}", baseline.id),
        OutputFormat::Auto | OutputFormat::Tree => {
            println!(
                "{} Created baseline {} ({})",
                style("✓").green(),
                style(&baseline.name).cyan(),
                baseline.id
            );
            if !global.quiet {
                println!(
                    "   {} iteration(s), {} optional link(s), {} substitute link(s) from {} policy",
                    baseline.iterations.len(),
                    baseline.optional_links.len(),
                    baseline.substitute_links.len(),
                    baseline.source_policy
                );
            }
        }
    }

    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load_with_project(Some(&project));
    let mut baselines: Vec<Baseline> = loader::load_all(&project.baselines_dir())?;

    if let Some(root) = &args.root {
        let root = crate::cli::helpers::parse_part(root, &config)?;
        baselines.retain(|b| b.root == root);
    }
    baselines.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.name.cmp(&b.name)));

    match output_format(global, &config) {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&baselines).into_diagnostic()?),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&baselines).into_diagnostic()?),
        OutputFormat::Tsv => {
            println!("ID\tNAME\tROOT\tPOLICY\tITERATIONS\tCREATED");
            for b in &baselines {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    b.id,
                    b.name,
                    b.root,
                    b.source_policy,
                    b.iterations.len(),
                    b.created.format("%Y-%m-%d")
                );
            }
        }
        OutputFormat::Auto | OutputFormat::Tree => {
            if baselines.is_empty() {
                println!("{}", style("No baselines found.").dim());
                return Ok(());
            }
            let mut builder = Builder::default();
            builder.push_record(["ID", "Name", "Root", "Policy", "Iterations", "Created"]);
            for b in &baselines {
                builder.push_record([
                    format_short_id(&b.id),
                    truncate_str(&b.name, 24),
                    b.root.to_string(),
                    b.source_policy.clone(),
                    b.iterations.len().to_string(),
                    b.created.format("%Y-%m-%d").to_string(),
                ]);
            }
            println!("{}", builder.build().with(Style::rounded()));
            if !global.quiet {
                println!("\n{} baseline(s) found", baselines.len());
            }
        }
    }

    Ok(())
}
