//! Shared helper functions for CLI commands
//!
//! Project discovery, policy construction and the traversal run shared by
//! `resolve`, `rollup` and `baseline create`.

use chrono::Local;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};

use crate::cli::args::{OutputFormat, PolicyKind, TraversalArgs};
use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::identity::{EntityId, PartKey};
use crate::core::loader;
use crate::core::project::Project;
use crate::core::repository::InMemoryRepository;
use crate::core::team::TeamRoster;
use crate::entities::baseline::Baseline;
use crate::entities::configuration::ProductConfiguration;
use crate::entities::effectivity::EffectivityContext;
use crate::structure::{
    AllowAll, BaselinePolicy, ConfigurationPolicy, DiagnosticsCollector, EffectivityPolicy,
    Resolution, TraversalEngine, WorkInProgressPolicy,
};

/// Format an EntityId for display, truncating if too long
///
/// IDs longer than 16 characters are truncated to 13 chars with "..." suffix.
pub fn format_short_id(id: &EntityId) -> String {
    truncate_str(&id.to_string(), 16)
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a quantity without trailing zeros (4.0 -> "4", 0.25 -> "0.25")
pub fn format_quantity(quantity: f64, unit: Option<&str>) -> String {
    let number = if quantity.fract() == 0.0 && quantity.abs() < 1e15 {
        format!("{}", quantity as i64)
    } else {
        let s = format!("{:.6}", quantity);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    };
    match unit {
        Some(unit) => format!("{} {}", number, unit),
        None => number,
    }
}

/// Open the project named by `--project`, or discover it from the cwd
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    };
    project.map_err(|e| miette::miette!("{}", e))
}

/// Resolve `--format auto` against the configured default
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    config
        .default_format
        .as_deref()
        .and_then(|f| f.parse::<OutputFormat>().ok())
        .filter(|f| *f != OutputFormat::Auto)
        .unwrap_or(OutputFormat::Tree)
}

/// Parse a part argument, qualifying bare numbers with the default workspace
pub fn parse_part(input: &str, config: &Config) -> Result<PartKey> {
    PartKey::parse_in(input, &config.workspace()).map_err(|e| miette::miette!("{}", e))
}

fn policy_kind(args: &TraversalArgs, config: &Config) -> Result<PolicyKind> {
    if let Some(kind) = args.policy {
        return Ok(kind);
    }
    match config.default_policy.as_deref() {
        Some(name) => name
            .parse()
            .map_err(|e| miette::miette!("invalid default_policy '{}': {}", name, e)),
        None => Ok(PolicyKind::Wip),
    }
}

/// Find a baseline by exact name, or by full or partial ID
pub fn find_baseline(project: &Project, name_or_id: &str) -> Result<Baseline> {
    loader::find_entity::<Baseline>(&project.baselines_dir(), name_or_id)?
        .ok_or_else(|| miette::miette!("baseline not found: {}", name_or_id))
}

fn load_configuration(project: &Project, name_or_path: &str) -> Result<ProductConfiguration> {
    let direct = PathBuf::from(name_or_path);
    let path = if direct.exists() {
        direct
    } else {
        project
            .configurations_dir()
            .join(format!("{}.tps.yaml", name_or_path))
    };
    if !path.exists() {
        return Err(miette::miette!(
            "product configuration not found: {}",
            name_or_path
        ));
    }
    loader::load_file(&path)
}

fn effectivity_context(args: &TraversalArgs) -> EffectivityContext {
    let mut context = EffectivityContext {
        date: args.date,
        serial: args.serial.clone(),
        lot: args.lot.clone(),
    };
    if context.date.is_none() && context.serial.is_none() && context.lot.is_none() {
        context.date = Some(Local::now().date_naive());
    }
    context
}

/// Build the policy selected by the arguments and configuration
pub fn build_policy(
    args: &TraversalArgs,
    project: &Project,
    config: &Config,
) -> Result<Box<dyn ConfigurationPolicy>> {
    let policy: Box<dyn ConfigurationPolicy> = match policy_kind(args, config)? {
        PolicyKind::Wip => {
            let principal = args.principal.clone().unwrap_or_else(|| config.principal());
            match TeamRoster::load(project)? {
                Some(roster) => Box::new(WorkInProgressPolicy::new(principal, roster)),
                None => Box::new(WorkInProgressPolicy::new(principal, AllowAll)),
            }
        }
        PolicyKind::Effectivity => {
            let mut policy = EffectivityPolicy::new(effectivity_context(args));
            if let Some(name) = &args.config {
                policy = policy.with_configuration(load_configuration(project, name)?);
            }
            Box::new(policy)
        }
        PolicyKind::Baseline => {
            let name = args
                .baseline
                .as_deref()
                .ok_or_else(|| miette::miette!("the baseline policy needs --baseline NAME"))?;
            Box::new(BaselinePolicy::new(find_baseline(project, name)?))
        }
    };
    Ok(policy)
}

/// Everything produced by one CLI traversal
pub struct Traversal {
    pub project: Project,
    pub config: Config,
    pub root: PartKey,
    pub policy: &'static str,
    pub resolution: Resolution,
    pub collector: DiagnosticsCollector,
}

/// Load the project's parts and resolve the structure below `part`
pub fn run_traversal(global: &GlobalOpts, part: &str, args: &TraversalArgs) -> Result<Traversal> {
    let project = open_project(global)?;
    let config = Config::load_with_project(Some(&project));
    let root = parse_part(part, &config)?;
    let policy = build_policy(args, &project, &config)?;
    let stop_depth = args.depth.or(config.stop_depth);

    let repository = InMemoryRepository::load_project(&project)?;
    let engine = TraversalEngine::new(&repository);
    let mut collector = DiagnosticsCollector::new();
    let resolution = engine
        .visit(&root, policy.as_ref(), stop_depth, &mut collector)
        .map_err(miette::Report::new)?;

    Ok(Traversal {
        project,
        config,
        root,
        policy: policy.name(),
        resolution,
        collector,
    })
}

/// Write `content` to stdout or to a file
pub fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content).into_diagnostic(),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}
