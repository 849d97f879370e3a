//! `tps resolve` command - Print the configured structure below a part

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::args::{OutputFormat, TraversalArgs};
use crate::cli::helpers::{format_quantity, output_format, run_traversal, write_output};
use crate::cli::GlobalOpts;
use crate::core::identity::PartKey;
use crate::entities::link::PartLink;
use crate::structure::{Branch, Component, StructureDiagnostic};

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    /// Root part (NUMBER or WORKSPACE/NUMBER)
    pub part: String,

    #[command(flatten)]
    pub traversal: TraversalArgs,

    /// Also list every leaf with its iteration chain
    #[arg(long)]
    pub branches: bool,

    /// Fail if the resolution raised any diagnostic
    #[arg(long)]
    pub strict: bool,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Serialize)]
struct ResolveReport<'a> {
    root: &'a PartKey,
    policy: &'a str,
    structure: &'a Component,
    diagnostics: &'a [StructureDiagnostic],
    #[serde(skip_serializing_if = "Option::is_none")]
    branches: Option<&'a [Branch]>,
}

pub fn run(args: ResolveArgs, global: &GlobalOpts) -> Result<()> {
    let traversal = run_traversal(global, &args.part, &args.traversal)?;
    let format = output_format(global, &traversal.config);
    let root = &traversal.resolution.root;
    let diagnostics = &traversal.collector.diagnostics;

    let content = match format {
        OutputFormat::Yaml | OutputFormat::Json => {
            let report = ResolveReport {
                root: &traversal.root,
                policy: traversal.policy,
                structure: root,
                diagnostics,
                branches: args.branches.then_some(&traversal.collector.branches[..]),
            };
            if format == OutputFormat::Json {
                let mut json = serde_json::to_string_pretty(&report).into_diagnostic()?;
                json.push('\n');
                json
            } else {
                serde_yml::to_string(&report).into_diagnostic()?
            }
        }
        OutputFormat::Tsv => render_tsv(root),
        OutputFormat::Auto | OutputFormat::Tree => {
            let mut tree = render_tree(root);
            if args.branches {
                tree.push('\n');
                for branch in &traversal.collector.branches {
                    let chain: Vec<String> = branch.iterations.iter().map(ToString::to_string).collect();
                    tree.push_str(&format!("{}\n", chain.join(" > ")));
                }
            }
            tree
        }
    };
    write_output(&content, args.output.as_deref())?;

    if matches!(format, OutputFormat::Auto | OutputFormat::Tree | OutputFormat::Tsv)
        && !global.quiet
        && !diagnostics.is_empty()
    {
        eprintln!();
        eprintln!(
            "{} {} diagnostic(s):",
            style("!").yellow(),
            diagnostics.len()
        );
        for diagnostic in diagnostics {
            eprintln!("  {}", diagnostic);
        }
    }

    if args.strict && !diagnostics.is_empty() {
        return Err(miette::miette!(
            "{} resolved with {} diagnostic(s)",
            traversal.root,
            diagnostics.len()
        ));
    }

    Ok(())
}

fn node_label(component: &Component) -> String {
    let mut label = format!(
        "{} {}",
        style(component.key()).cyan(),
        component.part().name
    );

    match component.link() {
        PartLink::Root(_) => {}
        link => {
            label.push_str(&format!(
                " x{}",
                format_quantity(link.amount(), link.unit())
            ));
            if link.is_optional() {
                label.push_str(&format!(" {}", style("(optional)").dim()));
            }
            if matches!(link, PartLink::Substitute(_)) {
                label.push_str(&format!(" {}", style("(substitute)").magenta()));
            }
        }
    }

    match component.retained_iteration() {
        Some(r) => label.push_str(&format!(" [{}.{}]", r.version, r.iteration)),
        None => label.push_str(&format!(" {}", style("[?]").yellow())),
    }
    label
}

/// Indented tree with box-drawing branches
pub fn render_tree(root: &Component) -> String {
    let mut out = format!("{}\n", node_label(root));
    render_children(&mut out, root, "");
    out
}

fn render_children(out: &mut String, component: &Component, prefix: &str) {
    let children = component.components();
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        let branch = if is_last { "└─ " } else { "├─ " };
        out.push_str(&format!("{}{}{}\n", prefix, branch, node_label(child)));

        let next = format!("{}{}", prefix, if is_last { "   " } else { "│  " });
        render_children(out, child, &next);
    }
}

fn render_tsv(root: &Component) -> String {
    let mut out = String::from("DEPTH\tPART\tNAME\tQUANTITY\tUNIT\tITERATION\tPATH\n");
    for component in root.iter() {
        let iteration = component
            .retained_iteration()
            .map(|r| format!("{}.{}", r.version, r.iteration))
            .unwrap_or_default();
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            component.depth(),
            component.key(),
            component.part().name,
            format_quantity(component.quantity(), None),
            component.link().unit().unwrap_or(""),
            iteration,
            component.path_string()
        ));
    }
    out
}
