//! `tps rollup` command - Flattened quantity rollup of a structure

use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::args::{OutputFormat, TraversalArgs};
use crate::cli::helpers::{format_quantity, output_format, run_traversal, truncate_str, write_output};
use crate::cli::GlobalOpts;
use crate::structure::RollupLine;

#[derive(clap::Args, Debug)]
pub struct RollupArgs {
    /// Root part (NUMBER or WORKSPACE/NUMBER)
    pub part: String,

    #[command(flatten)]
    pub traversal: TraversalArgs,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: RollupArgs, global: &GlobalOpts) -> Result<()> {
    let traversal = run_traversal(global, &args.part, &args.traversal)?;
    let lines = traversal.resolution.root.rollup();

    let content = match output_format(global, &traversal.config) {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&lines).into_diagnostic()?;
            json.push('\n');
            json
        }
        OutputFormat::Yaml => serde_yml::to_string(&lines).into_diagnostic()?,
        OutputFormat::Tsv => render_tsv(&lines),
        OutputFormat::Auto | OutputFormat::Tree => {
            let mut table = render_table(&lines);
            if !global.quiet {
                table.push_str(&format!(
                    "\n{} distinct part(s) below {}\n",
                    lines.len(),
                    traversal.root
                ));
            }
            table
        }
    };

    write_output(&content, args.output.as_deref())
}

fn render_table(lines: &[RollupLine]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Part", "Name", "Quantity", "Occurrences"]);
    for line in lines {
        builder.push_record([
            line.part.to_string(),
            truncate_str(&line.name, 30),
            format_quantity(line.quantity, line.unit.as_deref()),
            line.occurrences.to_string(),
        ]);
    }
    let mut table = builder.build().with(Style::rounded()).to_string();
    table.push('\n');
    table
}

fn render_tsv(lines: &[RollupLine]) -> String {
    let mut out = String::from("PART\tNAME\tQUANTITY\tUNIT\tOCCURRENCES\n");
    for line in lines {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\n",
            line.part,
            line.name,
            format_quantity(line.quantity, None),
            line.unit.as_deref().unwrap_or(""),
            line.occurrences
        ));
    }
    out
}
