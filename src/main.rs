//! coldread CLI - read-before-init analysis over JSON syntax trees.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use coldread::ast::Unit;
use coldread::{analyze_unit, UnitReport};

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Find variables that may be read before initialization.
#[derive(Parser)]
#[command(
    name = "coldread",
    version,
    about = "Find variables that may be read before initialization",
    long_about = r#"
Find variables that may be read before initialization.

Takes translation units as JSON syntax trees, lowers every function to an
annotated control-flow graph, runs a backward may-analysis to a fixpoint,
and prints one line per function that has findings:

    functionName:var1,var2

Examples:
    coldread unit.json                  # Text report to stdout
    coldread unit.json -o findings.txt  # Text report to a file
    coldread unit.json --format json    # Findings plus metrics as JSON
    coldread unit.json --dump-cfg -vv   # Annotated CFGs on stderr
"#
)]
struct Cli {
    /// Translation units to analyze (JSON syntax trees)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Print each function's annotated CFG to stderr
    #[arg(long)]
    dump_cfg: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut reports: Vec<(PathBuf, UnitReport)> = Vec::new();
    for input in &cli.inputs {
        let text = fs::read_to_string(input)
            .with_context(|| format!("reading {}", input.display()))?;
        let unit =
            Unit::from_json(&text).with_context(|| format!("parsing {}", input.display()))?;
        let report =
            analyze_unit(&unit).with_context(|| format!("analyzing {}", input.display()))?;

        if cli.dump_cfg {
            for function in &report.functions {
                eprintln!("== {} ==", function.function_name);
                eprint!("{}", function.render_cfg());
            }
        }
        reports.push((input.clone(), report));
    }

    let rendered = match cli.format {
        OutputFormat::Text => {
            let mut out = String::new();
            for (_, report) in &reports {
                for line in report.lines() {
                    out.push_str(&line);
                    out.push('\n');
                }
            }
            out
        }
        OutputFormat::Json => {
            let units: Vec<_> = reports
                .iter()
                .map(|(path, report)| {
                    json!({
                        "file": path.display().to_string(),
                        "report": report.to_json(),
                    })
                })
                .collect();
            let mut text = serde_json::to_string_pretty(&json!({ "units": units }))?;
            text.push('\n');
            text
        }
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(rendered.as_bytes())?;
        }
    }
    Ok(())
}
