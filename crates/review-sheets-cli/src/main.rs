//! Review Sheets CLI - compute and inspect review table snapshots

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use review_sheets::prelude::*;
use review_sheets::{extract_deps, parse_formula};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "review")]
#[command(author, version, about = "Review table formula engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every formula cell of a table and print the results as JSON
    Compute {
        /// Table snapshot (JSON)
        table: PathBuf,

        /// Input overrides: a JSON object mapping addresses to text
        #[arg(short, long)]
        inputs: Option<PathBuf>,

        /// Relaxation rounds for circular references
        #[arg(long, default_value_t = CalculationOptions::default().max_relaxation_rounds)]
        max_relaxation_rounds: u32,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,

        /// Print calculation statistics to stderr
        #[arg(short, long)]
        stats: bool,
    },

    /// Print the addresses a formula depends on, one per line
    Deps {
        /// Formula text, e.g. "=SUM(A1:A3)"
        formula: String,
    },

    /// Check a table snapshot for conflicting or duplicate cells
    Validate {
        /// Table snapshot (JSON)
        table: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compute {
            table,
            inputs,
            max_relaxation_rounds,
            pretty,
            stats,
        } => compute(
            &table,
            inputs.as_deref(),
            &CalculationOptions {
                max_relaxation_rounds,
            },
            pretty,
            stats,
        ),
        Commands::Deps { formula } => print_deps(&formula),
        Commands::Validate { table } => validate(&table),
    }
}

fn load_table(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse '{}'", path.display()))
}

fn load_inputs(path: &Path) -> Result<InputsMap> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse '{}'", path.display()))
}

fn compute(
    table_path: &Path,
    inputs_path: Option<&Path>,
    options: &CalculationOptions,
    pretty: bool,
    show_stats: bool,
) -> Result<()> {
    let table = load_table(table_path)?;
    let inputs = match inputs_path {
        Some(path) => load_inputs(path)?,
        None => InputsMap::new(),
    };

    let calculation = table.calculate_with_options(&inputs, options);

    if show_stats {
        let stats = &calculation.stats;
        eprintln!(
            "Calculated {} of {} formulas ({} errors)",
            stats.cells_calculated, stats.formula_count, stats.errors
        );
        if stats.circular_references > 0 {
            eprintln!(
                "Circular references: {} cells, {} unresolved, {} rounds ({})",
                stats.circular_references,
                stats.unresolved,
                stats.iterations,
                if stats.converged { "settled" } else { "not settled" }
            );
        }
    }

    let json = if pretty {
        serde_json::to_string_pretty(&calculation.values)
    } else {
        serde_json::to_string(&calculation.values)
    }
    .context("Failed to serialize results")?;

    let mut stdout = io::stdout();
    writeln!(stdout, "{}", json).context("Failed to write to stdout")?;

    Ok(())
}

fn print_deps(formula: &str) -> Result<()> {
    if let Err(e) = parse_formula(formula) {
        eprintln!("Warning: {}", e);
    }

    let mut stdout = io::stdout();
    for addr in extract_deps(formula) {
        writeln!(stdout, "{}", addr).context("Failed to write to stdout")?;
    }

    Ok(())
}

fn validate(table_path: &Path) -> Result<()> {
    let table = load_table(table_path)?;

    let (mut formulas, mut inputs) = (0, 0);
    for cell in table.visible_cells() {
        if cell.is_formula() {
            formulas += 1;
        } else if cell.is_input {
            inputs += 1;
        }
    }

    println!("File: {}", table_path.display());
    println!("Rows: {}", table.row_count());
    println!("Formulas: {}", formulas);
    println!("Inputs: {}", inputs);

    if let Err(e) = table.validate() {
        bail!("Invalid table '{}': {}", table_path.display(), e);
    }
    println!("OK");

    Ok(())
}
