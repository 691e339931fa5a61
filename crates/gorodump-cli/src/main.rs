mod report;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gorodump_parser::{Dump, DumpParser, SCHEMA_VERSION};
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gorodump")]
#[command(about = "Inspect Go goroutine stack dumps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a stack dump and emit JSON
    Parse {
        /// Path to the dump, or `-` for stdin
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// Wrap the output with the schema version and parse diagnostics
        #[arg(long)]
        diagnostics: bool,
    },
    /// Print goroutines whose stack mentions PATTERN (case-insensitive)
    Grep {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        pattern: String,
        /// Only keep goroutines with exactly this status
        #[arg(long)]
        status: Option<String>,
    },
    /// Summarize goroutines by status
    Stats {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

#[derive(Serialize)]
struct ParseOutput<'a> {
    schema_version: &'a str,
    #[serde(flatten)]
    dump: &'a Dump,
}

fn read_dump(path: &Path) -> anyhow::Result<Dump> {
    let parser = DumpParser::new();
    let dump = if path == Path::new("-") {
        parser.parse_reader(io::stdin().lock())?
    } else {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        parser
            .parse_reader(file)
            .with_context(|| format!("reading {}", path.display()))?
    };
    log::info!(
        "Parsed {} goroutines ({} skipped blocks or frames)",
        dump.goroutines.len(),
        dump.diagnostics.len()
    );
    Ok(dump)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Parse { path, diagnostics } => {
            let dump = read_dump(path)?;
            let json = if *diagnostics {
                serde_json::to_string_pretty(&ParseOutput {
                    schema_version: SCHEMA_VERSION,
                    dump: &dump,
                })?
            } else {
                serde_json::to_string_pretty(&dump.goroutines)?
            };
            println!("{json}");
        }
        Commands::Grep {
            path,
            pattern,
            status,
        } => {
            let dump = read_dump(path)?;
            let matches = report::grep(&dump.goroutines, pattern, status.as_deref());
            for goroutine in &matches {
                println!("{}", report::render(goroutine));
            }
            log::info!("{} of {} goroutines matched", matches.len(), dump.goroutines.len());
        }
        Commands::Stats { path } => {
            let dump = read_dump(path)?;
            print!("{}", report::Stats::collect(&dump.goroutines));
        }
    }
    Ok(())
}
