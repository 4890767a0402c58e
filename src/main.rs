use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use connmat::io_utils::{connmat_cli_error, io_cli_error, simple_cli_error};
use connmat::{BlobSummary, CompressedMatrix};

/// Inspect and query compressed connection-cost blobs.
#[derive(Parser)]
#[command(name = "connmat")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a blob and print a summary.
    Info {
        blob: PathBuf,
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the cost of a single transition.
    Lookup { blob: PathBuf, row: usize, col: usize },
    /// Print every cost of one row, space separated.
    Row { blob: PathBuf, row: usize },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn read_blob(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    Ok(fs::read(path).map_err(|e| io_cli_error("reading blob", path, e))?)
}

fn open(data: &[u8]) -> Result<CompressedMatrix<'_>, Box<dyn std::error::Error>> {
    Ok(CompressedMatrix::new(data).map_err(|e| connmat_cli_error("invalid blob", e))?)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Info { blob, json } => {
            let data = read_blob(&blob)?;
            let summary = BlobSummary::new(&open(&data)?);
            if json {
                let out = serde_json::to_string_pretty(&summary)
                    .map_err(|e| simple_cli_error(&format!("JSON encoding failed: {e}")))?;
                println!("{out}");
            } else {
                summary.report();
            }
        }
        Command::Lookup { blob, row, col } => {
            let data = read_blob(&blob)?;
            let cost = open(&data)?
                .cost(row, col)
                .map_err(|e| connmat_cli_error("lookup failed", e))?;
            println!("{cost}");
        }
        Command::Row { blob, row } => {
            let data = read_blob(&blob)?;
            let costs = open(&data)?
                .row(row)
                .map_err(|e| connmat_cli_error("lookup failed", e))?;
            let line: Vec<String> = costs.iter().map(|c| c.to_string()).collect();
            println!("{}", line.join(" "));
        }
    }
    Ok(())
}
