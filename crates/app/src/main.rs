use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use payables_core::{filter, DateRange, FiscalCalendar};
use payables_import::{load_latest_extract, read_extract_file};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod report;

use config::ReportConfig;
use report::{write_classified, write_summary, OutputFormat};

/// Weekly vendor payable summary from AP analysis extracts.
#[derive(Debug, Parser)]
#[command(name = "vendor-payable", version)]
struct Cli {
    /// TOML file with source, filter, field and rule settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Filter the newest extract and total it per vendor for a date window.
    Summary {
        /// Folder holding AP_Analysis_Report_*.csv files.
        #[arg(long, conflicts_with = "file")]
        source_dir: Option<PathBuf>,
        /// Use this extract instead of searching for the newest one.
        #[arg(long)]
        file: Option<PathBuf>,
        /// First day of the window (inclusive).
        #[arg(long)]
        start: Option<String>,
        /// Last day of the window (inclusive).
        #[arg(long)]
        end: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
        /// Write here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Emit one classified line per ledger row instead of vendor totals.
        #[arg(long)]
        classified: bool,
    },
    /// Print the fiscal column label that follows the given ones.
    NextColumn {
        /// Existing column labels, e.g. "Period 5- Week 20".
        #[arg(required = true)]
        labels: Vec<String>,
        /// The fiscal year has 53 weeks.
        #[arg(long = "is-53-week")]
        long_year: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };

    match cli.command {
        Command::Summary {
            source_dir,
            file,
            start,
            end,
            format,
            output,
            classified,
        } => {
            let format_cfg = config.extract_format()?;
            let (raw, path) = match file {
                Some(path) => (read_extract_file(&path, &format_cfg)?, path),
                None => {
                    let dir = source_dir
                        .or_else(|| config.source_dir.clone())
                        .context("No source directory: pass --source-dir or set source_dir")?;
                    load_latest_extract(&dir, &format_cfg)?
                }
            };

            let start = start
                .or_else(|| config.start_date.clone())
                .context("No start date: pass --start or set start_date")?;
            let end = end
                .or_else(|| config.end_date.clone())
                .context("No end date: pass --end or set end_date")?;

            let filtered = filter(&raw, &config.filter)
                .with_context(|| format!("Filtering {}", path.display()))?;
            tracing::info!(
                kept = filtered.len(),
                total = raw.len(),
                "applied merch/category filters"
            );

            let aggregator = config.aggregator()?;
            // Schema problems are reported ahead of a bad window.
            filtered.require(&aggregator.fields().names())?;
            let window = DateRange::parse(start, end)?;

            let mut out: Box<dyn Write> = match &output {
                Some(p) => Box::new(BufWriter::new(
                    File::create(p).with_context(|| format!("Failed to create {}", p.display()))?,
                )),
                None => Box::new(io::stdout().lock()),
            };

            if classified {
                let rows = aggregator.classify_rows(&filtered, window)?;
                write_classified(&rows, format, &mut out)?;
            } else {
                let summary = aggregator.summarize(&filtered, window)?;
                tracing::info!(vendors = summary.len(), %window, "vendor summary ready");
                write_summary(&summary, format, &mut out)?;
            }
            out.flush()?;
        }
        Command::NextColumn { labels, long_year } => {
            let next = FiscalCalendar::new(long_year).next_column(labels.iter().map(String::as_str))?;
            println!("{next}");
        }
    }

    Ok(())
}
