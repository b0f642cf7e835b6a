// src/main.rs
mod config;
mod extractors;
mod metrics;
mod pipeline;
mod portal;
mod storage;
mod utils;

use std::path::PathBuf;
use clap::Parser;
use config::Config;
use metrics::AveragingPolicy;
use pipeline::Pipeline;
use portal::PortalClient;
use storage::WorkbookWriter;
use utils::AppError;

/// Scrapes sector financial statements from the hexun stock-data portal into a workbook
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file overriding the built-in configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the template and output workbooks
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Template workbook file name inside the data directory
    #[arg(long)]
    template: Option<String>,

    /// Output workbook file name inside the data directory
    #[arg(short, long)]
    output: Option<String>,

    /// Only scrape these sectors (code or name, repeatable)
    #[arg(short, long)]
    sector: Vec<String>,

    /// Average with the divisor starting at one, as older runs did
    #[arg(long)]
    legacy_average: bool,

    /// Debug mode - save annotated report index pages that fail to parse
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Build configuration: defaults, then file, then flags
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(template) = args.template {
        config.template_file = template;
    }
    if let Some(output) = args.output {
        config.output_file = output;
    }
    if args.legacy_average {
        config.averaging = AveragingPolicy::Legacy;
    }
    config.retain_sectors(&args.sector);
    config.validate()?;
    tracing::info!("Scraping {} sectors for years {:?} ({:?} averaging)", config.sectors.len(), config.years, config.averaging);

    // 4. Copy the template and hold the output workbook open
    let writer = WorkbookWriter::from_template(
        &config.template_path(),
        &config.output_path(),
        config.header(),
        config.header_rows,
    )?;
    let sheets = writer.sheet_names();
    for year in config.years.iter().filter(|y| !sheets.contains(y)) {
        tracing::warn!("Template has no sheet for {}, it will be added", year);
    }
    let output_path = writer.path().to_path_buf();

    // 5. Initialize portal client
    let mut client = PortalClient::new(&config)?;
    if args.debug {
        client = client.with_debug_dir(config.data_dir.join("debug"));
    }

    // 6. Run
    let mut pipeline = Pipeline::new(client, &config, writer);
    let summary = pipeline.run().await?;

    tracing::info!(
        "Wrote {} rows per sheet to {} ({} companies skipped)",
        pipeline.next_row(),
        output_path.display(),
        summary.skipped
    );

    if summary.processed == 0 && summary.skipped > 0 {
        return Err(AppError::Processing(format!("Failed to scrape any of {} companies", summary.skipped)));
    }

    Ok(())
}
