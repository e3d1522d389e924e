//! filingfacts CLI binary.
//!
//! Downloads filings, extracts headline financial facts and queries the
//! fact store.

mod output;
mod paths;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use filingfacts::Pipeline;
use filingfacts_data::{
    DownloadSummary, EdgarClient, EdgarDownloader, FactStore, FetchRequest, FilingCache,
};
use filingfacts_extract::{ExtractionConfig, FilingCategory};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use output::OutputFormat;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "filingfacts")]
#[command(about = "Extract headline financial facts from SEC filings", long_about = None)]
#[command(version)]
struct Cli {
    /// Fact database (defaults to the user cache directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Filing cache root (defaults to the user cache directory)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and store facts from a company's cached filings
    Process {
        /// Ticker symbol
        ticker: String,

        /// Most recent annual reports to process (all if omitted)
        #[arg(long)]
        annual_limit: Option<usize>,

        /// Most recent quarterly reports to process (all if omitted)
        #[arg(long)]
        quarterly_limit: Option<usize>,

        /// Only filings filed on or after this date (YYYY-MM-DD)
        #[arg(long)]
        after: Option<NaiveDate>,

        /// Only filings filed on or before this date (YYYY-MM-DD)
        #[arg(long)]
        before: Option<NaiveDate>,

        /// Download missing filings from EDGAR first
        #[arg(long)]
        download: bool,

        /// Replace facts that are already stored
        #[arg(long)]
        overwrite: bool,

        /// Extraction configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print stored facts for a company
    Query {
        /// Ticker symbol
        ticker: String,

        /// Restrict to one category (annual or quarterly)
        #[arg(long)]
        category: Option<FilingCategory>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show fact store statistics
    Stats,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let db_path = cli.db.unwrap_or_else(paths::default_db_path);
    let cache_dir = cli.cache_dir.unwrap_or_else(paths::default_filings_dir);

    match cli.command {
        Commands::Process {
            ticker,
            annual_limit,
            quarterly_limit,
            after,
            before,
            download,
            overwrite,
            config,
        } => {
            let ticker = ticker.to_uppercase();
            let categories = [
                (FilingCategory::Annual, fetch_request(annual_limit, after, before)),
                (
                    FilingCategory::Quarterly,
                    fetch_request(quarterly_limit, after, before),
                ),
            ];

            if download {
                download_filings(&ticker, &cache_dir, &categories).await?;
            }
            process_company(&ticker, &db_path, &cache_dir, &categories, overwrite, config.as_deref())?;
        }
        Commands::Query {
            ticker,
            category,
            format,
        } => {
            let store = paths::open_store(&db_path)?;
            let facts = store.query_by(&ticker.to_uppercase(), category)?;
            output::write_facts(&mut io::stdout().lock(), &facts, format)?;
        }
        Commands::Stats => {
            let store = paths::open_store(&db_path)?;
            println!("Database: {}\n", db_path.display());
            output::write_stats(&mut io::stdout().lock(), &store.stats()?)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn fetch_request(
    limit: Option<usize>,
    after: Option<NaiveDate>,
    before: Option<NaiveDate>,
) -> FetchRequest {
    let mut request = limit.map_or_else(FetchRequest::all, FetchRequest::latest);
    if let Some(date) = after {
        request = request.with_after(date);
    }
    if let Some(date) = before {
        request = request.with_before(date);
    }
    request
}

async fn download_filings(
    ticker: &str,
    cache_dir: &Path,
    categories: &[(FilingCategory, FetchRequest)],
) -> Result<(), Box<dyn std::error::Error>> {
    let downloader = EdgarDownloader::new(EdgarClient::new()?, FilingCache::new(cache_dir));

    let downloader = &downloader;
    let failed = download_each(ticker, categories, move |category, request| async move {
        downloader.download(ticker, category, &request).await
    })
    .await;

    if !failed.is_empty() {
        eprintln!(
            "Warning: {} download failed for {}; processing cached filings only",
            failed.join(", "),
            ticker
        );
    }
    Ok(())
}

/// Run `download` for every category. A failed category is reported and the
/// remaining ones still run. Returns the forms whose download failed.
async fn download_each<F, Fut>(
    ticker: &str,
    categories: &[(FilingCategory, FetchRequest)],
    mut download: F,
) -> Vec<&'static str>
where
    F: FnMut(FilingCategory, FetchRequest) -> Fut,
    Fut: Future<Output = filingfacts_data::Result<DownloadSummary>>,
{
    let mut failed = Vec::new();

    for &(category, request) in categories {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .expect("valid template"),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));
        spinner.set_message(format!("Downloading {} {} filings...", ticker, category.form()));

        match download(category, request).await {
            Ok(summary) => {
                spinner.finish_with_message(format!(
                    "{} {}: {} downloaded, {} already cached, {} failed",
                    ticker,
                    category.form(),
                    summary.downloaded,
                    summary.already_cached,
                    summary.failed.len()
                ));
                for (accession, reason) in &summary.failed {
                    eprintln!("  {}: {}", accession, reason);
                }
            }
            Err(e) => {
                spinner.finish_with_message(format!("{} {}: failed", ticker, category.form()));
                eprintln!("  {} {} download failed: {}", ticker, category.form(), e);
                failed.push(category.form());
            }
        }
    }

    failed
}

fn process_company(
    ticker: &str,
    db_path: &Path,
    cache_dir: &Path,
    categories: &[(FilingCategory, FetchRequest)],
    overwrite: bool,
    config: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config {
        Some(path) => ExtractionConfig::from_json_file(path)?,
        None => ExtractionConfig::default(),
    };
    let store = paths::open_store(db_path)?;
    let pipeline = Pipeline::with_config(&config, FilingCache::new(cache_dir), store)?;

    info!("Processing {} from {}", ticker, cache_dir.display());

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("█▓░"),
    );
    pb.set_message(format!("Extracting {} filings...", ticker));

    let report = pipeline.process_company_with(ticker, categories, overwrite, |total, line| {
        match line {
            None => pb.inc_length(total as u64),
            Some(line) => {
                pb.set_message(line.document_id.clone());
                pb.inc(1);
            }
        }
    });
    pb.finish_with_message(format!(
        "Processed {} documents",
        report
            .categories
            .iter()
            .map(|c| c.ingestion.total())
            .sum::<usize>()
    ));

    output::write_report(&mut io::stdout().lock(), &report)?;

    if report.inserted() + report.skipped() == 0 && report.failed() > 0 {
        return Err(format!("no filings could be processed for {}", ticker).into());
    }
    Ok(())
}
