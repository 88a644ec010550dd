use analytics::MarketStatsEngine;
use anyhow::Context;
use clap::{Parser, Subcommand};
use configuration::{init_tracing, load_config, Overrides, Settings};
use core_types::{Instrument, PriceSeries};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use market_data::{save_series, validate_coverage, CsvDirectorySource, PriceSource, TiingoClient};
use reporter::{Exporter, ReportContext, SortinoDetail};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The main entry point for the market statistics application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables (e.g. the Tiingo API key) from a .env file, if present.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let overrides = match &cli.command {
        Commands::Analyze(args) => &args.overrides,
        Commands::Fetch(args) => &args.overrides,
    };
    let settings = load_settings(&cli.config, overrides)?;
    let _log_guard = init_tracing(&settings.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, settings).await,
        Commands::Fetch(args) => handle_fetch(args, settings).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Up/down market capture, beta and Sortino ratios for a list of stocks and ETFs.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the statistics, print them and write the report files.
    Analyze(AnalyzeArgs),
    /// Download every instrument's prices into CSV files for offline analysis.
    Fetch(FetchArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Read `{TICKER}.csv` files from this directory instead of calling Tiingo.
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Overrides the output directory of the report files.
    #[arg(long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Parser)]
struct FetchArgs {
    /// Directory receiving one `{TICKER}.csv` file per instrument.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    overrides: Overrides,
}

fn load_settings(path: &Path, overrides: &Overrides) -> anyhow::Result<Settings> {
    let mut settings = load_config(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    overrides.apply(&mut settings);
    settings.validate().context("invalid command-line overrides")?;
    Ok(settings)
}

fn tiingo_source(settings: &Settings) -> anyhow::Result<Arc<dyn PriceSource>> {
    let api_key = settings.require_api_key()?;
    Ok(Arc::new(TiingoClient::new(&settings.tiingo.base_url, api_key)?))
}

// ==============================================================================
// Analyze Command Logic
// ==============================================================================

/// Handles the orchestration of a full statistics run.
async fn handle_analyze(args: AnalyzeArgs, settings: Settings) -> anyhow::Result<()> {
    let source: Arc<dyn PriceSource> = match &args.csv_dir {
        Some(dir) => Arc::new(CsvDirectorySource::new(dir)),
        None => tiingo_source(&settings)?,
    };
    let instruments = settings.universe.instruments()?;
    tracing::info!(
        instruments = instruments.len(),
        frequency = %settings.analysis.frequency,
        offline = args.csv_dir.is_some(),
        "starting analysis"
    );
    let series = load_prices(source, &instruments, &settings).await?;

    let engine = MarketStatsEngine::new(settings.analysis_params());
    let output = engine.run(&series).context("statistics run failed")?;

    if settings.output.show_prices {
        println!("{}", reporter::price_table(&output.prices));
        println!("Growth ratios (not percentages):");
        println!("{}", reporter::return_table(&output.returns, &output.classification));
    }
    println!("{}", reporter::statistics_table(&output));
    println!("{}", reporter::export::DATA_SOURCE);
    println!("{}", reporter::export::DISCLAIMER);

    // The per-period Sortino working is exported for the last instrument only.
    let detail = instruments.last().and_then(|instrument| {
        let periods = engine.sortino_detail(&output, instrument)?;
        Some(SortinoDetail::new(instrument.clone(), &output.returns, &periods))
    });

    let directory = args.output.unwrap_or_else(|| settings.output.directory.clone());
    let exporter = Exporter::new(directory, ReportContext::from_settings(&settings));
    let written = exporter.export(&output, detail.as_ref())?;
    tracing::info!(files = written.len(), "analysis finished");
    println!("Wrote {} report files:", written.len());
    for path in &written {
        println!("  {}", path.display());
    }
    Ok(())
}

// ==============================================================================
// Fetch Command Logic
// ==============================================================================

/// Downloads and stores the price history of every configured instrument.
async fn handle_fetch(args: FetchArgs, settings: Settings) -> anyhow::Result<()> {
    let source = tiingo_source(&settings)?;
    let instruments = settings.universe.instruments()?;
    tracing::info!(
        instruments = instruments.len(),
        frequency = %settings.analysis.frequency,
        out = %args.out.display(),
        "starting download"
    );
    let series = load_prices(source, &instruments, &settings).await?;

    for s in &series {
        let path = save_series(&args.out, s)?;
        println!("Saved {} prices for {} to {}", s.len(), s.instrument, path.display());
    }
    tracing::info!(series = series.len(), "download finished");
    Ok(())
}

/// Validates every instrument's listed history, then downloads all price
/// series concurrently. The returned series keep the order of `instruments`.
async fn load_prices(
    source: Arc<dyn PriceSource>,
    instruments: &[Instrument],
    settings: &Settings,
) -> anyhow::Result<Vec<PriceSeries>> {
    let analysis = &settings.analysis;
    validate_coverage(source.as_ref(), instruments, analysis.start_date, analysis.end_date)
        .await
        .context("metadata validation failed; no prices were requested")?;

    // Set up the progress bar
    let progress_bar = ProgressBar::new(instruments.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    // Create concurrent tasks for each instrument
    let tasks: Vec<_> = instruments
        .iter()
        .cloned()
        .map(|instrument| {
            let source = Arc::clone(&source);
            let pb_clone = progress_bar.clone();
            let (start, end, frequency) = (analysis.start_date, analysis.end_date, analysis.frequency);

            tokio::spawn(async move {
                pb_clone.set_message(format!("Fetching {instrument}..."));
                let series = source.fetch_prices(&instrument, start, end, frequency).await;
                pb_clone.inc(1);
                series
            })
        })
        .collect();

    // Wait for all concurrent tasks to complete
    let results = join_all(tasks).await;
    progress_bar.finish_with_message("Download complete!");

    let mut series = Vec::with_capacity(results.len());
    for (instrument, result) in instruments.iter().zip(results) {
        let prices = result
            .context("download task panicked")?
            .with_context(|| format!("failed to download prices for {instrument}"))?;
        series.push(prices);
    }
    Ok(series)
}
