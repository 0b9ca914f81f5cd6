//! Pageturn main entry point
//!
//! Command-line interface for the pagination-aware transaction scraper.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pageturn::browser::{BrowserPool, DriverPool};
use pageturn::config::{load_config, CrawlOptions, SiteAdapter};
use pageturn::crawl::{capture_elements, crawl_batch, Coordinator, ElementCapture};
use pageturn::output::write_json;
use pageturn::progress::{ProgressEmitter, ProgressEvent, SessionRegistry};
use pageturn::records::{CrawlOutcome, CrawlResult};
use pageturn::session::new_session_id;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Pageturn: scrape client-side-paginated transaction tables
///
/// Pageturn drives headless browsers through tables whose pagination
/// changes the DOM without changing the URL, extracts the rows of every
/// page, and writes structured JSON results.
#[derive(Parser, Debug)]
#[command(name = "pageturn")]
#[command(version = "1.0.0")]
#[command(about = "Headless-browser scraper for paginated transaction tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape the paginated transaction table of one URL
    Table {
        /// Target URL
        url: String,

        /// Output file for the scraped JSON
        #[arg(short, long, default_value = "transactions.json")]
        output: PathBuf,

        /// Run with a visible browser window
        #[arg(long)]
        headed: bool,

        /// Navigation timeout in milliseconds
        #[arg(long, default_value_t = 30_000)]
        timeout: u64,
    },

    /// Capture every element with a given class from one URL
    Elements {
        /// Target URL
        url: String,

        /// Class name to match (without the leading dot)
        #[arg(short, long)]
        class: String,

        /// Output file for the captured JSON
        #[arg(short, long, default_value = "elements.json")]
        output: PathBuf,

        /// Run with a visible browser window
        #[arg(long)]
        headed: bool,

        /// Navigation timeout in milliseconds
        #[arg(long, default_value_t = 30_000)]
        timeout: u64,
    },

    /// Run a batch crawl from a TOML configuration file
    Batch {
        /// Path to the TOML configuration file
        config: PathBuf,

        /// Override the configured results directory
        #[arg(long)]
        results_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Table {
            url,
            output,
            headed,
            timeout,
        } => handle_table(url, output, headed, timeout).await,
        Command::Elements {
            url,
            class,
            output,
            headed,
            timeout,
        } => handle_elements(url, class, output, headed, timeout).await,
        Command::Batch {
            config,
            results_dir,
        } => handle_batch(config, results_dir).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pageturn=info,warn"),
            1 => EnvFilter::new("pageturn=debug,info"),
            2 => EnvFilter::new("pageturn=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the table mode: paginated extraction for one URL
async fn handle_table(
    url: String,
    output: PathBuf,
    headed: bool,
    timeout: u64,
) -> anyhow::Result<()> {
    let options = CrawlOptions {
        concurrency: 1,
        headless: !headed,
        timeout_ms: timeout,
    };
    let adapter = SiteAdapter::default();

    let registry = Arc::new(SessionRegistry::new());
    let emitter = ProgressEmitter::new(Arc::clone(&registry));

    let session_id = new_session_id(std::slice::from_ref(&url));
    let (tx, rx) = mpsc::unbounded_channel();
    registry.register(&session_id, tx);
    let drain = tokio::spawn(drain_progress(rx));

    let coordinator = Coordinator::new(options, adapter, emitter);
    let batch = coordinator
        .run_batch(&session_id, std::slice::from_ref(&url))
        .await;
    registry.remove(&session_id);
    let _ = drain.await;

    let batch = batch.context("table scrape failed")?;
    let outcome = batch
        .outcomes
        .into_iter()
        .next()
        .context("no outcome produced")?;

    match outcome {
        CrawlOutcome::Success(result) => {
            print_transaction_preview(&result);
            write_json(&output, &result).context("failed to write output file")?;
            println!(
                "✓ {} transaction(s) across {} page(s) written to {}",
                result.total_transactions,
                result.total_pages,
                output.display()
            );
            Ok(())
        }
        CrawlOutcome::Failure(failure) => {
            anyhow::bail!("scrape failed for {}: {}", failure.url, failure.error)
        }
    }
}

/// Handles the elements mode: class-based capture for one URL
async fn handle_elements(
    url: String,
    class: String,
    output: PathBuf,
    headed: bool,
    timeout: u64,
) -> anyhow::Result<()> {
    let pool = BrowserPool::launch(1, !headed)
        .await
        .context("failed to launch browser")?;

    let captured = async {
        let driver = pool.page(0).await?;
        let captures = capture_elements(
            driver.as_ref(),
            &url,
            &class,
            std::time::Duration::from_millis(timeout),
        )
        .await;
        let _ = driver.close().await;
        captures
    }
    .await;
    pool.teardown().await;

    let captures = captured.context("element capture failed")?;

    print_element_preview(&captures, &class);
    write_json(&output, &captures).context("failed to write output file")?;
    println!(
        "✓ {} element(s) written to {}",
        captures.len(),
        output.display()
    );

    Ok(())
}

/// Handles the batch mode: full coordinator run from a config file
async fn handle_batch(config_path: PathBuf, results_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = load_config(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    if let Some(dir) = results_dir {
        config.output.results_dir = dir.display().to_string();
    }

    tracing::info!(
        "Loaded {} target URL(s), concurrency {}",
        config.urls.len(),
        config.crawl.concurrency
    );

    let registry = Arc::new(SessionRegistry::new());
    let (tx, rx) = mpsc::unbounded_channel();
    let drain = tokio::spawn(drain_progress(rx));

    let report = crawl_batch(config, Arc::clone(&registry), tx)
        .await
        .context("batch crawl failed")?;
    let _ = drain.await;

    println!(
        "Session {} finished in {}ms",
        report.session_id, report.elapsed_ms
    );
    for outcome in &report.batch.outcomes {
        match outcome {
            CrawlOutcome::Success(result) => println!(
                "  ✓ {} — {} transaction(s), {} page(s)",
                result.url, result.total_transactions, result.total_pages
            ),
            CrawlOutcome::Failure(failure) => {
                println!("  ✗ {} — {}", failure.url, failure.error)
            }
        }
    }
    println!(
        "{} succeeded, {} failed",
        report.batch.succeeded(),
        report.batch.failed()
    );
    if let Some(path) = report.artifact_path {
        println!("Results written to {}", path.display());
    }

    Ok(())
}

/// Forwards progress events into the log output
async fn drain_progress(mut rx: mpsc::UnboundedReceiver<ProgressEvent>) {
    while let Some(event) = rx.recv().await {
        tracing::info!(
            "[{}/{}] {} {}",
            event.url_index + 1,
            event.total_urls,
            event.status,
            event.message
        );
    }
}

/// Prints the first few scraped records to the console
fn print_transaction_preview(result: &CrawlResult) {
    println!(
        "Scraped {} transaction(s) from {}",
        result.total_transactions, result.url
    );
    for record in result.transactions.iter().take(3) {
        println!(
            "  {} | {} BR | {} | {}",
            record.date.as_deref().unwrap_or("-"),
            record.bedrooms.as_deref().unwrap_or("-"),
            record.price.as_deref().unwrap_or("-"),
            record.address.as_deref().unwrap_or("-")
        );
    }
    if result.transactions.len() > 3 {
        println!("  ... and {} more", result.transactions.len() - 3);
    }
}

/// Prints the first few captured elements to the console
fn print_element_preview(captures: &[ElementCapture], class: &str) {
    println!("Captured {} element(s) with class '{}'", captures.len(), class);
    for capture in captures.iter().take(3) {
        let text = if capture.text.chars().count() > 60 {
            format!("{}...", capture.text.chars().take(60).collect::<String>())
        } else {
            capture.text.clone()
        };
        println!("  <{}> {}", capture.tag, text);
    }
    if captures.len() > 3 {
        println!("  ... and {} more", captures.len() - 3);
    }
}
