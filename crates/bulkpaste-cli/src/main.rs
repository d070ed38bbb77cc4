mod sheet;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use bulkpaste_client::build_chain;
use bulkpaste_core::config::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, parse_alternates};
use bulkpaste_core::retry::RetryPolicy;
use bulkpaste_core::{BatchRunner, BatchSummary, PublishConfig, TracingBatchReporter};

use crate::sheet::{CsvRecorder, default_output_path, preview, read_items};

const PREVIEW_ROWS: usize = 5;

#[derive(Parser)]
#[command(name = "bulkpaste", version, about = "Publish spreadsheet rows to paste services")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish every valid row and write a results CSV
    Publish {
        /// CSV file with a `content` column
        #[arg(short, long, env = "BULKPASTE_INPUT")]
        input: PathBuf,

        /// Results file (defaults to bulkpaste_results_<timestamp>.csv)
        #[arg(short, long, env = "BULKPASTE_OUTPUT")]
        output: Option<PathBuf>,

        /// Seconds to wait between submissions
        #[arg(short, long, env = "BULKPASTE_DELAY", default_value = "2", value_parser = parse_secs)]
        delay: Duration,

        /// Print the first rows before publishing
        #[arg(long, env = "BULKPASTE_PREVIEW")]
        preview: bool,

        #[command(flatten)]
        content: ContentArgs,

        #[command(flatten)]
        chain: ChainArgs,
    },

    /// Validate the input without any network call
    Check {
        /// CSV file with a `content` column
        #[arg(short, long, env = "BULKPASTE_INPUT")]
        input: PathBuf,

        #[command(flatten)]
        content: ContentArgs,
    },

    /// Show the provider chain in attempt order
    Providers {
        #[command(flatten)]
        chain: ChainArgs,
    },
}

#[derive(Args)]
struct ContentArgs {
    /// Strip Markdown formatting before validation and submission
    #[arg(long, env = "BULKPASTE_NORMALIZE_MARKDOWN")]
    normalize_markdown: bool,

    /// Minimum number of characters a row needs to be published
    #[arg(long, env = "BULKPASTE_MIN_LENGTH", default_value_t = bulkpaste_core::validate::DEFAULT_MIN_LENGTH)]
    min_length: usize,
}

#[derive(Args)]
struct ChainArgs {
    /// Primary paste site
    #[arg(long, env = "BULKPASTE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// User agent sent with every request
    #[arg(long, env = "BULKPASTE_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "BULKPASTE_TIMEOUT", default_value = "30", value_parser = parse_secs)]
    timeout: Duration,

    /// Tries of the primary API before moving on
    #[arg(long, env = "BULKPASTE_API_ATTEMPTS", default_value_t = 2)]
    api_attempts: u32,

    /// Seconds between API tries
    #[arg(long, env = "BULKPASTE_RETRY_DELAY", default_value = "1", value_parser = parse_secs)]
    retry_delay: Duration,

    /// Fallback services, comma-separated, or `none`
    #[arg(long, env = "BULKPASTE_ALTERNATES", default_value = "dpaste,paste.rs,0x0.st")]
    alternates: String,

    /// Never launch a headless browser
    #[arg(long, env = "BULKPASTE_NO_BROWSER")]
    no_browser: bool,
}

fn parse_secs(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|_| format!("'{raw}' must be a non-negative number"))
}

impl ChainArgs {
    fn into_config(self, content: Option<&ContentArgs>, delay: Duration) -> Result<PublishConfig> {
        let alternates = parse_alternates(&self.alternates).map_err(|e| anyhow::anyhow!(e))?;
        let defaults = PublishConfig::default();
        let config = PublishConfig {
            base_url: self.base_url,
            user_agent: self.user_agent,
            timeout: self.timeout,
            api_retry: RetryPolicy::new(self.api_attempts, self.retry_delay),
            alternates,
            browser: !self.no_browser,
            min_length: content.map_or(defaults.min_length, |c| c.min_length),
            normalize_markdown: content.is_some_and(|c| c.normalize_markdown),
            delay,
            ..defaults
        };
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("bulkpaste=info".parse()?)
                .add_directive("bulkpaste_core=info".parse()?)
                .add_directive("bulkpaste_client=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Publish {
            input,
            output,
            delay,
            preview,
            content,
            chain,
        } => {
            let config = chain.into_config(Some(&content), delay)?;
            let output = output.unwrap_or_else(default_output_path);
            cmd_publish(&input, &output, preview, &config).await?;
        }
        Commands::Check { input, content } => {
            cmd_check(&input, &content)?;
        }
        Commands::Providers { chain } => {
            let config = chain.into_config(None, Duration::ZERO)?;
            cmd_providers(&config).await?;
        }
    }

    Ok(())
}

async fn cmd_publish(
    input: &Path,
    output: &Path,
    show_preview: bool,
    config: &PublishConfig,
) -> Result<()> {
    let items = read_items(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    tracing::info!("Loaded {} rows from {}", items.len(), input.display());

    if show_preview {
        println!("First {} rows:", PREVIEW_ROWS.min(items.len()));
        for line in preview(&items, PREVIEW_ROWS) {
            println!("{line}");
        }
        println!();
    }

    let chain = build_chain(config)
        .await
        .context("Failed to build provider chain")?;
    let runner = BatchRunner::new(chain, config.batch_options());
    let mut recorder = CsvRecorder::create(output)
        .with_context(|| format!("Failed to create output file: {}", output.display()))?;

    let cancel_token = CancellationToken::new();
    let signal_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping after the current row");
            signal_token.cancel();
        }
    });

    let summary = runner
        .run(&items, &mut recorder, &TracingBatchReporter, &cancel_token)
        .await
        .context("Failed to record results")?;

    print_summary(&summary);
    println!("Results written to {}", output.display());
    Ok(())
}

fn cmd_check(input: &Path, content: &ContentArgs) -> Result<()> {
    let items = read_items(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;

    let options = PublishConfig {
        min_length: content.min_length,
        normalize_markdown: content.normalize_markdown,
        ..PublishConfig::default()
    }
    .batch_options();

    let mut publishable = 0;
    for item in &items {
        let prepared = options.prepare(item);
        match options.validator.check(&prepared.text) {
            Ok(()) => {
                publishable += 1;
                println!("  row {:>4}: ok ({} chars)", item.row, prepared.text.chars().count());
            }
            Err(reason) => println!("  row {:>4}: skip ({reason})", item.row),
        }
    }

    println!(
        "\n{publishable} of {} rows would be published, {} skipped",
        items.len(),
        items.len() - publishable
    );
    Ok(())
}

async fn cmd_providers(config: &PublishConfig) -> Result<()> {
    let chain = build_chain(config)
        .await
        .context("Failed to build provider chain")?;

    println!("Provider chain for {}:", config.base_url());
    for (i, name) in chain.names().iter().enumerate() {
        println!("  {}. {name}", i + 1);
    }
    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    println!("\nSummary:");
    println!("  total:     {}", summary.total);
    println!("  succeeded: {}", summary.succeeded);
    println!("  failed:    {}", summary.failed);
    println!("  skipped:   {}", summary.skipped);
    if summary.cancelled {
        println!("  (interrupted; remaining rows were not processed)");
    }
}
