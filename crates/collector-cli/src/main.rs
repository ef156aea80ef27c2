use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use collector_client::{EncodingTranscoder, FetchSettings, ReqwestFetcher, parse_flag};
use collector_core::source::source_urls;
use collector_core::{Collector, CompiledConfig, ExtractionConfig};

#[derive(Parser)]
#[command(name = "collector", version, about = "Rule-driven web content collector")]
struct Cli {
    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "COLLECTOR_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long, global = true, env = "COLLECTOR_USER_AGENT")]
    user_agent: Option<String>,

    /// Allow requests to private/reserved IP addresses
    #[arg(
        long,
        global = true,
        env = "COLLECTOR_ALLOW_PRIVATE",
        action = ArgAction::SetTrue,
        value_parser = flag_value
    )]
    allow_private: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the list-page URLs generated by a source
    Sources {
        /// Path to the JSON rule set
        #[arg(short, long)]
        config: PathBuf,

        /// Override the last page of a sequential source
        #[arg(short, long)]
        pages: Option<u32>,
    },

    /// Print the content links found on one list page (or feed) as JSON
    Links {
        /// Path to the JSON rule set
        #[arg(short, long)]
        config: PathBuf,

        /// List page or feed URL
        #[arg(short, long)]
        url: String,
    },

    /// Extract one record from a content page and print it as JSON
    Collect {
        /// Path to the JSON rule set
        #[arg(short, long)]
        config: PathBuf,

        /// Content page URL
        #[arg(short, long)]
        url: String,
    },

    /// Run the whole source and print one JSON record per line
    Crawl {
        /// Path to the JSON rule set
        #[arg(short, long)]
        config: PathBuf,

        /// Override the last page of a sequential source
        #[arg(short, long)]
        pages: Option<u32>,

        /// Stop after this many records
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("collector=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = fetch_settings(&cli)?;

    match cli.command {
        Commands::Sources { config, pages } => cmd_sources(&config, pages),
        Commands::Links { config, url } => {
            let collector = build_collector(&config, &settings)?;
            cmd_links(&collector, &url).await
        }
        Commands::Collect { config, url } => {
            let collector = build_collector(&config, &settings)?;
            cmd_collect(&collector, &url).await
        }
        Commands::Crawl {
            config,
            pages,
            limit,
        } => {
            let collector = build_collector(&config, &settings)?;
            cmd_crawl(&collector, pages, limit).await
        }
    }
}

type HttpCollector = Collector<ReqwestFetcher, EncodingTranscoder>;

/// Same on/off reading as `FetchSettings::from_env`, so `1` works for the flag's env var too.
fn flag_value(raw: &str) -> Result<bool, std::convert::Infallible> {
    Ok(parse_flag(raw))
}

/// Environment settings with command-line flags applied on top.
fn fetch_settings(cli: &Cli) -> Result<FetchSettings> {
    let mut settings = FetchSettings::from_env().context("Invalid fetch settings")?;
    if let Some(secs) = cli.timeout {
        anyhow::ensure!(secs > 0, "--timeout must be at least 1 second");
        settings.timeout = Duration::from_secs(secs);
    }
    if let Some(ua) = &cli.user_agent {
        settings.user_agent.clone_from(ua);
    }
    settings.allow_private |= cli.allow_private;
    Ok(settings)
}

fn load_config(path: &Path) -> Result<CompiledConfig> {
    ExtractionConfig::from_path(path)
        .and_then(ExtractionConfig::compile)
        .with_context(|| format!("Invalid rule set: {}", path.display()))
}

fn build_collector(config_path: &Path, settings: &FetchSettings) -> Result<HttpCollector> {
    let config = load_config(config_path)?;
    let fetcher = ReqwestFetcher::with_settings(settings).context("Failed to create HTTP client")?;
    Ok(Collector::new(fetcher, EncodingTranscoder, config))
}

fn cmd_sources(config_path: &Path, pages: Option<u32>) -> Result<()> {
    let config = load_config(config_path)?;
    for url in source_urls(&config.settings, pages) {
        println!("{url}");
    }
    Ok(())
}

async fn cmd_links(collector: &HttpCollector, url: &str) -> Result<()> {
    let links = collector
        .list_links(url)
        .await
        .with_context(|| format!("Failed to list links on {url}"))?;

    tracing::info!(count = links.len(), "Found links on {}", url);
    println!("{}", serde_json::to_string_pretty(&links)?);
    Ok(())
}

async fn cmd_collect(collector: &HttpCollector, url: &str) -> Result<()> {
    let record = collector.collect(url).await;

    if record.is_empty() {
        tracing::warn!("Nothing extracted from {}", url);
    }
    let hash = record.content_hash();
    tracing::info!(
        content_hash = %&hash[..8],
        pages = record.page_count(),
        "Extraction complete"
    );

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn cmd_crawl(
    collector: &HttpCollector,
    pages: Option<u32>,
    limit: Option<usize>,
) -> Result<()> {
    let records = collector.crawl(pages, limit).await;

    for record in &records {
        println!("{}", serde_json::to_string(record)?);
    }
    let empty = records.iter().filter(|r| r.is_empty()).count();
    tracing::info!(total = records.len(), empty, "Crawl complete");
    Ok(())
}
