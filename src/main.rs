use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use std::{env, fs};

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use markfetch::fetcher::HttpFetcher;
use markfetch::pipeline::{FailedUrl, Pipeline};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_USER_AGENT: &str = concat!("markfetch/", env!("CARGO_PKG_VERSION"));

#[derive(Parser)]
#[command(name = "markfetch", about = "Convert web pages into clean markdown notes")]
struct Cli {
    /// File with one URL per line, or "-" for stdin
    input: PathBuf,

    /// Destination for the combined markdown stream
    #[arg(short, long, default_value = "output.txt")]
    output: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Print a JSON batch summary to stdout
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct BatchSummary<'a> {
    converted: usize,
    output: String,
    failures: &'a [FailedUrl],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let urls = read_urls(&cli.input)?;

    let user_agent =
        env::var("MARKFETCH_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());
    let fetcher = HttpFetcher::new(Duration::from_secs(cli.timeout_secs), &user_agent)?;
    let batch = Pipeline::new(fetcher).run(&urls).await?;

    fs::write(&cli.output, batch.render())
        .with_context(|| format!("write {}", cli.output.display()))?;
    tracing::info!(
        "wrote {} records to {} ({} failed)",
        batch.records.len(),
        cli.output.display(),
        batch.failures.len()
    );

    if cli.json {
        let summary = BatchSummary {
            converted: batch.records.len(),
            output: cli.output.display().to_string(),
            failures: &batch.failures,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

fn read_urls(input: &PathBuf) -> anyhow::Result<Vec<String>> {
    let raw = if input.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?
    };
    Ok(raw.lines().map(str::to_string).collect())
}
