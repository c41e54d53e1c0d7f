mod export;
mod scrape;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::export::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "mapy-cli")]
#[command(about = "Mapy.com places and business listing scraper")]
struct Cli {
    /// Scraper settings file (JSON). Missing or invalid files fall back to defaults.
    #[arg(long, global = true, default_value = "config/settings.json")]
    settings: PathBuf,

    /// Log level used when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run scraping jobs and export the normalized, deduplicated dataset.
    Scrape {
        /// Jobs file: a JSON array, or YAML for `.yaml`/`.yml`.
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Output format; defaults to the output file extension, then JSON.
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Re-normalize and deduplicate an existing JSON dataset without network access.
    Normalize {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Scrape {
            input,
            output,
            format,
        } => scrape::run_scrape(&cli.settings, &input, &output, format).await,
        Commands::Normalize {
            input,
            output,
            format,
        } => scrape::run_normalize(&input, &output, format),
    }
}

/// Logs go to stderr so stdout stays free for run summaries.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
