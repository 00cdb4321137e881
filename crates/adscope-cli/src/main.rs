mod export;
mod report;
mod scrape;

use std::path::PathBuf;

use adscope_core::{CategoryRegistry, ListingFilter};
use clap::{ArgGroup, Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::export::ExportFormat;

#[derive(Debug, Parser)]
#[command(name = "adscope")]
#[command(about = "Scrape, clean, summarize and export classified-ad listings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the configured listing categories
    Categories,
    /// Scrape one category, clean the listings and print a summary
    Scrape(ScrapeArgs),
    /// Scrape every configured category and merge the results
    ScrapeAll(ScrapeAllArgs),
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("target").required(true).args(["category", "url"])))]
pub(crate) struct ScrapeArgs {
    /// Category label or identifier from the registry (e.g. "vetements-homme")
    #[arg(long)]
    pub category: Option<String>,

    /// Category listing URL, for categories not in the registry
    #[arg(long)]
    pub url: Option<String>,

    /// Export file; the format is taken from the extension unless --format is given
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub(crate) struct ScrapeAllArgs {
    /// Directory for the merged export (defaults to ADSCOPE_EXPORT_DIR)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Keep only listings from this category, by label or identifier (repeatable)
    #[arg(long)]
    pub source_category: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub(crate) struct CommonArgs {
    /// Pages to scrape per category (defaults to ADSCOPE_DEFAULT_PAGE_COUNT)
    #[arg(long)]
    pub pages: Option<u32>,

    /// Export format; nothing is exported when neither this nor an output path is given
    #[arg(long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Comma-separated export columns, in output order
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Export raw listings instead of cleaned ones
    #[arg(long)]
    pub raw: bool,

    /// Keep only listings in this city (repeatable)
    #[arg(long)]
    pub city: Vec<String>,

    /// Keep only listings priced at or above this amount (CFA)
    #[arg(long)]
    pub min_price: Option<u64>,

    /// Keep only listings priced at or below this amount (CFA)
    #[arg(long)]
    pub max_price: Option<u64>,

    /// Ignore and replace any cached result for this request
    #[arg(long)]
    pub refresh: bool,

    /// Neither read nor write the scrape cache
    #[arg(long, conflicts_with = "refresh")]
    pub no_cache: bool,
}

impl CommonArgs {
    pub(crate) fn filter(&self) -> ListingFilter {
        ListingFilter {
            categories: Vec::new(),
            cities: self.city.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Cancels `token` on Ctrl-C so running sessions stop before their next page.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("interrupt received; finishing the current page");
            token.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = adscope_core::load_app_config()?;
    init_tracing(&config.log_level);

    let registry = CategoryRegistry::from_optional_path(config.categories_path.as_deref())?;

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    match cli.command {
        Commands::Categories => scrape::print_categories(&registry),
        Commands::Scrape(args) => scrape::run_scrape(&config, &registry, &args, &cancel).await?,
        Commands::ScrapeAll(args) => {
            scrape::run_scrape_all(&config, &registry, &args, &cancel).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
