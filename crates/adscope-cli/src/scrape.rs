//! `categories`, `scrape` and `scrape-all` command handlers.
//!
//! Session-level failures are reported, not propagated: a session that stops
//! on a fetch error still yields its partial listings. Only invalid input and
//! export failures end the command with an error.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use adscope_core::{
    category_id_from_url, AppConfig, CategoryConfig, CategoryRegistry, CleanListing,
    ListingFilter, ListingSummary, RawListing,
};
use adscope_scraper::{
    normalize_with_report, CachedScrape, CardExtractor, ListingClient, NormalizeReport,
    Orchestrator, OutcomeSource, ScrapeCache, ScrapeEvent, ScrapeRequest,
};
use chrono::{Local, NaiveDateTime};
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::export::{self, Column, ExportFormat, Row};
use crate::report;
use crate::{CommonArgs, ScrapeAllArgs, ScrapeArgs};

/// File-name stem for merged `scrape-all` exports.
const ALL_CATEGORIES_STEM: &str = "all-categories";

pub(crate) fn print_categories(registry: &CategoryRegistry) {
    for category in registry.iter() {
        println!(
            "{:<22} {:<20} {}",
            category.label,
            category.id(),
            category.url
        );
    }
}

pub(crate) async fn run_scrape(
    config: &AppConfig,
    registry: &CategoryRegistry,
    args: &ScrapeArgs,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let (label, url) = resolve_target(registry, args.category.as_deref(), args.url.as_deref())?;
    let page_count = args.common.pages.unwrap_or(config.default_page_count);
    let request = ScrapeRequest::new(&url, page_count)?;
    let columns = export::resolve_columns(&args.common.columns, args.common.raw)?;
    let filter = args.common.filter();
    let stem = export_stem(request.source_category());
    let target = export_target(
        args.common.format,
        args.out.as_deref(),
        &config.export_dir,
        &stem,
        Local::now().naive_local(),
    )?;

    let orchestrator = build_orchestrator(config)?;
    let cache = build_cache(config, &args.common);

    let scraped = run_session(
        &orchestrator,
        &request,
        cache.as_ref(),
        args.common.refresh,
        cancel,
        &label,
    )
    .await;
    let outcome = &scraped.outcome;

    let normalized = normalize_with_report(&outcome.listings);
    print!(
        "{}",
        report::render_outcome(outcome, scraped.source, &normalized)
    );

    let clean = filter.apply(&normalized.listings);
    println!();
    print!(
        "{}",
        report::render_summary(&ListingSummary::from_listings(&clean))
    );

    if let Some((format, path)) = target {
        let rows = export_rows(args.common.raw, &filter, &outcome.listings, &clean);
        write_rows(&path, format, &columns, &rows)?;
    }
    Ok(())
}

pub(crate) async fn run_scrape_all(
    config: &AppConfig,
    registry: &CategoryRegistry,
    args: &ScrapeAllArgs,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let page_count = args.common.pages.unwrap_or(config.default_page_count);
    let requests = registry
        .iter()
        .map(|c| -> anyhow::Result<(String, ScrapeRequest)> {
            Ok((c.label.clone(), ScrapeRequest::new(&c.url, page_count)?))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let columns = export::resolve_columns(&args.common.columns, args.common.raw)?;
    let filter = scrape_all_filter(registry, args)?;
    let export_dir = args.out_dir.as_deref().unwrap_or(&config.export_dir);
    let target = export_target(
        args.common.format,
        None,
        export_dir,
        ALL_CATEGORIES_STEM,
        Local::now().naive_local(),
    )?;

    let orchestrator = build_orchestrator(config)?;
    let cache = build_cache(config, &args.common);
    let max_concurrent = config.scraper_max_concurrent_categories.max(1);

    tracing::info!(
        categories = requests.len(),
        page_count,
        max_concurrent,
        "scraping all categories"
    );

    // Each session keeps its own pacer and accumulation; only the HTTP client
    // and the cache are shared.
    let mut results: Vec<(usize, CachedScrape)> = stream::iter(requests.iter().enumerate())
        .map(|(idx, (label, request))| {
            let orchestrator = &orchestrator;
            let cache = cache.as_ref();
            async move {
                let scraped = run_session(
                    orchestrator,
                    request,
                    cache,
                    args.common.refresh,
                    cancel,
                    label,
                )
                .await;
                (idx, scraped)
            }
        })
        .buffer_unordered(max_concurrent)
        .collect()
        .await;
    results.sort_by_key(|(idx, _)| *idx);

    let mut all_raw: Vec<RawListing> = Vec::new();
    let mut merged = NormalizeReport::default();
    let mut failed = 0usize;

    for (_, scraped) in &results {
        let outcome = &scraped.outcome;
        let normalized = normalize_with_report(&outcome.listings);
        print!(
            "{}",
            report::render_outcome(outcome, scraped.source, &normalized)
        );
        if outcome.stop_reason.is_failure() {
            failed += 1;
        }
        all_raw.extend(outcome.listings.iter().cloned());
        merged.unparsable_price += normalized.unparsable_price;
        merged.out_of_range += normalized.out_of_range;
        merged.listings.extend(normalized.listings);
    }

    if !results.is_empty() && failed == results.len() {
        anyhow::bail!("all {failed} category scrapes failed; see warnings above");
    }

    let clean = filter.apply(&merged.listings);
    println!();
    print!(
        "{}",
        report::render_summary(&ListingSummary::from_listings(&clean))
    );

    if let Some((format, path)) = target {
        let rows = export_rows(args.common.raw, &filter, &all_raw, &clean);
        write_rows(&path, format, &columns, &rows)?;
    }
    Ok(())
}

fn build_orchestrator(config: &AppConfig) -> anyhow::Result<Orchestrator<ListingClient>> {
    let client = ListingClient::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build listing client: {e}"))?;
    Ok(Orchestrator::new(
        client,
        CardExtractor::new(config.site_origin.as_str()),
        Duration::from_millis(config.scraper_inter_page_delay_ms),
    ))
}

/// Persistent cache under `<export_dir>/.cache`, unless disabled. Entries
/// older than `cache_ttl_secs` are scraped again.
fn build_cache(config: &AppConfig, common: &CommonArgs) -> Option<ScrapeCache> {
    if common.no_cache {
        None
    } else {
        Some(
            ScrapeCache::with_dir(config.export_dir.join(".cache"))
                .with_max_age(Duration::from_secs(config.cache_ttl_secs)),
        )
    }
}

async fn run_session(
    orchestrator: &Orchestrator<ListingClient>,
    request: &ScrapeRequest,
    cache: Option<&ScrapeCache>,
    refresh: bool,
    cancel: &CancellationToken,
    label: &str,
) -> CachedScrape {
    let on_event = |event: ScrapeEvent<'_>| eprintln!("{}", report::render_event(label, &event));

    match cache {
        Some(cache) => {
            if refresh && cache.invalidate(request.url(), request.page_count()) {
                tracing::info!(url = request.url(), "dropped cached result");
            }
            orchestrator
                .scrape_cached(request, cache, cancel, on_event)
                .await
        }
        None => CachedScrape {
            outcome: Arc::new(orchestrator.scrape(request, cancel, on_event).await),
            source: OutcomeSource::Scraped,
        },
    }
}

/// Resolves `--category` / `--url` into `(label, url)`.
fn resolve_target(
    registry: &CategoryRegistry,
    category: Option<&str>,
    url: Option<&str>,
) -> anyhow::Result<(String, String)> {
    match (category, url) {
        (Some(key), _) => registry
            .find(key)
            .map(|c| (c.label.clone(), c.url.clone()))
            .ok_or_else(|| {
                anyhow::anyhow!("unknown category '{key}'; run `adscope categories` to list them")
            }),
        (None, Some(url)) => Ok((category_id_from_url(url), url.to_owned())),
        (None, None) => anyhow::bail!("either --category or --url is required"),
    }
}

/// `scrape-all` listing filter, with `--source-category` keys (labels or
/// identifiers) resolved to registry identifiers.
fn scrape_all_filter(
    registry: &CategoryRegistry,
    args: &ScrapeAllArgs,
) -> anyhow::Result<ListingFilter> {
    let categories = args
        .source_category
        .iter()
        .map(|key| {
            registry.find(key).map(CategoryConfig::id).ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown source category '{key}'; run `adscope categories` to list them"
                )
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(ListingFilter {
        categories,
        ..args.common.filter()
    })
}

fn export_stem(source_category: &str) -> String {
    if source_category.is_empty() {
        "listings".to_owned()
    } else {
        source_category.to_owned()
    }
}

/// Decides whether and where to export.
///
/// No format and no path means no export. A path without a format takes the
/// format from its extension; a format without a path writes a timestamped
/// file under `export_dir`.
fn export_target(
    format: Option<ExportFormat>,
    out: Option<&Path>,
    export_dir: &Path,
    stem: &str,
    now: NaiveDateTime,
) -> anyhow::Result<Option<(ExportFormat, PathBuf)>> {
    match (format, out) {
        (None, None) => Ok(None),
        (Some(format), Some(path)) => Ok(Some((format, path.to_path_buf()))),
        (None, Some(path)) => {
            let format = ExportFormat::from_path(path).ok_or_else(|| {
                anyhow::anyhow!(
                    "cannot infer export format from {}; pass --format",
                    path.display()
                )
            })?;
            Ok(Some((format, path.to_path_buf())))
        }
        (Some(format), None) => Ok(Some((
            format,
            export_dir.join(export::default_file_name(stem, now, format)),
        ))),
    }
}

/// Rows to export: cleaned listings after filtering, or every raw listing
/// with `--raw`.
fn export_rows<'a>(
    raw_mode: bool,
    filter: &ListingFilter,
    raw: &'a [RawListing],
    clean: &'a [CleanListing],
) -> Vec<Row<'a>> {
    if raw_mode {
        if !filter.is_unrestricted() {
            tracing::warn!("listing filters apply to cleaned listings only; raw export is unfiltered");
        }
        raw.iter().map(Row::Raw).collect()
    } else {
        clean.iter().map(Row::Clean).collect()
    }
}

fn write_rows(
    path: &Path,
    format: ExportFormat,
    columns: &[Column],
    rows: &[Row<'_>],
) -> anyhow::Result<()> {
    export::export_to_path(path, format, columns, rows)?;
    println!("\nexported {} rows to {}", rows.len(), path.display());
    Ok(())
}
