use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// YAML category registry; the built-in registry is used when `None`.
    pub categories_path: Option<PathBuf>,
    /// Origin that relative listing links are resolved against.
    pub site_origin: String,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_inter_page_delay_ms: u64,
    pub scraper_max_concurrent_categories: usize,
    pub default_page_count: u32,
    pub export_dir: PathBuf,
    /// Cached scrape results older than this are scraped again.
    pub cache_ttl_secs: u64,
}
