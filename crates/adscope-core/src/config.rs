use crate::app_config::AppConfig;
use crate::ConfigError;

/// Upper bound on pages per scrape session.
pub const MAX_PAGE_COUNT: u32 = 20;

/// Pages scraped when the caller does not ask for a specific count.
pub const DEFAULT_PAGE_COUNT: u32 = 5;

/// Default age limit for cached scrape results.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3_600;

/// Smallest permitted pause between two page requests of one session.
pub const MIN_INTER_PAGE_DELAY_MS: u64 = 1_000;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation live here, decoupled from the process environment,
/// so tests can drive it with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let log_level = or_default("ADSCOPE_LOG_LEVEL", "info");
    let categories_path = lookup("ADSCOPE_CATEGORIES_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let site_origin = or_default("ADSCOPE_SITE_ORIGIN", "https://sn.coinafrique.com")
        .trim_end_matches('/')
        .to_string();
    if !site_origin.starts_with("https://") && !site_origin.starts_with("http://") {
        return Err(invalid(
            "ADSCOPE_SITE_ORIGIN",
            format!("'{site_origin}' is not an http(s) origin"),
        ));
    }

    let scraper_request_timeout_secs = parse_u64("ADSCOPE_SCRAPER_REQUEST_TIMEOUT_SECS", "10")?;
    if scraper_request_timeout_secs == 0 {
        return Err(invalid(
            "ADSCOPE_SCRAPER_REQUEST_TIMEOUT_SECS",
            "timeout must be at least 1 second".to_string(),
        ));
    }

    let scraper_user_agent = or_default("ADSCOPE_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);

    let scraper_inter_page_delay_ms = parse_u64("ADSCOPE_SCRAPER_INTER_PAGE_DELAY_MS", "1000")?;
    if scraper_inter_page_delay_ms < MIN_INTER_PAGE_DELAY_MS {
        return Err(invalid(
            "ADSCOPE_SCRAPER_INTER_PAGE_DELAY_MS",
            format!("{scraper_inter_page_delay_ms} ms is below the {MIN_INTER_PAGE_DELAY_MS} ms floor"),
        ));
    }

    let scraper_max_concurrent_categories =
        parse_usize("ADSCOPE_SCRAPER_MAX_CONCURRENT_CATEGORIES", "1")?;
    if scraper_max_concurrent_categories == 0 {
        return Err(invalid(
            "ADSCOPE_SCRAPER_MAX_CONCURRENT_CATEGORIES",
            "must be at least 1".to_string(),
        ));
    }

    let default_page_count =
        parse_u32("ADSCOPE_DEFAULT_PAGE_COUNT", &DEFAULT_PAGE_COUNT.to_string())?;
    if !(1..=MAX_PAGE_COUNT).contains(&default_page_count) {
        return Err(invalid(
            "ADSCOPE_DEFAULT_PAGE_COUNT",
            format!("{default_page_count} is outside 1..={MAX_PAGE_COUNT}"),
        ));
    }

    let export_dir = PathBuf::from(or_default("ADSCOPE_EXPORT_DIR", "./exports"));

    let cache_ttl_secs =
        parse_u64("ADSCOPE_CACHE_TTL_SECS", &DEFAULT_CACHE_TTL_SECS.to_string())?;
    if cache_ttl_secs == 0 {
        return Err(invalid(
            "ADSCOPE_CACHE_TTL_SECS",
            "must be at least 1 second; pass --no-cache to skip the cache".to_string(),
        ));
    }

    Ok(AppConfig {
        log_level,
        categories_path,
        site_origin,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_inter_page_delay_ms,
        scraper_max_concurrent_categories,
        default_page_count,
        export_dir,
        cache_ttl_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
