mod app_config;
mod categories;
mod config;
mod listings;
mod summary;

pub use app_config::AppConfig;
pub use categories::{
    builtin_categories, category_id_from_url, load_categories, CategoriesFile, CategoryConfig,
    CategoryRegistry,
};
pub use config::{
    load_app_config, load_app_config_from_env, DEFAULT_CACHE_TTL_SECS, DEFAULT_PAGE_COUNT,
    MAX_PAGE_COUNT, MIN_INTER_PAGE_DELAY_MS,
};
pub use listings::{
    is_valid_price, CleanListing, PriceBand, RawListing, MAX_VALID_PRICE, MIN_VALID_PRICE,
    PRICE_BAND_BREAKPOINTS, UNTITLED_LISTING,
};
pub use summary::{CityCount, CityMeanPrice, ListingFilter, ListingSummary, PriceStats};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read categories file {path}: {source}")]
    CategoriesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse categories file: {0}")]
    CategoriesFileParse(#[source] serde_yaml::Error),

    #[error("invalid category registry: {0}")]
    Validation(String),
}
