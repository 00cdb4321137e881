//! Caller-owned cache of scrape outcomes keyed by `(url, page_count)`.
//!
//! Entries are addressed by a SHA-256 digest over the normalized URL and the
//! page count, so a 3-page result is never served for a 5-page request.
//! With a max age set, entries older than it (measured from the session's
//! `finished_at`) are dropped on lookup; callers can also invalidate explicitly.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use adscope_core::MAX_PAGE_COUNT;
use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::session::ScrapeOutcome;

/// Content-addressed store of [`ScrapeOutcome`] snapshots.
///
/// Only outcomes whose stop reason is cacheable (completed or ended on an
/// empty page) are stored. With a directory attached, entries are also written
/// as `<digest>.json` files and read back on a memory miss; disk errors are
/// logged and treated as misses.
#[derive(Debug, Default)]
pub struct ScrapeCache {
    entries: Mutex<HashMap<String, Arc<ScrapeOutcome>>>,
    dir: Option<PathBuf>,
    max_age: Option<Duration>,
}

impl ScrapeCache {
    /// In-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache that also persists entries under `dir`.
    #[must_use]
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            entries: Mutex::default(),
            dir: Some(dir.into()),
            max_age: None,
        }
    }

    /// Entries whose session finished more than `max_age` ago are treated as
    /// misses and removed.
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Cache key for `(url, page_count)`: hex SHA-256 of the trimmed URL
    /// without trailing slashes, a newline, and the page count.
    #[must_use]
    pub fn key(url: &str, page_count: u32) -> String {
        let normalized = normalize_url(url);
        let input = format!("{normalized}\n{page_count}");
        format!("{:x}", Sha256::digest(input.as_bytes()))
    }

    #[must_use]
    pub fn get(&self, url: &str, page_count: u32) -> Option<Arc<ScrapeOutcome>> {
        let key = Self::key(url, page_count);
        let in_memory = self.lock().get(&key).map(Arc::clone);
        let outcome = match in_memory {
            Some(hit) => hit,
            None => Arc::new(self.read_from_disk(&key)?),
        };

        if self.is_expired(&outcome) {
            tracing::info!(
                url = %outcome.url,
                page_count,
                finished_at = %outcome.finished_at,
                "cached scrape expired"
            );
            self.remove_from_disk(&key);
            self.lock().remove(&key);
            return None;
        }

        self.lock()
            .entry(key)
            .or_insert_with(|| Arc::clone(&outcome));
        Some(outcome)
    }

    /// Stores `outcome` under its own `(url, page_count)`.
    ///
    /// Returns `false` (and stores nothing) when the outcome is not cacheable.
    pub fn insert(&self, outcome: Arc<ScrapeOutcome>) -> bool {
        if !outcome.stop_reason.is_cacheable() {
            tracing::debug!(
                url = %outcome.url,
                stop_reason = ?outcome.stop_reason,
                "not caching incomplete scrape"
            );
            return false;
        }

        let key = Self::key(&outcome.url, outcome.page_count);
        self.write_to_disk(&key, &outcome);
        self.lock().insert(key, outcome);
        true
    }

    /// Drops the entry for exactly `(url, page_count)`. Returns whether an
    /// entry existed in memory.
    pub fn invalidate(&self, url: &str, page_count: u32) -> bool {
        let key = Self::key(url, page_count);
        self.remove_from_disk(&key);
        self.lock().remove(&key).is_some()
    }

    /// Drops every page-count variant cached for `url`. Returns the number of
    /// in-memory entries removed.
    pub fn invalidate_url(&self, url: &str) -> usize {
        (1..=MAX_PAGE_COUNT)
            .filter(|&page_count| self.invalidate(url, page_count))
            .count()
    }

    /// Drops every in-memory entry and every persisted entry.
    pub fn clear(&self) {
        self.lock().clear();
        let Some(dir) = &self.dir else {
            return;
        };
        let Ok(read_dir) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in read_dir.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                remove_file_logged(&path);
            }
        }
    }

    /// Number of in-memory entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<ScrapeOutcome>>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn is_expired(&self, outcome: &ScrapeOutcome) -> bool {
        let Some(max_age) = self.max_age else {
            return false;
        };
        Utc::now()
            .signed_duration_since(outcome.finished_at)
            .to_std()
            .is_ok_and(|age| age > max_age)
    }

    fn entry_path(&self, key: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(format!("{key}.json")))
    }

    fn read_from_disk(&self, key: &str) -> Option<ScrapeOutcome> {
        let path = self.entry_path(key)?;
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read cache entry");
                return None;
            }
        };
        match serde_json::from_slice::<ScrapeOutcome>(&bytes) {
            Ok(outcome) if outcome.stop_reason.is_cacheable() => Some(outcome),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt cache entry");
                None
            }
        }
    }

    fn write_to_disk(&self, key: &str, outcome: &ScrapeOutcome) {
        let Some(path) = self.entry_path(key) else {
            return;
        };
        let result = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|()| {
                let json = serde_json::to_vec(outcome).map_err(std::io::Error::other)?;
                std::fs::write(&path, json)
            });
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "failed to persist cache entry");
        }
    }

    fn remove_from_disk(&self, key: &str) {
        if let Some(path) = self.entry_path(key) {
            remove_file_logged(&path);
        }
    }
}

fn normalize_url(url: &str) -> &str {
    url.trim().trim_end_matches('/')
}

fn remove_file_logged(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove cache entry");
        }
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
