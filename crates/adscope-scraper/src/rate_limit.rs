//! Politeness pacing between page requests of one scrape session.
//!
//! Each session owns its own [`PagePacer`]; concurrent sessions never share
//! one, so each keeps an independent serialized cadence.

use std::time::Duration;

use adscope_core::MIN_INTER_PAGE_DELAY_MS;
use tokio::time::Instant;

/// Enforces a minimum gap between the completion of one page fetch and the
/// start of the next.
#[derive(Debug)]
pub struct PagePacer {
    delay: Duration,
    last_fetch: Option<Instant>,
}

impl PagePacer {
    /// Creates a pacer with `delay` between pages.
    ///
    /// Delays below [`MIN_INTER_PAGE_DELAY_MS`] are raised to that floor.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        let floor = Duration::from_millis(MIN_INTER_PAGE_DELAY_MS);
        let delay = if delay < floor {
            tracing::warn!(
                requested_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                floor_ms = MIN_INTER_PAGE_DELAY_MS,
                "inter-page delay below floor; using floor"
            );
            floor
        } else {
            delay
        };
        Self {
            delay,
            last_fetch: None,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Time left before the next request may start; zero before the first
    /// fetch.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.last_fetch.map_or(Duration::ZERO, |last| {
            (last + self.delay).saturating_duration_since(Instant::now())
        })
    }

    /// Sleeps until the next request may start.
    pub async fn wait_turn(&self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            tokio::time::sleep(remaining).await;
        }
    }

    /// Records that a page fetch just completed.
    pub fn mark_fetched(&mut self) {
        self.last_fetch = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_below_floor_is_raised() {
        let pacer = PagePacer::new(Duration::from_millis(10));
        assert_eq!(pacer.delay(), Duration::from_millis(MIN_INTER_PAGE_DELAY_MS));
    }

    #[test]
    fn delay_above_floor_is_kept() {
        let pacer = PagePacer::new(Duration::from_millis(2_500));
        assert_eq!(pacer.delay(), Duration::from_millis(2_500));
    }

    #[tokio::test(start_paused = true)]
    async fn first_turn_does_not_wait() {
        let pacer = PagePacer::new(Duration::from_secs(1));
        let start = Instant::now();
        pacer.wait_turn().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn second_turn_waits_full_delay() {
        let mut pacer = PagePacer::new(Duration::from_secs(1));
        pacer.mark_fetched();
        let start = Instant::now();
        pacer.wait_turn().await;
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn time_spent_elsewhere_counts_toward_delay() {
        let mut pacer = PagePacer::new(Duration::from_secs(1));
        pacer.mark_fetched();
        tokio::time::advance(Duration::from_millis(600)).await;
        assert_eq!(pacer.remaining(), Duration::from_millis(400));
    }
}
