//! Reachability probing.
//!
//! One probe is one fetch attempt for one candidate, raced against a
//! deadline. Probes consult the failure cache before doing any I/O and feed
//! every real failure back into it.

mod classify;
mod content;
mod fetch;
mod http;

use std::sync::Arc;
use std::time::Duration;

use crate::outcome_cache::{HostClusterKey, OutcomeCache};

pub use classify::{classify_curl_error, classify_http_status, is_success_status};
pub use content::inspect;
pub use fetch::{FetchOutcome, Fetcher};
pub use http::{fetch_blocking, CurlFetcher};

/// Why a probe did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// Host cluster was already known to be down; nothing was sent.
    #[error("host cluster previously failed")]
    CachedFailure,
    #[error("probe timed out")]
    Timeout,
    #[error("transport error")]
    Transport,
    /// A response arrived but it is an error placeholder.
    #[error("degenerate content")]
    Degenerate,
}

#[derive(Clone)]
pub struct Prober {
    cache: Arc<OutcomeCache>,
    fetcher: Arc<dyn Fetcher>,
}

impl Prober {
    pub fn new(cache: Arc<OutcomeCache>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { cache, fetcher }
    }

    /// Single attempt, no internal retry.
    pub async fn probe(&self, address: &str, budget: Duration) -> Result<(), ProbeError> {
        let key = match HostClusterKey::from_url(address) {
            Ok(key) => key,
            Err(e) => {
                tracing::debug!("not probing {}: {:#}", address, e);
                return Err(ProbeError::Transport);
            }
        };
        if self.cache.is_failed(&key) {
            return Err(ProbeError::CachedFailure);
        }

        // Dropping the fetch future on timeout abandons it.
        let outcome = tokio::time::timeout(budget, self.fetcher.fetch(address, budget))
            .await
            .unwrap_or(FetchOutcome::TimedOut);

        let result = match outcome {
            FetchOutcome::Loaded => Ok(()),
            FetchOutcome::Degenerate => Err(ProbeError::Degenerate),
            FetchOutcome::TransportError => Err(ProbeError::Transport),
            FetchOutcome::TimedOut => Err(ProbeError::Timeout),
        };
        match result {
            Ok(()) => tracing::debug!(address, "probe succeeded"),
            Err(e) => {
                tracing::debug!(address, error = %e, "probe failed");
                self.cache.record_failure(key);
            }
        }
        result
    }
}

impl std::fmt::Debug for Prober {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prober").field("cache", &self.cache).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        outcome: FetchOutcome,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(outcome: FetchOutcome) -> Arc<Self> {
            Self::slow(outcome, Duration::ZERO)
        }

        fn slow(outcome: FetchOutcome, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                delay,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Fetcher for Fixed {
        async fn fetch(&self, _address: &str, _deadline: Duration) -> FetchOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.outcome
        }
    }

    const URL: &str = "https://k03.mbdny.org/a/1.jpg";

    fn key() -> HostClusterKey {
        HostClusterKey::from_url(URL).unwrap()
    }

    #[tokio::test]
    async fn success_leaves_cache_untouched() {
        let cache = Arc::new(OutcomeCache::new());
        let prober = Prober::new(cache.clone(), Fixed::new(FetchOutcome::Loaded));
        assert_eq!(prober.probe(URL, Duration::from_secs(1)).await, Ok(()));
        assert!(!cache.is_failed(&key()));
    }

    #[tokio::test]
    async fn failures_mark_host_cluster() {
        for (outcome, expected) in [
            (FetchOutcome::Degenerate, ProbeError::Degenerate),
            (FetchOutcome::TransportError, ProbeError::Transport),
            (FetchOutcome::TimedOut, ProbeError::Timeout),
        ] {
            let cache = Arc::new(OutcomeCache::new());
            let prober = Prober::new(cache.clone(), Fixed::new(outcome));
            assert_eq!(prober.probe(URL, Duration::from_secs(1)).await, Err(expected));
            assert!(cache.is_failed(&key()));
        }
    }

    #[tokio::test]
    async fn cached_failure_skips_fetch() {
        let cache = Arc::new(OutcomeCache::new());
        cache.record_failure(key());
        let fetcher = Fixed::new(FetchOutcome::Loaded);
        let prober = Prober::new(cache, fetcher.clone());
        assert_eq!(
            prober.probe("https://k03.mbdny.org/other/9.jpg", Duration::from_secs(1)).await,
            Err(ProbeError::CachedFailure)
        );
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_beats_slow_fetch() {
        let cache = Arc::new(OutcomeCache::new());
        let fetcher = Fixed::slow(FetchOutcome::Loaded, Duration::from_secs(60));
        let prober = Prober::new(cache.clone(), fetcher);
        assert_eq!(
            prober.probe(URL, Duration::from_millis(500)).await,
            Err(ProbeError::Timeout)
        );
        assert!(cache.is_failed(&key()));
    }

    #[tokio::test]
    async fn unparseable_address_is_transport_error() {
        let cache = Arc::new(OutcomeCache::new());
        let prober = Prober::new(cache.clone(), Fixed::new(FetchOutcome::Loaded));
        assert_eq!(
            prober.probe("::nope::", Duration::from_secs(1)).await,
            Err(ProbeError::Transport)
        );
        assert_eq!(cache.stats().failed_hosts, 0);
    }
}
