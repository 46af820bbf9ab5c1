//! Fetch seam between the prober and whatever actually loads images.

use std::time::Duration;

use async_trait::async_trait;

/// Terminal result of loading one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Real image content arrived.
    Loaded,
    /// Something arrived, but it is an error placeholder (too small, not an image).
    Degenerate,
    /// The request failed outright (DNS, connect, non-2xx, reset).
    TransportError,
    /// The deadline passed first.
    TimedOut,
}

/// Loads an address and reports how it went.
///
/// Implementations should honour `deadline` themselves where they can; the
/// prober enforces it regardless and abandons fetches that overrun.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, address: &str, deadline: Duration) -> FetchOutcome;
}
