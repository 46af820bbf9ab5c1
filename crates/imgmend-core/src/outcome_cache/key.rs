use std::fmt;

use anyhow::{Context, Result};

/// Key used to remember unreachable hosts.
///
/// We normalise addresses down to `(scheme, host)` so that one timed-out
/// server is not retried for other resources pointed at it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostClusterKey {
    pub scheme: String,
    pub host: String,
}

impl HostClusterKey {
    /// Construct a host cluster key from any URL string.
    pub fn from_url(url: &str) -> Result<Self> {
        let parsed =
            url::Url::parse(url).with_context(|| format!("invalid URL for host cluster: {url}"))?;

        let scheme = parsed.scheme().to_string();
        let host = parsed
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("URL missing host for host cluster: {url}"))?
            .to_ascii_lowercase();

        Ok(Self { scheme, host })
    }
}

impl fmt::Display for HostClusterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)
    }
}
