//! HTTP fetcher backed by libcurl.
//!
//! Issues a GET, keeps at most `max_body_bytes` of the body and hands it to
//! the content check. The transfer runs on the blocking pool; if the prober
//! gives up on it, the thread finishes on its own and the result is dropped.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::ContentConfig;

use super::classify::{classify_curl_error, classify_http_status};
use super::content;
use super::fetch::{FetchOutcome, Fetcher};

const USER_AGENT: &str = concat!("imgmend/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    content: ContentConfig,
}

impl CurlFetcher {
    pub fn new(content: ContentConfig) -> Self {
        Self { content }
    }
}

#[async_trait]
impl Fetcher for CurlFetcher {
    async fn fetch(&self, address: &str, deadline: Duration) -> FetchOutcome {
        let address = address.to_string();
        let content = self.content.clone();
        match tokio::task::spawn_blocking(move || fetch_blocking(&address, deadline, &content))
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("fetch task failed: {}", e);
                FetchOutcome::TransportError
            }
        }
    }
}

/// Blocking GET of `url`. Runs in the current thread.
pub fn fetch_blocking(url: &str, deadline: Duration, cfg: &ContentConfig) -> FetchOutcome {
    let mut body: Vec<u8> = Vec::new();
    let cap = cfg.max_body_bytes;

    let mut easy = curl::easy::Easy::new();
    let setup = (|| -> Result<(), curl::Error> {
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.useragent(USER_AGENT)?;
        easy.connect_timeout(deadline)?;
        easy.timeout(deadline)?;
        Ok(())
    })();
    if let Err(e) = setup {
        tracing::debug!(url, "curl setup failed: {}", e);
        return FetchOutcome::TransportError;
    }

    let performed = {
        let mut transfer = easy.transfer();
        let registered = transfer.write_function(|data| {
            let room = cap.saturating_sub(body.len());
            if room == 0 {
                // Short write aborts the transfer; the header is all we need.
                return Ok(0);
            }
            let take = room.min(data.len());
            body.extend_from_slice(&data[..take]);
            Ok(if take == data.len() { take } else { 0 })
        });
        match registered {
            Ok(()) => transfer.perform(),
            Err(e) => Err(e),
        }
    };

    if let Err(e) = performed {
        let capped = e.is_write_error() && body.len() >= cap;
        if !capped {
            let outcome = classify_curl_error(&e);
            tracing::debug!(url, ?outcome, "curl transfer failed: {}", e);
            return outcome;
        }
    }

    let code = match easy.response_code() {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(url, "no response code: {}", e);
            return FetchOutcome::TransportError;
        }
    };
    if let Some(outcome) = classify_http_status(code) {
        tracing::debug!(url, code, "HTTP error status");
        return outcome;
    }

    content::inspect(&body, cfg)
}
