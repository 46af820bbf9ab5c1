use std::time::Duration;

use crate::config::RetryConfig;
use crate::probe::ProbeError;

/// Decision taken when a pass runs out of candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Settle as failed.
    NoRetry,
    /// Run one more pass after the given delay.
    RetryAfter(Duration),
}

/// Single delayed retry, only for passes that ended on a timeout.
///
/// A timeout usually means a transient connectivity problem; transport errors
/// and placeholders mean the candidates really are bad, so another pass over
/// the same space is pointless.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub delay: Duration,
    /// Consecutive timeouts tolerated within one pass before it is abandoned.
    pub max_consecutive_timeouts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryConfig::default().into()
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(cfg: RetryConfig) -> Self {
        Self {
            delay: Duration::from_millis(cfg.delay_ms),
            max_consecutive_timeouts: cfg.max_consecutive_timeouts,
        }
    }
}

impl RetryPolicy {
    /// `retry_pass` is true when the pass that just ended was already the retry.
    pub fn decide(&self, retry_pass: bool, last_error: Option<ProbeError>) -> RetryDecision {
        if retry_pass {
            return RetryDecision::NoRetry;
        }
        match last_error {
            Some(ProbeError::Timeout) => RetryDecision::RetryAfter(self.delay),
            _ => RetryDecision::NoRetry,
        }
    }

    /// Whether a run of `consecutive` timeouts should cut the pass short.
    pub fn should_abort(&self, consecutive: u32) -> bool {
        consecutive > self.max_consecutive_timeouts
    }
}
