//! One sequential pass over a candidate list.

use std::time::Duration;

use crate::address::Address;
use crate::outcome_cache::OutcomeCache;
use crate::probe::{ProbeError, Prober};

use super::policy::RetryPolicy;

/// Working state of one pass. Lives only as long as the pass.
#[derive(Debug)]
pub(crate) struct ResolutionAttempt {
    candidates: Vec<Address>,
    cursor: usize,
    pub(crate) last_error: Option<ProbeError>,
    consecutive_timeouts: u32,
    pub(crate) probes: usize,
    pub(crate) aborted: bool,
    pub(crate) retry_pass: bool,
}

impl ResolutionAttempt {
    pub(crate) fn new(candidates: Vec<Address>, retry_pass: bool) -> Self {
        Self {
            candidates,
            cursor: 0,
            last_error: None,
            consecutive_timeouts: 0,
            probes: 0,
            aborted: false,
            retry_pass,
        }
    }

    fn next(&mut self) -> Option<Address> {
        let next = self.candidates.get(self.cursor).cloned();
        self.cursor += 1;
        next
    }

    fn record_failure(&mut self, e: ProbeError) {
        if e == ProbeError::CachedFailure {
            return;
        }
        self.last_error = Some(e);
        if e == ProbeError::Timeout {
            self.consecutive_timeouts += 1;
        } else {
            self.consecutive_timeouts = 0;
        }
    }
}

/// Probe candidates in order until one works.
///
/// Strictly sequential, so failures recorded by one probe let later
/// candidates on the same host be skipped without I/O.
pub(crate) async fn run_pass(
    prober: &Prober,
    cache: &OutcomeCache,
    policy: &RetryPolicy,
    budget: Duration,
    attempt: &mut ResolutionAttempt,
) -> Option<Address> {
    while let Some(candidate) = attempt.next() {
        if cache.is_failed(&candidate.host_cluster()) {
            continue;
        }
        attempt.probes += 1;
        match prober.probe(&candidate.render(), budget).await {
            Ok(()) => return Some(candidate),
            Err(e) => {
                attempt.record_failure(e);
                if policy.should_abort(attempt.consecutive_timeouts) {
                    tracing::info!(
                        timeouts = attempt.consecutive_timeouts,
                        "too many consecutive timeouts, abandoning pass"
                    );
                    attempt.aborted = true;
                    return None;
                }
            }
        }
    }
    None
}
