//! Resolution engine.
//!
//! Coordinates the pieces for one resource at a time:
//! parse -> generate candidates -> probe sequentially -> update cache ->
//! apply the winner, with one delayed retry pass for timeout-heavy failures.
//! Many resources may be resolving concurrently; each resource has at most
//! one resolution in flight.

mod pass;
mod policy;
mod resource;
mod state;
mod variants;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::address::{Address, AddressParser};
use crate::candidates::{self, Candidate};
use crate::config::MendConfig;
use crate::outcome_cache::OutcomeCache;
use crate::probe::{Fetcher, Prober};
use crate::rewriter;

use pass::{run_pass, ResolutionAttempt};

pub use policy::{RetryDecision, RetryPolicy};
pub use resource::{Resource, ResourceId};
pub use state::{ResolutionState, ResourceRecord, SwapRecord};
pub use variants::rewrite_variants;

/// What a call into the resolver did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A working address was found (or a fast swap was confirmed) and applied.
    Resolved(Address),
    /// Already in flight or already resolved; nothing was done.
    Skipped,
    /// The address is not in the recognized family.
    NotApplicable,
    /// The pass failed on timeouts; one delayed retry pass is pending.
    RetryScheduled,
    /// No candidate worked and no retry remains.
    Failed,
}

struct Inner {
    config: MendConfig,
    parser: AddressParser,
    cache: Arc<OutcomeCache>,
    prober: Prober,
    policy: RetryPolicy,
    tracker: state::Tracker,
}

/// Shared handle to the engine. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct Resolver {
    inner: Arc<Inner>,
}

impl Resolver {
    /// Engine with a fresh outcome cache.
    pub fn new(config: MendConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        Self::with_cache(config, fetcher, Arc::new(OutcomeCache::new()))
    }

    /// Engine over an existing outcome cache.
    pub fn with_cache(
        config: MendConfig,
        fetcher: Arc<dyn Fetcher>,
        cache: Arc<OutcomeCache>,
    ) -> Result<Self> {
        config.validate()?;
        let parser = AddressParser::new(&config.hosts)?;
        let policy = RetryPolicy::from(config.retry_policy());
        let prober = Prober::new(Arc::clone(&cache), fetcher);
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                parser,
                cache,
                prober,
                policy,
                tracker: state::Tracker::default(),
            }),
        })
    }

    pub fn config(&self) -> &MendConfig {
        &self.inner.config
    }

    pub fn parser(&self) -> &AddressParser {
        &self.inner.parser
    }

    pub fn cache(&self) -> &Arc<OutcomeCache> {
        &self.inner.cache
    }

    pub fn state(&self, id: ResourceId) -> ResolutionState {
        self.inner.tracker.state(id)
    }

    /// Candidate list the resolver would walk for `address` right now, best
    /// first and tagged with their tier. `None` if the address is not
    /// recognized.
    pub fn candidates(&self, address: &str) -> Option<Vec<Candidate>> {
        let addr = self.inner.parser.parse(address)?;
        Some(candidates::generate_tagged(&addr, &self.inner.cache, &self.inner.config))
    }

    /// Swap a known-unreliable address for its likely-good twin without probing.
    ///
    /// Returns whether a swap was applied. The original is kept so that
    /// [`Resolver::verify_fast_swap`] can restore it.
    pub fn try_fast_swap(&self, resource: &dyn Resource) -> bool {
        let inner = &self.inner;
        let id = resource.id();
        let current = resource.address();
        let Some(addr) = inner.parser.parse(&current) else {
            return false;
        };
        let Some(target) = rewriter::fast_swap_target(&addr, &inner.cache, &inner.config) else {
            return false;
        };
        let variants = resource.variants();
        let original = SwapRecord {
            address: current,
            variants: variants.clone(),
        };
        if !inner.tracker.record_swap(id, original) {
            return false;
        }
        let new_variants = variants.map(|v| rewrite_variants(&inner.parser, &v, &addr, &target));
        tracing::debug!(resource = %id, from = %addr, to = %target, "fast swap");
        resource.apply(&target.render(), new_variants.as_deref());
        true
    }

    /// Check a fast-swapped resource. If it loaded, the swap is confirmed and
    /// remembered for its group; if not, the original address is restored
    /// verbatim and a full resolution runs.
    ///
    /// Holds the resource's in-flight slot throughout, so a concurrent
    /// [`Resolver::resolve`] is skipped rather than overwritten. Returns
    /// [`Resolution::Skipped`] if a resolution already started or settled
    /// since the swap.
    pub async fn verify_fast_swap(&self, resource: Arc<dyn Resource>) -> Resolution {
        let inner = &self.inner;
        let id = resource.id();
        let Some(original) = inner.tracker.take_swap_for_verify(id) else {
            return Resolution::Skipped;
        };
        let swapped = resource.address();

        if !resource.is_broken().await {
            let Some(addr) = inner.parser.parse(&swapped) else {
                inner.tracker.set(id, ResolutionState::Idle);
                return Resolution::NotApplicable;
            };
            inner
                .cache
                .record_success(addr.group_key(inner.config.group_path_segments), addr.clone());
            inner.tracker.succeed(id);
            tracing::info!(resource = %id, address = %addr, "fast swap confirmed");
            return Resolution::Resolved(addr);
        }

        tracing::debug!(resource = %id, address = %swapped, "fast swap did not load, restoring");
        if let Some(addr) = inner.parser.parse(&swapped) {
            inner.cache.record_failure(addr.host_cluster());
        }
        resource.apply(&original.address, original.variants.as_deref());
        self.run(resource, false).await
    }

    /// Find and apply a working address for `resource`.
    ///
    /// Idempotent: while a resolution for the same resource is in flight, or
    /// after it has succeeded, further calls return [`Resolution::Skipped`].
    pub async fn resolve(&self, resource: Arc<dyn Resource>) -> Resolution {
        if !self.inner.tracker.try_begin(resource.id()) {
            return Resolution::Skipped;
        }
        self.run(resource, false).await
    }

    async fn run(&self, resource: Arc<dyn Resource>, retry_pass: bool) -> Resolution {
        let inner = &self.inner;
        let id = resource.id();
        let current = resource.address();
        let Some(addr) = inner.parser.parse(&current) else {
            tracing::debug!(resource = %id, address = %current, "not a recognized address");
            inner.tracker.set(id, ResolutionState::Idle);
            return Resolution::NotApplicable;
        };

        let list = candidates::generate(&addr, &inner.cache, &inner.config);
        tracing::debug!(
            resource = %id,
            address = %addr,
            candidates = list.len(),
            retry_pass,
            "resolving"
        );
        let mut attempt = ResolutionAttempt::new(list, retry_pass);
        let found = run_pass(
            &inner.prober,
            &inner.cache,
            &inner.policy,
            inner.config.probe_timeout(),
            &mut attempt,
        )
        .await;

        if let Some(found) = found {
            self.apply(resource.as_ref(), &addr, &found);
            inner.tracker.succeed(id);
            tracing::info!(resource = %id, from = %addr, to = %found, probes = attempt.probes, "resolved");
            return Resolution::Resolved(found);
        }

        match inner.policy.decide(attempt.retry_pass, attempt.last_error) {
            RetryDecision::RetryAfter(delay) => {
                inner.tracker.set(id, ResolutionState::RetryScheduled);
                tracing::info!(
                    resource = %id,
                    delay_ms = delay.as_millis() as u64,
                    aborted = attempt.aborted,
                    "pass timed out, retry scheduled"
                );
                self.schedule_retry(resource, delay);
                Resolution::RetryScheduled
            }
            RetryDecision::NoRetry => {
                inner.tracker.set(id, ResolutionState::Failed);
                tracing::warn!(
                    resource = %id,
                    address = %addr,
                    probes = attempt.probes,
                    last_error = ?attempt.last_error,
                    "no working alternate found"
                );
                Resolution::Failed
            }
        }
    }

    fn schedule_retry(&self, resource: Arc<dyn Resource>, delay: Duration) {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.retry_pass(resource).await;
        });
    }

    async fn retry_pass(&self, resource: Arc<dyn Resource>) -> Resolution {
        let id = resource.id();
        if !resource.is_broken().await {
            tracing::debug!(resource = %id, "healed before retry, leaving it alone");
            self.inner.tracker.set(id, ResolutionState::Idle);
            return Resolution::Skipped;
        }
        if !self.inner.tracker.begin_retry(id) {
            return Resolution::Skipped;
        }
        self.run(resource, true).await
    }

    fn apply(&self, resource: &dyn Resource, from: &Address, to: &Address) {
        let inner = &self.inner;
        inner
            .cache
            .record_success(to.group_key(inner.config.group_path_segments), to.clone());
        let variants = resource
            .variants()
            .map(|v| rewrite_variants(&inner.parser, &v, from, to));
        resource.apply(&to.render(), variants.as_deref());
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("config", &self.inner.config)
            .field("cache", &self.inner.cache.stats())
            .finish_non_exhaustive()
    }
}
