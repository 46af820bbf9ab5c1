//! `imgmend resolve <url>...` – repair each address as if it were a broken image.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use imgmend_core::config::MendConfig;
use imgmend_core::{
    CurlFetcher, FetchOutcome, Fetcher, Resolution, ResolutionState, Resolver, Resource,
    ResourceId,
};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinSet;

const SETTLE_POLL: Duration = Duration::from_millis(250);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A bare address treated as an image element. "Broken" means the current
/// address does not fetch as a real image.
struct UrlResource {
    id: ResourceId,
    address: Mutex<String>,
    fetcher: Arc<CurlFetcher>,
    deadline: Duration,
}

impl UrlResource {
    fn new(address: &str, fetcher: Arc<CurlFetcher>, deadline: Duration) -> Self {
        Self {
            id: ResourceId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
            address: Mutex::new(address.to_string()),
            fetcher,
            deadline,
        }
    }
}

#[async_trait]
impl Resource for UrlResource {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn address(&self) -> String {
        self.address.lock().clone()
    }

    fn apply(&self, address: &str, _variants: Option<&str>) {
        *self.address.lock() = address.to_string();
    }

    async fn is_broken(&self) -> bool {
        let current = self.address();
        self.fetcher.fetch(&current, self.deadline).await != FetchOutcome::Loaded
    }
}

#[derive(Debug, Serialize)]
struct Report {
    input: String,
    outcome: &'static str,
    address: String,
}

fn outcome_label(outcome: &Resolution) -> &'static str {
    match outcome {
        Resolution::Resolved(_) => "resolved",
        Resolution::Skipped => "skipped",
        Resolution::NotApplicable => "not-applicable",
        Resolution::RetryScheduled => "retry-scheduled",
        Resolution::Failed => "failed",
    }
}

/// Waits out a scheduled retry pass so the process does not exit under it.
async fn settle(resolver: &Resolver, resource: &UrlResource) -> &'static str {
    loop {
        tokio::time::sleep(SETTLE_POLL).await;
        match resolver.state(resource.id) {
            ResolutionState::RetryScheduled | ResolutionState::Resolving => continue,
            ResolutionState::Succeeded => return "resolved",
            ResolutionState::Failed => return "failed",
            ResolutionState::Idle => return "healed",
        }
    }
}

async fn resolve_one(resolver: Resolver, resource: Arc<UrlResource>, fast_swap: bool) -> Report {
    let input = resource.address();
    let dyn_resource: Arc<dyn Resource> = resource.clone();

    let outcome = if fast_swap && resolver.try_fast_swap(resource.as_ref()) {
        resolver.verify_fast_swap(dyn_resource).await
    } else {
        resolver.resolve(dyn_resource).await
    };

    let label = match outcome {
        Resolution::RetryScheduled => settle(&resolver, &resource).await,
        ref other => outcome_label(other),
    };
    Report {
        input,
        outcome: label,
        address: resource.address(),
    }
}

pub async fn run_resolve(cfg: MendConfig, urls: Vec<String>, fast_swap: bool, json: bool) -> Result<()> {
    let fetcher = Arc::new(CurlFetcher::new(cfg.content.clone()));
    let deadline = cfg.probe_timeout();
    let resolver = Resolver::new(cfg, fetcher.clone())?;

    let mut tasks = JoinSet::new();
    for (i, url) in urls.iter().enumerate() {
        let resource = Arc::new(UrlResource::new(url, Arc::clone(&fetcher), deadline));
        let resolver = resolver.clone();
        tasks.spawn(async move { (i, resolve_one(resolver, resource, fast_swap).await) });
    }

    let mut reports: Vec<Option<Report>> = urls.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (i, report) = joined.context("resolve task join")?;
        reports[i] = Some(report);
    }
    let reports: Vec<Report> = reports.into_iter().flatten().collect();

    if json {
        let body = serde_json::to_string_pretty(&reports).context("serializing report")?;
        println!("{}", body);
    } else {
        println!("{:<16} {:<48} {}", "OUTCOME", "INPUT", "ADDRESS");
        for r in &reports {
            println!("{:<16} {:<48} {}", r.outcome, r.input, r.address);
        }
    }

    let stats = resolver.cache().stats();
    tracing::info!(
        groups = stats.groups,
        failed_hosts = stats.failed_hosts,
        "resolve finished"
    );
    Ok(())
}
