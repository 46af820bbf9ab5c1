//! Process-lifetime outcome cache.
//!
//! Two independent stores:
//! - group successes: `ResourceGroupKey` -> last server that worked for it
//! - failed host clusters: `(scheme, host)` pairs that timed out, errored or
//!   served a placeholder
//!
//! The cache is created once per engine and shared by the generator, prober
//! and resolver. Nothing is evicted and nothing is persisted; a host marked
//! failed stays failed until the cache is dropped.

mod key;

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use crate::address::{Address, ResourceGroupKey};

pub use key::HostClusterKey;

/// Entry counts, for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub groups: usize,
    pub failed_hosts: usize,
}

#[derive(Debug, Default)]
pub struct OutcomeCache {
    successes: Mutex<HashMap<ResourceGroupKey, Address>>,
    failures: Mutex<HashSet<HostClusterKey>>,
}

impl OutcomeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last server known to work for `group`. A hint only: callers re-probe it.
    pub fn success_for(&self, group: &ResourceGroupKey) -> Option<Address> {
        self.successes.lock().get(group).cloned()
    }

    /// Remember that `addr` worked for `group`, replacing any earlier entry.
    pub fn record_success(&self, group: ResourceGroupKey, addr: Address) {
        tracing::debug!(%group, server = %addr.host(), "recording group success");
        self.successes.lock().insert(group, addr);
    }

    pub fn is_failed(&self, key: &HostClusterKey) -> bool {
        self.failures.lock().contains(key)
    }

    /// Mark a host cluster unreachable. Returns false if it already was.
    pub fn record_failure(&self, key: HostClusterKey) -> bool {
        let inserted = self.failures.lock().insert(key.clone());
        if inserted {
            tracing::debug!(host = %key, "marking host cluster failed");
        }
        inserted
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            groups: self.successes.lock().len(),
            failed_hosts: self.failures.lock().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AddressParser;
    use crate::config::HostFamilyConfig;

    fn parse(s: &str) -> Address {
        AddressParser::new(&HostFamilyConfig::default())
            .unwrap()
            .parse(s)
            .unwrap()
    }

    #[test]
    fn host_cluster_key_from_url_lowercases_host() {
        let key = HostClusterKey::from_url("https://N03.MBDNY.org/a/1.jpg").unwrap();
        assert_eq!(key.scheme, "https");
        assert_eq!(key.host, "n03.mbdny.org");
        assert_eq!(key.to_string(), "https://n03.mbdny.org");
    }

    #[test]
    fn host_cluster_key_matches_address_cluster() {
        let addr = parse("https://k03.mbdny.org/a/b/c/1.jpg");
        let key = HostClusterKey::from_url(&addr.render()).unwrap();
        assert_eq!(key, addr.host_cluster());
    }

    #[test]
    fn host_cluster_key_rejects_garbage() {
        assert!(HostClusterKey::from_url("not a url").is_err());
        assert!(HostClusterKey::from_url("data:image/png;base64,AAAA").is_err());
    }

    #[test]
    fn success_entries_are_keyed_by_group() {
        let cache = OutcomeCache::new();
        let good = parse("https://n03.mbdny.org/a/b/c/1.jpg");
        cache.record_success(good.group_key(3), good.clone());

        let sibling = parse("https://k07.mbdny.org/a/b/c/2.jpg");
        assert_eq!(cache.success_for(&sibling.group_key(3)), Some(good));

        let other = parse("https://k07.mbdny.org/a/b/z/2.jpg");
        assert_eq!(cache.success_for(&other.group_key(3)), None);
    }

    #[test]
    fn later_success_replaces_earlier() {
        let cache = OutcomeCache::new();
        let first = parse("https://n03.mbdny.org/a/b/c/1.jpg");
        let second = parse("https://s05.mbdny.org/a/b/c/4.jpg");
        cache.record_success(first.group_key(3), first);
        cache.record_success(second.group_key(3), second.clone());
        assert_eq!(cache.success_for(&second.group_key(3)), Some(second));
        assert_eq!(cache.stats().groups, 1);
    }

    #[test]
    fn failures_are_write_once_membership() {
        let cache = OutcomeCache::new();
        let key = parse("https://k03.mbdny.org/a/1.jpg").host_cluster();
        assert!(!cache.is_failed(&key));
        assert!(cache.record_failure(key.clone()));
        assert!(!cache.record_failure(key.clone()));
        assert!(cache.is_failed(&key));
        assert_eq!(
            cache.stats(),
            CacheStats {
                groups: 0,
                failed_hosts: 1
            }
        );
    }
}
