//! Candidate generation.
//!
//! Turns one broken address into a bounded, priority-ordered list of
//! alternates. Pure: the same address, cache contents and config always yield
//! the same list.

mod tier;

use std::collections::HashSet;

use crate::address::Address;
use crate::config::MendConfig;
use crate::outcome_cache::OutcomeCache;

pub use tier::{Candidate, Tier};

/// Candidates for `addr`, best first, with their priority class.
///
/// Every candidate keeps `addr`'s path. The original address is only ever
/// returned as the cached hint; no other class reproduces it.
pub fn generate_tagged(addr: &Address, cache: &OutcomeCache, cfg: &MendConfig) -> Vec<Candidate> {
    let hosts = &cfg.hosts;
    let mut tagged: Vec<Candidate> = Vec::new();
    let mut push = |tier: Tier, address: Address| tagged.push(Candidate { tier, address });

    if let Some(cached) = cache.success_for(&addr.group_key(cfg.group_path_segments)) {
        push(Tier::Cached, cached.with_path(&addr.path));
    }

    push(Tier::ReliablePrefix, addr.with_prefix(&hosts.reliable_prefix));

    for prefix in &hosts.alternate_prefixes {
        if !prefix.eq_ignore_ascii_case(&addr.prefix) {
            push(Tier::AlternatePrefix, addr.with_prefix(prefix));
        }
    }

    for index in hosts.index_min..=hosts.index_max {
        if index != addr.index {
            push(Tier::SiblingIndex, addr.with_index(index));
        }
    }

    for root in &hosts.mirror_roots {
        if !root.eq_ignore_ascii_case(&addr.domain_root) {
            push(Tier::MirrorRoot, addr.with_root(root));
        }
    }

    let reliable = addr.with_prefix(&hosts.reliable_prefix);
    for index in hosts.index_min..=hosts.sweep_max {
        if index != addr.index {
            push(Tier::Sweep, reliable.with_index(index));
        }
    }

    // Stable: first-seen order survives within a tier.
    tagged.sort_by_key(|c| c.tier);

    let original = addr.render();
    let mut seen = HashSet::new();
    tagged.retain(|c| {
        let rendered = c.address.render();
        if c.tier != Tier::Cached && rendered == original {
            return false;
        }
        seen.insert(rendered)
    });
    tagged.truncate(cfg.max_candidates);
    tagged
}

/// Candidate addresses for `addr`, best first.
pub fn generate(addr: &Address, cache: &OutcomeCache, cfg: &MendConfig) -> Vec<Address> {
    generate_tagged(addr, cache, cfg)
        .into_iter()
        .map(|c| c.address)
        .collect()
}
