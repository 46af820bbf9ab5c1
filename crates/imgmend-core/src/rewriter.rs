//! Preemptive rewrite heuristic.
//!
//! Servers behind the unreliable prefix fail most of the time and the
//! reliable-prefix twin almost always works, so the swap is applied before
//! anything is probed. The resolver verifies it afterwards.

use crate::address::Address;
use crate::config::MendConfig;
use crate::outcome_cache::OutcomeCache;

/// Whether `addr` sits behind one of the unreliable prefixes.
pub fn is_unreliable(addr: &Address, cfg: &MendConfig) -> bool {
    cfg.hosts
        .unreliable_prefixes
        .iter()
        .any(|p| p.eq_ignore_ascii_case(&addr.prefix))
}

/// Address to swap in for `addr` without probing, if any.
///
/// Prefers the server that last worked for the resource group, then the
/// reliable-prefix substitution. Servers already known to be down are never
/// chosen.
pub fn fast_swap_target(addr: &Address, cache: &OutcomeCache, cfg: &MendConfig) -> Option<Address> {
    if !is_unreliable(addr, cfg) {
        return None;
    }
    let cached = cache
        .success_for(&addr.group_key(cfg.group_path_segments))
        .map(|server| server.with_path(&addr.path));
    let substituted = addr.with_prefix(&cfg.hosts.reliable_prefix);

    cached
        .into_iter()
        .chain(std::iter::once(substituted))
        .find(|target| target != addr && !cache.is_failed(&target.host_cluster()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AddressParser;

    fn parse(s: &str) -> Address {
        AddressParser::new(&MendConfig::default().hosts)
            .unwrap()
            .parse(s)
            .unwrap()
    }

    #[test]
    fn reliable_prefixes_are_left_alone() {
        let cfg = MendConfig::default();
        let cache = OutcomeCache::new();
        assert_eq!(
            fast_swap_target(&parse("https://n03.mbdny.org/a/1.jpg"), &cache, &cfg),
            None
        );
    }

    #[test]
    fn default_substitution_without_cache() {
        let cfg = MendConfig::default();
        let cache = OutcomeCache::new();
        let target = fast_swap_target(&parse("https://K03.mbdny.org/a/1.jpg"), &cache, &cfg);
        assert_eq!(target.unwrap().render(), "https://n03.mbdny.org/a/1.jpg");
    }

    #[test]
    fn cached_group_server_wins() {
        let cfg = MendConfig::default();
        let cache = OutcomeCache::new();
        let good = parse("https://s09.mbcdns.org/a/b/c/1.jpg");
        cache.record_success(parse("https://k03.mbdny.org/a/b/c/1.jpg").group_key(3), good);
        let target = fast_swap_target(&parse("https://k03.mbdny.org/a/b/c/5.jpg"), &cache, &cfg);
        assert_eq!(target.unwrap().render(), "https://s09.mbcdns.org/a/b/c/5.jpg");
    }

    #[test]
    fn known_failed_targets_are_skipped() {
        let cfg = MendConfig::default();
        let cache = OutcomeCache::new();
        let addr = parse("https://k03.mbdny.org/a/1.jpg");
        cache.record_failure(parse("https://n03.mbdny.org/x.jpg").host_cluster());
        assert_eq!(fast_swap_target(&addr, &cache, &cfg), None);
    }
}
