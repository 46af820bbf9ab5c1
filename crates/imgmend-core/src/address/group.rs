//! Resource grouping: sibling resources that share a working server.

use std::fmt;

use super::Address;

/// Key for the success cache.
///
/// Resources under the same `<root>.<suffix>` and the same leading directory
/// segments (e.g. pages of one chapter) are expected to be served from the
/// same healthy server, so one resolution seeds the others.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceGroupKey {
    pub domain: String,
    pub path_prefix: String,
}

impl ResourceGroupKey {
    /// Group for `addr`, using at most `path_segments` directory segments.
    /// The final path segment (the file itself) never takes part.
    pub fn for_address(addr: &Address, path_segments: usize) -> Self {
        let path = addr.path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let dirs = segments.len().saturating_sub(1);
        let path_prefix = segments[..dirs.min(path_segments)].join("/");
        Self {
            domain: addr.domain(),
            path_prefix,
        }
    }
}

impl fmt::Display for ResourceGroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.domain, self.path_prefix)
    }
}
