//! Address model for the CDN host family.
//!
//! An address looks like `scheme://<prefix><index>.<root>.<suffix><path>`,
//! e.g. `https://k03.mbdny.org/a/b/c/1.jpg`. Parsing is strict: anything that
//! does not match the whole pattern is simply not an address we handle.

mod group;
mod pattern;

use std::fmt;

pub use group::ResourceGroupKey;
pub use pattern::AddressParser;

use crate::outcome_cache::HostClusterKey;

/// A parsed CDN address. Scheme and host parts are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub scheme: String,
    pub prefix: String,
    pub index: u32,
    pub domain_root: String,
    pub domain_suffix: String,
    /// Path (plus any query) exactly as it appeared, starting with `/` or empty.
    pub path: String,
}

impl Address {
    /// `<prefix><index>.<root>.<suffix>`, index zero-padded to two digits.
    pub fn host(&self) -> String {
        format!(
            "{}{:02}.{}.{}",
            self.prefix, self.index, self.domain_root, self.domain_suffix
        )
    }

    /// `<root>.<suffix>`
    pub fn domain(&self) -> String {
        format!("{}.{}", self.domain_root, self.domain_suffix)
    }

    /// Canonical string form.
    pub fn render(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host(), self.path)
    }

    pub fn with_prefix(&self, prefix: &str) -> Self {
        Self {
            prefix: prefix.to_ascii_lowercase(),
            ..self.clone()
        }
    }

    pub fn with_index(&self, index: u32) -> Self {
        Self {
            index,
            ..self.clone()
        }
    }

    pub fn with_root(&self, root: &str) -> Self {
        Self {
            domain_root: root.to_ascii_lowercase(),
            ..self.clone()
        }
    }

    /// Same server, different resource.
    pub fn with_path(&self, path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..self.clone()
        }
    }

    pub fn host_cluster(&self) -> HostClusterKey {
        HostClusterKey {
            scheme: self.scheme.clone(),
            host: self.host(),
        }
    }

    pub fn group_key(&self, path_segments: usize) -> ResourceGroupKey {
        ResourceGroupKey::for_address(self, path_segments)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}
