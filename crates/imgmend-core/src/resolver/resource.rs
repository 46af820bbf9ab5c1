//! The caller's side of the contract: something whose address can be read,
//! rewritten and checked.

use std::fmt;

use async_trait::async_trait;

/// Stable identity of a resource for the lifetime of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u64);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An image (or anything else addressable) the resolver may repair.
#[async_trait]
pub trait Resource: Send + Sync {
    fn id(&self) -> ResourceId;

    /// Current primary address.
    fn address(&self) -> String;

    /// Secondary variant list (`srcset` style), if the resource has one.
    fn variants(&self) -> Option<String> {
        None
    }

    /// Point the resource at a new address (and variant list, if any).
    fn apply(&self, address: &str, variants: Option<&str>);

    /// Whether the resource is currently failing to load.
    async fn is_broken(&self) -> bool;
}
