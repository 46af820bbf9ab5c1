/// Priority class of a candidate. Lower classes are tried first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// Server that last worked for the resource group.
    Cached = 0,
    /// Unreliable prefix swapped for the reliable one.
    ReliablePrefix = 1,
    /// Other prefixes at the same server index.
    AlternatePrefix = 2,
    /// Sibling server indices behind the same prefix.
    SiblingIndex = 3,
    /// Same server on a mirror domain root.
    MirrorRoot = 4,
    /// Exhaustive index sweep on the reliable prefix.
    Sweep = 5,
}

/// A generated address with the class that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub tier: Tier,
    pub address: crate::address::Address,
}
