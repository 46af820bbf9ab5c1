pub mod config;
pub mod logging;

pub mod address;
pub mod candidates;
pub mod outcome_cache;
pub mod probe;
pub mod resolver;
pub mod rewriter;

pub use address::{Address, AddressParser, ResourceGroupKey};
pub use outcome_cache::{HostClusterKey, OutcomeCache};
pub use probe::{CurlFetcher, FetchOutcome, Fetcher, ProbeError, Prober};
pub use resolver::{Resolution, ResolutionState, Resolver, Resource, ResourceId};
