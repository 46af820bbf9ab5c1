//! CLI command handlers, one file per command.

mod candidates;
mod config;
mod resolve;

pub use candidates::run_candidates;
pub use config::run_config;
pub use resolve::run_resolve;
