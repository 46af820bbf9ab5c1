//! `imgmend config` – show where settings come from and what they are.

use std::path::Path;

use anyhow::{Context, Result};
use imgmend_core::config::{self, MendConfig};
use imgmend_core::logging;

pub fn run_config(cfg: &MendConfig, explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    println!("config file: {}", path.display());
    if let Ok(log) = logging::log_path() {
        println!("log file:    {}", log.display());
    }
    let body = serde_json::to_string_pretty(cfg).context("serializing config")?;
    println!("{}", body);
    Ok(())
}
