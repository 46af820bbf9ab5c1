//! Structural matcher for CDN addresses.

use anyhow::{Context, Result};
use regex::Regex;

use super::Address;
use crate::config::HostFamilyConfig;

/// Compiled address pattern for a configured suffix set.
#[derive(Debug, Clone)]
pub struct AddressParser {
    re: Regex,
}

impl AddressParser {
    pub fn new(hosts: &HostFamilyConfig) -> Result<Self> {
        let suffixes = hosts
            .suffixes
            .iter()
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(
            r"(?i)^(?-u:([a-z][a-z0-9+.\-]*)://([a-z]+)([0-9]{{2,3}})\.([a-z0-9\-]+)\.({suffixes}))(/\S*)?$"
        );
        let re = Regex::new(&pattern).context("compiling address pattern")?;
        Ok(Self { re })
    }

    /// Parse `address`, or `None` if it is not in the recognized family.
    pub fn parse(&self, address: &str) -> Option<Address> {
        let caps = self.re.captures(address.trim())?;
        let index = caps[3].parse::<u32>().ok()?;
        Some(Address {
            scheme: caps[1].to_ascii_lowercase(),
            prefix: caps[2].to_ascii_lowercase(),
            index,
            domain_root: caps[4].to_ascii_lowercase(),
            domain_suffix: caps[5].to_ascii_lowercase(),
            path: caps.get(6).map(|m| m.as_str().to_string()).unwrap_or_default(),
        })
    }
}
