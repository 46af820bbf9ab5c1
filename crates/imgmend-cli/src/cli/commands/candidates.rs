//! `imgmend candidates <url>` – print the priority-ordered candidate list.

use std::sync::Arc;

use anyhow::Result;
use imgmend_core::config::MendConfig;
use imgmend_core::{CurlFetcher, Resolver};

pub fn run_candidates(cfg: MendConfig, url: &str) -> Result<()> {
    let fetcher = Arc::new(CurlFetcher::new(cfg.content.clone()));
    let resolver = Resolver::new(cfg, fetcher)?;
    let Some(list) = resolver.candidates(url) else {
        anyhow::bail!("not a recognized CDN image address: {}", url);
    };

    println!("{:>3}  {:<16} {}", "#", "TIER", "ADDRESS");
    for (i, c) in list.iter().enumerate() {
        println!(
            "{:>3}  {:<16} {}",
            i + 1,
            format!("{:?}", c.tier),
            c.address
        );
    }
    Ok(())
}
