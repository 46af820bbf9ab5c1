//! CLI for the imgmend image mirror resolver.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use imgmend_core::config::{self, MendConfig};
use std::path::{Path, PathBuf};

use commands::{run_candidates, run_config, run_resolve};

/// Top-level CLI for the imgmend image mirror resolver.
#[derive(Debug, Parser)]
#[command(name = "imgmend")]
#[command(about = "imgmend: find working mirrors for broken CDN image addresses", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the XDG config path.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print the alternate addresses that would be tried, best first.
    Candidates {
        /// Image address on a recognized CDN host.
        url: String,
    },

    /// Treat each address as a broken image and find a working mirror.
    Resolve {
        /// One or more image addresses.
        #[arg(required = true)]
        urls: Vec<String>,
        /// Skip the unprobed prefix swap and always run a full search.
        #[arg(long)]
        no_fast_swap: bool,
        /// Print results as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show the config file location and the effective settings.
    Config,
}

fn load_config(path: Option<&Path>) -> Result<MendConfig> {
    match path {
        Some(p) => config::load_from_path(p),
        None => config::load_or_init(),
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = load_config(cli.config.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Candidates { url } => run_candidates(cfg, &url)?,
            CliCommand::Resolve {
                urls,
                no_fast_swap,
                json,
            } => run_resolve(cfg, urls, !no_fast_swap, json).await?,
            CliCommand::Config => run_config(&cfg, cli.config.as_deref())?,
        }

        Ok(())
    }
}
