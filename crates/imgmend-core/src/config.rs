use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Retry parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Delay in milliseconds before the single retry pass.
    pub delay_ms: u64,
    /// A pass is abandoned once more than this many candidates in a row time out.
    pub max_consecutive_timeouts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            delay_ms: 10_000,
            max_consecutive_timeouts: 8,
        }
    }
}

/// The CDN host family the resolver understands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostFamilyConfig {
    /// Recognized top-level suffixes (e.g. "org").
    pub suffixes: Vec<String>,
    /// Prefixes whose servers are systematically unreliable.
    pub unreliable_prefixes: Vec<String>,
    /// Prefix substituted for an unreliable one.
    pub reliable_prefix: String,
    /// Other prefixes tried at the same server index.
    pub alternate_prefixes: Vec<String>,
    /// Domain roots that serve the same content.
    pub mirror_roots: Vec<String>,
    /// Lowest valid server index.
    pub index_min: u32,
    /// Highest server index tried by the load-balancer fallback.
    pub index_max: u32,
    /// Highest server index tried by the exhaustive sweep.
    pub sweep_max: u32,
}

impl Default for HostFamilyConfig {
    fn default() -> Self {
        Self {
            suffixes: vec!["org".into(), "net".into(), "com".into()],
            unreliable_prefixes: vec!["k".into()],
            reliable_prefix: "n".into(),
            alternate_prefixes: vec!["n".into(), "s".into(), "i".into(), "m".into()],
            mirror_roots: vec!["mbdny".into(), "mbcdns".into(), "mbimg".into()],
            index_min: 1,
            index_max: 10,
            sweep_max: 40,
        }
    }
}

/// Content validation thresholds for fetched images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// An image smaller than this in both dimensions is an error placeholder.
    pub min_dimension: u32,
    /// Upper bound on bytes read from a probed body.
    pub max_body_bytes: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            min_dimension: 2,
            max_body_bytes: 4 * 1024 * 1024,
        }
    }
}

/// Global configuration loaded from `~/.config/imgmend/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MendConfig {
    /// Maximum number of candidates tried per pass.
    pub max_candidates: usize,
    /// Deadline for a single probe, in milliseconds.
    pub probe_timeout_ms: u64,
    /// Number of leading directory segments that identify a resource group.
    pub group_path_segments: usize,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub hosts: HostFamilyConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

impl Default for MendConfig {
    fn default() -> Self {
        Self {
            max_candidates: 24,
            probe_timeout_ms: 8_000,
            group_path_segments: 3,
            retry: None,
            hosts: HostFamilyConfig::default(),
            content: ContentConfig::default(),
        }
    }
}

impl MendConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Effective retry settings (section or defaults).
    pub fn retry_policy(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    /// Reject settings the resolver cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_candidates == 0 {
            anyhow::bail!("max_candidates must be at least 1");
        }
        if self.hosts.suffixes.is_empty() {
            anyhow::bail!("hosts.suffixes must not be empty");
        }
        if self.hosts.reliable_prefix.is_empty()
            || !self.hosts.reliable_prefix.chars().all(|c| c.is_ascii_alphabetic())
        {
            anyhow::bail!(
                "hosts.reliable_prefix must be letters only, got {:?}",
                self.hosts.reliable_prefix
            );
        }
        if self.hosts.index_min > self.hosts.index_max {
            anyhow::bail!(
                "hosts.index_min ({}) is greater than hosts.index_max ({})",
                self.hosts.index_min,
                self.hosts.index_max
            );
        }
        if self.hosts.index_max > 999 || self.hosts.sweep_max > 999 {
            anyhow::bail!("server indices are at most three digits");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgmend")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MendConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MendConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load and validate configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<MendConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: MendConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
