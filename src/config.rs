use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use crate::archive_policy::ArchivePolicy;
use crate::models::DataSourceConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(rename = "data_source")]
    pub data_sources: Vec<DataSourceConfig>,
    /// Raw rrd plugin directives (`RRAs`, `rrd_rootdir`, `grid_summary`).
    #[serde(default)]
    pub rrd: BTreeMap<String, toml::Value>,
    #[serde(default)]
    pub engine: EngineConfig,
    pub spool: SpoolConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_rrdtool_path")]
    pub rrdtool_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rrdtool_path: default_rrdtool_path(),
        }
    }
}

fn default_rrdtool_path() -> PathBuf {
    PathBuf::from("rrdtool")
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpoolConfig {
    /// Directory polled for `*.json` cluster snapshots. Dot-prefixed files are still being written.
    pub dir: PathBuf,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// How often to log processing stats at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_stats_log_interval_secs() -> u64 {
    60
}

/// Directive value as plugin text: strings verbatim, arrays space-joined (e.g. a list of RRAs).
fn directive_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => items
            .iter()
            .map(directive_text)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// `[rrd]` entries as (key, text) directive pairs.
    pub fn directives(&self) -> Vec<(String, String)> {
        self.rrd
            .iter()
            .map(|(k, v)| (k.clone(), directive_text(v)))
            .collect()
    }

    /// Default policy with the `[rrd]` directives applied.
    pub fn archive_policy(&self) -> ArchivePolicy {
        let directives = self.directives();
        ArchivePolicy::from_directives(directives.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.data_sources.is_empty(),
            "at least one [[data_source]] must be configured"
        );
        let mut seen = HashSet::new();
        for ds in &self.data_sources {
            anyhow::ensure!(!ds.name.is_empty(), "data_source.name must be non-empty");
            anyhow::ensure!(
                ds.interval > 0,
                "data_source.interval must be > 0 for {}, got {}",
                ds.name,
                ds.interval
            );
            anyhow::ensure!(
                seen.insert(ds.name.as_str()),
                "data_source.name {} is configured twice",
                ds.name
            );
        }
        anyhow::ensure!(
            !self.spool.dir.as_os_str().is_empty(),
            "spool.dir must be non-empty"
        );
        anyhow::ensure!(
            self.spool.poll_interval_ms > 0,
            "spool.poll_interval_ms must be > 0, got {}",
            self.spool.poll_interval_ms
        );
        anyhow::ensure!(
            self.spool.stats_log_interval_secs > 0,
            "spool.stats_log_interval_secs must be > 0, got {}",
            self.spool.stats_log_interval_secs
        );
        Ok(())
    }
}
