// Spool worker: plays the host engine. Every tick it picks up `*.json` cluster snapshots
// from the spool directory and hands them to the plugin.
// Snapshots of one cluster run in file-name order on a single blocking task; different
// clusters run concurrently, so one archive is never written from two tasks at once.
// Producers must write a snapshot under a dot-prefixed name (e.g. `.web.json`) and rename it
// into place when complete. Dot files are never read, so a half-written snapshot is not
// mistaken for a malformed one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio::time::{Duration, interval};
use tracing::Instrument;

use crate::models::ClusterNode;
use crate::plugin::{MetricPlugin, NotifyOutcome};

/// Suffix given to spool files that cannot be parsed, so they are not retried every tick.
pub const REJECTED_SUFFIX: &str = "bad";

/// Plugin and shutdown for the worker.
pub struct WorkerDeps {
    pub plugin: Arc<dyn MetricPlugin>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing and spool location.
pub struct WorkerConfig {
    pub spool_dir: PathBuf,
    pub poll_interval_ms: u64,
    /// How often to log processing stats (real seconds).
    pub stats_log_interval_secs: u64,
}

/// Counts for one spool pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Snapshots handed to the plugin that completed (persisted, down, or grid).
    pub processed: u64,
    /// Snapshots whose notification was aborted (unknown data source, directory failure).
    pub aborted: u64,
    /// Files that could not be parsed and were set aside.
    pub rejected: u64,
}

impl TickStats {
    fn add(&mut self, other: TickStats) {
        self.processed += other.processed;
        self.aborted += other.aborted;
        self.rejected += other.rejected;
    }
}

type SpoolBatch = BTreeMap<String, Vec<(PathBuf, ClusterNode)>>;

/// Complete snapshot file: `*.json`, not dot-prefixed.
fn is_spooled_snapshot(path: &Path) -> bool {
    let in_progress = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'));
    !in_progress && path.is_file() && path.extension().is_some_and(|ext| ext == "json")
}

/// Read and parse every `*.json` in `dir`, grouped by cluster name, each group in file-name order.
fn collect_snapshots(dir: &Path) -> anyhow::Result<(SpoolBatch, u64)> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| is_spooled_snapshot(p))
        .collect();
    files.sort();

    let mut batch = SpoolBatch::new();
    let mut rejected = 0;
    for path in files {
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, operation = "read_snapshot", "snapshot read failed");
                continue;
            }
        };
        match serde_json::from_slice::<ClusterNode>(&bytes) {
            Ok(node) => batch.entry(node.name.clone()).or_default().push((path, node)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, operation = "parse_snapshot", "rejecting unparseable snapshot");
                let mut bad = path.clone().into_os_string();
                bad.push(".");
                bad.push(REJECTED_SUFFIX);
                if let Err(e) = std::fs::rename(&path, &bad) {
                    tracing::warn!(path = %path.display(), error = %e, "could not set aside rejected snapshot");
                }
                rejected += 1;
            }
        }
    }
    Ok((batch, rejected))
}

fn notify_all(plugin: &dyn MetricPlugin, snapshots: Vec<(PathBuf, ClusterNode)>) -> TickStats {
    let mut stats = TickStats::default();
    for (path, node) in snapshots {
        match plugin.notify(&node) {
            Ok(outcome) => {
                if let NotifyOutcome::Persisted(c) | NotifyOutcome::GridSummary(c) = outcome {
                    tracing::debug!(
                        cluster = %node.name,
                        created = c.created,
                        updated = c.updated,
                        failed = c.failed,
                        "snapshot processed"
                    );
                }
                stats.processed += 1;
            }
            Err(e) => {
                tracing::debug!(cluster = %node.name, error = %e, "notification aborted");
                stats.aborted += 1;
            }
        }
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "could not remove spooled snapshot");
        }
    }
    stats
}

/// One spool pass. Used by the worker loop and directly by tests.
pub async fn run_one_tick(
    plugin: Arc<dyn MetricPlugin>,
    spool_dir: &Path,
) -> anyhow::Result<TickStats> {
    let dir = spool_dir.to_path_buf();
    let (batch, rejected) = tokio::task::spawn_blocking(move || collect_snapshots(&dir)).await??;

    let mut set = JoinSet::new();
    for (_cluster, snapshots) in batch {
        let plugin = plugin.clone();
        set.spawn_blocking(move || notify_all(plugin.as_ref(), snapshots));
    }

    let mut stats = TickStats {
        rejected,
        ..TickStats::default()
    };
    while let Some(res) = set.join_next().await {
        match res {
            Ok(s) => stats.add(s),
            Err(e) => tracing::warn!(error = %e, "cluster notification task failed"),
        }
    }
    Ok(stats)
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        plugin,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        spool_dir,
        poll_interval_ms,
        stats_log_interval_secs,
    } = config;

    let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", poll_interval_ms);
    let worker = async move {
        let mut tick = interval(Duration::from_millis(poll_interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut totals = TickStats::default();

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    match run_one_tick(plugin.clone(), &spool_dir).await {
                        Ok(s) => totals.add(s),
                        Err(e) => tracing::warn!(
                            error = %e,
                            operation = "scan_spool",
                            path = %spool_dir.display(),
                            "spool scan failed"
                        ),
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        snapshots_processed_total = totals.processed,
                        snapshots_aborted_total = totals.aborted,
                        snapshots_rejected_total = totals.rejected,
                        "app stats"
                    );
                }
            }
        }
    };
    tokio::spawn(worker.instrument(worker_span))
}
