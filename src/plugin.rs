// Snapshot orchestration: one notify() per changed cluster snapshot.
// Gates (unknown data source, cluster down) abort before touching the filesystem, and a
// cluster folder that cannot be created aborts the notification. After that everything is
// best-effort: a host folder or a metric create/update that fails is logged and skipped.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::instrument;

use crate::archive_policy::ArchivePolicy;
use crate::archive_writer::{ArchiveWriter, Creation, SeriesLayout};
use crate::models::{ClusterNode, DataSourceConfig, MetricNode};
use crate::paths::PathResolver;
use crate::rrd::RrdEngine;

/// Lifecycle contract expected by the host engine.
pub trait MetricPlugin: Send + Sync {
    fn start(&self);
    fn stop(&self);
    fn notify(&self, cluster: &ClusterNode) -> Result<NotifyOutcome, NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("no matching data source for {0}")]
    UnknownDataSource(String),
    #[error("cannot create directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-notification metric counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub created: u32,
    pub updated: u32,
    pub failed: u32,
    /// Non-numeric metrics (string, timestamp).
    pub skipped: u32,
    /// Hosts whose folder could not be created; their metrics are not attempted.
    pub failed_hosts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    ClusterDown,
    /// Grid node with summary archives disabled: only its summary folder is ensured.
    GridDirectoryOnly,
    GridSummary(CycleStats),
    Persisted(CycleStats),
}

pub struct RrdPlugin {
    policy: ArchivePolicy,
    data_sources: Vec<DataSourceConfig>,
    resolver: PathResolver,
    writer: ArchiveWriter,
}

impl RrdPlugin {
    pub fn new(
        policy: ArchivePolicy,
        data_sources: Vec<DataSourceConfig>,
        engine: Arc<dyn RrdEngine>,
    ) -> Self {
        let resolver = PathResolver::new(policy.root_directory());
        let writer = ArchiveWriter::new(engine, policy.archive_specs().to_vec());
        Self {
            policy,
            data_sources,
            resolver,
            writer,
        }
    }

    fn data_source(&self, name: &str) -> Option<&DataSourceConfig> {
        self.data_sources.iter().find(|ds| ds.name == name)
    }

    /// Ensure one archive exists and write this cycle's sample into it.
    fn persist_metric(
        &self,
        folder: &Path,
        cluster: &ClusterNode,
        metric: &MetricNode,
        step: u32,
        layout: SeriesLayout,
        stats: &mut CycleStats,
    ) {
        if !metric.metric_type.is_numeric() {
            stats.skipped += 1;
            return;
        }
        let path = self.resolver.metric_path(folder, metric);
        match self
            .writer
            .ensure_created(&path, cluster, metric, step, layout)
        {
            Ok(Creation::Created) => stats.created += 1,
            Ok(Creation::AlreadyPresent) => {}
            Err(e) => {
                tracing::info!(error = %e, operation = "create_rrd", "Error creating rrd");
                stats.failed += 1;
                return;
            }
        }
        match self.writer.update(&path, cluster, metric, layout) {
            Ok(()) => stats.updated += 1,
            Err(e) => {
                tracing::info!(error = %e, operation = "update_rrd", "Error updating rrd");
                stats.failed += 1;
            }
        }
    }
}

/// Idempotent: succeeds when the directory already exists, including when a concurrent
/// notification created it first.
fn ensure_dir(path: &Path) -> Result<(), NotifyError> {
    std::fs::create_dir_all(path).map_err(|source| {
        tracing::warn!(path = %path.display(), error = %source, "rrd directory creation failed");
        NotifyError::Directory {
            path: path.to_path_buf(),
            source,
        }
    })
}

impl MetricPlugin for RrdPlugin {
    fn start(&self) {
        tracing::debug!(root = %self.policy.root_directory().display(), "rrd plugin start");
    }

    fn stop(&self) {
        tracing::debug!("rrd plugin stop");
    }

    #[instrument(skip(self, cluster), fields(cluster = %cluster.name, operation = "notify"))]
    fn notify(&self, cluster: &ClusterNode) -> Result<NotifyOutcome, NotifyError> {
        let Some(ds) = self.data_source(&cluster.name) else {
            tracing::info!("No matching data source for {}", cluster.name);
            return Err(NotifyError::UnknownDataSource(cluster.name.clone()));
        };
        if cluster.is_down() {
            tracing::debug!("cluster is down; nothing persisted");
            return Ok(NotifyOutcome::ClusterDown);
        }

        let cluster_folder = self.resolver.cluster_folder(cluster);
        ensure_dir(&cluster_folder)?;

        let mut stats = CycleStats::default();
        if cluster.is_grid() {
            if !self.policy.grid_summary() {
                return Ok(NotifyOutcome::GridDirectoryOnly);
            }
            for metric in &cluster.summary {
                self.persist_metric(
                    &cluster_folder,
                    cluster,
                    metric,
                    ds.interval,
                    SeriesLayout::Summary,
                    &mut stats,
                );
            }
            return Ok(NotifyOutcome::GridSummary(stats));
        }

        for host in &cluster.hosts {
            let host_folder = self.resolver.host_folder(&cluster_folder, host);
            if let Err(e) = ensure_dir(&host_folder) {
                tracing::info!(host = %host.name, error = %e, "skipping host");
                stats.failed_hosts += 1;
                continue;
            }
            for metric in &host.metrics {
                self.persist_metric(
                    &host_folder,
                    cluster,
                    metric,
                    ds.interval,
                    SeriesLayout::Single,
                    &mut stats,
                );
            }
        }
        tracing::debug!(
            created = stats.created,
            updated = stats.updated,
            failed = stats.failed,
            failed_hosts = stats.failed_hosts,
            "snapshot persisted"
        );
        Ok(NotifyOutcome::Persisted(stats))
    }
}
