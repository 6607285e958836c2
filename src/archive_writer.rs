// Create-if-absent + update for one metric archive.
// Failures come back as ArchiveError; callers log and move on to the next metric.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::models::{ClusterNode, DataSourceType, MetricNode};
use crate::rrd::{CreateRequest, DataSourceSpec, EngineError, RrdEngine, SampleRow};

/// Heartbeat is this many steps: samples may be late by up to 8 intervals before going unknown.
pub const HEARTBEAT_STEPS: u64 = 8;

/// Data source layout of an archive, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesLayout {
    /// One `sum` series holding the host's value.
    Single,
    /// `sum` and `num` series for a population aggregate.
    Summary,
}

impl SeriesLayout {
    fn data_sources(self, kind: DataSourceType, heartbeat: u64) -> Vec<DataSourceSpec> {
        let names: &[&'static str] = match self {
            SeriesLayout::Single => &["sum"],
            SeriesLayout::Summary => &["sum", "num"],
        };
        names
            .iter()
            .map(|&name| DataSourceSpec {
                name,
                kind,
                heartbeat,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Creation {
    Created,
    AlreadyPresent,
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("no retention archives configured for {}", .0.display())]
    NoArchives(PathBuf),
    #[error("metric {metric} has no {field} value")]
    MissingValue {
        metric: String,
        field: &'static str,
    },
    #[error("create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: EngineError,
    },
    #[error("update {}: {source}", path.display())]
    Update {
        path: PathBuf,
        #[source]
        source: EngineError,
    },
}

pub fn heartbeat(step: u32) -> u64 {
    HEARTBEAT_STEPS * u64::from(step)
}

pub struct ArchiveWriter {
    engine: Arc<dyn RrdEngine>,
    archives: Vec<String>,
}

impl ArchiveWriter {
    pub fn new(engine: Arc<dyn RrdEngine>, archives: Vec<String>) -> Self {
        Self { engine, archives }
    }

    /// Create the archive at `path` unless a file is already there. Existing files are never replaced.
    /// The archive starts one second before the cluster's sample time so this cycle's row fits.
    pub fn ensure_created(
        &self,
        path: &Path,
        cluster: &ClusterNode,
        metric: &MetricNode,
        step: u32,
        layout: SeriesLayout,
    ) -> Result<Creation, ArchiveError> {
        if path.is_file() {
            return Ok(Creation::AlreadyPresent);
        }
        if self.archives.is_empty() {
            return Err(ArchiveError::NoArchives(path.to_path_buf()));
        }
        // rrdtool only accepts updates strictly after the start time.
        let request = CreateRequest {
            path: path.to_path_buf(),
            start: cluster.sample_time() - 1,
            step,
            data_sources: layout.data_sources(metric.slope.data_source_type(), heartbeat(step)),
            archives: self.archives.clone(),
        };
        self.engine
            .create(&request)
            .map_err(|source| ArchiveError::Create {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), step, "created rrd");
        Ok(Creation::Created)
    }

    /// Write one row stamped with the cluster's sample time.
    pub fn update(
        &self,
        path: &Path,
        cluster: &ClusterNode,
        metric: &MetricNode,
        layout: SeriesLayout,
    ) -> Result<(), ArchiveError> {
        let row = sample_row(cluster.sample_time(), metric, layout)?;
        self.engine
            .update(path, &row)
            .map_err(|source| ArchiveError::Update {
                path: path.to_path_buf(),
                source,
            })
    }
}

fn sample_row(
    timestamp: i64,
    metric: &MetricNode,
    layout: SeriesLayout,
) -> Result<SampleRow, ArchiveError> {
    let missing = |field: &'static str| ArchiveError::MissingValue {
        metric: metric.name.clone(),
        field,
    };
    let values = match layout {
        SeriesLayout::Single => vec![metric.val.ok_or_else(|| missing("val"))?.to_string()],
        SeriesLayout::Summary => vec![
            metric.sum.ok_or_else(|| missing("sum"))?.to_string(),
            metric.num.ok_or_else(|| missing("num"))?.to_string(),
        ],
    };
    Ok(SampleRow { timestamp, values })
}
