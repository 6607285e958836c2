// Shared test helpers: recording engine + snapshot builders
#![allow(dead_code)]

use rrd_archiver::models::*;
use rrd_archiver::rrd::{CreateRequest, EngineError, RrdEngine, SampleRow};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Fake engine: `create` drops a placeholder file at the archive path (so later cycles see it),
/// every call is recorded. Updates to paths containing `fail_updates_matching` are rejected.
#[derive(Default)]
pub struct RecordingEngine {
    pub creates: Mutex<Vec<CreateRequest>>,
    pub updates: Mutex<Vec<(PathBuf, String)>>,
    pub fail_updates_matching: Option<String>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_updates_for(fragment: &str) -> Self {
        Self {
            fail_updates_matching: Some(fragment.to_string()),
            ..Self::default()
        }
    }

    pub fn creates(&self) -> Vec<CreateRequest> {
        self.creates.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(PathBuf, String)> {
        self.updates.lock().unwrap().clone()
    }
}

impl RrdEngine for RecordingEngine {
    fn create(&self, request: &CreateRequest) -> Result<(), EngineError> {
        std::fs::write(&request.path, b"rrd").map_err(|e| EngineError::Rejected(e.to_string()))?;
        self.creates.lock().unwrap().push(request.clone());
        Ok(())
    }

    fn update(&self, path: &Path, row: &SampleRow) -> Result<(), EngineError> {
        if let Some(fragment) = &self.fail_updates_matching
            && path.to_string_lossy().contains(fragment.as_str())
        {
            return Err(EngineError::Rejected(format!("illegal update to {}", path.display())));
        }
        self.updates
            .lock()
            .unwrap()
            .push((path.to_path_buf(), row.to_string()));
        Ok(())
    }
}

pub fn float_metric(name: &str, val: f64) -> MetricNode {
    MetricNode::sample(name, MetricType::Float, Slope::Both, val)
}

/// Cluster `name` with one host carrying `metrics`, stamped at `localtime`.
pub fn cluster_with(name: &str, host: &str, metrics: Vec<MetricNode>, localtime: Option<i64>) -> ClusterNode {
    let mut cluster = ClusterNode::new(name, ClusterKind::Cluster);
    cluster.localtime = localtime;
    let mut h = HostNode::new(host);
    h.metrics = metrics;
    cluster.hosts.push(h);
    cluster
}

/// Recursively count regular files and directories under `root`.
pub fn count_entries(root: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(root) else {
        return 0;
    };
    entries
        .filter_map(Result::ok)
        .map(|e| {
            let p = e.path();
            if p.is_dir() { 1 + count_entries(&p) } else { 1 }
        })
        .sum()
}
