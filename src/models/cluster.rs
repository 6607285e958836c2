// Cluster / grid and host nodes of a snapshot tree

use serde::{Deserialize, Serialize};

use super::MetricNode;

/// Whether a cluster node is the grid aggregate or a real cluster. JSON key is `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClusterKind {
    Grid,
    #[default]
    Cluster,
}

/// Reported cluster health. Anything other than "down" counts as up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStatus {
    Down,
    #[default]
    #[serde(other)]
    Up,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterNode {
    pub name: String,
    #[serde(rename = "id", default)]
    pub kind: ClusterKind,
    /// Epoch seconds reported by the source; `None` means use wall-clock time.
    #[serde(default)]
    pub localtime: Option<i64>,
    #[serde(default)]
    pub status: ClusterStatus,
    #[serde(default)]
    pub hosts: Vec<HostNode>,
    /// Grid-level aggregate metrics (sum/num). Empty for plain clusters.
    #[serde(default)]
    pub summary: Vec<MetricNode>,
}

impl ClusterNode {
    pub fn new(name: impl Into<String>, kind: ClusterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            localtime: None,
            status: ClusterStatus::Up,
            hosts: Vec::new(),
            summary: Vec::new(),
        }
    }

    pub fn is_grid(&self) -> bool {
        self.kind == ClusterKind::Grid
    }

    pub fn is_down(&self) -> bool {
        self.status == ClusterStatus::Down
    }

    /// Sample time for this snapshot: `localtime` if reported, else now.
    pub fn sample_time(&self) -> i64 {
        self.localtime
            .unwrap_or_else(|| chrono::Utc::now().timestamp())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostNode {
    pub name: String,
    #[serde(default)]
    pub metrics: Vec<MetricNode>,
}

impl HostNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metrics: Vec::new(),
        }
    }
}
