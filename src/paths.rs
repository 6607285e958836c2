// Archive layout: <root>/<cluster>/<host>/<metric>.rrd
// Grid aggregates live under <root>/<grid>/__SummaryInfo__ instead of per-host folders.
// Names are used as-is; no collision or unsafe-character handling. Each name is appended
// as a raw segment, so an absolute name still stays under its parent.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::models::{ClusterNode, HostNode, MetricNode};

/// Reserved folder holding grid-wide summary archives.
pub const SUMMARY_FOLDER: &str = "__SummaryInfo__";

pub const ARCHIVE_EXTENSION: &str = "rrd";

/// `<base>/<name>`. Unlike `Path::join`, a leading `/` in `name` never replaces `base`.
fn segment(base: &Path, name: &str) -> PathBuf {
    let mut out = OsString::from(base.as_os_str());
    out.push("/");
    out.push(name);
    PathBuf::from(out)
}

/// Pure path derivation for one storage root. No I/O.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn cluster_folder(&self, cluster: &ClusterNode) -> PathBuf {
        let folder = segment(&self.root, &cluster.name);
        if cluster.is_grid() {
            segment(&folder, SUMMARY_FOLDER)
        } else {
            folder
        }
    }

    pub fn host_folder(&self, cluster_folder: &Path, host: &HostNode) -> PathBuf {
        segment(cluster_folder, &host.name)
    }

    pub fn metric_path(&self, host_folder: &Path, metric: &MetricNode) -> PathBuf {
        segment(
            host_folder,
            &format!("{}.{}", metric.name, ARCHIVE_EXTENSION),
        )
    }
}
