// Round-robin storage engine seam. The engine owns the on-disk format and bucket rotation;
// this crate only builds create/update requests.

mod rrdtool;

pub use rrdtool::RrdtoolCli;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::models::DataSourceType;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{operation} exited with {status}: {stderr}")]
    Failed {
        operation: &'static str,
        status: String,
        stderr: String,
    },
    #[error("{0}")]
    Rejected(String),
}

/// Create/update primitives of a round-robin archive store. Both may fail.
pub trait RrdEngine: Send + Sync {
    fn create(&self, request: &CreateRequest) -> Result<(), EngineError>;
    fn update(&self, path: &Path, row: &SampleRow) -> Result<(), EngineError>;
}

/// One data source definition: `DS:<name>:<type>:<heartbeat>:U:U` (no min/max bounds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceSpec {
    pub name: &'static str,
    pub kind: DataSourceType,
    pub heartbeat: u64,
}

impl fmt::Display for DataSourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DS:{}:{}:{}:U:U", self.name, self.kind, self.heartbeat)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateRequest {
    pub path: PathBuf,
    /// Archive start time (epoch seconds).
    pub start: i64,
    pub step: u32,
    pub data_sources: Vec<DataSourceSpec>,
    /// Retention bucket specs, passed through verbatim.
    pub archives: Vec<String>,
}

impl CreateRequest {
    /// Argument vector in engine order: `path -b start -s step DS... RRA...`.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            self.path.display().to_string(),
            "-b".to_string(),
            self.start.to_string(),
            "-s".to_string(),
            self.step.to_string(),
        ];
        args.extend(self.data_sources.iter().map(ToString::to_string));
        args.extend(self.archives.iter().cloned());
        args
    }
}

/// One update row: `timestamp:v1[:v2]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    pub timestamp: i64,
    pub values: Vec<String>,
}

impl fmt::Display for SampleRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.timestamp)?;
        for v in &self.values {
            write!(f, ":{}", v)?;
        }
        Ok(())
    }
}
