// Data source entries (one per monitored cluster or grid)

use serde::{Deserialize, Serialize};

/// Polling interval used when a data source omits one.
pub const DEFAULT_INTERVAL_SECS: u32 = 15;

fn default_interval() -> u32 {
    DEFAULT_INTERVAL_SECS
}

/// A configured data source. `interval` becomes the archive step for every metric of the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceConfig {
    pub name: String,
    #[serde(default = "default_interval")]
    pub interval: u32,
}

impl DataSourceConfig {
    pub fn new(name: impl Into<String>, interval: u32) -> Self {
        Self {
            name: name.into(),
            interval,
        }
    }
}
