// Metric snapshot tree and data source models

mod cluster;
mod data_source;
mod metric;

pub use cluster::{ClusterKind, ClusterNode, ClusterStatus, HostNode};
pub use data_source::{DEFAULT_INTERVAL_SECS, DataSourceConfig};
pub use metric::{DataSourceType, MetricNode, MetricType, Slope};
