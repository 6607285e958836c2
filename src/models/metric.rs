// Metric nodes: value type, slope and sample fields

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reported value type. Only `string` and `timestamp` are non-numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    String,
    Timestamp,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float,
    Double,
    #[serde(other)]
    Other,
}

impl MetricType {
    pub fn is_numeric(self) -> bool {
        !matches!(self, MetricType::String | MetricType::Timestamp)
    }
}

/// How a metric's value moves over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slope {
    Positive,
    Negative,
    Both,
    Zero,
    #[default]
    #[serde(other)]
    Unspecified,
}

impl Slope {
    /// Monotonically increasing metrics are stored as counters, everything else as gauges.
    pub fn data_source_type(self) -> DataSourceType {
        match self {
            Slope::Positive => DataSourceType::Counter,
            _ => DataSourceType::Gauge,
        }
    }
}

/// Round-robin data source type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceType {
    Counter,
    Gauge,
}

impl fmt::Display for DataSourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceType::Counter => f.write_str("COUNTER"),
            DataSourceType::Gauge => f.write_str("GAUGE"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricNode {
    pub name: String,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    #[serde(default)]
    pub slope: Slope,
    /// Single host sample.
    #[serde(default)]
    pub val: Option<f64>,
    /// Aggregate sum across a population (summary metrics).
    #[serde(default)]
    pub sum: Option<f64>,
    /// Population size behind `sum`.
    #[serde(default)]
    pub num: Option<u64>,
}

impl MetricNode {
    /// Single-valued metric (per-host sample).
    pub fn sample(name: impl Into<String>, metric_type: MetricType, slope: Slope, val: f64) -> Self {
        Self {
            name: name.into(),
            metric_type,
            slope,
            val: Some(val),
            sum: None,
            num: None,
        }
    }

    /// Aggregate metric carrying a sum and a population count.
    pub fn summary(
        name: impl Into<String>,
        metric_type: MetricType,
        slope: Slope,
        sum: f64,
        num: u64,
    ) -> Self {
        Self {
            name: name.into(),
            metric_type,
            slope,
            val: None,
            sum: Some(sum),
            num: Some(num),
        }
    }
}
