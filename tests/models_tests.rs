// Snapshot tree deserialization (JSON)

use rrd_archiver::models::*;

const SNAPSHOT: &str = r#"{
  "name": "web",
  "id": "CLUSTER",
  "localtime": 1700000000,
  "hosts": [
    {
      "name": "h1",
      "metrics": [
        { "name": "load_one", "type": "float", "slope": "both", "val": 0.25 },
        { "name": "bytes_in", "type": "uint32", "slope": "positive", "val": 1024 },
        { "name": "os_name", "type": "string", "slope": "zero" }
      ]
    }
  ]
}"#;

#[test]
fn test_cluster_snapshot_deserializes() {
    let c: ClusterNode = serde_json::from_str(SNAPSHOT).unwrap();
    assert_eq!(c.name, "web");
    assert_eq!(c.kind, ClusterKind::Cluster);
    assert_eq!(c.localtime, Some(1_700_000_000));
    assert_eq!(c.status, ClusterStatus::Up);
    assert!(c.summary.is_empty());

    let metrics = &c.hosts[0].metrics;
    assert_eq!(metrics[0].metric_type, MetricType::Float);
    assert_eq!(metrics[0].val, Some(0.25));
    assert_eq!(metrics[1].slope.data_source_type(), DataSourceType::Counter);
    assert!(!metrics[2].metric_type.is_numeric());
    assert_eq!(metrics[2].val, None);
}

#[test]
fn test_status_down_and_unknown_values() {
    let down: ClusterNode = serde_json::from_str(r#"{"name":"a","status":"down"}"#).unwrap();
    assert!(down.is_down());
    let other: ClusterNode = serde_json::from_str(r#"{"name":"a","status":"degraded"}"#).unwrap();
    assert!(!other.is_down());
    let absent: ClusterNode = serde_json::from_str(r#"{"name":"a"}"#).unwrap();
    assert!(!absent.is_down());
    assert!(!absent.is_grid());

    assert_eq!(serde_json::to_value(ClusterStatus::Down).unwrap(), "down");
    assert_eq!(serde_json::to_value(ClusterStatus::default()).unwrap(), "up");
}

#[test]
fn test_grid_with_summary_metrics() {
    let grid: ClusterNode = serde_json::from_str(
        r#"{"name":"g","id":"GRID","summary":[{"name":"load_one","type":"float","sum":3.5,"num":4}]}"#,
    )
    .unwrap();
    assert!(grid.is_grid());
    assert_eq!(grid.summary[0].sum, Some(3.5));
    assert_eq!(grid.summary[0].num, Some(4));
    assert_eq!(grid.summary[0].slope, Slope::Unspecified);
}

#[test]
fn test_unknown_type_and_slope_fall_back() {
    let m: MetricNode =
        serde_json::from_str(r#"{"name":"x","type":"int64","slope":"derivative","val":1}"#).unwrap();
    assert_eq!(m.metric_type, MetricType::Other);
    assert!(m.metric_type.is_numeric());
    assert_eq!(m.slope, Slope::Unspecified);
    assert_eq!(m.slope.data_source_type(), DataSourceType::Gauge);
}

#[test]
fn test_numeric_types() {
    for t in [
        MetricType::Int8,
        MetricType::Uint8,
        MetricType::Int16,
        MetricType::Uint16,
        MetricType::Int32,
        MetricType::Uint32,
        MetricType::Float,
        MetricType::Double,
    ] {
        assert!(t.is_numeric(), "{t:?} should be numeric");
    }
    assert!(!MetricType::String.is_numeric());
    assert!(!MetricType::Timestamp.is_numeric());
}

#[test]
fn test_data_source_interval_default() {
    let ds: DataSourceConfig = serde_json::from_str(r#"{"name":"web"}"#).unwrap();
    assert_eq!(ds.interval, DEFAULT_INTERVAL_SECS);
}
