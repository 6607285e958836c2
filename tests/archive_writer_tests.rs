// ArchiveWriter: create-if-absent and update semantics against the recording engine

mod common;

use common::{RecordingEngine, float_metric};
use rrd_archiver::archive_writer::{ArchiveError, ArchiveWriter, Creation, SeriesLayout};
use rrd_archiver::models::*;
use std::sync::Arc;
use tempfile::TempDir;

fn archives() -> Vec<String> {
    vec!["RRA:AVERAGE:0.5:1:244".into()]
}

fn cluster_at(localtime: i64) -> ClusterNode {
    let mut c = ClusterNode::new("web", ClusterKind::Cluster);
    c.localtime = Some(localtime);
    c
}

#[test]
fn ensure_created_creates_once() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(RecordingEngine::new());
    let writer = ArchiveWriter::new(engine.clone(), archives());
    let path = dir.path().join("load.rrd");
    let metric = float_metric("load", 1.0);

    let first = writer
        .ensure_created(&path, &cluster_at(10), &metric, 30, SeriesLayout::Single)
        .unwrap();
    let second = writer
        .ensure_created(&path, &cluster_at(40), &metric, 30, SeriesLayout::Single)
        .unwrap();

    assert_eq!(first, Creation::Created);
    assert_eq!(second, Creation::AlreadyPresent);
    let creates = engine.creates();
    assert_eq!(creates.len(), 1);
    assert_eq!(
        creates[0].to_args(),
        [
            path.to_str().unwrap(),
            "-b",
            "9",
            "-s",
            "30",
            "DS:sum:GAUGE:240:U:U",
            "RRA:AVERAGE:0.5:1:244",
        ]
    );
}

#[test]
fn existing_file_is_never_recreated() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(RecordingEngine::new());
    let writer = ArchiveWriter::new(engine.clone(), Vec::new());
    let path = dir.path().join("load.rrd");
    std::fs::write(&path, b"existing").unwrap();

    let res = writer
        .ensure_created(&path, &cluster_at(1), &float_metric("load", 1.0), 15, SeriesLayout::Single)
        .unwrap();
    assert_eq!(res, Creation::AlreadyPresent);
    assert_eq!(std::fs::read(&path).unwrap(), b"existing");
    assert!(engine.creates().is_empty());
}

#[test]
fn empty_archive_list_is_a_creation_error() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(RecordingEngine::new());
    let writer = ArchiveWriter::new(engine.clone(), Vec::new());
    let path = dir.path().join("load.rrd");

    let err = writer
        .ensure_created(&path, &cluster_at(1), &float_metric("load", 1.0), 15, SeriesLayout::Single)
        .unwrap_err();
    assert!(matches!(err, ArchiveError::NoArchives(_)));
    assert!(!path.exists());
    assert!(engine.creates().is_empty());
}

#[test]
fn engine_failure_is_wrapped_with_path() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(RecordingEngine::failing_updates_for("load"));
    let writer = ArchiveWriter::new(engine, archives());
    let path = dir.path().join("load.rrd");

    let err = writer
        .update(&path, &cluster_at(5), &float_metric("load", 1.0), SeriesLayout::Single)
        .unwrap_err();
    assert!(matches!(err, ArchiveError::Update { .. }));
    assert!(err.to_string().contains("load.rrd"));
}

#[test]
fn summary_update_writes_sum_and_num() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(RecordingEngine::new());
    let writer = ArchiveWriter::new(engine.clone(), archives());
    let path = dir.path().join("cpu_num.rrd");
    let metric = MetricNode::summary("cpu_num", MetricType::Uint16, Slope::Zero, 64.0, 8);

    writer
        .ensure_created(&path, &cluster_at(7), &metric, 15, SeriesLayout::Summary)
        .unwrap();
    writer
        .update(&path, &cluster_at(7), &metric, SeriesLayout::Summary)
        .unwrap();

    assert_eq!(engine.creates()[0].data_sources.len(), 2);
    assert_eq!(engine.updates(), [(path, "7:64:8".to_string())]);
}

#[test]
fn update_without_value_is_rejected_before_engine() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(RecordingEngine::new());
    let writer = ArchiveWriter::new(engine.clone(), archives());
    let mut metric = float_metric("load", 1.0);
    metric.val = None;

    let err = writer
        .update(&dir.path().join("load.rrd"), &cluster_at(1), &metric, SeriesLayout::Single)
        .unwrap_err();
    assert!(matches!(err, ArchiveError::MissingValue { field: "val", .. }));
    assert!(engine.updates().is_empty());
}
