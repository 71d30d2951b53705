//! Tests for the exporter against a mock Prometheus backend:
//! - one table per catalog entry on success
//! - header-only tables for queries matching nothing
//! - collect-then-decide failure aggregation

use shardscope::catalog::LabelSet;
use shardscope::export::{ExportReport, Exporter, SeriesOutcome};
use shardscope::series;
use shardscope::window::{parse_utc, TimeWindow};
use shardscope::Error;

use std::path::PathBuf;
use tempfile::tempdir;

fn window() -> TimeWindow {
    TimeWindow::new(
        parse_utc("2025-12-02T18:44:15Z").unwrap(),
        parse_utc("2025-12-02T20:08:00Z").unwrap(),
        "60s",
        "1m",
    )
    .unwrap()
}

fn labels() -> LabelSet {
    LabelSet::new("shard_distributor_replay", "fixed", "ShardAssignLoop")
}

const MATRIX_BODY: &str = r#"{
    "status": "success",
    "data": {
        "resultType": "matrix",
        "result": [
            {
                "metric": {"namespace": "shard_distributor_replay"},
                "values": [[1764700000.5, "1.5"], [1764700060.0, "2.25"], [1764700120.9, "NaN"]]
            }
        ]
    }
}"#;

const EMPTY_BODY: &str = r#"{
    "status": "success",
    "data": {"resultType": "matrix", "result": []}
}"#;

// =========================================================================
// Happy path
// =========================================================================

#[test]
fn test_export_writes_one_table_per_catalog_entry() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/v1/query_range")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(MATRIX_BODY)
        .expect(16)
        .create();

    let dir = tempdir().unwrap();
    let exporter = Exporter::new(server.url()).unwrap();
    let report = exporter.export(&window(), &labels(), dir.path());

    assert_eq!(report.outcomes.len(), 16);
    assert!(report.failures().is_empty());
    assert_eq!(report.written().len(), 16);
    for path in report.written() {
        assert!(path.exists(), "missing table {}", path.display());
    }
    assert!(dir.path().join("moves_per_window.csv").exists());
    assert!(dir.path().join("active_executors.csv").exists());
    mock.assert();
}

#[test]
fn test_exported_timestamps_truncated_to_seconds() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v1/query_range")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(MATRIX_BODY)
        .create();

    let dir = tempdir().unwrap();
    let exporter = Exporter::new(server.url()).unwrap();
    exporter.export(&window(), &labels(), dir.path());

    let contents = std::fs::read_to_string(dir.path().join("smoothed_cv.csv")).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("timestamp,value"));
    // 1764700000.5 truncates to 18:26:40, fraction discarded
    assert_eq!(lines.next(), Some("2025-12-02 18:26:40,1.5"));
    assert_eq!(lines.next(), Some("2025-12-02 18:27:40,2.25"));
    // raw NaN token is preserved on disk (dropped only on load)
    assert_eq!(lines.next(), Some("2025-12-02 18:28:40,NaN"));
}

#[test]
fn test_round_trip_drops_only_nan_rows() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v1/query_range")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(MATRIX_BODY)
        .create();

    let dir = tempdir().unwrap();
    let exporter = Exporter::new(server.url()).unwrap();
    exporter.export(&window(), &labels(), dir.path());

    let points = series::load_table(&dir.path().join("reported_cv.csv")).unwrap();
    assert_eq!(points.len(), 2, "the NaN row is dropped on load");
    assert_eq!(points[0].value, 1.5);
    assert_eq!(points[1].value, 2.25);
}

#[test]
fn test_no_matching_series_writes_header_only_table() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v1/query_range")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(EMPTY_BODY)
        .create();

    let dir = tempdir().unwrap();
    let exporter = Exporter::new(server.url()).unwrap();
    let report = exporter.export(&window(), &labels(), dir.path());

    assert!(report.failures().is_empty(), "empty result is not an error");
    let contents = std::fs::read_to_string(dir.path().join("active_shards.csv")).unwrap();
    assert_eq!(contents.trim_end(), "timestamp,value");
}

// =========================================================================
// Failure handling
// =========================================================================

#[test]
fn test_backend_http_failure_collected_per_query() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/v1/query_range")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .with_body("boom")
        .expect(16)
        .create();

    let dir = tempdir().unwrap();
    let exporter = Exporter::new(server.url()).unwrap();
    let report = exporter.export(&window(), &labels(), dir.path());

    // every catalog entry was still attempted, no short-circuit
    mock.assert();
    assert_eq!(report.outcomes.len(), 16);
    assert_eq!(report.failures().len(), 16);

    let err = report.into_result().unwrap_err();
    match err {
        Error::Export(messages) => {
            assert_eq!(messages.len(), 16);
            assert!(
                messages.iter().any(|m| m.contains("moves_per_window")),
                "messages identify the failing query: {messages:?}"
            );
        }
        other => panic!("expected Error::Export, got {other}"),
    }
}

#[test]
fn test_non_success_envelope_is_a_query_failure() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v1/query_range")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status": "error", "error": "query timed out"}"#)
        .create();

    let dir = tempdir().unwrap();
    let exporter = Exporter::new(server.url()).unwrap();
    let report = exporter.export(&window(), &labels(), dir.path());

    assert_eq!(report.failures().len(), 16);
    assert!(report.failures()[0].contains("query timed out"));
}

#[test]
fn test_report_aggregation_keeps_sibling_successes_visible() {
    // The collect-then-decide contract, independent of transport: a report
    // with mixed outcomes fails overall but still names what was written.
    let report = ExportReport {
        outcomes: vec![
            SeriesOutcome {
                name: "smoothed_cv",
                outcome: Ok((PathBuf::from("/run/smoothed_cv.csv"), 10)),
            },
            SeriesOutcome {
                name: "reported_cv",
                outcome: Err("reported_cv: Backend error: HTTP 500".to_string()),
            },
            SeriesOutcome {
                name: "moves_per_window",
                outcome: Ok((PathBuf::from("/run/moves_per_window.csv"), 0)),
            },
        ],
    };

    assert_eq!(report.written().len(), 2);
    assert_eq!(report.failures().len(), 1);

    let err = report.into_result().unwrap_err();
    assert!(err.to_string().contains("reported_cv"));
}
