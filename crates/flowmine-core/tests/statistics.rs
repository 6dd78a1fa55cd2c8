//! Loading and validation of statistics files.
//!
//! - file-based loading through [`LogStatistics::from_path`]
//! - error codes surfaced for unreadable or malformed input
//! - property checks for matrix shape validation and frequency maxima

use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use flowmine_core::model::StatisticsFile;
use flowmine_core::{ErrorCode, LogStatistics, Matrix, MiningError};
use proptest::prelude::*;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn square_rows(max_dim: usize) -> impl Strategy<Value = Vec<Vec<u64>>> {
    (0..=max_dim).prop_flat_map(|n| prop::collection::vec(prop::collection::vec(0_u64..500, n), n))
}

// ---------------------------------------------------------------------------
// File loading
// ---------------------------------------------------------------------------

#[test]
fn loads_statistics_from_disk() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("stats.json");
    fs::write(
        &path,
        r#"{
            "events": ["receive", "approve"],
            "succession": [[0, 7], [2, 0]],
            "appearance": {"receive": 9, "approve": 7},
            "start": ["receive"],
            "end": ["approve"]
        }"#,
    )
    .expect("write");

    let stats = LogStatistics::from_path(&path).expect("load");
    assert_eq!(stats.events().len(), 2);
    assert_eq!(stats.events().position("approve"), Some(1));
    assert_eq!(stats.appearance_of("receive"), Some(9));
    assert_eq!(stats.max_frequency(), 7);
    assert!(stats.end_nodes().contains("approve"));
}

#[test]
fn optional_sections_default_to_empty() {
    let stats =
        LogStatistics::from_json_str(r#"{"events": ["solo"], "succession": [[3]]}"#).expect("load");
    assert_eq!(stats.appearance(), &[0_u64]);
    assert!(stats.start_nodes().is_empty());
    assert!(stats.end_nodes().is_empty());
}

#[test]
fn missing_file_is_read_failure() {
    let dir = TempDir::new().expect("tempdir");
    let err = LogStatistics::from_path(&dir.path().join("absent.json")).expect_err("missing");
    assert!(matches!(err, MiningError::Io(_)));
    assert_eq!(err.code(), ErrorCode::StatisticsReadFailed);
}

#[test]
fn malformed_json_is_parse_failure() {
    let err = LogStatistics::from_json_str("{\"events\": [").expect_err("malformed");
    assert_eq!(err.code(), ErrorCode::StatisticsParseError);
}

#[test]
fn start_outside_events_is_rejected() {
    let file = StatisticsFile {
        events: vec!["A".into()],
        succession: vec![vec![0]],
        appearance: BTreeMap::new(),
        start: BTreeSet::from(["Z".to_string()]),
        end: BTreeSet::new(),
    };
    let err = file.into_statistics().expect_err("unknown start");
    assert_eq!(err.code(), ErrorCode::UnknownEvent);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn square_rows_always_build(rows in square_rows(8)) {
        let n = rows.len();
        let matrix = Matrix::from_rows(rows.clone()).expect("square");
        prop_assert_eq!(matrix.dim(), n);
        prop_assert_eq!(matrix.to_rows(), rows);
    }

    #[test]
    fn truncated_row_is_rejected(rows in square_rows(8), which in any::<prop::sample::Index>()) {
        prop_assume!(!rows.is_empty());
        let mut rows = rows;
        let i = which.index(rows.len());
        rows[i].pop();
        let err = Matrix::from_rows(rows).expect_err("ragged");
        prop_assert_eq!(err.code(), ErrorCode::ShapeMismatch);
    }

    #[test]
    fn max_frequency_is_largest_cell(rows in square_rows(6)) {
        let expected = rows.iter().flatten().copied().max().unwrap_or(0);
        let events: Vec<String> = (0..rows.len()).map(|i| format!("e{i}")).collect();
        let file = StatisticsFile {
            events,
            succession: rows,
            ..StatisticsFile::default()
        };
        let stats = file.into_statistics().expect("valid");
        prop_assert_eq!(stats.max_frequency(), expected);
    }
}
