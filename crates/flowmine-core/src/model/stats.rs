//! Precomputed log statistics consumed by the mining engines.
//!
//! # Overview
//!
//! Event-log ingestion happens upstream. What reaches flowmine is a small
//! bundle of derived statistics:
//!
//! - an ordered [`EventIndex`] naming the rows/columns of every matrix,
//! - a [`SuccessionMatrix`] of directly-follows counts,
//! - per-event appearance frequencies,
//! - the sets of events that start and end at least one trace.
//!
//! [`LogStatistics::new`] validates the bundle once. Everything downstream
//! can index freely without re-checking shapes.
//!
//! ## File Format
//!
//! The CLI reads the same bundle from JSON:
//!
//! ```json
//! {
//!   "events": ["A", "B", "C"],
//!   "succession": [[0, 10, 0], [0, 0, 5], [0, 0, 0]],
//!   "appearance": {"A": 10, "B": 15, "C": 5},
//!   "start": ["A"],
//!   "end": ["C"]
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::MiningError;
use crate::model::matrix::{Matrix, SuccessionMatrix};

// ---------------------------------------------------------------------------
// EventIndex
// ---------------------------------------------------------------------------

/// Fixed, ordered list of distinct event identifiers.
///
/// Position `i` in the index is row/column `i` of every matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventIndex {
    ids: Vec<String>,
    positions: HashMap<String, usize>,
}

impl EventIndex {
    /// Build an index from identifiers in matrix order.
    ///
    /// # Errors
    ///
    /// Returns [`MiningError::DuplicateEvent`] if an identifier repeats.
    pub fn new<I, S>(ids: I) -> Result<Self, MiningError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let mut positions = HashMap::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            if positions.insert(id.clone(), i).is_some() {
                return Err(MiningError::DuplicateEvent(id.clone()));
            }
        }
        Ok(Self { ids, positions })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifier at matrix position `i`.
    #[must_use]
    pub fn id(&self, i: usize) -> Option<&str> {
        self.ids.get(i).map(String::as_str)
    }

    /// Matrix position of `id`.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Iterate identifiers in matrix order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// LogStatistics
// ---------------------------------------------------------------------------

/// Validated statistics bundle for one event log.
///
/// Immutable after construction. Appearance frequencies are stored aligned
/// with the [`EventIndex`]; events missing from the input mapping count 0.
#[derive(Debug, Clone)]
pub struct LogStatistics {
    events: EventIndex,
    succession: SuccessionMatrix,
    appearance: Vec<u64>,
    start_nodes: BTreeSet<String>,
    end_nodes: BTreeSet<String>,
}

impl LogStatistics {
    /// Validate and assemble a statistics bundle.
    ///
    /// # Errors
    ///
    /// - [`MiningError::ShapeMismatch`] if the matrix dimension differs from
    ///   the number of events.
    /// - [`MiningError::UnknownEvent`] if an appearance key or a start/end
    ///   identifier is not in `events`.
    pub fn new(
        events: EventIndex,
        succession: SuccessionMatrix,
        appearance: &BTreeMap<String, u64>,
        start_nodes: BTreeSet<String>,
        end_nodes: BTreeSet<String>,
    ) -> Result<Self, MiningError> {
        if succession.dim() != events.len() {
            return Err(MiningError::ShapeMismatch {
                rows: succession.dim(),
                columns: succession.dim(),
                expected: events.len(),
            });
        }

        let mut aligned = vec![0_u64; events.len()];
        for (id, &count) in appearance {
            let i = events
                .position(id)
                .ok_or_else(|| MiningError::UnknownEvent(id.clone()))?;
            aligned[i] = count;
        }

        if let Some(unknown) = start_nodes
            .iter()
            .chain(end_nodes.iter())
            .find(|id| events.position(id).is_none())
        {
            return Err(MiningError::UnknownEvent(unknown.clone()));
        }

        Ok(Self {
            events,
            succession,
            appearance: aligned,
            start_nodes,
            end_nodes,
        })
    }

    /// Parse and validate a JSON statistics document.
    ///
    /// # Errors
    ///
    /// Returns [`MiningError::Parse`] for malformed JSON, otherwise any
    /// validation error from [`LogStatistics::new`].
    pub fn from_json_str(input: &str) -> Result<Self, MiningError> {
        let file: StatisticsFile = serde_json::from_str(input)?;
        file.into_statistics()
    }

    /// Read, parse, and validate a JSON statistics file.
    ///
    /// # Errors
    ///
    /// Returns [`MiningError::Io`] if the file cannot be read, otherwise any
    /// error from [`LogStatistics::from_json_str`].
    #[instrument]
    pub fn from_path(path: &Path) -> Result<Self, MiningError> {
        let content = std::fs::read_to_string(path)?;
        let stats = Self::from_json_str(&content)?;
        debug!(events = stats.events.len(), "loaded log statistics");
        Ok(stats)
    }

    #[must_use]
    pub const fn events(&self) -> &EventIndex {
        &self.events
    }

    #[must_use]
    pub const fn succession(&self) -> &SuccessionMatrix {
        &self.succession
    }

    /// Appearance frequency for every event, aligned with [`Self::events`].
    #[must_use]
    pub fn appearance(&self) -> &[u64] {
        &self.appearance
    }

    /// Appearance frequency of one event, if it exists.
    #[must_use]
    pub fn appearance_of(&self, id: &str) -> Option<u64> {
        self.events.position(id).map(|i| self.appearance[i])
    }

    #[must_use]
    pub const fn start_nodes(&self) -> &BTreeSet<String> {
        &self.start_nodes
    }

    #[must_use]
    pub const fn end_nodes(&self) -> &BTreeSet<String> {
        &self.end_nodes
    }

    /// Largest directly-follows count, or 0 for an empty log.
    ///
    /// Upper bound for a sensible minimum-frequency setting.
    #[must_use]
    pub fn max_frequency(&self) -> u64 {
        self.succession.cells().map(|(_, _, v)| v).max().unwrap_or(0)
    }

    /// Largest appearance frequency, or 0 for an empty log.
    #[must_use]
    pub fn max_appearance(&self) -> u64 {
        self.appearance.iter().copied().max().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// StatisticsFile
// ---------------------------------------------------------------------------

/// Serialized form of [`LogStatistics`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatisticsFile {
    pub events: Vec<String>,
    pub succession: Vec<Vec<u64>>,
    #[serde(default)]
    pub appearance: BTreeMap<String, u64>,
    #[serde(default)]
    pub start: BTreeSet<String>,
    #[serde(default)]
    pub end: BTreeSet<String>,
}

impl StatisticsFile {
    /// Validate the raw document into [`LogStatistics`].
    ///
    /// # Errors
    ///
    /// Propagates shape and identifier errors from [`Matrix::from_rows`],
    /// [`EventIndex::new`], and [`LogStatistics::new`].
    pub fn into_statistics(self) -> Result<LogStatistics, MiningError> {
        let events = EventIndex::new(self.events)?;
        let succession = Matrix::from_rows(self.succession)?;
        LogStatistics::new(events, succession, &self.appearance, self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN: &str = r#"{
        "events": ["A", "B", "C"],
        "succession": [[0, 10, 0], [0, 0, 5], [0, 0, 0]],
        "appearance": {"A": 10, "B": 15, "C": 5},
        "start": ["A"],
        "end": ["C"]
    }"#;

    #[test]
    fn parses_chain_document() {
        let stats = LogStatistics::from_json_str(CHAIN).expect("valid");
        assert_eq!(stats.events().len(), 3);
        assert_eq!(stats.events().position("B"), Some(1));
        assert_eq!(stats.succession().get(0, 1), 10);
        assert_eq!(stats.appearance_of("B"), Some(15));
        assert!(stats.start_nodes().contains("A"));
        assert!(stats.end_nodes().contains("C"));
        assert_eq!(stats.max_frequency(), 10);
        assert_eq!(stats.max_appearance(), 15);
    }

    #[test]
    fn duplicate_events_rejected() {
        let err = EventIndex::new(["A", "B", "A"]).expect_err("duplicate");
        assert!(matches!(err, MiningError::DuplicateEvent(ref id) if id == "A"));
    }

    #[test]
    fn dimension_must_match_event_count() {
        let events = EventIndex::new(["A", "B", "C"]).expect("index");
        let succession = Matrix::from_rows(vec![vec![0_u64, 1], vec![1, 0]]).expect("square");
        let err = LogStatistics::new(
            events,
            succession,
            &BTreeMap::new(),
            BTreeSet::new(),
            BTreeSet::new(),
        )
        .expect_err("mismatch");
        assert!(matches!(
            err,
            MiningError::ShapeMismatch {
                rows: 2,
                expected: 3,
                ..
            }
        ));
    }

    #[test]
    fn unknown_start_node_rejected() {
        let doc = r#"{"events": ["A"], "succession": [[0]], "start": ["Z"]}"#;
        let err = LogStatistics::from_json_str(doc).expect_err("unknown");
        assert!(matches!(err, MiningError::UnknownEvent(ref id) if id == "Z"));
    }

    #[test]
    fn unknown_appearance_key_rejected() {
        let doc = r#"{"events": ["A"], "succession": [[0]], "appearance": {"Q": 3}}"#;
        let err = LogStatistics::from_json_str(doc).expect_err("unknown");
        assert!(matches!(err, MiningError::UnknownEvent(ref id) if id == "Q"));
    }

    #[test]
    fn missing_appearance_defaults_to_zero() {
        let doc = r#"{"events": ["A", "B"], "succession": [[0, 1], [0, 0]], "appearance": {"A": 2}}"#;
        let stats = LogStatistics::from_json_str(doc).expect("valid");
        assert_eq!(stats.appearance(), &[2, 0]);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = LogStatistics::from_json_str("{not json").expect_err("parse");
        assert!(matches!(err, MiningError::Parse(_)));
    }

    #[test]
    fn empty_log_is_valid() {
        let doc = r#"{"events": [], "succession": []}"#;
        let stats = LogStatistics::from_json_str(doc).expect("valid");
        assert!(stats.events().is_empty());
        assert_eq!(stats.max_frequency(), 0);
        assert_eq!(stats.max_appearance(), 0);
    }
}
