//! Graph-building interface and a petgraph-backed implementation.
//!
//! # Overview
//!
//! The miner never lays out or draws anything. It emits abstract
//! operations against a [`GraphSink`]:
//!
//! ```text
//! add_event × frequent nodes
//! create_edge × surviving edges
//! add_start_node, add_end_node
//! add_starting_edges / add_ending_edges (log-recorded, then inferred)
//! ```
//!
//! [`ProcessGraph`] records those operations into a [`petgraph`] directed
//! graph with two virtual nodes for the process start and end. It can be
//! flattened into a serializable [`GraphSnapshot`] for JSON output.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::sizing::NodeSize;

/// Receiver for the miner's node/edge emissions.
pub trait GraphSink {
    fn add_event(&mut self, id: &str, frequency: u64, size: NodeSize);
    fn create_edge(&mut self, source: &str, target: &str, weight: u64, size: f64);
    fn add_start_node(&mut self);
    fn add_end_node(&mut self);
    fn add_starting_edges(&mut self, ids: &BTreeSet<String>);
    fn add_ending_edges(&mut self, ids: &BTreeSet<String>);
}

// ---------------------------------------------------------------------------
// ProcessGraph
// ---------------------------------------------------------------------------

/// Node payload in a [`ProcessGraph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessNode {
    Start,
    End,
    Event {
        id: String,
        frequency: u64,
        size: NodeSize,
    },
}

impl ProcessNode {
    /// Display label: the event id, or `"start"` / `"end"`.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Event { id, .. } => id.as_str(),
        }
    }
}

/// Edge payload in a [`ProcessGraph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessEdge {
    Flow { weight: u64, size: f64 },
    Start,
    End,
}

/// Directed process graph assembled from [`GraphSink`] calls.
#[derive(Debug, Default)]
pub struct ProcessGraph {
    pub graph: DiGraph<ProcessNode, ProcessEdge>,
    node_map: HashMap<String, NodeIndex>,
    start: Option<NodeIndex>,
    end: Option<NodeIndex>,
}

impl ProcessGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the `NodeIndex` for an event id.
    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Number of event nodes, excluding the virtual start/end.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.node_map.len()
    }

    /// Number of event-to-event edges.
    #[must_use]
    pub fn flow_edge_count(&self) -> usize {
        self.graph
            .edge_weights()
            .filter(|e| matches!(e, ProcessEdge::Flow { .. }))
            .count()
    }

    /// `true` if `source → target` was emitted as a flow edge.
    #[must_use]
    pub fn has_flow(&self, source: &str, target: &str) -> bool {
        match (self.node_index(source), self.node_index(target)) {
            (Some(a), Some(b)) => self
                .graph
                .edges_connecting(a, b)
                .any(|e| matches!(e.weight(), ProcessEdge::Flow { .. })),
            _ => false,
        }
    }

    /// Event ids connected from the virtual start node, sorted.
    #[must_use]
    pub fn starting_events(&self) -> Vec<String> {
        self.start.map_or_else(Vec::new, |start| {
            let mut ids: Vec<String> = self
                .graph
                .edges(start)
                .map(|e| self.graph[e.target()].label().to_string())
                .collect();
            ids.sort_unstable();
            ids
        })
    }

    /// Event ids connected to the virtual end node, sorted.
    #[must_use]
    pub fn ending_events(&self) -> Vec<String> {
        self.end.map_or_else(Vec::new, |end| {
            let mut ids: Vec<String> = self
                .graph
                .edges_directed(end, petgraph::Direction::Incoming)
                .map(|e| self.graph[e.source()].label().to_string())
                .collect();
            ids.sort_unstable();
            ids
        })
    }

    /// Flatten into a serializable node/edge listing.
    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        let nodes = self.graph.node_weights().cloned().collect();
        let edges = self
            .graph
            .edge_references()
            .map(|e| EdgeRecord {
                source: self.graph[e.source()].label().to_string(),
                target: self.graph[e.target()].label().to_string(),
                edge: e.weight().clone(),
            })
            .collect();
        GraphSnapshot { nodes, edges }
    }

    fn start_index(&mut self) -> NodeIndex {
        *self
            .start
            .get_or_insert_with(|| self.graph.add_node(ProcessNode::Start))
    }

    fn end_index(&mut self) -> NodeIndex {
        *self
            .end
            .get_or_insert_with(|| self.graph.add_node(ProcessNode::End))
    }
}

impl GraphSink for ProcessGraph {
    fn add_event(&mut self, id: &str, frequency: u64, size: NodeSize) {
        if self.node_map.contains_key(id) {
            warn!(id, "event added twice; keeping the first");
            return;
        }
        let idx = self.graph.add_node(ProcessNode::Event {
            id: id.to_string(),
            frequency,
            size,
        });
        self.node_map.insert(id.to_string(), idx);
    }

    fn create_edge(&mut self, source: &str, target: &str, weight: u64, size: f64) {
        let (Some(a), Some(b)) = (self.node_index(source), self.node_index(target)) else {
            warn!(source, target, "edge references an unknown event; skipped");
            return;
        };
        self.graph.add_edge(a, b, ProcessEdge::Flow { weight, size });
    }

    fn add_start_node(&mut self) {
        self.start_index();
    }

    fn add_end_node(&mut self) {
        self.end_index();
    }

    fn add_starting_edges(&mut self, ids: &BTreeSet<String>) {
        let start = self.start_index();
        for id in ids {
            if let Some(idx) = self.node_index(id) {
                self.graph.update_edge(start, idx, ProcessEdge::Start);
            } else {
                warn!(id = id.as_str(), "starting edge to unknown event; skipped");
            }
        }
    }

    fn add_ending_edges(&mut self, ids: &BTreeSet<String>) {
        let end = self.end_index();
        for id in ids {
            if let Some(idx) = self.node_index(id) {
                self.graph.update_edge(idx, end, ProcessEdge::End);
            } else {
                warn!(id = id.as_str(), "ending edge from unknown event; skipped");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// GraphSnapshot
// ---------------------------------------------------------------------------

/// Serializable view of a [`ProcessGraph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<ProcessNode>,
    pub edges: Vec<EdgeRecord>,
}

/// One edge of a [`GraphSnapshot`], endpoints named by label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    #[serde(flatten)]
    pub edge: ProcessEdge,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: NodeSize = NodeSize {
        width: 1.0,
        height: 1.0,
    };

    fn ids(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn records_events_and_flows() {
        let mut g = ProcessGraph::new();
        g.add_event("A", 3, SIZE);
        g.add_event("B", 2, SIZE);
        g.create_edge("A", "B", 2, 1.3);

        assert_eq!(g.event_count(), 2);
        assert_eq!(g.flow_edge_count(), 1);
        assert!(g.has_flow("A", "B"));
        assert!(!g.has_flow("B", "A"));
    }

    #[test]
    fn unknown_endpoints_are_skipped() {
        let mut g = ProcessGraph::new();
        g.add_event("A", 3, SIZE);
        g.create_edge("A", "Z", 1, 1.0);
        g.add_starting_edges(&ids(&["Z"]));
        assert_eq!(g.flow_edge_count(), 0);
        assert!(g.starting_events().is_empty());
    }

    #[test]
    fn start_and_end_edges_are_deduplicated() {
        let mut g = ProcessGraph::new();
        g.add_event("A", 1, SIZE);
        g.add_event("B", 1, SIZE);
        g.add_start_node();
        g.add_end_node();
        g.add_starting_edges(&ids(&["A"]));
        g.add_starting_edges(&ids(&["A", "B"]));
        g.add_ending_edges(&ids(&["B"]));

        assert_eq!(g.starting_events(), vec!["A", "B"]);
        assert_eq!(g.ending_events(), vec!["B"]);
        // 2 events + start + end
        assert_eq!(g.graph.node_count(), 4);
    }

    #[test]
    fn duplicate_event_keeps_first() {
        let mut g = ProcessGraph::new();
        g.add_event("A", 1, SIZE);
        g.add_event("A", 9, SIZE);
        assert_eq!(g.event_count(), 1);
    }

    #[test]
    fn snapshot_serializes_with_kinds() {
        let mut g = ProcessGraph::new();
        g.add_event("A", 1, SIZE);
        g.add_start_node();
        g.add_starting_edges(&ids(&["A"]));

        let json = serde_json::to_value(g.snapshot()).expect("serialize");
        assert_eq!(json["nodes"][0]["kind"], "event");
        assert_eq!(json["nodes"][0]["id"], "A");
        assert_eq!(json["nodes"][1]["kind"], "start");
        assert_eq!(json["edges"][0]["source"], "start");
        assert_eq!(json["edges"][0]["target"], "A");
        assert_eq!(json["edges"][0]["kind"], "start");
    }
}
