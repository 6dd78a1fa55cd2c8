//! Source/sink inference on the filtered dependency graph.
//!
//! # Overview
//!
//! After filtering, some activities may lose every predecessor or every
//! successor. Those behave like process starts or ends under the current
//! thresholds even if the log never recorded them as such.
//!
//! - A **source** has no incoming edge from any *other* node.
//! - A **sink** has no outgoing edge to any *other* node.
//!
//! Self-loops are ignored: an activity that only repeats itself is still a
//! source (or sink).
//!
//! Inference runs on the subgraph induced by a caller-supplied node subset
//! (normally the frequent nodes). An empty subset yields empty sets.

use std::collections::BTreeSet;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::filter::FilteredGraph;

/// Subgraph of a [`FilteredGraph`] induced by a node subset.
///
/// Node weights are matrix positions; edge weights are surviving counts.
#[derive(Debug)]
pub struct InducedGraph {
    pub graph: DiGraph<usize, u64>,
}

impl InducedGraph {
    /// Keep only `nodes` and the nonzero edges between them.
    ///
    /// Positions outside the matrix are skipped.
    #[must_use]
    pub fn new(filtered: &FilteredGraph, nodes: &[usize]) -> Self {
        let mut graph = DiGraph::<usize, u64>::with_capacity(nodes.len(), nodes.len());
        let mut index_of: Vec<Option<NodeIndex>> = vec![None; filtered.dim()];

        for &position in nodes {
            if position < filtered.dim() && index_of[position].is_none() {
                index_of[position] = Some(graph.add_node(position));
            }
        }

        for (source, target, count) in filtered.edges() {
            if let (Some(a), Some(b)) = (index_of[source], index_of[target]) {
                graph.add_edge(a, b, count);
            }
        }

        Self { graph }
    }

    /// Positions with no incoming edge from another node.
    #[must_use]
    pub fn sources(&self) -> BTreeSet<usize> {
        self.isolated_in(Direction::Incoming)
    }

    /// Positions with no outgoing edge to another node.
    #[must_use]
    pub fn sinks(&self) -> BTreeSet<usize> {
        self.isolated_in(Direction::Outgoing)
    }

    fn isolated_in(&self, direction: Direction) -> BTreeSet<usize> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .neighbors_directed(idx, direction)
                    .all(|other| other == idx)
            })
            .map(|idx| self.graph[idx])
            .collect()
    }
}

/// Sources of `filtered` restricted to `nodes`.
#[must_use]
pub fn sources(filtered: &FilteredGraph, nodes: &[usize]) -> BTreeSet<usize> {
    InducedGraph::new(filtered, nodes).sources()
}

/// Sinks of `filtered` restricted to `nodes`.
#[must_use]
pub fn sinks(filtered: &FilteredGraph, nodes: &[usize]) -> BTreeSet<usize> {
    InducedGraph::new(filtered, nodes).sinks()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
