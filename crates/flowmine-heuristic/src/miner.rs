//! Heuristic miner: assembles the visible process graph.
//!
//! # Overview
//!
//! [`HeuristicMiner`] owns the validated [`LogStatistics`] plus two caches
//! computed once at construction:
//!
//! - the [`DependencyMatrix`] derived from the succession counts,
//! - the [`ScaleTable`] fitted over every distinct succession count.
//!
//! Each call to [`HeuristicMiner::build_visible_graph`] is a pure
//! recomputation from those caches and one [`HeuristicParams`] pair.
//! Parameters are validated first and the whole emission is planned before
//! the first sink call, so a failing call never leaves a partial graph.
//!
//! ## Emission Order
//!
//! ```text
//! 1. add_event            for each frequent node (index order)
//! 2. create_edge          for each surviving edge between frequent nodes
//! 3. add_start_node, add_end_node
//! 4. add_starting_edges   log start nodes ∩ frequent
//!    add_ending_edges     log end nodes ∩ frequent
//! 5. add_starting_edges   inferred sources − log start nodes
//!    add_ending_edges     inferred sinks − log end nodes
//! ```

use std::collections::BTreeSet;

use flowmine_core::config::{HeuristicConfig, MiningConfig};
use flowmine_core::{LogStatistics, MiningError};
use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::dependency::DependencyMatrix;
use crate::filter::{FilteredGraph, HeuristicParams};
use crate::scale::{DensityBuckets, ScaleStrategy, ScaleTable};
use crate::sink::GraphSink;
use crate::sizing::{FrequencyNodeSizer, NodeSize, NodeSizer};
use crate::topology::InducedGraph;

// ---------------------------------------------------------------------------
// EdgePolicy
// ---------------------------------------------------------------------------

/// How edge thickness is derived from a scale score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePolicy {
    /// Baseline added to every scaled thickness.
    pub min_edge_thickness: f64,
    /// Thickness used for every edge when the dependency threshold is 0.
    pub zero_threshold_thickness: f64,
}

impl Default for EdgePolicy {
    fn default() -> Self {
        Self::from_config(&HeuristicConfig::default())
    }
}

impl EdgePolicy {
    #[must_use]
    pub const fn from_config(config: &HeuristicConfig) -> Self {
        Self {
            min_edge_thickness: config.min_edge_thickness,
            zero_threshold_thickness: config.zero_threshold_edge_thickness,
        }
    }
}

// ---------------------------------------------------------------------------
// GraphSummary
// ---------------------------------------------------------------------------

/// What one [`HeuristicMiner::build_visible_graph`] call emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSummary {
    pub params: HeuristicParams,
    pub node_count: usize,
    pub edge_count: usize,
    /// Log-recorded start activities that are frequent.
    pub start_events: BTreeSet<String>,
    /// Log-recorded end activities that are frequent.
    pub end_events: BTreeSet<String>,
    /// Activities that only act as starts under the current filtering.
    pub inferred_starts: BTreeSet<String>,
    /// Activities that only act as ends under the current filtering.
    pub inferred_ends: BTreeSet<String>,
}

struct PlannedEdge<'a> {
    source: &'a str,
    target: &'a str,
    weight: u64,
    size: f64,
}

// ---------------------------------------------------------------------------
// HeuristicMiner
// ---------------------------------------------------------------------------

/// Heuristic mining engine over one set of log statistics.
///
/// Read-only after construction; share it freely between readers.
#[derive(Debug, Clone)]
pub struct HeuristicMiner {
    stats: LogStatistics,
    dependency: DependencyMatrix,
    scale: ScaleTable,
    policy: EdgePolicy,
}

impl HeuristicMiner {
    /// Build with the default density bucketing and edge policy.
    #[must_use]
    pub fn new(stats: LogStatistics) -> Self {
        Self::with_strategy(stats, &DensityBuckets::default(), EdgePolicy::default())
    }

    /// Build with bucketing and edge policy taken from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`MiningError::InvalidScaleBounds`] for a bad `[scale]` range.
    pub fn from_config(stats: LogStatistics, config: &MiningConfig) -> Result<Self, MiningError> {
        Ok(Self::with_strategy(
            stats,
            &DensityBuckets::from_config(&config.scale)?,
            EdgePolicy::from_config(&config.heuristic),
        ))
    }

    /// Build with an explicit scale strategy.
    #[must_use]
    #[instrument(skip_all, fields(events = stats.events().len()))]
    #[allow(clippy::cast_precision_loss)]
    pub fn with_strategy(
        stats: LogStatistics,
        strategy: &dyn ScaleStrategy,
        policy: EdgePolicy,
    ) -> Self {
        let dependency = DependencyMatrix::build(stats.succession());
        let magnitudes: Vec<f64> = stats
            .succession()
            .cells()
            .map(|(_, _, count)| count as f64)
            .collect();
        let scale = strategy.fit(&magnitudes);
        debug!(distinct_frequencies = scale.len(), "heuristic miner ready");
        Self {
            stats,
            dependency,
            scale,
            policy,
        }
    }

    #[must_use]
    pub const fn statistics(&self) -> &LogStatistics {
        &self.stats
    }

    #[must_use]
    pub const fn dependency_matrix(&self) -> &DependencyMatrix {
        &self.dependency
    }

    /// Largest directly-follows count in the log.
    #[must_use]
    pub fn max_frequency(&self) -> u64 {
        self.stats.max_frequency()
    }

    /// Node sizer scaled to this log's appearance frequencies.
    #[must_use]
    pub fn default_sizer(&self, config: &MiningConfig) -> FrequencyNodeSizer {
        FrequencyNodeSizer::new(config.node.clone(), self.stats.max_appearance())
    }

    /// Validate `params` and filter the dependency graph.
    ///
    /// # Errors
    ///
    /// Returns the validation error from [`HeuristicParams::validate`].
    pub fn filter(&self, params: HeuristicParams) -> Result<FilteredGraph, MiningError> {
        params.validate()?;
        Ok(FilteredGraph::filter(
            &self.dependency,
            self.stats.succession(),
            params,
        ))
    }

    /// Matrix positions of events whose appearance frequency reaches
    /// `min_frequency`, in index order.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn frequent_positions(&self, min_frequency: f64) -> Vec<usize> {
        self.stats
            .appearance()
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count as f64 >= min_frequency)
            .map(|(i, _)| i)
            .collect()
    }

    /// Thickness of an edge carrying `count` observations.
    ///
    /// # Errors
    ///
    /// Returns [`MiningError::NotFound`] if `count` is not a succession count
    /// of this log.
    #[allow(clippy::cast_precision_loss, clippy::float_cmp)]
    pub fn edge_thickness(&self, count: u64, dependency_threshold: f64) -> Result<f64, MiningError> {
        if dependency_threshold == 0.0 {
            return Ok(self.policy.zero_threshold_thickness);
        }
        Ok(self.scale.lookup(count as f64)? + self.policy.min_edge_thickness)
    }

    /// Filter with `params` and emit the visible graph into `sink`.
    ///
    /// # Errors
    ///
    /// - Parameter validation errors; nothing is emitted.
    /// - [`MiningError::NotFound`] if the scale table lacks a surviving edge
    ///   count; nothing is emitted.
    #[instrument(skip(self, sizer, sink))]
    pub fn build_visible_graph(
        &self,
        params: HeuristicParams,
        sizer: &dyn NodeSizer,
        sink: &mut dyn GraphSink,
    ) -> Result<GraphSummary, MiningError> {
        let filtered = self.filter(params)?;
        let events = self.stats.events();
        let frequent = self.frequent_positions(params.min_frequency);

        let mut is_frequent = vec![false; events.len()];
        for &i in &frequent {
            is_frequent[i] = true;
        }

        // Plan every emission before touching the sink.
        let nodes: Vec<(&str, u64, NodeSize)> = frequent
            .iter()
            .filter_map(|&i| {
                let id = events.id(i)?;
                let frequency = self.stats.appearance()[i];
                Some((id, frequency, sizer.size(id, frequency)))
            })
            .collect();

        let mut edges = Vec::new();
        for (source, target, weight) in filtered.edges() {
            if !(is_frequent[source] && is_frequent[target]) {
                continue;
            }
            let (Some(source_id), Some(target_id)) = (events.id(source), events.id(target))
            else {
                continue;
            };
            let size = self.edge_thickness(weight, params.dependency_threshold)?;
            trace!(source = source_id, target = target_id, weight, size, "planned edge");
            edges.push(PlannedEdge {
                source: source_id,
                target: target_id,
                weight,
                size,
            });
        }

        let frequent_ids: BTreeSet<String> =
            nodes.iter().map(|(id, _, _)| (*id).to_string()).collect();
        let start_events: BTreeSet<String> = self
            .stats
            .start_nodes()
            .intersection(&frequent_ids)
            .cloned()
            .collect();
        let end_events: BTreeSet<String> = self
            .stats
            .end_nodes()
            .intersection(&frequent_ids)
            .cloned()
            .collect();

        let induced = InducedGraph::new(&filtered, &frequent);
        let inferred_starts = self.names(induced.sources(), self.stats.start_nodes());
        let inferred_ends = self.names(induced.sinks(), self.stats.end_nodes());

        for &(id, frequency, size) in &nodes {
            sink.add_event(id, frequency, size);
        }
        for edge in &edges {
            sink.create_edge(edge.source, edge.target, edge.weight, edge.size);
        }
        sink.add_start_node();
        sink.add_end_node();
        sink.add_starting_edges(&start_events);
        sink.add_ending_edges(&end_events);
        sink.add_starting_edges(&inferred_starts);
        sink.add_ending_edges(&inferred_ends);

        let summary = GraphSummary {
            params,
            node_count: nodes.len(),
            edge_count: edges.len(),
            start_events,
            end_events,
            inferred_starts,
            inferred_ends,
        };
        debug!(
            nodes = summary.node_count,
            edges = summary.edge_count,
            inferred_starts = summary.inferred_starts.len(),
            inferred_ends = summary.inferred_ends.len(),
            "built visible graph"
        );
        Ok(summary)
    }

    /// Event ids for `positions`, minus those already in `known`.
    fn names(&self, positions: BTreeSet<usize>, known: &BTreeSet<String>) -> BTreeSet<String> {
        positions
            .into_iter()
            .filter_map(|i| self.stats.events().id(i))
            .filter(|id| !known.contains(*id))
            .map(str::to_string)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
