#![forbid(unsafe_code)]
//! flowmine-heuristic library.
//!
//! Heuristic process discovery over directly-follows statistics.
//!
//! ## Pipeline
//!
//! ```text
//! LogStatistics (succession counts, appearance, start/end sets)
//!        ↓  dependency::DependencyMatrix::build()        once
//!        ↓  scale::ScaleStrategy::fit()                  once
//! HeuristicMiner
//!        ↓  filter::FilteredGraph::filter(params)        per call
//!        ↓  topology::InducedGraph::{sources, sinks}     per call
//!        ↓  sink::GraphSink emissions                    per call
//! ```
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use flowmine_core::LogStatistics;
//! use flowmine_heuristic::{HeuristicMiner, HeuristicParams, ProcessGraph};
//!
//! let stats = LogStatistics::from_path(path)?;
//! let miner = HeuristicMiner::new(stats);
//! let sizer = miner.default_sizer(&config);
//! let mut graph = ProcessGraph::new();
//! let summary = miner.build_visible_graph(HeuristicParams::new(1.0, 0.5), &sizer, &mut graph)?;
//! ```
//!
//! # Conventions
//!
//! - **Errors**: Return `Result<_, flowmine_core::MiningError>`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod dependency;
pub mod filter;
pub mod miner;
pub mod scale;
pub mod sink;
pub mod sizing;
pub mod topology;

pub use dependency::DependencyMatrix;
pub use filter::{FilteredGraph, HeuristicParams};
pub use miner::{EdgePolicy, GraphSummary, HeuristicMiner};
pub use scale::{DensityBuckets, LinearScale, ScaleStrategy, ScaleTable};
pub use sink::{GraphSink, GraphSnapshot, ProcessGraph};
pub use sizing::{FrequencyNodeSizer, NodeSize, NodeSizer};
