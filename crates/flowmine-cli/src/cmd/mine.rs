//! `fm mine`: run the heuristic miner and print the visible graph.

use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};
use flowmine_core::{LogStatistics, MiningError};
use flowmine_core::config::MiningConfig;
use flowmine_heuristic::sink::{ProcessEdge, ProcessNode};
use flowmine_heuristic::{
    EdgePolicy, GraphSnapshot, GraphSummary, HeuristicMiner, HeuristicParams, LinearScale,
    ProcessGraph,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Frequency-to-thickness scaling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScaleKind {
    /// Gap-based density buckets.
    Density,
    /// Proportional min-max mapping.
    Linear,
}

/// Arguments for `fm mine`.
#[derive(Args, Debug)]
pub struct MineArgs {
    /// Path to a statistics JSON file.
    pub path: PathBuf,

    /// Minimum occurrence count for activities and edges.
    #[arg(long = "min-frequency", short = 'f')]
    pub min_frequency: Option<f64>,

    /// Minimum dependency score for edges, in [0, 1].
    #[arg(long, short = 't')]
    pub threshold: Option<f64>,

    /// Edge-thickness scaling strategy.
    #[arg(long, value_enum)]
    pub scale: Option<ScaleKind>,
}

/// Report payload for `fm mine`.
#[derive(Debug, Serialize)]
pub struct MineReport {
    pub summary: GraphSummary,
    pub graph: GraphSnapshot,
}

/// Flags override the merged config file values.
fn resolve_params(args: &MineArgs, config: &MiningConfig) -> HeuristicParams {
    HeuristicParams::new(
        args.min_frequency.unwrap_or(config.heuristic.min_frequency),
        args.threshold.unwrap_or(config.heuristic.dependency_threshold),
    )
}

fn build_miner(
    stats: LogStatistics,
    scale: ScaleKind,
    config: &MiningConfig,
) -> Result<HeuristicMiner, MiningError> {
    match scale {
        ScaleKind::Density => HeuristicMiner::from_config(stats, config),
        ScaleKind::Linear => Ok(HeuristicMiner::with_strategy(
            stats,
            &LinearScale::from_config(&config.scale)?,
            EdgePolicy::from_config(&config.heuristic),
        )),
    }
}

/// Execute `fm mine`.
#[instrument(skip_all, fields(path = %args.path.display()))]
pub fn run_mine(args: &MineArgs, config: &MiningConfig, output: OutputMode) -> anyhow::Result<()> {
    let stats = LogStatistics::from_path(&args.path)
        .with_context(|| format!("loading statistics from {}", args.path.display()))?;
    let params = resolve_params(args, config);
    let miner = build_miner(stats, args.scale.unwrap_or(ScaleKind::Density), config)
        .context("configuring scale strategy")?;
    let sizer = miner.default_sizer(config);

    let mut graph = ProcessGraph::new();
    let summary = miner
        .build_visible_graph(params, &sizer, &mut graph)
        .context("mining visible graph")?;
    info!(
        nodes = summary.node_count,
        edges = summary.edge_count,
        "mined process graph"
    );

    let report = MineReport {
        summary,
        graph: graph.snapshot(),
    };
    render_mode(output, &report, render_text, render_pretty)
}

fn edge_line(source: &str, target: &str, edge: &ProcessEdge) -> String {
    match edge {
        ProcessEdge::Flow { weight, size } => {
            format!("{source}\t{target}\t{weight}\t{size:.3}")
        }
        ProcessEdge::Start | ProcessEdge::End => format!("{source}\t{target}"),
    }
}

fn render_text(report: &MineReport, w: &mut dyn Write) -> io::Result<()> {
    for record in &report.graph.edges {
        writeln!(w, "{}", edge_line(&record.source, &record.target, &record.edge))?;
    }
    Ok(())
}

fn join(ids: &BTreeSet<String>) -> String {
    if ids.is_empty() {
        "-".to_string()
    } else {
        ids.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

fn render_pretty(report: &MineReport, w: &mut dyn Write) -> io::Result<()> {
    let summary = &report.summary;
    pretty_section(w, "Parameters")?;
    pretty_kv(w, "min frequency", summary.params.min_frequency.to_string())?;
    pretty_kv(w, "threshold", summary.params.dependency_threshold.to_string())?;
    writeln!(w)?;

    pretty_section(w, "Activities")?;
    for node in &report.graph.nodes {
        if let ProcessNode::Event {
            id,
            frequency,
            size,
        } = node
        {
            writeln!(
                w,
                "  {id:<24} {frequency:>8}   {:.2} x {:.2}",
                size.width, size.height
            )?;
        }
    }
    writeln!(w)?;

    pretty_section(w, "Flows")?;
    for record in &report.graph.edges {
        match record.edge {
            ProcessEdge::Flow { weight, size } => writeln!(
                w,
                "  {} -> {}  (count {weight}, thickness {size:.3})",
                record.source, record.target
            )?,
            ProcessEdge::Start | ProcessEdge::End => {
                writeln!(w, "  {} -> {}", record.source, record.target)?;
            }
        }
    }
    writeln!(w)?;

    pretty_section(w, "Boundaries")?;
    pretty_kv(w, "start", join(&summary.start_events))?;
    pretty_kv(w, "end", join(&summary.end_events))?;
    pretty_kv(w, "inferred start", join(&summary.inferred_starts))?;
    pretty_kv(w, "inferred end", join(&summary.inferred_ends))?;
    Ok(())
}
