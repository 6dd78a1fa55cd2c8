//! `fm info`: summarise a statistics file.

use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use flowmine_core::LogStatistics;
use serde::Serialize;

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `fm info`.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Path to a statistics JSON file.
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
struct EventInfo {
    id: String,
    appearance: u64,
}

/// Report payload for `fm info`.
#[derive(Debug, Serialize)]
pub struct InfoReport {
    event_count: usize,
    succession_pairs: usize,
    max_frequency: u64,
    max_appearance: u64,
    start: BTreeSet<String>,
    end: BTreeSet<String>,
    events: Vec<EventInfo>,
}

impl InfoReport {
    fn from_statistics(stats: &LogStatistics) -> Self {
        let events = stats
            .events()
            .iter()
            .zip(stats.appearance())
            .map(|(id, &appearance)| EventInfo {
                id: id.to_string(),
                appearance,
            })
            .collect();
        Self {
            event_count: stats.events().len(),
            succession_pairs: stats
                .succession()
                .cells()
                .filter(|&(_, _, count)| count > 0)
                .count(),
            max_frequency: stats.max_frequency(),
            max_appearance: stats.max_appearance(),
            start: stats.start_nodes().clone(),
            end: stats.end_nodes().clone(),
            events,
        }
    }
}

/// Execute `fm info`.
pub fn run_info(args: &InfoArgs, output: OutputMode) -> anyhow::Result<()> {
    let stats = LogStatistics::from_path(&args.path)
        .with_context(|| format!("loading statistics from {}", args.path.display()))?;
    let report = InfoReport::from_statistics(&stats);
    render_mode(output, &report, render_text, render_pretty)
}

fn render_text(report: &InfoReport, w: &mut dyn Write) -> io::Result<()> {
    for event in &report.events {
        writeln!(w, "{}\t{}", event.id, event.appearance)?;
    }
    Ok(())
}

fn render_pretty(report: &InfoReport, w: &mut dyn Write) -> io::Result<()> {
    let list = |ids: &BTreeSet<String>| ids.iter().cloned().collect::<Vec<_>>().join(", ");

    pretty_section(w, "Statistics")?;
    pretty_kv(w, "activities", report.event_count.to_string())?;
    pretty_kv(w, "pairs", report.succession_pairs.to_string())?;
    pretty_kv(w, "max frequency", report.max_frequency.to_string())?;
    pretty_kv(w, "max appearance", report.max_appearance.to_string())?;
    pretty_kv(w, "start", list(&report.start))?;
    pretty_kv(w, "end", list(&report.end))?;
    writeln!(w)?;

    pretty_section(w, "Activities")?;
    for event in &report.events {
        writeln!(w, "  {:<24} {:>8}", event.id, event.appearance)?;
    }
    Ok(())
}
