//! `depstage summary`: graph statistics and the impact ranking.
//!
//! The ranking lists every node by impact score, highest first. Pretty mode
//! draws a bar per node, capped at [`BAR_CAP`] cells.

use std::io::Write;

use clap::Args;
use depstage_core::{GraphAnalyzer, GraphStats, ImpactSummary};
use serde::Serialize;
use tracing::instrument;

use super::{InputArgs, Session};
use crate::output::{OutputMode, pretty_kv, pretty_section, render};
use crate::source::InputKind;

/// Longest bar drawn in the pretty ranking.
pub const BAR_CAP: usize = 20;

/// Arguments for `depstage summary`.
#[derive(Args, Debug)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Show only the top N nodes of the ranking.
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SummaryOutput {
    kind: InputKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    stats: GraphStats,
    ranking: Vec<ImpactSummary>,
}

/// Execute `depstage summary`.
#[instrument(skip_all, fields(input = %args.input.input.display()))]
pub fn run_summary(args: &SummaryArgs, session: &Session) -> anyhow::Result<()> {
    let loaded = session.load(&args.input)?;
    let analyzer = GraphAnalyzer::new(&loaded.graph);

    let mut ranking = analyzer.impact_ranking();
    if let Some(top) = args.top {
        ranking.truncate(top);
    }

    let payload = SummaryOutput {
        kind: loaded.kind,
        title: loaded.title,
        stats: analyzer.stats(),
        ranking,
    };
    render(session.output, &payload, render_summary_human)
}

fn render_summary_human(
    payload: &SummaryOutput,
    mode: OutputMode,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    let stats = &payload.stats;
    let unit = payload.kind.unit();

    if mode.is_pretty() {
        let heading = payload
            .title
            .as_deref()
            .map_or_else(|| "Graph summary".to_string(), |title| format!("Graph summary: {title}"));
        pretty_section(w, &heading)?;
    }

    pretty_kv(w, &format!("{unit}s"), stats.node_count.to_string())?;
    pretty_kv(w, "edges", stats.edge_count.to_string())?;
    pretty_kv(w, "density", format!("{:.3}", stats.density))?;
    pretty_kv(w, "roots", stats.root_count.to_string())?;
    pretty_kv(w, "leaves", stats.leaf_count.to_string())?;
    pretty_kv(w, "isolated", stats.isolated_node_count.to_string())?;
    pretty_kv(w, "components", stats.weakly_connected_component_count.to_string())?;
    if stats.self_loop_count > 0 {
        pretty_kv(w, "self loops", stats.self_loop_count.to_string())?;
    }

    if payload.ranking.is_empty() {
        return Ok(());
    }

    writeln!(w)?;
    if mode.is_pretty() {
        pretty_section(w, "Impact ranking")?;
        for (idx, row) in payload.ranking.iter().enumerate() {
            let bar = "█".repeat(row.impact_score.min(BAR_CAP));
            writeln!(
                w,
                "  {}. {:<30} {bar} ({})",
                idx + 1,
                row.name,
                row.impact_score
            )?;
        }
    } else {
        writeln!(w, "Impact ranking:")?;
        for row in &payload.ranking {
            writeln!(
                w,
                "  {} score={} deps={} dependents={}",
                row.name, row.impact_score, row.dependency_count, row.dependent_count
            )?;
        }
    }
    Ok(())
}
