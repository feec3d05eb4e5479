//! `depstage check`: validate a graph for dangling references and cycles.
//!
//! Exits non-zero when any cycle is found. Dangling references fail only
//! under `--strict` (or `[build] dangling = "fail"`), in which case the
//! build itself errors before this command renders anything.

use std::io::Write;

use clap::Args;
use depstage_core::{Cycle, DanglingReference, GraphAnalyzer};
use serde::Serialize;
use tracing::instrument;

use super::{InputArgs, Session, count_noun};
use crate::output::{OutputMode, pretty_section, render};
use crate::source::InputKind;

/// Arguments for `depstage check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Serialize)]
struct CheckOutput {
    kind: InputKind,
    node_count: usize,
    edge_count: usize,
    acyclic: bool,
    cycles: Vec<Cycle>,
    dangling_references: Vec<DanglingReference>,
    duplicate_edges_ignored: usize,
    self_loops: Vec<String>,
}

/// Execute `depstage check`. Returns `false` when the graph has cycles.
#[instrument(skip_all, fields(input = %args.input.input.display()))]
pub fn run_check(args: &CheckArgs, session: &Session) -> anyhow::Result<bool> {
    let loaded = session.load(&args.input)?;
    let cycles = GraphAnalyzer::new(&loaded.graph).detect_cycles();

    let payload = CheckOutput {
        kind: loaded.kind,
        node_count: loaded.report.node_count,
        edge_count: loaded.report.edge_count,
        acyclic: cycles.is_empty(),
        cycles,
        dangling_references: loaded.report.dangling_references,
        duplicate_edges_ignored: loaded.report.duplicate_edges_ignored,
        self_loops: loaded.report.self_loops,
    };

    render(session.output, &payload, render_check_human)?;
    Ok(payload.acyclic)
}

fn render_check_human(
    payload: &CheckOutput,
    mode: OutputMode,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    let unit = payload.kind.unit();
    let heading = format!(
        "Graph check: {}, {}",
        count_noun(payload.node_count, unit),
        count_noun(payload.edge_count, "edge")
    );
    if mode.is_pretty() {
        pretty_section(w, &heading)?;
    } else {
        writeln!(w, "{heading}")?;
    }

    if !payload.dangling_references.is_empty() {
        writeln!(
            w,
            "Dangling references ({}):",
            payload.dangling_references.len()
        )?;
        for reference in &payload.dangling_references {
            writeln!(w, "  - {reference}")?;
        }
    }

    if payload.duplicate_edges_ignored > 0 {
        writeln!(
            w,
            "Duplicate dependencies ignored: {}",
            payload.duplicate_edges_ignored
        )?;
    }

    if !payload.self_loops.is_empty() {
        writeln!(w, "Self dependencies: {}", payload.self_loops.join(", "))?;
    }

    if payload.cycles.is_empty() {
        writeln!(w, "No dependency cycles found.")?;
        return Ok(());
    }

    writeln!(w, "Dependency cycles ({}):", payload.cycles.len())?;
    for (idx, cycle) in payload.cycles.iter().enumerate() {
        writeln!(w, "  {}. {cycle}", idx + 1)?;
    }
    Ok(())
}
