//! `depstage mermaid`: Mermaid flowchart of the dependency graph.
//!
//! Nodes are labelled with their execution level (and `if:` condition for
//! workflow jobs), edges point from dependency to dependent, and each level
//! gets a fill colour on a green to red gradient.

use std::collections::HashSet;

use clap::Args;
use depstage_core::{Graph, GraphAnalyzer, LevelMap};
use serde::Serialize;
use tracing::instrument;

use super::{InputArgs, Session};
use crate::output::render;
use crate::source::workflow;

/// Fill used when every node sits on level 0.
pub const FLAT_FILL: &str = "#90EE90";

/// Arguments for `depstage mermaid`.
#[derive(Args, Debug)]
pub struct MermaidArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Emit the bare diagram without the ```mermaid fence.
    #[arg(long)]
    pub no_fence: bool,
}

#[derive(Debug, Serialize)]
struct MermaidOutput {
    mermaid: String,
}

/// Execute `depstage mermaid`.
#[instrument(skip_all, fields(input = %args.input.input.display()))]
pub fn run_mermaid(args: &MermaidArgs, session: &Session) -> anyhow::Result<()> {
    let loaded = session.load(&args.input)?;
    let levels = GraphAnalyzer::new(&loaded.graph).compute_levels()?;

    let diagram = flowchart(&loaded.graph, &levels);
    let mermaid = if args.no_fence {
        diagram
    } else {
        fenced(&diagram)
    };
    render(session.output, &MermaidOutput { mermaid }, |payload, _, w| {
        writeln!(w, "{}", payload.mermaid)
    })
}

/// Wrap a diagram in a Markdown ```mermaid block.
pub fn fenced(diagram: &str) -> String {
    format!("```mermaid\n{diagram}\n```")
}

/// Build the `flowchart TD` text for an acyclic graph and its levels.
pub fn flowchart(graph: &Graph, levels: &LevelMap) -> String {
    let ids = node_ids(graph);
    let mut lines = vec!["flowchart TD".to_string()];

    for node in graph.nodes() {
        let level = levels.get(node.name()).unwrap_or_default();
        let condition = workflow::condition_of(node.metadata())
            .map(|cond| format!("<br/><small>if: {}</small>", escape_label(cond)))
            .unwrap_or_default();
        lines.push(format!(
            "    {}[\"{}<br/>Level: {level}{condition}\"]",
            ids[node.index().index()],
            escape_label(node.name())
        ));
    }

    for node in graph.nodes() {
        for dependency in node.dependencies() {
            lines.push(format!(
                "    {} --> {}",
                ids[dependency.index()],
                ids[node.index().index()]
            ));
        }
    }

    let max_level = levels.max_level().unwrap_or_default();
    for stage in levels.stages() {
        let members: Vec<&str> = stage
            .nodes
            .iter()
            .filter_map(|name| graph.index_of(name))
            .map(|idx| ids[idx.index()].as_str())
            .collect();
        lines.push(format!(
            "    style {} fill:{}",
            members.join(","),
            level_color(stage.level, max_level)
        ));
    }
    lines.join("\n")
}

/// Fill colour for `level`, from light green at level 0 to orange-red at
/// `max_level`.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn level_color(level: usize, max_level: usize) -> String {
    if max_level == 0 {
        return FLAT_FILL.to_string();
    }
    let ratio = level as f64 / max_level as f64;
    let r = 111.0f64.mul_add(ratio, 144.0).round() as u8;
    let g = (-98.0f64).mul_add(ratio, 238.0).round() as u8;
    let b = (-144.0f64).mul_add(ratio, 144.0).round() as u8;
    format!("rgb({r},{g},{b})")
}

/// Mermaid-safe identifiers, one per node in canonical order.
///
/// Plain names (ASCII letters, digits, `_`, `-`) are used as-is; anything
/// else becomes `node<index>`. Clashes get a numeric suffix.
fn node_ids(graph: &Graph) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(graph.len());
    let mut ids = Vec::with_capacity(graph.len());

    for node in graph.nodes() {
        let base = if is_plain_id(node.name()) {
            node.name().to_string()
        } else {
            format!("node{}", node.index().index())
        };
        let mut candidate = base.clone();
        let mut suffix = 2;
        while taken.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        taken.insert(candidate.clone());
        ids.push(candidate);
    }
    ids
}

fn is_plain_id(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn escape_label(text: &str) -> String {
    text.replace('"', "#quot;")
}
