//! `depstage nodes`: list every node with its direct edges and metadata.
//!
//! Works on cyclic graphs too; nothing here needs levels.

use std::io::Write;

use clap::Args;
use depstage_core::Metadata;
use serde::Serialize;
use tracing::instrument;

use super::{InputArgs, Session, count_noun};
use crate::output::{OutputMode, join_or_none, pretty_section, render};
use crate::source::InputKind;

/// Arguments for `depstage nodes`.
#[derive(Args, Debug)]
pub struct NodesArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Serialize)]
struct NodesOutput {
    kind: InputKind,
    nodes: Vec<NodeRow>,
}

#[derive(Debug, Serialize)]
struct NodeRow {
    name: String,
    dependencies: Vec<String>,
    dependents: Vec<String>,
    #[serde(skip_serializing_if = "Metadata::is_empty")]
    metadata: Metadata,
}

/// Execute `depstage nodes`.
#[instrument(skip_all, fields(input = %args.input.input.display()))]
pub fn run_nodes(args: &NodesArgs, session: &Session) -> anyhow::Result<()> {
    let loaded = session.load(&args.input)?;
    let graph = &loaded.graph;

    let nodes = graph
        .nodes()
        .map(|node| NodeRow {
            name: node.name().to_string(),
            dependencies: graph
                .dependency_names(node.index())
                .map(str::to_string)
                .collect(),
            dependents: graph
                .dependent_names(node.index())
                .map(str::to_string)
                .collect(),
            metadata: node.metadata().clone(),
        })
        .collect();

    let payload = NodesOutput {
        kind: loaded.kind,
        nodes,
    };
    render(session.output, &payload, render_nodes_human)
}

fn render_nodes_human(
    payload: &NodesOutput,
    mode: OutputMode,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    if !mode.is_pretty() {
        for node in &payload.nodes {
            writeln!(
                w,
                "{}\t{}\t{}",
                node.name,
                node.dependencies.join(","),
                node.dependents.join(",")
            )?;
        }
        return Ok(());
    }

    pretty_section(
        w,
        &count_noun(payload.nodes.len(), payload.kind.unit()),
    )?;
    for node in &payload.nodes {
        writeln!(w, "{}", node.name)?;
        writeln!(w, "  needs:     {}", join_or_none(&node.dependencies))?;
        writeln!(w, "  needed by: {}", join_or_none(&node.dependents))?;
        for (key, value) in &node.metadata {
            writeln!(w, "  {key}: {value}")?;
        }
    }
    Ok(())
}
