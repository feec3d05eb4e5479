//! Input adapters: turn a file or directory into engine node entries.
//!
//! Three input kinds are understood:
//!
//! - [`InputKind::Nodes`]: a JSON or YAML list of `{name, depends_on, metadata}`
//! - [`InputKind::Workflow`]: a GitHub Actions workflow (`jobs.<id>.needs`)
//! - [`InputKind::Workspace`]: a JS monorepo root with `packages/`, `apps/`,
//!   `tools/`, `libs/` package manifests
//!
//! When no kind is given it is inferred: a directory is a workspace, a YAML
//! file with a top-level `jobs` key is a workflow, anything else is a node
//! list.

pub mod nodes;
pub mod workflow;
pub mod workspace;

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use depstage_core::{BuildOptions, BuildReport, Graph, GraphBuilder, NodeEntry};
use serde::Serialize;
use tracing::{debug, instrument};

/// The shape of the input being analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Normalized node list (JSON or YAML).
    Nodes,
    /// GitHub Actions workflow file.
    Workflow,
    /// JS monorepo workspace directory.
    Workspace,
}

impl InputKind {
    /// Singular noun for the nodes of this input, used in human output.
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Nodes => "node",
            Self::Workflow => "job",
            Self::Workspace => "package",
        }
    }
}

/// Entries produced by an adapter, before the graph is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInput {
    /// Human title of the input (workflow `name:`), if any.
    pub title: Option<String>,
    pub entries: Vec<NodeEntry>,
}

/// A built graph plus the context it came from.
#[derive(Debug, Clone)]
pub struct LoadedGraph {
    pub kind: InputKind,
    pub title: Option<String>,
    pub graph: Graph,
    pub report: BuildReport,
}

/// Parse `path` and build its dependency graph.
///
/// Engine failures are returned as [`depstage_core::GraphError`] inside the
/// `anyhow::Error`, so callers can downcast for codes and hints.
#[instrument(skip_all, fields(path = %path.display(), kind = ?kind))]
pub fn load(path: &Path, kind: Option<InputKind>, options: BuildOptions) -> Result<LoadedGraph> {
    let (kind, parsed) = parse(path, kind)?;

    debug!(?kind, entries = parsed.entries.len(), "input parsed");

    let (graph, report) = GraphBuilder::new(options).build(parsed.entries)?;

    Ok(LoadedGraph {
        kind,
        title: parsed.title,
        graph,
        report,
    })
}

fn parse(path: &Path, kind: Option<InputKind>) -> Result<(InputKind, ParsedInput)> {
    if kind == Some(InputKind::Workspace) || (kind.is_none() && path.is_dir()) {
        return Ok((InputKind::Workspace, workspace::scan(path)?));
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let kind = kind.unwrap_or_else(|| infer_kind(path, &content));

    let parsed = if kind == InputKind::Workflow {
        workflow::parse(&content)
    } else {
        nodes::parse(path, &content)
    }
    .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok((kind, parsed))
}

/// Guess the input kind of a file from its extension and content.
pub fn infer_kind(path: &Path, content: &str) -> InputKind {
    if is_yaml(path) && workflow::looks_like_workflow(content) {
        InputKind::Workflow
    } else {
        InputKind::Nodes
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"))
}
