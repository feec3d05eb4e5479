//! `depstage report`: Markdown analysis report.
//!
//! Sections: summary, nodes by execution level, critical path,
//! parallelization analysis, recommendations. `--with-diagram` puts the
//! Mermaid flowchart in front. JSON mode emits the same data structured.

use std::io::Write;

use clap::Args;
use depstage_core::graph::critical_path_from_levels;
use depstage_core::{Diagnostics, Graph, GraphAnalyzer, LevelMap};
use serde::Serialize;
use tracing::instrument;

use super::mermaid::{fenced, flowchart};
use super::{InputArgs, Session, count_noun};
use crate::output::render;
use crate::source::InputKind;

/// Arguments for `depstage report`.
#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Include the Mermaid dependency diagram.
    #[arg(long)]
    pub with_diagram: bool,
}

#[derive(Debug, Serialize)]
struct ReportOutput {
    kind: InputKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    node_count: usize,
    level_count: usize,
    levels: Vec<ReportStage>,
    critical_path: Vec<String>,
    diagnostics: Diagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    mermaid: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReportStage {
    level: usize,
    nodes: Vec<ReportNode>,
}

#[derive(Debug, Serialize)]
struct ReportNode {
    name: String,
    dependencies: Vec<String>,
}

/// Execute `depstage report`.
#[instrument(skip_all, fields(input = %args.input.input.display()))]
pub fn run_report(args: &ReportArgs, session: &Session) -> anyhow::Result<()> {
    let loaded = session.load(&args.input)?;
    let analyzer = GraphAnalyzer::new(&loaded.graph);
    let levels = analyzer.compute_levels()?;

    let payload = ReportOutput {
        kind: loaded.kind,
        title: loaded.title.clone(),
        node_count: loaded.graph.len(),
        level_count: levels.level_count(),
        levels: report_stages(&loaded.graph, &levels),
        critical_path: critical_path_from_levels(&levels),
        diagnostics: Diagnostics::with_fan_in_threshold(
            &loaded.graph,
            &levels,
            session.fan_in_threshold,
        ),
        mermaid: args
            .with_diagram
            .then(|| fenced(&flowchart(&loaded.graph, &levels))),
    };
    render(session.output, &payload, |payload, _, w| {
        write_markdown(payload, session.fan_in_threshold, w)
    })
}

fn report_stages(graph: &Graph, levels: &LevelMap) -> Vec<ReportStage> {
    levels
        .stages()
        .into_iter()
        .map(|stage| ReportStage {
            level: stage.level,
            nodes: stage
                .nodes
                .into_iter()
                .map(|name| {
                    let dependencies = graph
                        .index_of(&name)
                        .map(|idx| graph.dependency_names(idx).map(str::to_string).collect())
                        .unwrap_or_default();
                    ReportNode { name, dependencies }
                })
                .collect(),
        })
        .collect()
}

const fn report_title(kind: InputKind) -> &'static str {
    match kind {
        InputKind::Workflow => "Workflow Analysis Report",
        InputKind::Workspace => "Workspace Analysis Report",
        InputKind::Nodes => "Dependency Graph Analysis Report",
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_ascii_uppercase().to_string() + chars.as_str()
    })
}

fn write_markdown(
    payload: &ReportOutput,
    fan_in_threshold: usize,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    let unit = payload.kind.unit();
    let units = format!("{unit}s");
    let scope = if payload.kind == InputKind::Workflow {
        "workflow"
    } else {
        "graph"
    };

    if let Some(diagram) = &payload.mermaid {
        writeln!(w, "## Dependency Graph\n")?;
        writeln!(w, "{diagram}\n")?;
    }

    writeln!(w, "# {}\n", report_title(payload.kind))?;
    if let Some(title) = &payload.title {
        writeln!(w, "_{title}_\n")?;
    }

    writeln!(w, "## Summary")?;
    writeln!(w, "- Total {units}: {}", payload.node_count)?;
    writeln!(w, "- Execution levels: {}", payload.level_count)?;
    writeln!(w, "- Critical path length: {}", payload.critical_path.len())?;
    writeln!(w)?;

    writeln!(w, "## {} by Execution Level\n", capitalized(&units))?;
    for stage in &payload.levels {
        writeln!(
            w,
            "**Level {}** ({}):",
            stage.level,
            count_noun(stage.nodes.len(), unit)
        )?;
        for node in &stage.nodes {
            if node.dependencies.is_empty() {
                writeln!(w, "  - {} (no dependencies)", node.name)?;
            } else {
                writeln!(
                    w,
                    "  - {} (depends on: {})",
                    node.name,
                    node.dependencies.join(", ")
                )?;
            }
        }
        writeln!(w)?;
    }

    writeln!(w, "## Critical Path\n")?;
    writeln!(w, "The longest execution path through the {scope}:\n")?;
    for (idx, name) in payload.critical_path.iter().enumerate() {
        writeln!(w, "{}. {name}", idx + 1)?;
    }
    writeln!(w)?;

    let diagnostics = &payload.diagnostics;
    writeln!(w, "## Parallelization Analysis\n")?;
    if diagnostics.parallel_stages.is_empty() {
        writeln!(w, "Every level runs a single {unit}.")?;
    }
    for stage in &diagnostics.parallel_stages {
        writeln!(
            w,
            "**Level {}**: {} run in parallel",
            stage.level,
            count_noun(stage.nodes.len(), unit)
        )?;
        writeln!(w, "  - {}", stage.nodes.join(", "))?;
    }
    writeln!(w)?;

    writeln!(w, "## Recommendations\n")?;
    if diagnostics.single_dependency_nodes.is_empty() && diagnostics.fan_in_nodes.is_empty() {
        writeln!(w, "No recommendations.")?;
        return Ok(());
    }

    if !diagnostics.single_dependency_nodes.is_empty() {
        writeln!(w, "### Potential Parallelization Opportunities\n")?;
        writeln!(
            w,
            "These {units} have only one dependency and might be parallelizable:\n"
        )?;
        for single in &diagnostics.single_dependency_nodes {
            writeln!(
                w,
                "- Consider if `{}` can run in parallel with other {units} after `{}`",
                single.name, single.dependency
            )?;
        }
        writeln!(w)?;
    }

    if !diagnostics.fan_in_nodes.is_empty() {
        writeln!(w, "### Complex Dependencies\n")?;
        writeln!(
            w,
            "These {units} have more than {fan_in_threshold} dependencies and might benefit from review:\n"
        )?;
        for fan_in in &diagnostics.fan_in_nodes {
            writeln!(
                w,
                "- `{}` depends on: {}",
                fan_in.name,
                fan_in.dependencies.join(", ")
            )?;
        }
        writeln!(w)?;
    }
    Ok(())
}
