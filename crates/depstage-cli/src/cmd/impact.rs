//! `depstage impact <NAME>`: blast radius and dependency set of one node.
//!
//! For workspace inputs the output also suggests `pnpm --filter` commands
//! that rebuild and retest every affected package.

use std::io::Write;

use clap::Args;
use depstage_core::{GraphAnalyzer, ImpactRecord, Metadata};
use serde::Serialize;
use tracing::instrument;

use super::{InputArgs, Session};
use crate::output::{OutputMode, join_or_none, pretty_kv, pretty_section, render};
use crate::source::{InputKind, workspace};

/// Arguments for `depstage impact`.
#[derive(Args, Debug)]
pub struct ImpactArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Node (job or package) to analyze.
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(Debug, Serialize)]
struct ImpactOutput {
    #[serde(flatten)]
    record: ImpactRecord,
    metadata: Metadata,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    suggested_commands: Vec<String>,
}

/// Execute `depstage impact`.
#[instrument(skip_all, fields(input = %args.input.input.display(), name = %args.name))]
pub fn run_impact(args: &ImpactArgs, session: &Session) -> anyhow::Result<()> {
    let loaded = session.load(&args.input)?;
    let record = GraphAnalyzer::new(&loaded.graph).analyze_impact(&args.name)?;

    let metadata = loaded
        .graph
        .node(&args.name)
        .map(|node| node.metadata().clone())
        .unwrap_or_default();
    let suggested_commands = if loaded.kind == InputKind::Workspace {
        workspace::filter_commands(&args.name)
    } else {
        Vec::new()
    };

    let payload = ImpactOutput {
        record,
        metadata,
        suggested_commands,
    };
    render(session.output, &payload, render_impact_human)
}

fn render_impact_human(
    payload: &ImpactOutput,
    mode: OutputMode,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    let record = &payload.record;

    if mode.is_pretty() {
        pretty_section(w, &format!("Impact analysis: {}", record.name))?;
    } else {
        writeln!(w, "{}", record.name)?;
    }

    for (key, value) in payload.metadata.iter().filter(|(_, value)| !value.is_null()) {
        let text = value
            .as_str()
            .map_or_else(|| value.to_string(), str::to_string);
        pretty_kv(w, key, text)?;
    }
    pretty_kv(w, "impact score", record.impact_score.to_string())?;

    writeln!(w, "Dependencies:")?;
    writeln!(w, "  direct:     {}", join_or_none(&record.direct_dependencies))?;
    if !record.transitive_dependencies.is_empty() {
        writeln!(w, "  transitive: {}", record.transitive_dependencies.join(", "))?;
    }

    writeln!(w, "Dependents:")?;
    writeln!(w, "  direct:     {}", join_or_none(&record.direct_dependents))?;
    if !record.transitive_dependents.is_empty() {
        writeln!(w, "  transitive: {}", record.transitive_dependents.join(", "))?;
    }

    if !payload.suggested_commands.is_empty() {
        writeln!(w, "Suggested commands:")?;
        for command in &payload.suggested_commands {
            writeln!(w, "  {command}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> ImpactOutput {
        ImpactOutput {
            record: ImpactRecord {
                name: "@app/core".into(),
                direct_dependencies: Vec::new(),
                transitive_dependencies: Vec::new(),
                direct_dependents: vec!["@app/ui".into()],
                transitive_dependents: vec!["web".into()],
                impact_score: 3,
            },
            metadata: Metadata::from([
                ("path".to_string(), json!("packages/core")),
                ("version".to_string(), json!("1.2.0")),
            ]),
            suggested_commands: workspace::filter_commands("@app/core"),
        }
    }

    #[test]
    fn human_output_lists_both_directions() {
        let mut out = Vec::new();
        render_impact_human(&payload(), OutputMode::Text, &mut out).expect("render");
        let text = String::from_utf8(out).expect("utf8");

        assert!(text.starts_with("@app/core\n"), "{text}");
        assert!(text.contains("version:       1.2.0"), "{text}");
        assert!(text.contains("impact score:  3"), "{text}");
        assert!(text.contains("  direct:     none"), "{text}");
        assert!(text.contains("  direct:     @app/ui"), "{text}");
        assert!(text.contains("  transitive: web"), "{text}");
        assert!(text.contains("pnpm --filter \"...@app/core\" run test"), "{text}");
    }

    #[test]
    fn json_flattens_record() {
        let value = serde_json::to_value(payload()).expect("json");
        assert_eq!(value["name"], "@app/core");
        assert_eq!(value["impact_score"], 3);
        assert_eq!(value["metadata"]["path"], "packages/core");
        assert_eq!(value["suggested_commands"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn json_omits_commands_outside_workspaces() {
        let mut payload = payload();
        payload.suggested_commands.clear();
        let value = serde_json::to_value(payload).expect("json");
        assert!(value.get("suggested_commands").is_none());
    }
}
