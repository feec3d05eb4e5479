//! `depstage levels`: execution stages under maximal parallelism.

use std::io::Write;

use clap::Args;
use depstage_core::{GraphAnalyzer, LevelMap, Stage};
use serde::Serialize;
use tracing::instrument;

use super::{InputArgs, Session, count_noun};
use crate::output::{OutputMode, pretty_section, render};
use crate::source::InputKind;

/// Arguments for `depstage levels`.
#[derive(Args, Debug)]
pub struct LevelsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Serialize)]
struct LevelsOutput {
    kind: InputKind,
    level_count: usize,
    levels: LevelMap,
    stages: Vec<Stage>,
    parallel_stages: Vec<Stage>,
}

/// Execute `depstage levels`.
#[instrument(skip_all, fields(input = %args.input.input.display()))]
pub fn run_levels(args: &LevelsArgs, session: &Session) -> anyhow::Result<()> {
    let loaded = session.load(&args.input)?;
    let levels = GraphAnalyzer::new(&loaded.graph).compute_levels()?;

    let payload = LevelsOutput {
        kind: loaded.kind,
        level_count: levels.level_count(),
        stages: levels.stages(),
        parallel_stages: levels.parallel_stages(),
        levels,
    };
    render(session.output, &payload, render_levels_human)
}

fn render_levels_human(
    payload: &LevelsOutput,
    mode: OutputMode,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    let unit = payload.kind.unit();

    if mode.is_pretty() {
        pretty_section(
            w,
            &format!("Execution stages ({})", count_noun(payload.level_count, "level")),
        )?;
    }

    for stage in &payload.stages {
        writeln!(
            w,
            "Level {} ({}): {}",
            stage.level,
            count_noun(stage.nodes.len(), unit),
            stage.nodes.join(", ")
        )?;
    }

    if mode.is_pretty() && !payload.parallel_stages.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Parallelization opportunities")?;
        for stage in &payload.parallel_stages {
            writeln!(
                w,
                "Level {}: {} run in parallel",
                stage.level,
                count_noun(stage.nodes.len(), unit)
            )?;
        }
    }
    Ok(())
}
