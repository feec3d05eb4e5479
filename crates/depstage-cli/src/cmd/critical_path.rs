//! `depstage critical-path`: one representative node per execution level.

use std::io::Write;

use clap::Args;
use depstage_core::GraphAnalyzer;
use serde::Serialize;
use tracing::instrument;

use super::{InputArgs, Session, count_noun};
use crate::output::{OutputMode, pretty_section, render};

/// Arguments for `depstage critical-path`.
#[derive(Args, Debug)]
pub struct CriticalPathArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Serialize)]
struct CriticalPathOutput {
    path: Vec<String>,
    length: usize,
}

/// Execute `depstage critical-path`.
#[instrument(skip_all, fields(input = %args.input.input.display()))]
pub fn run_critical_path(args: &CriticalPathArgs, session: &Session) -> anyhow::Result<()> {
    let loaded = session.load(&args.input)?;
    let path = GraphAnalyzer::new(&loaded.graph).critical_path()?;
    let payload = CriticalPathOutput {
        length: path.len(),
        path,
    };
    render(session.output, &payload, render_critical_path_human)
}

fn render_critical_path_human(
    payload: &CriticalPathOutput,
    mode: OutputMode,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    if mode.is_pretty() {
        pretty_section(
            w,
            &format!("Critical path ({})", count_noun(payload.length, "stage")),
        )?;
        for (idx, name) in payload.path.iter().enumerate() {
            writeln!(w, "{:>4}. {name}", idx + 1)?;
        }
        return Ok(());
    }

    if payload.path.is_empty() {
        writeln!(w, "(empty graph)")?;
    } else {
        writeln!(w, "{}", payload.path.join(" -> "))?;
    }
    Ok(())
}
