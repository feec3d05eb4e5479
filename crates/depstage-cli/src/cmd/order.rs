//! `depstage order`: a valid execution order, dependencies first.

use std::io::Write;

use clap::Args;
use depstage_core::GraphAnalyzer;
use serde::Serialize;
use tracing::instrument;

use super::{InputArgs, Session};
use crate::output::{OutputMode, pretty_section, render};

/// Arguments for `depstage order`.
#[derive(Args, Debug)]
pub struct OrderArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Serialize)]
struct OrderOutput {
    order: Vec<String>,
}

/// Execute `depstage order`.
#[instrument(skip_all, fields(input = %args.input.input.display()))]
pub fn run_order(args: &OrderArgs, session: &Session) -> anyhow::Result<()> {
    let loaded = session.load(&args.input)?;
    let order = GraphAnalyzer::new(&loaded.graph).topological_order()?;
    render(session.output, &OrderOutput { order }, render_order_human)
}

fn render_order_human(
    payload: &OrderOutput,
    mode: OutputMode,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    if mode.is_pretty() {
        pretty_section(w, "Execution order")?;
        for (idx, name) in payload.order.iter().enumerate() {
            writeln!(w, "{:>4}. {name}", idx + 1)?;
        }
    } else {
        for name in &payload.order {
            writeln!(w, "{name}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_mode_is_one_name_per_line() {
        let payload = OrderOutput {
            order: vec!["a".into(), "b".into()],
        };
        let mut out = Vec::new();
        render_order_human(&payload, OutputMode::Text, &mut out).expect("render");
        assert_eq!(String::from_utf8(out).expect("utf8"), "a\nb\n");
    }

    #[test]
    fn pretty_mode_numbers_entries() {
        let payload = OrderOutput {
            order: vec!["a".into(), "b".into()],
        };
        let mut out = Vec::new();
        render_order_human(&payload, OutputMode::Pretty, &mut out).expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.starts_with("Execution order\n"));
        assert!(text.contains("   2. b"));
    }
}
