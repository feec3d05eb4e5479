//! Subcommand handlers.
//!
//! Every handler takes its clap args and the resolved [`Session`], loads the
//! input graph, and renders through [`crate::output`].

pub mod check;
pub mod critical_path;
pub mod impact;
pub mod levels;
pub mod mermaid;
pub mod nodes;
pub mod order;
pub mod report;
pub mod summary;

use std::path::PathBuf;

use clap::Args;
use depstage_core::BuildOptions;
use tracing::warn;

use crate::output::OutputMode;
use crate::source::{self, InputKind, LoadedGraph};

/// Graph source shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Node list (.json/.yaml), GitHub Actions workflow (.yml), or workspace directory.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

/// Settings resolved from flags and the config file.
#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub output: OutputMode,
    pub kind: Option<InputKind>,
    pub build: BuildOptions,
    pub fan_in_threshold: usize,
}

impl Session {
    /// Load and build the graph named by `input`.
    ///
    /// Dangling references that the build policy tolerates are logged.
    pub fn load(&self, input: &InputArgs) -> anyhow::Result<LoadedGraph> {
        let loaded = source::load(&input.input, self.kind, self.build)?;
        for reference in &loaded.report.dangling_references {
            warn!(node = %reference.node, missing = %reference.missing, "dependency on undeclared node ignored");
        }
        Ok(loaded)
    }
}

/// `"1 job"` / `"3 jobs"`.
pub fn count_noun(count: usize, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}
