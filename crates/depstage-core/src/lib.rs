#![forbid(unsafe_code)]
//! depstage-core: dependency-graph analysis engine.
//!
//! Builds a directed graph of named nodes (CI jobs, monorepo packages, or
//! anything else with "depends-on" edges) and answers:
//!
//! - is the graph acyclic, and if not, which cycles exist
//! - a valid execution order
//! - the execution level (stage) of every node under maximal parallelism
//! - the transitive blast radius and dependency set of a node
//!
//! The engine does no I/O and parses no source format. Callers convert their
//! input into [`NodeEntry`] values and pass them to [`GraphBuilder`].
//!
//! # Conventions
//!
//! - **Errors**: every fallible operation returns [`GraphError`].
//! - **Logging**: `tracing` spans and `debug!` events only; errors are
//!   returned, never logged.

pub mod analyzer;
pub mod error;
pub mod graph;

pub use analyzer::GraphAnalyzer;
pub use error::{ErrorKind, GraphError};
pub use graph::{
    BuildOptions, BuildReport, Cycle, DanglingPolicy, DanglingReference, Diagnostics, Graph,
    GraphBuilder, GraphStats, ImpactRecord, ImpactSummary, LevelMap, Metadata, NodeEntry, Stage,
};
