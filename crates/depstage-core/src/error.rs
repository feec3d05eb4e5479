//! Error taxonomy for graph construction and analysis.
//!
//! Every failure the engine can report is a [`GraphError`]. Variants fall into
//! three [`ErrorKind`]s:
//!
//! - **Input shape**: the caller's node list is inconsistent. Always fatal to
//!   [`GraphBuilder::build`](crate::graph::build::GraphBuilder::build); no
//!   partial graph is ever returned.
//! - **Structural**: the graph contains cycles, so order-dependent queries
//!   (topological order, levels, critical path) are meaningless. Carries the
//!   complete cycle list so callers can report all of them at once.
//! - **Lookup**: a query named a node that is not in the graph.
//!
//! The engine assigns no severity and never logs these errors; the caller
//! decides whether a cycle is a warning or a hard failure.

use crate::graph::{build::DanglingReference, cycles::Cycle};

/// Coarse classification of a [`GraphError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller-supplied entries are inconsistent (duplicates, empty names,
    /// dangling references under the strict policy).
    InputShape,
    /// The graph is cyclic and the requested query needs a DAG.
    Structural,
    /// A queried node name does not exist.
    Lookup,
}

/// Errors returned by the builder and the analysis queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// An entry has an empty name.
    #[error("entry #{index} has an empty name")]
    EmptyName {
        /// Zero-based position of the offending entry in the input.
        index: usize,
    },

    /// Two entries declare the same name.
    #[error("duplicate node name: {name}")]
    DuplicateNode {
        /// The name declared more than once.
        name: String,
    },

    /// Strict mode only: one or more dependencies name undeclared nodes.
    #[error("{} dangling dependency reference(s): {}", .references.len(), format_references(.references))]
    DanglingDependencies {
        /// Every missing reference, in input order.
        references: Vec<DanglingReference>,
    },

    /// The graph contains at least one cycle.
    #[error("dependency graph is cyclic: {}", format_cycles(.cycles))]
    CyclicGraph {
        /// All cycles found by cycle detection.
        cycles: Vec<Cycle>,
    },

    /// The queried node does not exist.
    #[error("node not found: {name}")]
    UnknownNode {
        /// The name that was looked up.
        name: String,
    },
}

impl GraphError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyName { .. } | Self::DuplicateNode { .. } | Self::DanglingDependencies { .. } => {
                ErrorKind::InputShape
            }
            Self::CyclicGraph { .. } => ErrorKind::Structural,
            Self::UnknownNode { .. } => ErrorKind::Lookup,
        }
    }

    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyName { .. } => "E1001",
            Self::DuplicateNode { .. } => "E1002",
            Self::DanglingDependencies { .. } => "E1003",
            Self::CyclicGraph { .. } => "E2001",
            Self::UnknownNode { .. } => "E3001",
        }
    }

    /// Optional remediation hint for operators.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::EmptyName { .. } => Some("Give every node a non-empty name."),
            Self::DuplicateNode { .. } => {
                Some("Each node name must be declared once; rename or merge the duplicates.")
            }
            Self::DanglingDependencies { .. } => Some(
                "Declare the missing nodes or remove the references; \
                 disable strict mode to ignore them.",
            ),
            Self::CyclicGraph { .. } => {
                Some("Remove one dependency from each reported cycle.")
            }
            Self::UnknownNode { .. } => None,
        }
    }

    /// The cycles carried by a [`GraphError::CyclicGraph`], if any.
    #[must_use]
    pub fn cycles(&self) -> Option<&[Cycle]> {
        match self {
            Self::CyclicGraph { cycles } => Some(cycles),
            _ => None,
        }
    }
}

fn format_references(references: &[DanglingReference]) -> String {
    references
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_cycles(cycles: &[Cycle]) -> String {
    cycles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
