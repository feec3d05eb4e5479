//! Basic structural statistics for a dependency graph.
//!
//! # Statistics Provided
//!
//! - **node_count** / **edge_count**: size of the graph. Duplicate
//!   declarations are already collapsed; self-loops count as edges.
//! - **density**: `edge_count / (node_count * (node_count - 1))`. Zero for
//!   graphs with fewer than two nodes.
//! - **root_count**: nodes with no dependencies (level-0 candidates).
//! - **leaf_count**: nodes nothing depends on.
//! - **isolated_node_count**: nodes that are both roots and leaves.
//! - **self_loop_count**: nodes that depend on themselves.
//! - **weakly_connected_component_count**: disjoint subgraphs when edge
//!   direction is ignored.
//! - **max_dependency_count** / **max_dependent_count**: widest fan-in and
//!   fan-out.

use petgraph::algo::connected_components;
use serde::Serialize;

use crate::graph::build::Graph;

// ---------------------------------------------------------------------------
// GraphStats
// ---------------------------------------------------------------------------

/// Summary statistics for a dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    /// Number of nodes.
    pub node_count: usize,
    /// Number of distinct dependency edges.
    pub edge_count: usize,
    /// Ratio of actual to possible directed edges, in `[0.0, 1.0]`.
    pub density: f64,
    /// Nodes with no dependencies.
    pub root_count: usize,
    /// Nodes with no dependents.
    pub leaf_count: usize,
    /// Nodes with neither dependencies nor dependents.
    pub isolated_node_count: usize,
    /// Nodes that list themselves as a dependency.
    pub self_loop_count: usize,
    /// Number of weakly connected components.
    pub weakly_connected_component_count: usize,
    /// Highest number of direct dependencies on one node.
    pub max_dependency_count: usize,
    /// Highest number of direct dependents on one node.
    pub max_dependent_count: usize,
}

impl GraphStats {
    /// Compute statistics for `graph`.
    #[must_use]
    pub fn from_graph<M>(graph: &Graph<M>) -> Self {
        let node_count = graph.len();
        let edge_count = graph.edge_count();

        let mut stats = Self {
            node_count,
            edge_count,
            density: compute_density(node_count, edge_count),
            root_count: 0,
            leaf_count: 0,
            isolated_node_count: 0,
            self_loop_count: 0,
            weakly_connected_component_count: connected_components(graph.petgraph()),
            max_dependency_count: 0,
            max_dependent_count: 0,
        };

        for node in graph.nodes() {
            let deps = node.dependencies().len();
            let dependents = node.dependents().len();

            if deps == 0 {
                stats.root_count += 1;
            }
            if dependents == 0 {
                stats.leaf_count += 1;
            }
            if deps == 0 && dependents == 0 {
                stats.isolated_node_count += 1;
            }
            if node.has_self_loop() {
                stats.self_loop_count += 1;
            }
            stats.max_dependency_count = stats.max_dependency_count.max(deps);
            stats.max_dependent_count = stats.max_dependent_count.max(dependents);
        }

        stats
    }

    /// Return `true` if the graph has no dependency edges.
    #[must_use]
    pub const fn is_flat(&self) -> bool {
        self.edge_count == 0
    }
}

#[allow(clippy::cast_precision_loss)]
fn compute_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0_f64;
    }
    let max_edges = (node_count * (node_count - 1)) as f64;
    edge_count as f64 / max_edges
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build::NodeEntry;

    fn graph_of(entries: &[(&str, &[&str])]) -> Graph {
        Graph::from_entries(
            entries
                .iter()
                .map(|(name, deps)| NodeEntry::new(*name, deps.iter().copied())),
        )
        .expect("build graph")
    }

    #[test]
    fn empty_graph() {
        let stats = GraphStats::from_graph(&graph_of(&[]));
        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.edge_count, 0);
        assert!(stats.density.abs() < f64::EPSILON);
        assert_eq!(stats.weakly_connected_component_count, 0);
        assert!(stats.is_flat());
    }

    #[test]
    fn diamond_with_isolated_node() {
        let stats = GraphStats::from_graph(&graph_of(&[
            ("a", &[]),
            ("b", &["a"]),
            ("c", &["a"]),
            ("d", &["b", "c"]),
            ("lonely", &[]),
        ]));

        assert_eq!(stats.node_count, 5);
        assert_eq!(stats.edge_count, 4);
        assert!((stats.density - 4.0 / 20.0).abs() < 1e-9);
        assert_eq!(stats.root_count, 2);
        assert_eq!(stats.leaf_count, 2);
        assert_eq!(stats.isolated_node_count, 1);
        assert_eq!(stats.weakly_connected_component_count, 2);
        assert_eq!(stats.max_dependency_count, 2);
        assert_eq!(stats.max_dependent_count, 2);
        assert!(!stats.is_flat());
    }

    #[test]
    fn self_loop_counts_as_edge_not_isolation() {
        let stats = GraphStats::from_graph(&graph_of(&[("a", &["a"])]));
        assert_eq!(stats.edge_count, 1);
        assert_eq!(stats.self_loop_count, 1);
        assert_eq!(stats.isolated_node_count, 0);
        assert_eq!(stats.root_count, 0);
        assert!(stats.density.abs() < f64::EPSILON);
    }
}
