//! Transitive closure and impact analysis.
//!
//! For a target node, [`analyze_impact`] reports what it needs (dependencies)
//! and what needs it (dependents), each split into a *direct* list and a
//! *transitive-only* list. The two lists are disjoint: a name reachable in
//! one hop is reported only as direct.
//!
//! `impact_score = |all reachable dependents| + 1`, the number of units
//! affected when the target changes, the target itself included.
//!
//! Reachability uses BFS with a visited set, so it terminates on cyclic
//! graphs too. The target is never reported as its own dependency or
//! dependent, even when it sits on a cycle.

#![allow(clippy::module_name_repetitions)]

use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use petgraph::graph::NodeIndex;
use serde::Serialize;

use crate::error::GraphError;
use crate::graph::build::{Graph, Node};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Blast radius and dependency set of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactRecord {
    /// The analyzed node.
    pub name: String,
    /// Immediate dependencies, in declaration order.
    pub direct_dependencies: Vec<String>,
    /// Dependencies reachable only through other dependencies, in BFS order.
    pub transitive_dependencies: Vec<String>,
    /// Immediate dependents, in canonical order.
    pub direct_dependents: Vec<String>,
    /// Dependents reachable only through other dependents, in BFS order.
    pub transitive_dependents: Vec<String>,
    /// `|direct_dependents| + |transitive_dependents| + 1`.
    pub impact_score: usize,
}

impl ImpactRecord {
    /// Direct and transitive dependencies together.
    pub fn all_dependencies(&self) -> impl Iterator<Item = &str> {
        self.direct_dependencies
            .iter()
            .chain(&self.transitive_dependencies)
            .map(String::as_str)
    }

    /// Direct and transitive dependents together.
    pub fn all_dependents(&self) -> impl Iterator<Item = &str> {
        self.direct_dependents
            .iter()
            .chain(&self.transitive_dependents)
            .map(String::as_str)
    }
}

/// One row of the workspace-wide impact ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactSummary {
    /// Node name.
    pub name: String,
    /// Number of direct dependencies.
    pub dependency_count: usize,
    /// Number of direct dependents.
    pub dependent_count: usize,
    /// See [`ImpactRecord::impact_score`].
    pub impact_score: usize,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Analyze the blast radius of `target`.
///
/// # Errors
///
/// Returns [`GraphError::UnknownNode`] if `target` is not in the graph.
pub fn analyze_impact<M>(graph: &Graph<M>, target: &str) -> Result<ImpactRecord, GraphError> {
    let Some(start) = graph.index_of(target) else {
        return Err(GraphError::UnknownNode {
            name: target.to_string(),
        });
    };
    let node = graph.node_at(start);

    let direct_dependencies = without(start, node.dependencies());
    let direct_dependents = without(start, node.dependents());

    let reachable_dependencies = reachable(graph, start, Node::dependencies);
    let reachable_dependents = reachable(graph, start, Node::dependents);

    let impact_score = reachable_dependents.len() + 1;

    Ok(ImpactRecord {
        name: target.to_string(),
        transitive_dependencies: names(
            graph,
            &difference(&reachable_dependencies, &direct_dependencies),
        ),
        transitive_dependents: names(graph, &difference(&reachable_dependents, &direct_dependents)),
        direct_dependencies: names(graph, &direct_dependencies),
        direct_dependents: names(graph, &direct_dependents),
        impact_score,
    })
}

/// All nodes reachable from `name` along dependency edges, target excluded.
///
/// # Errors
///
/// Returns [`GraphError::UnknownNode`] if `name` is not in the graph.
pub fn transitive_dependencies<M>(graph: &Graph<M>, name: &str) -> Result<Vec<String>, GraphError> {
    let start = lookup(graph, name)?;
    Ok(names(graph, &reachable(graph, start, Node::dependencies)))
}

/// All nodes that reach `name` along dependency edges, target excluded.
///
/// # Errors
///
/// Returns [`GraphError::UnknownNode`] if `name` is not in the graph.
pub fn transitive_dependents<M>(graph: &Graph<M>, name: &str) -> Result<Vec<String>, GraphError> {
    let start = lookup(graph, name)?;
    Ok(names(graph, &reachable(graph, start, Node::dependents)))
}

/// Impact score of every node, highest first; ties keep canonical order.
#[must_use]
pub fn impact_ranking<M>(graph: &Graph<M>) -> Vec<ImpactSummary> {
    let mut ranking: Vec<ImpactSummary> = graph
        .nodes()
        .map(|node| ImpactSummary {
            name: node.name().to_string(),
            dependency_count: node.dependencies().len(),
            dependent_count: node.dependents().len(),
            impact_score: reachable(graph, node.index(), Node::dependents).len() + 1,
        })
        .collect();

    // Stable sort: equal scores stay in canonical order.
    ranking.sort_by(|a, b| b.impact_score.cmp(&a.impact_score));
    ranking
}

// ---------------------------------------------------------------------------
// Traversal helpers
// ---------------------------------------------------------------------------

fn lookup<M>(graph: &Graph<M>, name: &str) -> Result<NodeIndex, GraphError> {
    graph.index_of(name).ok_or_else(|| GraphError::UnknownNode {
        name: name.to_string(),
    })
}

/// BFS from `start` following `next`, excluding `start` itself.
fn reachable<M>(
    graph: &Graph<M>,
    start: NodeIndex,
    next: fn(&Node<M>) -> &[NodeIndex],
) -> Vec<NodeIndex> {
    let mut visited = FixedBitSet::with_capacity(graph.len());
    let mut queue: VecDeque<NodeIndex> = VecDeque::from([start]);
    let mut found: Vec<NodeIndex> = Vec::new();
    visited.insert(start.index());

    while let Some(current) = queue.pop_front() {
        for &neighbor in next(graph.node_at(current)) {
            if !visited.contains(neighbor.index()) {
                visited.insert(neighbor.index());
                found.push(neighbor);
                queue.push_back(neighbor);
            }
        }
    }

    found
}

fn without(target: NodeIndex, indices: &[NodeIndex]) -> Vec<NodeIndex> {
    indices.iter().copied().filter(|&idx| idx != target).collect()
}

fn difference(all: &[NodeIndex], direct: &[NodeIndex]) -> Vec<NodeIndex> {
    all.iter().copied().filter(|idx| !direct.contains(idx)).collect()
}

fn names<M>(graph: &Graph<M>, indices: &[NodeIndex]) -> Vec<String> {
    indices
        .iter()
        .map(|&idx| graph.name_of(idx).to_string())
        .collect()
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

    fn diamond() -> Graph {
        graph_of(&[("a", &[]), ("b", &["a"]), ("c", &["a"]), ("d", &["b", "c"])])
    }

    #[test]
    fn root_of_diamond_affects_everything() {
        let record = analyze_impact(&diamond(), "a").expect("known node");

        assert_eq!(record.impact_score, 4);
        assert_eq!(record.direct_dependents, vec!["b", "c"]);
        assert_eq!(record.transitive_dependents, vec!["d"]);
        assert!(record.direct_dependencies.is_empty());
        assert!(record.transitive_dependencies.is_empty());
    }

    #[test]
    fn sink_of_diamond_depends_on_everything() {
        let record = analyze_impact(&diamond(), "d").expect("known node");

        assert_eq!(record.impact_score, 1);
        assert_eq!(record.direct_dependencies, vec!["b", "c"]);
        assert_eq!(record.transitive_dependencies, vec!["a"]);
        assert!(record.direct_dependents.is_empty());
        assert_eq!(record.all_dependencies().collect::<Vec<_>>(), vec!["b", "c", "a"]);
    }

    #[test]
    fn direct_and_transitive_lists_are_disjoint() {
        // d depends on a both directly and through b.
        let graph = graph_of(&[("a", &[]), ("b", &["a"]), ("d", &["b", "a"])]);
        let record = analyze_impact(&graph, "d").expect("known node");

        assert_eq!(record.direct_dependencies, vec!["b", "a"]);
        assert!(record.transitive_dependencies.is_empty());

        let root = analyze_impact(&graph, "a").expect("known node");
        assert_eq!(root.direct_dependents, vec!["b", "d"]);
        assert!(root.transitive_dependents.is_empty());
        assert_eq!(root.impact_score, 3);
    }

    #[test]
    fn unknown_node_is_a_lookup_error() {
        let err = analyze_impact(&diamond(), "ghost").expect_err("unknown node");
        assert_eq!(err, GraphError::UnknownNode { name: "ghost".into() });
    }

    #[test]
    fn terminates_on_cycles_and_excludes_target() {
        let graph = graph_of(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]);
        let record = analyze_impact(&graph, "a").expect("known node");

        assert_eq!(record.direct_dependencies, vec!["b"]);
        assert_eq!(record.transitive_dependencies, vec!["c"]);
        assert_eq!(record.direct_dependents, vec!["c"]);
        assert_eq!(record.transitive_dependents, vec!["b"]);
        assert_eq!(record.impact_score, 3);
    }

    #[test]
    fn self_loop_does_not_count_the_target_twice() {
        let graph = graph_of(&[("a", &["a"]), ("b", &["a"])]);
        let record = analyze_impact(&graph, "a").expect("known node");

        assert!(record.direct_dependencies.is_empty());
        assert_eq!(record.direct_dependents, vec!["b"]);
        assert_eq!(record.impact_score, 2);
    }

    #[test]
    fn transitive_helpers_include_direct_neighbors() {
        let graph = diamond();
        assert_eq!(
            transitive_dependencies(&graph, "d").expect("known"),
            vec!["b", "c", "a"]
        );
        assert_eq!(
            transitive_dependents(&graph, "a").expect("known"),
            vec!["b", "c", "d"]
        );
        assert!(transitive_dependents(&graph, "nope").is_err());
    }

    #[test]
    fn ranking_orders_by_score_then_canonical_order() {
        let ranking = impact_ranking(&diamond());
        let order: Vec<(&str, usize)> = ranking
            .iter()
            .map(|r| (r.name.as_str(), r.impact_score))
            .collect();
        assert_eq!(order, vec![("a", 4), ("b", 2), ("c", 2), ("d", 1)]);
        assert_eq!(ranking[0].dependent_count, 2);
        assert_eq!(ranking[3].dependency_count, 2);
    }
}
