//! Execution staging: longest-path level assignment.
//!
//! # Definition
//!
//! `level(n) = 0` when `n` has no dependencies, otherwise
//! `1 + max(level(d))` over its dependencies. This is the longest path from a
//! root, not the shortest: a node whose dependencies sit at levels `{0, 0, 2}`
//! lands at level 3 because it cannot start before its slowest chain is done.
//!
//! Nodes sharing a level are mutually independent and may run concurrently.
//!
//! # Algorithm
//!
//! Walk the topological order once; each node is processed after all of its
//! dependencies, so one pass over every edge suffices (O(V+E), no
//! exponential blowup on diamonds). The cycle check is the one performed by
//! the topological order, and its cycle list is returned unchanged on
//! failure.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::error::GraphError;
use crate::graph::build::Graph;
use crate::graph::topo::topological_indices;

// ---------------------------------------------------------------------------
// LevelMap
// ---------------------------------------------------------------------------

/// Per-node execution level, iterated in canonical node order.
///
/// Serializes as a JSON object whose keys appear in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelMap {
    entries: Vec<(String, usize)>,
    lookup: HashMap<String, usize>,
}

/// The nodes that share one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    /// Zero-based level.
    pub level: usize,
    /// Node names at this level, in canonical order.
    pub nodes: Vec<String>,
}

impl Stage {
    /// `true` if more than one node can run in this stage.
    #[must_use]
    pub fn is_parallel(&self) -> bool {
        self.nodes.len() > 1
    }
}

impl LevelMap {
    fn from_entries(entries: Vec<(String, usize)>) -> Self {
        let lookup = entries
            .iter()
            .enumerate()
            .map(|(pos, (name, _))| (name.clone(), pos))
            .collect();
        Self { entries, lookup }
    }

    /// Level of `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).map(|&pos| self.entries[pos].1)
    }

    /// `(name, level)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries
            .iter()
            .map(|(name, level)| (name.as_str(), *level))
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` for an empty graph.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest level, or `None` for an empty graph.
    #[must_use]
    pub fn max_level(&self) -> Option<usize> {
        self.entries.iter().map(|(_, level)| *level).max()
    }

    /// Number of distinct stages (`max_level + 1`, or 0 when empty).
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.max_level().map_or(0, |max| max + 1)
    }

    /// Names at `level`, in canonical order.
    #[must_use]
    pub fn nodes_at(&self, level: usize) -> Vec<&str> {
        self.iter()
            .filter(|&(_, l)| l == level)
            .map(|(name, _)| name)
            .collect()
    }

    /// All stages in ascending level order.
    ///
    /// Every level between 0 and the maximum is populated (a node at level
    /// `k > 0` implies a dependency at `k - 1`), so no stage is empty.
    #[must_use]
    pub fn stages(&self) -> Vec<Stage> {
        let mut stages: Vec<Stage> = (0..self.level_count())
            .map(|level| Stage {
                level,
                nodes: Vec::new(),
            })
            .collect();
        for (name, level) in &self.entries {
            stages[*level].nodes.push(name.clone());
        }
        stages
    }

    /// Stages with more than one node: the parallelization opportunities.
    #[must_use]
    pub fn parallel_stages(&self) -> Vec<Stage> {
        self.stages().into_iter().filter(Stage::is_parallel).collect()
    }
}

impl Serialize for LevelMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, level) in &self.entries {
            map.serialize_entry(name, level)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Assign every node its execution level.
///
/// # Errors
///
/// Returns [`GraphError::CyclicGraph`] if the graph has any cycle.
pub fn compute_levels<M>(graph: &Graph<M>) -> Result<LevelMap, GraphError> {
    let order = topological_indices(graph)?;

    let mut levels: Vec<usize> = vec![0; graph.len()];
    for idx in order {
        levels[idx.index()] = graph
            .node_at(idx)
            .dependencies()
            .iter()
            .map(|dep| levels[dep.index()] + 1)
            .max()
            .unwrap_or(0);
    }

    Ok(LevelMap::from_entries(
        graph
            .nodes()
            .map(|node| (node.name().to_string(), levels[node.index().index()]))
            .collect(),
    ))
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
    fn diamond_levels() {
        let graph = graph_of(&[("a", &[]), ("b", &["a"]), ("c", &["a"]), ("d", &["b", "c"])]);
        let levels = compute_levels(&graph).expect("acyclic");

        assert_eq!(levels.get("a"), Some(0));
        assert_eq!(levels.get("b"), Some(1));
        assert_eq!(levels.get("c"), Some(1));
        assert_eq!(levels.get("d"), Some(2));
        assert_eq!(levels.max_level(), Some(2));
        assert_eq!(levels.level_count(), 3);
    }

    #[test]
    fn longest_path_wins_over_shortest() {
        // x depends on roots r1, r2 (level 0) and on c2 (level 2).
        let graph = graph_of(&[
            ("r1", &[]),
            ("r2", &[]),
            ("c0", &[]),
            ("c1", &["c0"]),
            ("c2", &["c1"]),
            ("x", &["r1", "r2", "c2"]),
        ]);
        let levels = compute_levels(&graph).expect("acyclic");
        assert_eq!(levels.get("x"), Some(3));
    }

    #[test]
    fn stages_group_in_canonical_order() {
        let graph = graph_of(&[
            ("lint", &[]),
            ("build", &[]),
            ("test", &["build"]),
            ("e2e", &["build"]),
            ("deploy", &["test", "e2e", "lint"]),
        ]);
        let levels = compute_levels(&graph).expect("acyclic");

        let stages = levels.stages();
        assert_eq!(stages.len(), 3);
        assert_eq!(stages[0].nodes, vec!["lint", "build"]);
        assert_eq!(stages[1].nodes, vec!["test", "e2e"]);
        assert_eq!(stages[2].nodes, vec!["deploy"]);

        let parallel = levels.parallel_stages();
        assert_eq!(parallel.len(), 2);
        assert_eq!(parallel[0].level, 0);
        assert_eq!(parallel[1].level, 1);
        assert_eq!(levels.nodes_at(1), vec!["test", "e2e"]);
    }

    #[test]
    fn cyclic_graph_is_rejected() {
        let graph = graph_of(&[("a", &[]), ("b", &["c"]), ("c", &["b"])]);
        let err = compute_levels(&graph).expect_err("cyclic");
        assert_eq!(
            err.cycles().map(|c| c[0].to_string()),
            Some("b -> c -> b".to_string())
        );
    }

    #[test]
    fn empty_graph_has_no_levels() {
        let graph = graph_of(&[]);
        let levels = compute_levels(&graph).expect("acyclic");
        assert!(levels.is_empty());
        assert_eq!(levels.max_level(), None);
        assert_eq!(levels.level_count(), 0);
        assert!(levels.stages().is_empty());
    }

    #[test]
    fn serializes_in_canonical_order() {
        let graph = graph_of(&[("z", &[]), ("a", &["z"]), ("m", &[])]);
        let levels = compute_levels(&graph).expect("acyclic");
        assert_eq!(
            serde_json::to_string(&levels).expect("serialize"),
            r#"{"z":0,"a":1,"m":0}"#
        );
    }

    #[test]
    fn wide_diamond_chain_is_linear() {
        // 40 stacked diamonds: naive recursion without memoization would
        // explore 2^40 paths.
        let mut entries: Vec<(String, Vec<String>)> = vec![("d0".into(), vec![])];
        for i in 0..40 {
            let base = format!("d{i}");
            entries.push((format!("l{i}"), vec![base.clone()]));
            entries.push((format!("r{i}"), vec![base]));
            entries.push((format!("d{}", i + 1), vec![format!("l{i}"), format!("r{i}")]));
        }
        let graph = Graph::from_entries(
            entries
                .into_iter()
                .map(|(name, deps)| NodeEntry::<crate::graph::build::Metadata>::new(name, deps)),
        )
        .expect("build graph");

        let levels = compute_levels(&graph).expect("acyclic");
        assert_eq!(levels.get("d40"), Some(80));
    }
}
