//! Cycle detection over the dependency relation.
//!
//! # Algorithm
//!
//! Depth-first search from every not-yet-visited node in canonical order,
//! following each node's dependencies in declaration order. A node is on the
//! *recursion stack* while its DFS frame is active. Reaching a dependency that
//! is already on the stack closes a cycle: the reported walk is the suffix of
//! the current DFS path starting at that dependency, followed by the
//! dependency again.
//!
//! Fully explored nodes are marked permanently visited and never re-entered,
//! so the search is O(V+E). It reports at least one cycle per non-trivial
//! strongly connected component reachable from an unvisited root; it does not
//! enumerate every elementary cycle of a component.
//!
//! The DFS is iterative (explicit frame stack) so long dependency chains do
//! not exhaust the call stack.
//!
//! # Guarantees
//!
//! - Every reported sequence is a genuine closed walk `[n0, …, nk, n0]` over
//!   declared edges. The back-edge target is always on the current path
//!   because "on the recursion stack" and "on the path" are the same set.
//! - Self-loops are reported as `[n, n]`.
//! - Identical input yields identical output, in identical order.

#![allow(clippy::module_name_repetitions)]

use std::fmt;

use fixedbitset::FixedBitSet;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::graph::build::Graph;

// ---------------------------------------------------------------------------
// Cycle
// ---------------------------------------------------------------------------

/// A closed walk through the dependency relation.
///
/// The first and last names are equal. For `["a", "b", "a"]`, `a` depends on
/// `b` and `b` depends on `a`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cycle {
    path: Vec<String>,
}

impl Cycle {
    /// Wrap an already-closed path.
    #[must_use]
    pub const fn new(path: Vec<String>) -> Self {
        Self { path }
    }

    /// The closed walk, first element repeated at the end.
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Distinct nodes on the walk (the repeated endpoint is not counted).
    #[must_use]
    pub fn members(&self) -> &[String] {
        match self.path.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    /// Number of distinct nodes in the cycle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members().len()
    }

    /// `true` for a degenerate, empty cycle.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members().is_empty()
    }

    /// Returns `true` if this is a self-loop (a node depends on itself).
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.len() == 1
    }

    /// Consume the cycle, returning the closed walk.
    #[must_use]
    pub fn into_path(self) -> Vec<String> {
        self.path
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.join(" -> "))
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Find cycles in `graph`. Empty when the graph is a DAG.
#[must_use]
pub fn detect_cycles<M>(graph: &Graph<M>) -> Vec<Cycle> {
    let mut visited = FixedBitSet::with_capacity(graph.len());
    let mut on_stack = FixedBitSet::with_capacity(graph.len());
    let mut path: Vec<NodeIndex> = Vec::new();
    let mut cycles: Vec<Cycle> = Vec::new();

    // Each frame: (node, position of the next dependency to examine).
    let mut frames: Vec<(NodeIndex, usize)> = Vec::new();

    for root in graph.indices() {
        if visited.contains(root.index()) {
            continue;
        }

        visited.insert(root.index());
        on_stack.insert(root.index());
        path.push(root);
        frames.push((root, 0));

        while let Some(frame) = frames.last_mut() {
            let (current, cursor) = *frame;
            let dependencies = graph.node_at(current).dependencies();

            if let Some(&dep) = dependencies.get(cursor) {
                frame.1 += 1;

                if !visited.contains(dep.index()) {
                    visited.insert(dep.index());
                    on_stack.insert(dep.index());
                    path.push(dep);
                    frames.push((dep, 0));
                } else if on_stack.contains(dep.index()) {
                    cycles.push(close_cycle(graph, &path, dep));
                }
            } else {
                frames.pop();
                path.pop();
                on_stack.set(current.index(), false);
            }
        }
    }

    cycles
}

/// `true` if the graph contains at least one cycle.
#[must_use]
pub fn is_cyclic<M>(graph: &Graph<M>) -> bool {
    !detect_cycles(graph).is_empty()
}

/// Slice the active path from `target` and append `target` to close it.
fn close_cycle<M>(graph: &Graph<M>, path: &[NodeIndex], target: NodeIndex) -> Cycle {
    // `target` is on the recursion stack, and the stack is exactly `path`.
    let start = path.iter().rposition(|&idx| idx == target).unwrap_or(0);

    let mut walk: Vec<String> = path[start..]
        .iter()
        .map(|&idx| graph.name_of(idx).to_string())
        .collect();
    walk.push(graph.name_of(target).to_string());
    Cycle::new(walk)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
