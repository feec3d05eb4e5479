//! Topological execution order.
//!
//! Cycle detection runs first; any cycle fails the whole query with
//! [`GraphError::CyclicGraph`] carrying every detected cycle. A partial order
//! over a cyclic graph is never returned.
//!
//! On a DAG, the order is the DFS post-order: roots visited in canonical
//! order, dependencies walked in declaration order, and a node emitted only
//! after all of its dependencies. For `a; b→a; c→a; d→b,c` this yields
//! `[a, b, c, d]`.

use fixedbitset::FixedBitSet;
use petgraph::graph::NodeIndex;

use crate::error::GraphError;
use crate::graph::build::Graph;
use crate::graph::cycles::detect_cycles;

/// Execution order as node names, dependencies first.
///
/// # Errors
///
/// Returns [`GraphError::CyclicGraph`] if the graph has any cycle.
pub fn topological_order<M>(graph: &Graph<M>) -> Result<Vec<String>, GraphError> {
    Ok(topological_indices(graph)?
        .into_iter()
        .map(|idx| graph.name_of(idx).to_string())
        .collect())
}

/// Execution order as node indices, dependencies first.
///
/// # Errors
///
/// Returns [`GraphError::CyclicGraph`] if the graph has any cycle.
pub fn topological_indices<M>(graph: &Graph<M>) -> Result<Vec<NodeIndex>, GraphError> {
    let cycles = detect_cycles(graph);
    if !cycles.is_empty() {
        return Err(GraphError::CyclicGraph { cycles });
    }
    Ok(post_order(graph))
}

/// DFS post-order over an acyclic graph.
fn post_order<M>(graph: &Graph<M>) -> Vec<NodeIndex> {
    let mut emitted = FixedBitSet::with_capacity(graph.len());
    let mut entered = FixedBitSet::with_capacity(graph.len());
    let mut order: Vec<NodeIndex> = Vec::with_capacity(graph.len());
    let mut frames: Vec<(NodeIndex, usize)> = Vec::new();

    for root in graph.indices() {
        if entered.contains(root.index()) {
            continue;
        }
        entered.insert(root.index());
        frames.push((root, 0));

        while let Some(frame) = frames.last_mut() {
            let (current, cursor) = *frame;

            if let Some(&dep) = graph.node_at(current).dependencies().get(cursor) {
                frame.1 += 1;
                if !entered.contains(dep.index()) {
                    entered.insert(dep.index());
                    frames.push((dep, 0));
                }
            } else {
                frames.pop();
                if !emitted.contains(current.index()) {
                    emitted.insert(current.index());
                    order.push(current);
                }
            }
        }
    }

    order
}
