//! Critical path summary over execution levels.
//!
//! # Overview
//!
//! The critical path reports one representative node per level, from level 0
//! up to the deepest level. Its length is the minimum number of sequential
//! stages needed to run the whole graph (`max_level + 1`).
//!
//! # Selection Rule
//!
//! At each level the *first node in canonical order* is chosen. The chosen
//! nodes are not guaranteed to form an actual dependency chain: with
//! `a; x; b→x`, level 0 yields `a` (first in order) even though `b` depends on
//! `x`. Callers that need a real chain should walk dependencies themselves.

use crate::error::GraphError;
use crate::graph::build::Graph;
use crate::graph::levels::{LevelMap, compute_levels};

/// Representative node per level, level 0 first.
///
/// Empty for an empty graph.
///
/// # Errors
///
/// Returns [`GraphError::CyclicGraph`] if the graph has any cycle.
pub fn critical_path<M>(graph: &Graph<M>) -> Result<Vec<String>, GraphError> {
    Ok(critical_path_from_levels(&compute_levels(graph)?))
}

/// [`critical_path`] over an already computed [`LevelMap`].
#[must_use]
pub fn critical_path_from_levels(levels: &LevelMap) -> Vec<String> {
    let Some(max_level) = levels.max_level() else {
        return Vec::new();
    };

    let mut path: Vec<String> = Vec::with_capacity(max_level + 1);
    for level in (0..=max_level).rev() {
        if let Some((name, _)) = levels.iter().find(|&(_, l)| l == level) {
            path.insert(0, name.to_string());
        }
    }
    path
}
