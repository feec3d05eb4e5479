//! Structural recommendations derived from levels and adjacency.
//!
//! Exposes the findings a report's "recommendations" section is built from:
//! - [`SingleDependency`]: a non-root node gated by exactly one dependency,
//!   often a candidate for running alongside its siblings
//! - [`FanIn`]: a node with many dependencies, worth reviewing
//! - the parallel stages of the [`LevelMap`]

use serde::Serialize;

use crate::graph::build::Graph;
use crate::graph::levels::{LevelMap, Stage};

/// Nodes with more than this many dependencies are reported as fan-in.
pub const FAN_IN_THRESHOLD: usize = 2;

/// A node at level > 0 with exactly one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SingleDependency {
    pub name: String,
    pub dependency: String,
    pub level: usize,
}

/// A node whose dependency count exceeds the fan-in threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FanIn {
    pub name: String,
    pub dependencies: Vec<String>,
}

/// Recommendation inputs for one graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Canonical order.
    pub single_dependency_nodes: Vec<SingleDependency>,
    /// Canonical order.
    pub fan_in_nodes: Vec<FanIn>,
    /// Stages with more than one node, ascending level.
    pub parallel_stages: Vec<Stage>,
}

impl Diagnostics {
    /// Diagnostics with the default [`FAN_IN_THRESHOLD`].
    #[must_use]
    pub fn from_levels<M>(graph: &Graph<M>, levels: &LevelMap) -> Self {
        Self::with_fan_in_threshold(graph, levels, FAN_IN_THRESHOLD)
    }

    /// Diagnostics reporting nodes with more than `threshold` dependencies.
    #[must_use]
    pub fn with_fan_in_threshold<M>(graph: &Graph<M>, levels: &LevelMap, threshold: usize) -> Self {
        let mut single_dependency_nodes = Vec::new();
        let mut fan_in_nodes = Vec::new();

        for node in graph.nodes() {
            let level = levels.get(node.name()).unwrap_or(0);

            if let [only] = node.dependencies()
                && level > 0
            {
                single_dependency_nodes.push(SingleDependency {
                    name: node.name().to_string(),
                    dependency: graph.name_of(*only).to_string(),
                    level,
                });
            }

            if node.dependencies().len() > threshold {
                fan_in_nodes.push(FanIn {
                    name: node.name().to_string(),
                    dependencies: graph
                        .dependency_names(node.index())
                        .map(str::to_string)
                        .collect(),
                });
            }
        }

        Self {
            single_dependency_nodes,
            fan_in_nodes,
            parallel_stages: levels.parallel_stages(),
        }
    }

    /// `true` when there is nothing to recommend.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.single_dependency_nodes.is_empty()
            && self.fan_in_nodes.is_empty()
            && self.parallel_stages.is_empty()
    }
}
