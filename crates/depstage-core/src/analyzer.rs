//! Read-only query facade over a built [`Graph`].

use tracing::instrument;

use crate::error::GraphError;
use crate::graph::{
    Cycle, Diagnostics, Graph, GraphStats, ImpactRecord, ImpactSummary, LevelMap, Metadata,
    analyze_impact, critical_path_from_levels, compute_levels, detect_cycles, impact_ranking,
    topological_order,
};

/// Borrows a [`Graph`] and answers structural queries about it.
///
/// Holds no state besides the borrow, so any number of analyzers may query
/// the same graph from different threads.
#[derive(Debug)]
pub struct GraphAnalyzer<'g, M = Metadata> {
    graph: &'g Graph<M>,
}

// Copy for any `M`: only the borrow is held.
impl<M> Clone for GraphAnalyzer<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for GraphAnalyzer<'_, M> {}

impl<'g, M> GraphAnalyzer<'g, M> {
    /// Wrap `graph` for querying.
    #[must_use]
    pub const fn new(graph: &'g Graph<M>) -> Self {
        Self { graph }
    }

    /// The analyzed graph.
    #[must_use]
    pub const fn graph(&self) -> &'g Graph<M> {
        self.graph
    }

    /// See [`detect_cycles`](crate::graph::detect_cycles).
    #[must_use]
    pub fn detect_cycles(&self) -> Vec<Cycle> {
        detect_cycles(self.graph)
    }

    /// See [`topological_order`](crate::graph::topological_order).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::CyclicGraph`] if the graph has any cycle.
    pub fn topological_order(&self) -> Result<Vec<String>, GraphError> {
        topological_order(self.graph)
    }

    /// See [`compute_levels`](crate::graph::compute_levels).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::CyclicGraph`] if the graph has any cycle.
    pub fn compute_levels(&self) -> Result<LevelMap, GraphError> {
        compute_levels(self.graph)
    }

    /// See [`analyze_impact`](crate::graph::analyze_impact).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if `target` is not in the graph.
    #[instrument(skip(self))]
    pub fn analyze_impact(&self, target: &str) -> Result<ImpactRecord, GraphError> {
        analyze_impact(self.graph, target)
    }

    /// See [`critical_path`](crate::graph::critical_path).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::CyclicGraph`] if the graph has any cycle.
    pub fn critical_path(&self) -> Result<Vec<String>, GraphError> {
        Ok(critical_path_from_levels(&self.compute_levels()?))
    }

    /// Structural statistics; see [`GraphStats::from_graph`].
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        GraphStats::from_graph(self.graph)
    }

    /// Every node ranked by impact score, highest first.
    #[must_use]
    pub fn impact_ranking(&self) -> Vec<ImpactSummary> {
        impact_ranking(self.graph)
    }

    /// Recommendations with a custom fan-in threshold.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::CyclicGraph`] if the graph has any cycle.
    pub fn diagnostics(&self, fan_in_threshold: usize) -> Result<Diagnostics, GraphError> {
        let levels = self.compute_levels()?;
        Ok(Diagnostics::with_fan_in_threshold(
            self.graph,
            &levels,
            fan_in_threshold,
        ))
    }
}
