//! Graph construction from a caller-supplied node list.
//!
//! # Overview
//!
//! [`GraphBuilder::build`] turns an ordered sequence of [`NodeEntry`] values
//! (`name` + declared `depends_on` names + opaque metadata) into an immutable
//! [`Graph`] and a [`BuildReport`].
//!
//! ## Edge Direction
//!
//! A declaration `b.depends_on = ["a"]` means "b requires a first". Each
//! [`Node`] stores both directions as ordered adjacency lists:
//!
//! - `a.dependents   == [b]`
//! - `b.dependencies == [a]`
//!
//! The mirrored petgraph structure uses `dependency → dependent` edges
//! (`a → b`, blocker → blocked), so petgraph's `Outgoing` direction walks
//! toward dependents.
//!
//! ## Canonical Order
//!
//! Nodes are inserted in input order, so petgraph `NodeIndex` order *is* the
//! canonical order. Every analysis visits roots in this order and walks a
//! node's dependencies in declaration order. Nothing downstream ever iterates
//! a hash map.
//!
//! ## Dangling References
//!
//! A dependency naming an undeclared node is never turned into a node. Under
//! [`DanglingPolicy::Ignore`] it is recorded in
//! [`BuildReport::dangling_references`] and the edge is dropped; under
//! [`DanglingPolicy::Fail`] the build fails listing every such reference.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::GraphError;

/// Default opaque per-node payload: a JSON-valued string map.
///
/// CI-job callers typically store the `if:` condition here; workspace
/// callers store package version and path.
pub type Metadata = BTreeMap<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One caller-supplied node declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeEntry<M = Metadata> {
    /// Unique, non-empty node name.
    pub name: String,
    /// Names of the nodes this node requires. Need not exist.
    #[serde(default, alias = "dependsOn")]
    pub depends_on: Vec<String>,
    /// Opaque payload carried through unchanged.
    #[serde(default)]
    pub metadata: M,
}

impl<M: Default> NodeEntry<M> {
    /// Declare a node with default metadata.
    pub fn new<I, S>(name: impl Into<String>, depends_on: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            depends_on: depends_on.into_iter().map(Into::into).collect(),
            metadata: M::default(),
        }
    }
}

impl<M> NodeEntry<M> {
    /// Replace the metadata payload.
    #[must_use]
    pub fn with_metadata<N>(self, metadata: N) -> NodeEntry<N> {
        NodeEntry {
            name: self.name,
            depends_on: self.depends_on,
            metadata,
        }
    }
}

// ---------------------------------------------------------------------------
// Options and report
// ---------------------------------------------------------------------------

/// What to do with a dependency that names an undeclared node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DanglingPolicy {
    /// Drop the edge and record the reference in the [`BuildReport`].
    #[default]
    Ignore,
    /// Fail the whole build with [`GraphError::DanglingDependencies`].
    Fail,
}

/// Builder configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Dangling-reference policy.
    #[serde(default)]
    pub dangling: DanglingPolicy,
}

impl BuildOptions {
    /// Options that reject dangling references.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            dangling: DanglingPolicy::Fail,
        }
    }
}

/// A declared dependency that does not match any node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DanglingReference {
    /// The node that declared the dependency.
    pub node: String,
    /// The undeclared dependency name.
    pub missing: String,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.node, self.missing)
    }
}

/// Side information produced by a successful build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Number of nodes in the built graph.
    pub node_count: usize,
    /// Number of distinct dependency edges in the built graph.
    pub edge_count: usize,
    /// Ignored references to undeclared nodes, in input order.
    pub dangling_references: Vec<DanglingReference>,
    /// Repeated dependency declarations collapsed into an existing edge.
    pub duplicate_edges_ignored: usize,
    /// Nodes that declare a dependency on themselves.
    pub self_loops: Vec<String>,
}

impl BuildReport {
    /// `true` when nothing was dropped, collapsed, or self-referential.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dangling_references.is_empty()
            && self.duplicate_edges_ignored == 0
            && self.self_loops.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// A node of the built graph.
#[derive(Debug, Clone)]
pub struct Node<M = Metadata> {
    index: NodeIndex,
    name: String,
    metadata: M,
    dependencies: Vec<NodeIndex>,
    dependents: Vec<NodeIndex>,
}

impl<M> Node<M> {
    /// Canonical position of this node.
    #[must_use]
    pub const fn index(&self) -> NodeIndex {
        self.index
    }

    /// The node name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The caller's opaque payload.
    #[must_use]
    pub const fn metadata(&self) -> &M {
        &self.metadata
    }

    /// What this node requires, in declaration order.
    #[must_use]
    pub fn dependencies(&self) -> &[NodeIndex] {
        &self.dependencies
    }

    /// What requires this node, in canonical order.
    #[must_use]
    pub fn dependents(&self) -> &[NodeIndex] {
        &self.dependents
    }

    /// `true` if the node declares a dependency on itself.
    #[must_use]
    pub fn has_self_loop(&self) -> bool {
        self.dependencies.contains(&self.index)
    }
}

/// An immutable dependency graph.
///
/// Produced only by [`GraphBuilder::build`]; there is no API to add nodes or
/// edges afterwards. All analysis functions take `&Graph`.
#[derive(Debug, Clone)]
pub struct Graph<M = Metadata> {
    graph: DiGraph<Node<M>, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl<M> Graph<M> {
    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of distinct dependency edges (self-loops included).
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for a name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<NodeIndex> {
        self.node_map.get(name).copied()
    }

    /// `true` if a node with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// Look up a node by name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&Node<M>> {
        self.index_of(name).map(|idx| &self.graph[idx])
    }

    /// Look up a node by index.
    ///
    /// # Panics
    ///
    /// Panics if `idx` does not belong to this graph.
    #[must_use]
    pub fn node_at(&self, idx: NodeIndex) -> &Node<M> {
        &self.graph[idx]
    }

    /// Name of the node at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` does not belong to this graph.
    #[must_use]
    pub fn name_of(&self, idx: NodeIndex) -> &str {
        &self.graph[idx].name
    }

    /// All nodes in canonical order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<M>> {
        self.graph.node_weights()
    }

    /// All node indices in canonical order.
    pub fn indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    /// Dependency names of a node, in declaration order.
    pub fn dependency_names(&self, idx: NodeIndex) -> impl Iterator<Item = &str> {
        self.graph[idx]
            .dependencies
            .iter()
            .map(|&dep| self.name_of(dep))
    }

    /// Dependent names of a node, in canonical order.
    pub fn dependent_names(&self, idx: NodeIndex) -> impl Iterator<Item = &str> {
        self.graph[idx]
            .dependents
            .iter()
            .map(|&dep| self.name_of(dep))
    }

    /// Read-only petgraph view. Edge direction is `dependency → dependent`.
    #[must_use]
    pub const fn petgraph(&self) -> &DiGraph<Node<M>, ()> {
        &self.graph
    }
}

impl<M> Graph<M> {
    /// Build with [`BuildOptions::default`] and discard the report.
    ///
    /// # Errors
    ///
    /// See [`GraphBuilder::build`].
    pub fn from_entries(
        entries: impl IntoIterator<Item = NodeEntry<M>>,
    ) -> Result<Self, GraphError> {
        GraphBuilder::default().build(entries).map(|(graph, _)| graph)
    }
}

// ---------------------------------------------------------------------------
// GraphBuilder
// ---------------------------------------------------------------------------

/// Validates a node list and produces a [`Graph`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphBuilder {
    options: BuildOptions,
}

impl GraphBuilder {
    /// Create a builder with the given options.
    #[must_use]
    pub const fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    /// Create a builder that rejects dangling references.
    #[must_use]
    pub const fn strict() -> Self {
        Self::new(BuildOptions::strict())
    }

    /// The options this builder applies.
    #[must_use]
    pub const fn options(&self) -> BuildOptions {
        self.options
    }

    /// Build a graph from `entries`.
    ///
    /// Either the whole graph is built or an error is returned; there is no
    /// partial result.
    ///
    /// # Errors
    ///
    /// - [`GraphError::EmptyName`] if an entry has an empty name.
    /// - [`GraphError::DuplicateNode`] if two entries share a name.
    /// - [`GraphError::DanglingDependencies`] under [`DanglingPolicy::Fail`]
    ///   if any dependency names an undeclared node (all of them listed).
    #[instrument(skip_all, fields(policy = ?self.options.dangling))]
    pub fn build<M>(
        &self,
        entries: impl IntoIterator<Item = NodeEntry<M>>,
    ) -> Result<(Graph<M>, BuildReport), GraphError> {
        let entries = entries.into_iter();
        let (lower, _) = entries.size_hint();

        let mut graph = DiGraph::<Node<M>, ()>::with_capacity(lower, lower);
        let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(lower);
        let mut declared: Vec<Vec<String>> = Vec::with_capacity(lower);

        // Pass 1: register every node so forward references resolve.
        for (position, entry) in entries.enumerate() {
            if entry.name.is_empty() {
                return Err(GraphError::EmptyName { index: position });
            }
            if node_map.contains_key(&entry.name) {
                return Err(GraphError::DuplicateNode { name: entry.name });
            }

            let index = NodeIndex::new(graph.node_count());
            let idx = graph.add_node(Node {
                index,
                name: entry.name.clone(),
                metadata: entry.metadata,
                dependencies: Vec::new(),
                dependents: Vec::new(),
            });
            debug_assert_eq!(idx, index);
            node_map.insert(entry.name, idx);
            declared.push(entry.depends_on);
        }

        // Pass 2: resolve declared dependencies into edges.
        let mut report = BuildReport::default();

        for (position, depends_on) in declared.into_iter().enumerate() {
            let idx = NodeIndex::new(position);
            for dep_name in depends_on {
                let Some(&dep_idx) = node_map.get(&dep_name) else {
                    // Repeating a missing name is recorded once per node.
                    let node = &graph[idx].name;
                    let seen = report
                        .dangling_references
                        .iter()
                        .any(|r| r.node == *node && r.missing == dep_name);
                    if !seen {
                        report.dangling_references.push(DanglingReference {
                            node: node.clone(),
                            missing: dep_name,
                        });
                    }
                    continue;
                };

                // Avoid duplicate edges (petgraph allows them by default).
                if graph.contains_edge(dep_idx, idx) {
                    report.duplicate_edges_ignored += 1;
                    continue;
                }

                graph.add_edge(dep_idx, idx, ());
                graph[idx].dependencies.push(dep_idx);
                graph[dep_idx].dependents.push(idx);

                if dep_idx == idx {
                    report.self_loops.push(graph[idx].name.clone());
                }
            }
        }

        if self.options.dangling == DanglingPolicy::Fail && !report.dangling_references.is_empty()
        {
            return Err(GraphError::DanglingDependencies {
                references: report.dangling_references,
            });
        }

        report.node_count = graph.node_count();
        report.edge_count = graph.edge_count();

        debug!(
            nodes = report.node_count,
            edges = report.edge_count,
            dangling = report.dangling_references.len(),
            "dependency graph built"
        );

        Ok((Graph { graph, node_map }, report))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
