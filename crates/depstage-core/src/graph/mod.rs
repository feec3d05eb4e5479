//! Dependency graph construction and analysis.
//!
//! # Overview
//!
//! A caller hands an ordered list of named entries to [`GraphBuilder`],
//! receives an immutable [`Graph`], and runs pure queries over it. Every
//! query is a free function taking `&Graph<M>`; none mutates or caches.
//!
//! ## Pipeline
//!
//! ```text
//! Vec<NodeEntry<M>>
//!        ↓  build::GraphBuilder::build()
//! (Graph<M>, BuildReport)
//!        ├─ cycles::detect_cycles()          → Vec<Cycle>
//!        ├─ topo::topological_order()        → Vec<String>
//!        ├─ levels::compute_levels()         → LevelMap
//!        │      ├─ critical_path_from_levels → Vec<String>
//!        │      └─ Diagnostics::from_levels  → Diagnostics
//!        ├─ impact::analyze_impact()         → ImpactRecord
//!        ├─ impact::impact_ranking()         → Vec<ImpactSummary>
//!        └─ stats::GraphStats::from_graph()  → GraphStats
//! ```
//!
//! ## Typical Usage
//!
//! ```rust
//! use depstage_core::graph::{Graph, NodeEntry, compute_levels};
//!
//! let graph: Graph = Graph::from_entries([
//!     NodeEntry::new("build", Vec::<String>::new()),
//!     NodeEntry::new("test", ["build"]),
//! ])?;
//! let levels = compute_levels(&graph)?;
//! assert_eq!(levels.get("test"), Some(1));
//! # Ok::<(), depstage_core::GraphError>(())
//! ```

pub mod build;
pub mod critical_path;
pub mod cycles;
pub mod diagnostics;
pub mod impact;
pub mod levels;
pub mod stats;
pub mod topo;

// Re-export primary types at module level for convenience.
pub use build::{
    BuildOptions, BuildReport, DanglingPolicy, DanglingReference, Graph, GraphBuilder, Metadata,
    Node, NodeEntry,
};
pub use critical_path::{critical_path, critical_path_from_levels};
pub use cycles::{Cycle, detect_cycles, is_cyclic};
pub use diagnostics::{Diagnostics, FAN_IN_THRESHOLD, FanIn, SingleDependency};
pub use impact::{
    ImpactRecord, ImpactSummary, analyze_impact, impact_ranking, transitive_dependencies,
    transitive_dependents,
};
pub use levels::{LevelMap, Stage, compute_levels};
pub use stats::GraphStats;
pub use topo::{topological_indices, topological_order};
