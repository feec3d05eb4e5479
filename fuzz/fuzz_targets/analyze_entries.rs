#![no_main]

use depstage_core::{BuildOptions, GraphAnalyzer, GraphBuilder, NodeEntry};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(entries) = serde_json::from_slice::<Vec<NodeEntry>>(data) else {
        return;
    };
    let Ok((graph, _report)) = GraphBuilder::new(BuildOptions::default()).build(entries) else {
        return;
    };

    let analyzer = GraphAnalyzer::new(&graph);
    let cycles = analyzer.detect_cycles();
    for cycle in &cycles {
        assert_eq!(cycle.path().first(), cycle.path().last());
    }

    match analyzer.topological_order() {
        Ok(order) => {
            assert!(cycles.is_empty());
            assert_eq!(order.len(), graph.len());
            let levels = analyzer.compute_levels().expect("acyclic graph has levels");
            assert_eq!(levels.len(), graph.len());
        }
        Err(_) => assert!(!cycles.is_empty()),
    }

    for node in graph.nodes() {
        let record = analyzer
            .analyze_impact(node.name())
            .expect("every node can be analyzed");
        assert_eq!(
            record.impact_score,
            record.direct_dependents.len() + record.transitive_dependents.len() + 1
        );
    }
});
