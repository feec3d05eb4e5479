//! Concurrent read-only queries over one shared graph.

use std::thread;

use depstage_core::graph::NodeEntry;
use depstage_core::{Graph, GraphAnalyzer};

fn layered(width: usize, depth: usize) -> Graph {
    let mut entries: Vec<NodeEntry> = Vec::with_capacity(width * depth);
    for layer in 0..depth {
        for slot in 0..width {
            let deps: Vec<String> = if layer == 0 {
                Vec::new()
            } else {
                (0..width)
                    .filter(|s| (s + slot) % 2 == 0)
                    .map(|s| format!("l{}-{s}", layer - 1))
                    .collect()
            };
            entries.push(NodeEntry::new(format!("l{layer}-{slot}"), deps));
        }
    }
    Graph::from_entries(entries).expect("build graph")
}

#[test]
fn parallel_readers_agree_with_sequential_results() {
    let graph = layered(8, 12);
    let analyzer = GraphAnalyzer::new(&graph);

    let expected_order = analyzer.topological_order().expect("acyclic");
    let expected_levels = analyzer.compute_levels().expect("acyclic");
    let expected_impact = analyzer.analyze_impact("l0-0").expect("known");

    thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    let local = GraphAnalyzer::new(&graph);
                    (
                        local.topological_order().expect("acyclic"),
                        local.compute_levels().expect("acyclic"),
                        local.analyze_impact("l0-0").expect("known"),
                    )
                })
            })
            .collect();

        for handle in handles {
            let (order, levels, impact) = handle.join().expect("reader thread panicked");
            assert_eq!(order, expected_order);
            assert_eq!(levels, expected_levels);
            assert_eq!(impact, expected_impact);
        }
    });

    assert_eq!(expected_levels.max_level(), Some(11));
}

#[test]
fn graph_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Graph>();
    assert_send_sync::<GraphAnalyzer<'static>>();
}
