//! Property-based tests for modbridge-graph using proptest.
//!
//! Run with: cargo test --features proptest --package modbridge-graph property_tests

#![cfg(feature = "proptest")]

use indexmap::IndexMap;
use proptest::prelude::*;

use crate::{BundleGraph, IdMode, ModuleId, ModuleRecord};

/// Random DAG over ids `1..=n`: edges only point at higher ids, record 1 is
/// the entry.
fn dag_strategy() -> impl Strategy<Value = Vec<ModuleRecord>> {
    (2u64..=24).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(any::<prop::sample::Index>(), 0..4), n as usize)
            .prop_map(move |edges| {
                edges
                    .into_iter()
                    .enumerate()
                    .map(|(index, targets)| {
                        let id = index as u64 + 1;
                        let mut record = ModuleRecord::new(id, format!("// module {id}"));
                        if id == 1 {
                            record = record.entry();
                        }
                        if id < n {
                            let span = (n - id) as usize;
                            for target in targets {
                                let to = id + 1 + target.index(span) as u64;
                                record = record.dep(format!("m{to}"), to);
                            }
                        }
                        record
                    })
                    .collect()
            })
    })
}

/// Records nothing depends on at extraction time: the entry plus any
/// unreferenced records.
fn roots(graph: &BundleGraph) -> Vec<ModuleId> {
    graph
        .records()
        .filter(|record| record.entry || graph.dependants(&record.id).is_empty())
        .map(|record| record.id.clone())
        .collect()
}

fn reachable_from(graph: &BundleGraph, roots: &[ModuleId]) -> Vec<ModuleId> {
    let mut seen = indexmap::IndexSet::new();
    let mut stack: Vec<ModuleId> = roots.to_vec();
    while let Some(id) = stack.pop() {
        if !seen.insert(id.clone()) {
            continue;
        }
        if let Some(record) = graph.record(&id) {
            stack.extend(record.deps.values().cloned());
        }
    }
    let mut ids: Vec<_> = seen.into_iter().collect();
    ids.sort();
    ids
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: dependants and dependencies mirror each other.
    #[test]
    fn prop_adjacency_is_symmetric(records in dag_strategy()) {
        let graph = BundleGraph::extract(records).unwrap();
        for node in graph.nodes() {
            for dep in &node.dependencies {
                prop_assert!(graph.dependants(dep).contains(&node.id));
            }
        }
        prop_assert!(graph.check_consistency().asymmetric.is_empty());
    }

    /// Property: extracting the records of a graph yields the same graph.
    #[test]
    fn prop_extraction_is_idempotent(records in dag_strategy()) {
        let first = BundleGraph::extract(records).unwrap();
        let second = BundleGraph::extract(first.records().cloned().collect()).unwrap();
        prop_assert_eq!(
            first.nodes().cloned().collect::<Vec<_>>(),
            second.nodes().cloned().collect::<Vec<_>>()
        );
    }

    /// Property: after rewriting one record to depend on nothing, exactly the
    /// records still reachable from the original roots survive and no edge
    /// dangles.
    #[test]
    fn prop_pruning_keeps_exactly_the_reachable_set(
        records in dag_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut graph = BundleGraph::extract(records).unwrap();
        let roots = roots(&graph);
        let before: Vec<ModuleId> = graph.records().map(|record| record.id.clone()).collect();
        let victim = before[pick.index(before.len())].clone();

        graph.rewrite_module(&victim, String::new(), IndexMap::new()).unwrap();

        let reachable = reachable_from(&graph, &roots);
        for id in &before {
            prop_assert_eq!(graph.record(id).is_some(), reachable.contains(id));
        }
        prop_assert!(graph.check_consistency().is_clean());
    }

    /// Property: renumbering yields `1..=n` and preserves edge structure.
    #[test]
    fn prop_renumbering_is_consistent(records in dag_strategy()) {
        let mut graph = BundleGraph::extract(records).unwrap();
        let edges_before: usize = graph.records().map(|record| record.deps.len()).sum();

        graph.apply_id_mode(&IdMode::Renumber).unwrap();

        let ids: Vec<_> = graph.records().map(|record| record.id.clone()).collect();
        let expected: Vec<_> = (1..=ids.len() as u64).map(ModuleId::Index).collect();
        prop_assert_eq!(ids, expected);
        let edges_after: usize = graph.records().map(|record| record.deps.len()).sum();
        prop_assert_eq!(edges_before, edges_after);
        prop_assert!(graph.check_consistency().is_clean());
    }
}
