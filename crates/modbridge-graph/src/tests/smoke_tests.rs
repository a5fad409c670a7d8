//! Smoke tests for modbridge-graph.
//!
//! Fast, deterministic checks of the graph invariants. The randomised versions
//! live in property_tests.rs (requires the proptest feature).

use indexmap::IndexMap;

use crate::{BundleGraph, ExtractionAnomaly, IdMode, ModuleId, ModuleRecord, dedupe_marker};

fn sample_bundle() -> Vec<ModuleRecord> {
    vec![
        ModuleRecord::new(1u64, "require('a'); require('@registry-client');")
            .dep("a", 2u64)
            .dep("@registry-client", 3u64)
            .entry(),
        ModuleRecord::new(2u64, "require('./impl')").dep("./impl", 4u64),
        ModuleRecord::new(3u64, "module.exports = registry;"),
        ModuleRecord::new(4u64, "module.exports = impl;"),
    ]
}

#[test]
fn test_extraction_is_idempotent() {
    let first = BundleGraph::extract(sample_bundle()).unwrap();
    let records: Vec<_> = first.records().cloned().collect();
    let second = BundleGraph::extract(records).unwrap();

    let first_nodes: Vec<_> = first.nodes().cloned().collect();
    let second_nodes: Vec<_> = second.nodes().cloned().collect();
    assert_eq!(first_nodes, second_nodes);
}

#[test]
fn test_known_as_collects_every_specifier() {
    let graph = BundleGraph::extract(vec![
        ModuleRecord::new(1u64, "")
            .dep("./util", 3u64)
            .dep("b", 2u64)
            .entry(),
        ModuleRecord::new(2u64, "").dep("../util", 3u64),
        ModuleRecord::new(3u64, ""),
    ])
    .unwrap();

    let node = graph.node(&ModuleId::Index(3)).unwrap();
    assert_eq!(
        node.known_as.iter().collect::<Vec<_>>(),
        vec!["./util", "../util"]
    );
    assert_eq!(
        graph.dependants(&ModuleId::Index(3)),
        vec![ModuleId::Index(1), ModuleId::Index(2)]
    );
}

#[test]
fn test_ambiguous_name_returns_every_match() {
    let graph = BundleGraph::extract(vec![
        ModuleRecord::new(1u64, "").dep("a", 2u64).dep("b", 3u64).entry(),
        ModuleRecord::new(2u64, "").dep("./util", 4u64),
        ModuleRecord::new(3u64, "").dep("./util", 5u64),
        ModuleRecord::new(4u64, ""),
        ModuleRecord::new(5u64, ""),
    ])
    .unwrap();

    let ids: Vec<_> = graph
        .nodes_known_as("./util")
        .into_iter()
        .map(|node| node.id.clone())
        .collect();
    assert_eq!(ids, vec![ModuleId::Index(4), ModuleId::Index(5)]);
    assert!(graph.nodes_known_as("missing").is_empty());
}

#[test]
fn test_duplicate_ids_are_rejected() {
    let result = BundleGraph::extract(vec![
        ModuleRecord::new(1u64, "").entry(),
        ModuleRecord::new(1u64, ""),
    ]);
    assert!(matches!(result, Err(crate::Error::DuplicateModuleId(ModuleId::Index(1)))));
}

#[test]
fn test_unreferenced_and_multiple_entries_are_reported() {
    let graph = BundleGraph::extract(vec![
        ModuleRecord::new(1u64, "").entry(),
        ModuleRecord::new(2u64, "").entry(),
        ModuleRecord::new(3u64, ""),
    ])
    .unwrap();

    assert_eq!(
        graph.anomalies(),
        &[
            ExtractionAnomaly::MultipleEntries {
                ids: vec![ModuleId::Index(1), ModuleId::Index(2)],
            },
            ExtractionAnomaly::UnreferencedRecord { id: ModuleId::Index(3) },
        ]
    );
    assert!(graph.is_entry(&ModuleId::Index(2)));
}

#[test]
fn test_stub_like_rewrite_prunes_former_dependencies() {
    let mut graph = BundleGraph::extract(sample_bundle()).unwrap();

    let pruned = graph
        .rewrite_module(
            &ModuleId::Index(2),
            "module.exports = require(\"@registry-client\").require(\"ns:a\");".to_string(),
            IndexMap::from([("@registry-client".to_string(), ModuleId::Index(3))]),
        )
        .unwrap();

    assert_eq!(pruned, vec![ModuleId::Index(4)]);
    assert_eq!(graph.len(), 3);
    assert_eq!(
        graph.dependants(&ModuleId::Index(3)),
        vec![ModuleId::Index(1), ModuleId::Index(2)]
    );
    assert!(graph.nodes_known_as("./impl").is_empty());
    assert!(graph.check_consistency().is_clean());
}

#[test]
fn test_cascade_stops_at_shared_modules() {
    // 1 -> 2 -> 4, 1 -> 3 -> 4: dropping 2 keeps 4 alive through 3.
    let mut graph = BundleGraph::extract(vec![
        ModuleRecord::new(1u64, "").dep("b", 2u64).dep("c", 3u64).entry(),
        ModuleRecord::new(2u64, "").dep("d", 4u64),
        ModuleRecord::new(3u64, "").dep("d", 4u64),
        ModuleRecord::new(4u64, ""),
    ])
    .unwrap();

    let pruned = graph
        .rewrite_module(
            &ModuleId::Index(1),
            String::new(),
            IndexMap::from([("c".to_string(), ModuleId::Index(3))]),
        )
        .unwrap();

    assert_eq!(pruned, vec![ModuleId::Index(2)]);
    assert_eq!(graph.dependants(&ModuleId::Index(4)), vec![ModuleId::Index(3)]);
}

#[test]
fn test_deep_chain_does_not_overflow() {
    let depth = 20_000u64;
    let mut records = Vec::new();
    for id in 1..depth {
        let mut record = ModuleRecord::new(id, "").dep(format!("m{}", id + 1), id + 1);
        if id == 1 {
            record = record.entry();
        }
        records.push(record);
    }
    records.push(ModuleRecord::new(depth, ""));
    let mut graph = BundleGraph::extract(records).unwrap();

    let pruned = graph
        .rewrite_module(&ModuleId::Index(1), String::new(), IndexMap::new())
        .unwrap();
    assert_eq!(pruned.len() as u64, depth - 1);
    assert_eq!(graph.len(), 1);
}

#[test]
fn test_dedupe_target_is_pinned_while_forwarder_lives() {
    let mut graph = BundleGraph::extract(vec![
        ModuleRecord::new(1u64, "")
            .dep("./x", 2u64)
            .dep("./y", 3u64)
            .entry(),
        ModuleRecord::new(2u64, dedupe_marker(&ModuleId::Index(4))),
        ModuleRecord::new(3u64, "").dep("./shared", 4u64),
        ModuleRecord::new(4u64, "module.exports = shared;"),
    ])
    .unwrap();

    // Dropping the only ordinary dependant of 4 keeps it: 2 still forwards to it.
    let pruned = graph
        .rewrite_module(
            &ModuleId::Index(1),
            String::new(),
            IndexMap::from([("./x".to_string(), ModuleId::Index(2))]),
        )
        .unwrap();
    assert_eq!(pruned, vec![ModuleId::Index(3)]);
    assert!(graph.record(&ModuleId::Index(4)).is_some());
    assert!(graph.is_pinned(&ModuleId::Index(4)));

    // Once the forwarder goes, so does the target.
    let pruned = graph
        .rewrite_module(&ModuleId::Index(1), String::new(), IndexMap::new())
        .unwrap();
    assert_eq!(pruned, vec![ModuleId::Index(2), ModuleId::Index(4)]);
}

#[test]
fn test_explicit_dedupe_field_pins_like_a_marker() {
    let mut graph = BundleGraph::extract(vec![
        ModuleRecord::new(1u64, "").dep("./x", 2u64).dep("./y", 3u64).entry(),
        ModuleRecord::new(2u64, "").dedupe_of(3u64),
        ModuleRecord::new(3u64, ""),
    ])
    .unwrap();

    let pruned = graph
        .rewrite_module(
            &ModuleId::Index(1),
            String::new(),
            IndexMap::from([("./x".to_string(), ModuleId::Index(2))]),
        )
        .unwrap();
    assert!(pruned.is_empty());
    assert!(graph.is_pinned(&ModuleId::Index(3)));
}

#[test]
fn test_renumbering_keeps_graph_consistent() {
    let mut graph = BundleGraph::extract(vec![
        ModuleRecord::new("/w/src/main.js", "")
            .dep("./a", "/w/src/a.js")
            .dep("./b", "/w/src/b.js")
            .entry(),
        ModuleRecord::new("/w/src/a.js", dedupe_marker(&ModuleId::path("/w/src/b.js"))),
        ModuleRecord::new("/w/src/b.js", ""),
    ])
    .unwrap();

    let mapping = graph.apply_id_mode(&IdMode::Renumber).unwrap();
    assert_eq!(mapping.len(), 3);
    assert!(graph.check_consistency().is_clean());

    let mut ids: Vec<_> = graph.records().map(|record| record.id.clone()).collect();
    ids.sort();
    assert_eq!(ids, vec![ModuleId::Index(1), ModuleId::Index(2), ModuleId::Index(3)]);
    assert!(graph.records().all(|record| !record.source.contains("/w/")));
}
