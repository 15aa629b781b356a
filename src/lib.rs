//! concept-graph: bidirectional knowledge graph store and explorer
//!
//! Store `(subject, predicate, object)` relations, walk them in both
//! directions, and render what you find with each predicate pointing the way
//! it was asserted.
//!
//! # Features
//! - Append-only multi-graph with reverse companion edges (`graph`)
//! - DFS, BFS, hop layers, bounded DFS chains and shortest paths (`query`)
//! - Neighborhood snapshots around a chosen or random focus (`explore`)
//! - Triple ingestion from JSON or TSV, relation merging (`ingest`)
//! - JSON persistence and Graphviz DOT export
//!
//! # Quickstart (Library)
//! ```
//! use concept_graph::graph::{build_graph, Triple};
//! use concept_graph::query::bfs_layers;
//! use concept_graph::query::format::format_layers;
//!
//! let triples = vec![Triple::new("A", "rel", "B")];
//! let graph = build_graph(&triples, true);
//! let layers = bfs_layers(&graph, "A", 1).expect("A is a node");
//! assert_eq!(format_layers(&layers), "Layer 0:\n  A\nLayer 1:\n  A -[rel]-> B");
//! ```
//!
//! # Quickstart (CLI)
//! ```text
//! concept-graph build --triples relations.json --graph graph.json
//! concept-graph explore --graph graph.json --focus M_deltoideus --hops 2
//! concept-graph path --graph graph.json --from A --to C
//! ```
pub mod app;
pub mod cli;
pub mod errors;
pub mod explore;
pub mod graph;
pub mod ingest;
pub mod query;
pub mod utils;
pub mod visualization;
