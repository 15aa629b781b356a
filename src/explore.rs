//! Neighborhood snapshot: the single aggregate read a presentation layer needs.
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;

use crate::errors::GraphError;
use crate::graph::ConceptGraph;
use crate::query::format::format_layers;
use crate::query::{bfs_layers, dfs_sample, predicate_frequencies, Layers, Traversal};

/// Default neighborhood radius.
pub const DEFAULT_HOPS: usize = 2;
/// Default depth limit for the DFS chain sample.
pub const DEFAULT_DEPTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploreOptions {
    /// Node to center on; `None` picks one at random.
    pub focus: Option<String>,
    pub max_hops: usize,
    pub dfs_depth: usize,
    pub limit_nodes: Option<usize>,
}

impl Default for ExploreOptions {
    fn default() -> Self {
        Self { focus: None, max_hops: DEFAULT_HOPS, dfs_depth: DEFAULT_DEPTH, limit_nodes: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationFrequency {
    pub predicate: Arc<str>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub focus: Arc<str>,
    pub layers: Layers,
    pub layers_text: String,
    /// Predicate counts over the neighborhood edges, most frequent first.
    pub relation_freqs: Vec<RelationFrequency>,
    pub chain: Traversal,
    pub chain_text: String,
}

/// Build a neighborhood snapshot around a focus node.
///
/// # Errors
/// Returns `GraphError::EmptyGraph` if the graph has no nodes, and
/// `GraphError::UnknownConcept` if `opts.focus` names a node that is not in
/// the graph (no random substitute is picked in that case).
pub fn explore<R: Rng>(
    graph: &ConceptGraph,
    opts: &ExploreOptions,
    rng: &mut R,
) -> Result<Snapshot, GraphError> {
    if graph.is_empty() {
        return Err(GraphError::EmptyGraph);
    }
    let focus: Arc<str> = match opts.focus.as_deref() {
        Some(name) => {
            graph.node(name).cloned().ok_or_else(|| GraphError::UnknownConcept(name.to_string()))?
        }
        None => {
            let i = rng.random_range(0..graph.len());
            let name = graph.nodes().nth(i).ok_or(GraphError::EmptyGraph)?;
            graph.node(name).cloned().ok_or(GraphError::EmptyGraph)?
        }
    };
    tracing::debug!(focus = %focus, hops = opts.max_hops, depth = opts.dfs_depth, "exploring");

    let layers = bfs_layers(graph, &focus, opts.max_hops)?;
    let layers_text = format_layers(&layers);
    let relation_freqs = predicate_frequencies(&layers.edges)
        .into_iter()
        .map(|(predicate, count)| RelationFrequency { predicate, count })
        .collect();

    let chain = dfs_sample(graph, &focus, opts.dfs_depth, opts.limit_nodes)?;
    let chain_text = chain.chain();

    Ok(Snapshot { focus, layers, layers_text, relation_freqs, chain, chain_text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_graph() -> ConceptGraph {
        let mut g = ConceptGraph::new();
        g.add_relation("Atherosclerosis", "leads_to", "Coronary_Artery_Disease", true);
        g.add_relation("Atherosclerosis", "predisposes_to", "Stroke", true);
        g.add_relation("Coronary_Artery_Disease", "managed_by", "Statin_Therapy", true);
        g.add_relation("Endothelial_Function", "protects_against", "Atherosclerosis", true);
        g
    }

    #[test]
    fn empty_graph_is_an_error() {
        let g = ConceptGraph::new();
        let mut rng = StdRng::seed_from_u64(7);
        let err = explore(&g, &ExploreOptions::default(), &mut rng).unwrap_err();
        assert!(matches!(err, GraphError::EmptyGraph));
    }

    #[test]
    fn unknown_focus_is_an_error() {
        let g = sample_graph();
        let mut rng = StdRng::seed_from_u64(7);
        let opts = ExploreOptions { focus: Some("Liver".into()), ..Default::default() };
        let err = explore(&g, &opts, &mut rng).unwrap_err();
        assert!(matches!(err, GraphError::UnknownConcept(ref n) if n == "Liver"));
    }

    #[test]
    fn snapshot_around_focus() {
        let g = sample_graph();
        let mut rng = StdRng::seed_from_u64(7);
        let opts = ExploreOptions { focus: Some("Atherosclerosis".into()), ..Default::default() };
        let snap = explore(&g, &opts, &mut rng).unwrap();
        assert_eq!(snap.focus.as_ref(), "Atherosclerosis");
        assert!(snap.layers_text.starts_with("Layer 0:\n  Atherosclerosis\nLayer 1:"));
        assert!(snap.layers_text.contains("Atherosclerosis <-[protects_against]- Endothelial_Function"));
        let total: usize = snap.relation_freqs.iter().map(|f| f.count).sum();
        assert_eq!(total, snap.layers.edges.len());
        assert_eq!(snap.layers.node_count(), 5);
        assert!(snap.chain_text.starts_with("Atherosclerosis -[leads_to]-> Coronary_Artery_Disease"));
    }

    #[test]
    fn random_focus_is_a_graph_node_and_seed_is_reproducible() {
        let g = sample_graph();
        let a = explore(&g, &ExploreOptions::default(), &mut StdRng::seed_from_u64(42)).unwrap();
        let b = explore(&g, &ExploreOptions::default(), &mut StdRng::seed_from_u64(42)).unwrap();
        assert!(g.contains(&a.focus));
        assert_eq!(a, b);
    }
}
