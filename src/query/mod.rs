//! Traversal engine over a `ConceptGraph`.
//!
//! Every algorithm is available as a free function (`dfs`, `bfs`,
//! `bfs_layers`, `dfs_sample`, `shortest_path_bfs`) and as a query struct
//! implementing `Query`. Neighbor iteration always follows adjacency insertion
//! order, so results are deterministic. Traversals never mutate the graph.
//!
//! A start node that is not in the graph is an error (`GraphError::UnknownNode`).
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::errors::GraphError;
use crate::graph::{ConceptGraph, Edge};

pub mod format;

/// Query trait implemented by all query types.
///
/// Given an immutable reference to a `ConceptGraph`, returns a result of type `R`.
pub trait Query<R> {
    fn run(&self, graph: &ConceptGraph) -> R;
}

/// Node visitation order plus the edges actually traversed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Traversal {
    pub nodes: Vec<Arc<str>>,
    pub edges: Vec<Edge>,
}

impl Traversal {
    /// Render as a left-to-right arrow chain (empty string for an empty traversal).
    #[must_use]
    pub fn chain(&self) -> String {
        match self.nodes.first() {
            Some(start) => format::format_chain(start, &self.edges),
            None => String::new(),
        }
    }
}

/// One node discovered by `bfs_layers`. The root has no parent and no predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerEntry {
    pub parent: Option<Arc<str>>,
    pub predicate: Option<Arc<str>>,
    pub node: Arc<str>,
    pub is_reverse: bool,
}

/// Nodes grouped by hop distance, plus the flat list of edges used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Layers {
    pub layers: BTreeMap<usize, Vec<LayerEntry>>,
    pub edges: Vec<Edge>,
}

impl Layers {
    /// Number of distinct nodes across all layers.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }
}

fn start_node(graph: &ConceptGraph, start: &str) -> Result<Arc<str>, GraphError> {
    graph.node(start).cloned().ok_or_else(|| GraphError::UnknownNode(start.to_string()))
}

/// Full depth-first search from `start` (pre-order).
///
/// Uses an explicit stack of `(node, next neighbor index)` frames, which
/// yields the same order as the recursive formulation.
///
/// # Errors
/// Returns `GraphError::UnknownNode` if `start` is not in the graph.
pub fn dfs(graph: &ConceptGraph, start: &str) -> Result<Traversal, GraphError> {
    let root = start_node(graph, start)?;
    let mut visited: HashSet<Arc<str>> = HashSet::from([root.clone()]);
    let mut out = Traversal { nodes: vec![root.clone()], edges: Vec::new() };
    let mut stack: Vec<(Arc<str>, usize)> = vec![(root, 0)];

    while let Some((u, cursor)) = stack.last_mut() {
        let adj = graph.neighbors(u);
        let Some(n) = adj.get(*cursor) else {
            stack.pop();
            continue;
        };
        *cursor += 1;
        if visited.insert(n.node.clone()) {
            out.edges.push(Edge::from_neighbor(u, n));
            out.nodes.push(n.node.clone());
            stack.push((n.node.clone(), 0));
        }
    }
    Ok(out)
}

/// Full breadth-first search from `start`.
///
/// # Errors
/// Returns `GraphError::UnknownNode` if `start` is not in the graph.
pub fn bfs(graph: &ConceptGraph, start: &str) -> Result<Traversal, GraphError> {
    let root = start_node(graph, start)?;
    let mut visited: HashSet<Arc<str>> = HashSet::from([root.clone()]);
    let mut q: VecDeque<Arc<str>> = VecDeque::from([root]);
    let mut out = Traversal::default();

    while let Some(u) = q.pop_front() {
        for n in graph.neighbors(&u) {
            if visited.insert(n.node.clone()) {
                out.edges.push(Edge::from_neighbor(&u, n));
                q.push_back(n.node.clone());
            }
        }
        out.nodes.push(u);
    }
    Ok(out)
}

/// Breadth-first neighborhood of `start`, grouped by hop distance up to `max_hops`.
///
/// Layer 0 holds the root alone. A node is listed once, at the distance where
/// it was first discovered. Nodes at exactly `max_hops` are listed but not
/// expanded.
///
/// # Errors
/// Returns `GraphError::UnknownNode` if `start` is not in the graph.
pub fn bfs_layers(graph: &ConceptGraph, start: &str, max_hops: usize) -> Result<Layers, GraphError> {
    let root = start_node(graph, start)?;
    let mut out = Layers::default();
    out.layers.insert(
        0,
        vec![LayerEntry { parent: None, predicate: None, node: root.clone(), is_reverse: false }],
    );
    let mut visited: HashSet<Arc<str>> = HashSet::from([root.clone()]);
    let mut q: VecDeque<(Arc<str>, usize)> = VecDeque::from([(root, 0)]);

    while let Some((u, depth)) = q.pop_front() {
        if depth >= max_hops {
            continue;
        }
        for n in graph.neighbors(&u) {
            if !visited.insert(n.node.clone()) {
                continue;
            }
            out.edges.push(Edge::from_neighbor(&u, n));
            out.layers.entry(depth + 1).or_default().push(LayerEntry {
                parent: Some(u.clone()),
                predicate: Some(n.predicate.clone()),
                node: n.node.clone(),
                is_reverse: n.is_reverse,
            });
            q.push_back((n.node.clone(), depth + 1));
        }
    }
    Ok(out)
}

/// Depth-limited DFS producing one deterministic chain sample.
///
/// Never steps more than `max_depth` edges away from `start`, and stops as
/// soon as `limit_nodes` nodes have been visited. `Some(0)` yields an empty
/// traversal.
///
/// # Errors
/// Returns `GraphError::UnknownNode` if `start` is not in the graph.
pub fn dfs_sample(
    graph: &ConceptGraph,
    start: &str,
    max_depth: usize,
    limit_nodes: Option<usize>,
) -> Result<Traversal, GraphError> {
    let root = start_node(graph, start)?;
    if limit_nodes == Some(0) {
        return Ok(Traversal::default());
    }
    let mut visited: HashSet<Arc<str>> = HashSet::from([root.clone()]);
    let mut out = Traversal { nodes: vec![root.clone()], edges: Vec::new() };
    // Frames: (node, depth, next neighbor index)
    let mut stack: Vec<(Arc<str>, usize, usize)> = vec![(root, 0, 0)];

    while limit_nodes.map_or(true, |limit| out.nodes.len() < limit) {
        let Some((u, depth, cursor)) = stack.last_mut() else { break };
        let Some(n) = graph.neighbors(u).get(*cursor) else {
            stack.pop();
            continue;
        };
        *cursor += 1;
        if *depth < max_depth && visited.insert(n.node.clone()) {
            let next_depth = *depth + 1;
            out.edges.push(Edge::from_neighbor(u, n));
            out.nodes.push(n.node.clone());
            stack.push((n.node.clone(), next_depth, 0));
        }
    }
    Ok(out)
}

/// Shortest (fewest hops) path from `start` to `goal`.
///
/// Ties are broken by adjacency insertion order: the first shortest path found
/// wins. Returns `Ok(None)` when `goal` is unreachable.
///
/// # Errors
/// Returns `GraphError::UnknownNode` if either endpoint is not in the graph.
pub fn shortest_path_bfs(
    graph: &ConceptGraph,
    start: &str,
    goal: &str,
) -> Result<Option<Traversal>, GraphError> {
    let src = start_node(graph, start)?;
    let dst = start_node(graph, goal)?;

    // Parent pointers: node -> edge that first discovered it
    let mut prev: HashMap<Arc<str>, Edge> = HashMap::new();
    let mut visited: HashSet<Arc<str>> = HashSet::from([src.clone()]);
    let mut q: VecDeque<Arc<str>> = VecDeque::from([src.clone()]);
    let mut found = src == dst;
    'search: while let Some(u) = q.pop_front() {
        if found {
            break;
        }
        for n in graph.neighbors(&u) {
            if visited.insert(n.node.clone()) {
                prev.insert(n.node.clone(), Edge::from_neighbor(&u, n));
                if n.node == dst {
                    found = true;
                    break 'search;
                }
                q.push_back(n.node.clone());
            }
        }
    }
    if !found {
        return Ok(None);
    }

    // Reconstruct path
    let mut edges: Vec<Edge> = Vec::new();
    let mut cur = dst;
    while let Some(e) = prev.get(&cur) {
        cur = e.source.clone();
        edges.push(e.clone());
    }
    edges.reverse();
    let mut nodes = Vec::with_capacity(edges.len() + 1);
    nodes.push(src);
    nodes.extend(edges.iter().map(|e| e.target.clone()));
    Ok(Some(Traversal { nodes, edges }))
}

/// Traversal order for `TraverseQuery`-style callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOrder {
    DepthFirst,
    BreadthFirst,
}

/// Full traversal from a start node in the given order.
pub struct TraverseQuery {
    pub start: String,
    pub order: TraversalOrder,
}

impl TraverseQuery {
    #[must_use]
    pub fn depth_first(start: &str) -> Self {
        Self { start: start.to_string(), order: TraversalOrder::DepthFirst }
    }

    #[must_use]
    pub fn breadth_first(start: &str) -> Self {
        Self { start: start.to_string(), order: TraversalOrder::BreadthFirst }
    }
}

impl Query<Result<Traversal, GraphError>> for TraverseQuery {
    fn run(&self, graph: &ConceptGraph) -> Result<Traversal, GraphError> {
        match self.order {
            TraversalOrder::DepthFirst => dfs(graph, &self.start),
            TraversalOrder::BreadthFirst => bfs(graph, &self.start),
        }
    }
}

/// Neighborhood of a node grouped by hop layer.
pub struct LayeredQuery {
    pub start: String,
    pub max_hops: usize,
}

impl LayeredQuery {
    #[must_use]
    pub fn new(start: &str, max_hops: usize) -> Self {
        Self { start: start.to_string(), max_hops }
    }
}

impl Query<Result<Layers, GraphError>> for LayeredQuery {
    fn run(&self, graph: &ConceptGraph) -> Result<Layers, GraphError> {
        bfs_layers(graph, &self.start, self.max_hops)
    }
}

/// Depth-limited DFS chain sample.
pub struct SampleQuery {
    pub start: String,
    pub max_depth: usize,
    pub limit_nodes: Option<usize>,
}

impl SampleQuery {
    #[must_use]
    pub fn new(start: &str, max_depth: usize, limit_nodes: Option<usize>) -> Self {
        Self { start: start.to_string(), max_depth, limit_nodes }
    }
}

impl Query<Result<Traversal, GraphError>> for SampleQuery {
    fn run(&self, graph: &ConceptGraph) -> Result<Traversal, GraphError> {
        dfs_sample(graph, &self.start, self.max_depth, self.limit_nodes)
    }
}

/// Compute the shortest path between two nodes.
pub struct ShortestPathQuery {
    pub from: String,
    pub to: String,
}

impl ShortestPathQuery {
    /// Create a shortest path query from `from` to `to`.
    #[must_use]
    pub fn new(from: &str, to: &str) -> Self {
        Self { from: from.to_string(), to: to.to_string() }
    }
}

impl Query<Result<Option<Traversal>, GraphError>> for ShortestPathQuery {
    fn run(&self, graph: &ConceptGraph) -> Result<Option<Traversal>, GraphError> {
        shortest_path_bfs(graph, &self.from, &self.to)
    }
}

/// Count predicates over a list of edges, most frequent first.
///
/// Ties keep the order in which predicates first appear.
#[must_use]
pub fn predicate_frequencies(edges: &[Edge]) -> Vec<(Arc<str>, usize)> {
    let mut counts: Vec<(Arc<str>, usize)> = Vec::new();
    let mut slot: HashMap<Arc<str>, usize> = HashMap::new();
    for e in edges {
        match slot.get(&e.predicate) {
            Some(&i) => counts[i].1 += 1,
            None => {
                slot.insert(e.predicate.clone(), counts.len());
                counts.push((e.predicate.clone(), 1));
            }
        }
    }
    // Stable sort keeps first-appearance order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(nodes: &[Arc<str>]) -> Vec<&str> {
        nodes.iter().map(AsRef::as_ref).collect()
    }

    // A -r1-> B, A -r2-> C, B -r3-> D, C -r4-> D, D -r5-> E (all bidirectional)
    fn diamond() -> ConceptGraph {
        let mut g = ConceptGraph::new();
        g.add_relation("A", "r1", "B", true);
        g.add_relation("A", "r2", "C", true);
        g.add_relation("B", "r3", "D", true);
        g.add_relation("C", "r4", "D", true);
        g.add_relation("D", "r5", "E", true);
        g
    }

    #[test]
    fn dfs_is_preorder_in_adjacency_order() {
        let g = diamond();
        let t = dfs(&g, "A").unwrap();
        assert_eq!(names(&t.nodes), vec!["A", "B", "D", "C", "E"]);
        // D reaches C over the reverse companion of C -r4-> D
        assert_eq!(t.edges[2].source.as_ref(), "D");
        assert_eq!(t.edges[2].target.as_ref(), "C");
        assert!(t.edges[2].is_reverse);
        assert_eq!(t.edges.len(), t.nodes.len() - 1);
    }

    #[test]
    fn bfs_visits_by_layer() {
        let g = diamond();
        let t = bfs(&g, "A").unwrap();
        assert_eq!(names(&t.nodes), vec!["A", "B", "C", "D", "E"]);
        assert_eq!(t.edges.len(), 4);
    }

    #[test]
    fn traversals_reject_unknown_start() {
        let g = diamond();
        assert!(matches!(dfs(&g, "Z"), Err(GraphError::UnknownNode(n)) if n == "Z"));
        assert!(matches!(bfs(&g, "Z"), Err(GraphError::UnknownNode(_))));
        assert!(matches!(bfs_layers(&g, "Z", 2), Err(GraphError::UnknownNode(_))));
        assert!(matches!(dfs_sample(&g, "Z", 2, None), Err(GraphError::UnknownNode(_))));
        assert!(matches!(shortest_path_bfs(&g, "A", "Z"), Err(GraphError::UnknownNode(_))));
    }

    #[test]
    fn bfs_layers_first_discovery_wins() {
        let g = diamond();
        let l = bfs_layers(&g, "A", 2).unwrap();
        assert_eq!(l.layers.len(), 3);
        let l1: Vec<&str> = l.layers[&1].iter().map(|e| e.node.as_ref()).collect();
        let l2: Vec<&str> = l.layers[&2].iter().map(|e| e.node.as_ref()).collect();
        assert_eq!(l1, vec!["B", "C"]);
        // D is reached from B first, never listed again from C
        assert_eq!(l2, vec!["D"]);
        assert_eq!(l.layers[&2][0].parent.as_deref(), Some("B"));
        assert_eq!(l.edges.len(), 3);
    }

    #[test]
    fn bfs_layers_does_not_overshoot() {
        let g = diamond();
        let l = bfs_layers(&g, "A", 1).unwrap();
        assert_eq!(l.layers.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
        let l0 = bfs_layers(&g, "A", 0).unwrap();
        assert_eq!(l0.node_count(), 1);
        assert!(l0.edges.is_empty());
    }

    #[test]
    fn dfs_sample_respects_depth() {
        let g = diamond();
        let t = dfs_sample(&g, "A", 1, None).unwrap();
        assert_eq!(names(&t.nodes), vec!["A", "B", "C"]);
        let t2 = dfs_sample(&g, "A", 2, None).unwrap();
        assert_eq!(names(&t2.nodes), vec!["A", "B", "D", "C"]);
    }

    #[test]
    fn dfs_sample_respects_node_limit() {
        let g = diamond();
        let t = dfs_sample(&g, "A", 10, Some(3)).unwrap();
        assert_eq!(names(&t.nodes), vec!["A", "B", "D"]);
        assert_eq!(t.edges.len(), 2);
        let empty = dfs_sample(&g, "A", 10, Some(0)).unwrap();
        assert!(empty.nodes.is_empty());
        assert_eq!(empty.chain(), "");
    }

    #[test]
    fn shortest_path_prefers_direct_edge() {
        let mut g = ConceptGraph::new();
        g.add_relation("A", "rel1", "B", true);
        g.add_relation("B", "rel2", "C", true);
        g.add_relation("A", "rel3", "C", true);
        let p = shortest_path_bfs(&g, "A", "C").unwrap().unwrap();
        assert_eq!(names(&p.nodes), vec!["A", "C"]);
        assert_eq!(p.edges.len(), 1);
        assert_eq!(p.edges[0].predicate.as_ref(), "rel3");
    }

    #[test]
    fn shortest_path_walks_reverse_edges_and_reports_missing() {
        let mut g = ConceptGraph::new();
        g.add_relation("A", "r", "B", true);
        g.add_relation("C", "s", "B", true);
        g.add_relation("X", "t", "Y", true);
        let p = shortest_path_bfs(&g, "A", "C").unwrap().unwrap();
        assert_eq!(names(&p.nodes), vec!["A", "B", "C"]);
        assert!(!p.edges[0].is_reverse);
        assert!(p.edges[1].is_reverse);
        assert_eq!(p.chain(), "A -[r]-> B <-[s]- C");

        assert!(shortest_path_bfs(&g, "A", "X").unwrap().is_none());
        let same = shortest_path_bfs(&g, "A", "A").unwrap().unwrap();
        assert_eq!(names(&same.nodes), vec!["A"]);
        assert!(same.edges.is_empty());
    }

    #[test]
    fn one_way_edges_are_not_walked_backwards() {
        let mut g = ConceptGraph::new();
        g.add_relation("A", "r", "B", false);
        assert!(shortest_path_bfs(&g, "B", "A").unwrap().is_none());
        assert_eq!(bfs(&g, "B").unwrap().nodes.len(), 1);
    }

    #[test]
    fn queries_delegate_to_functions() {
        let g = diamond();
        assert_eq!(TraverseQuery::depth_first("A").run(&g).unwrap(), dfs(&g, "A").unwrap());
        assert_eq!(TraverseQuery::breadth_first("A").run(&g).unwrap(), bfs(&g, "A").unwrap());
        assert_eq!(LayeredQuery::new("A", 2).run(&g).unwrap(), bfs_layers(&g, "A", 2).unwrap());
        assert_eq!(
            SampleQuery::new("A", 2, Some(2)).run(&g).unwrap(),
            dfs_sample(&g, "A", 2, Some(2)).unwrap()
        );
        assert!(ShortestPathQuery::new("A", "E").run(&g).unwrap().is_some());
    }

    #[test]
    fn predicate_frequencies_sorted_by_count_then_first_seen() {
        let mut g = ConceptGraph::new();
        g.add_relation("A", "x", "B", true);
        g.add_relation("A", "y", "C", true);
        g.add_relation("A", "y", "D", true);
        g.add_relation("A", "z", "E", true);
        let l = bfs_layers(&g, "A", 1).unwrap();
        let f = predicate_frequencies(&l.edges);
        let got: Vec<(&str, usize)> = f.iter().map(|(p, c)| (p.as_ref(), *c)).collect();
        assert_eq!(got, vec![("y", 2), ("x", 1), ("z", 1)]);
    }
}
