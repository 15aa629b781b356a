//! Graph store for the concept graph.
//!
//! This module defines the core data structures (`ConceptGraph`, `Neighbor`,
//! `Edge`, `Triple`) and the single write path, `ConceptGraph::add_relation`.
//!
//! The store is an append-only ordered multi-map from node to adjacency. A
//! relation asserted with `bidirectional = true` also stores a companion entry
//! on the object flagged `is_reverse`, so traversals can walk both ways while
//! the formatters in `crate::query::format` still print every predicate in the
//! direction it was asserted.
//!
//! You typically construct a graph via `build_graph` or
//! `crate::ingest::ingest_texts` and then pass it to queries in `crate::query`.
use crate::errors::GraphError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Version tag written into persisted graph documents.
pub const FORMAT_VERSION: u32 = 1;

/// A `(subject, predicate, object)` relation as produced by an extractor.
///
/// Deserializes from either an object with the three named fields or a
/// three-element array `["subject", "predicate", "object"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "TripleRepr")]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TripleRepr {
    Fields { subject: String, predicate: String, object: String },
    Array(String, String, String),
}

impl From<TripleRepr> for Triple {
    fn from(repr: TripleRepr) -> Self {
        match repr {
            TripleRepr::Fields { subject, predicate, object }
            | TripleRepr::Array(subject, predicate, object) => {
                Self { subject, predicate, object }
            }
        }
    }
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self { subject: subject.into(), predicate: predicate.into(), object: object.into() }
    }

    /// Copy of this triple with subject and object passed through `normalize_entity`.
    /// The predicate is kept verbatim.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            subject: normalize_entity(&self.subject),
            predicate: self.predicate.clone(),
            object: normalize_entity(&self.object),
        }
    }
}

/// One adjacency entry: the node on the other end, the relation label and
/// whether this entry is the auto-generated mirror of an asserted relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Neighbor {
    pub node: Arc<str>,
    pub predicate: Arc<str>,
    pub is_reverse: bool,
}

/// A traversed edge `source -> target`, carrying the flag of the adjacency
/// entry it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: Arc<str>,
    pub predicate: Arc<str>,
    pub target: Arc<str>,
    pub is_reverse: bool,
}

impl Edge {
    #[must_use]
    pub fn from_neighbor(source: &Arc<str>, n: &Neighbor) -> Self {
        Self {
            source: source.clone(),
            predicate: n.predicate.clone(),
            target: n.node.clone(),
            is_reverse: n.is_reverse,
        }
    }
}

/// Bidirectional multi-graph preserving a flag for reversed edges.
///
/// Nodes keep first-insertion order; adjacency lists keep insertion order and
/// are never deduplicated, so repeated relations stay countable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "StoredGraph", try_from = "StoredGraph")]
pub struct ConceptGraph {
    names: Vec<Arc<str>>,
    adjacency: Vec<Vec<Neighbor>>,
    index: HashMap<Arc<str>, usize>,
    // Interned predicate labels shared by forward and reverse entries
    predicates: HashSet<Arc<str>>,
}

impl ConceptGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure(&mut self, name: &str) -> usize {
        if let Some(&i) = self.index.get(name) {
            return i;
        }
        let arc: Arc<str> = Arc::from(name);
        let i = self.names.len();
        self.names.push(arc.clone());
        self.adjacency.push(Vec::new());
        self.index.insert(arc, i);
        i
    }

    fn intern_predicate(&mut self, predicate: &str) -> Arc<str> {
        if let Some(p) = self.predicates.get(predicate) {
            return p.clone();
        }
        let p: Arc<str> = Arc::from(predicate);
        self.predicates.insert(p.clone());
        p
    }

    /// Store `subject -[predicate]-> object` and, if `bidirectional`, the
    /// companion `object <-[predicate]- subject` flagged as reverse.
    ///
    /// Both nodes are created when absent. No uniqueness check is made:
    /// inserting the same relation twice yields parallel edges.
    pub fn add_relation(&mut self, subject: &str, predicate: &str, object: &str, bidirectional: bool) {
        let s = self.ensure(subject);
        let o = self.ensure(object);
        let p = self.intern_predicate(predicate);
        let object_name = self.names[o].clone();
        let subject_name = self.names[s].clone();
        self.adjacency[s].push(Neighbor { node: object_name, predicate: p.clone(), is_reverse: false });
        if bidirectional {
            self.adjacency[o].push(Neighbor { node: subject_name, predicate: p, is_reverse: true });
        }
    }

    /// Insert a triple verbatim (no normalization).
    pub fn add_triple(&mut self, triple: &Triple, bidirectional: bool) {
        self.add_relation(&triple.subject, &triple.predicate, &triple.object, bidirectional);
    }

    /// Adjacency of `node` in insertion order; empty for unknown nodes.
    #[must_use]
    pub fn neighbors(&self, node: &str) -> &[Neighbor] {
        match self.index.get(node) {
            Some(&i) => &self.adjacency[i],
            None => &[],
        }
    }

    /// All nodes in first-insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(AsRef::as_ref)
    }

    /// Shared handle for a stored node name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&Arc<str>> {
        self.index.get(name).map(|&i| &self.names[i])
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of adjacency entries, reverse companions included.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Number of asserted relations (entries with `is_reverse == false`).
    #[must_use]
    pub fn relation_count(&self) -> usize {
        self.adjacency.iter().flatten().filter(|n| !n.is_reverse).count()
    }

    /// Asserted relations in node order, then adjacency order.
    pub fn relations(&self) -> impl Iterator<Item = Edge> + '_ {
        self.names.iter().zip(&self.adjacency).flat_map(|(name, adj)| {
            adj.iter().filter(|n| !n.is_reverse).map(move |n| Edge::from_neighbor(name, n))
        })
    }

    /// Save the graph as pretty-printed JSON.
    ///
    /// The document is written to `<path>.tmp` and renamed over `path`, so an
    /// existing file is either fully replaced or left as it was.
    ///
    /// # Errors
    /// Returns `GraphError::Serialization` if encoding fails or `GraphError::Io`
    /// if writing or renaming the file fails.
    pub fn save_json(&self, path: &Path) -> Result<(), GraphError> {
        let data = serde_json::to_string_pretty(self)?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        if let Err(e) = std::fs::write(&tmp, data).and_then(|()| std::fs::rename(&tmp, path)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        tracing::debug!(path = %path.display(), nodes = self.len(), edges = self.edge_count(), "saved graph");
        Ok(())
    }

    /// Load a graph from a JSON file written by `save_json`.
    ///
    /// # Errors
    /// Returns `GraphError::Io` if reading fails, `GraphError::Serialization`
    /// if the JSON is malformed or references undeclared nodes.
    pub fn load_json(path: &Path) -> Result<Self, GraphError> {
        let data = std::fs::read_to_string(path)?;
        let graph: ConceptGraph = serde_json::from_str(&data)?;
        tracing::debug!(path = %path.display(), nodes = graph.len(), edges = graph.edge_count(), "loaded graph");
        Ok(graph)
    }

    /// Like `load_json`, but a missing file yields an empty graph.
    ///
    /// # Errors
    /// See `load_json`.
    pub fn load_or_default(path: &Path) -> Result<Self, GraphError> {
        if path.exists() {
            Self::load_json(path)
        } else {
            tracing::debug!(path = %path.display(), "graph file missing, starting empty");
            Ok(Self::default())
        }
    }
}

/// Build a graph from triples, normalizing entity names before insertion.
pub fn build_graph<I>(triples: I, bidirectional: bool) -> ConceptGraph
where
    I: IntoIterator,
    I::Item: Borrow<Triple>,
{
    let mut g = ConceptGraph::new();
    for t in triples {
        g.add_triple(&t.borrow().normalized(), bidirectional);
    }
    g
}

/// Canonical form of an entity name.
///
/// Whitespace runs become a single `_`, and a trailing `.` is dropped from
/// every word except the last, so abbreviations such as `"M. deltoideus"`
/// collapse onto `"M_deltoideus"`.
#[must_use]
pub fn normalize_entity(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    let last = words.len().saturating_sub(1);
    words
        .iter()
        .enumerate()
        .map(|(i, w)| if i < last { w.trim_end_matches('.') } else { w })
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[derive(Serialize, Deserialize)]
struct StoredGraph {
    version: u32,
    nodes: Vec<StoredNode>,
}

#[derive(Serialize, Deserialize)]
struct StoredNode {
    name: Arc<str>,
    #[serde(default)]
    edges: Vec<Neighbor>,
}

impl From<ConceptGraph> for StoredGraph {
    fn from(g: ConceptGraph) -> Self {
        let nodes = g
            .names
            .into_iter()
            .zip(g.adjacency)
            .map(|(name, edges)| StoredNode { name, edges })
            .collect();
        Self { version: FORMAT_VERSION, nodes }
    }
}

impl TryFrom<StoredGraph> for ConceptGraph {
    type Error = GraphError;

    fn try_from(stored: StoredGraph) -> Result<Self, Self::Error> {
        if stored.version != FORMAT_VERSION {
            return Err(GraphError::InvalidGraph(format!(
                "unsupported format version {}",
                stored.version
            )));
        }
        let mut g = ConceptGraph::new();
        for node in &stored.nodes {
            if g.contains(&node.name) {
                return Err(GraphError::InvalidGraph(format!("duplicate node '{}'", node.name)));
            }
            g.ensure(&node.name);
        }
        for (i, node) in stored.nodes.into_iter().enumerate() {
            let mut adj = Vec::with_capacity(node.edges.len());
            for n in node.edges {
                let Some(target) = g.node(&n.node).cloned() else {
                    return Err(GraphError::InvalidGraph(format!(
                        "edge from '{}' references unknown node '{}'",
                        node.name, n.node
                    )));
                };
                let predicate = g.intern_predicate(&n.predicate);
                adj.push(Neighbor { node: target, predicate, is_reverse: n.is_reverse });
            }
            g.adjacency[i] = adj;
        }
        Ok(g)
    }
}
