//! Turning raw inputs into graph relations.
//!
//! Extraction sits behind `TripleExtractor`. Two file-format extractors ship
//! with the crate; callers own the extractor and pass it in.
use serde::Deserialize;

use crate::errors::GraphError;
use crate::graph::{ConceptGraph, Triple};

pub mod merge;

pub use merge::{merge_relations, ExactMatch, NormalizedMatch, SimilarityJudge};

/// Capability: given one raw text, return the relations it contains.
pub trait TripleExtractor {
    /// # Errors
    /// Returns `GraphError::Extraction` when the text cannot be turned into triples.
    fn extract(&self, text: &str) -> Result<Vec<Triple>, GraphError>;
}

/// Parses relation-list JSON: `{"relations": [["s","p","o"], ...]}` or a bare
/// array of triples (arrays or `{subject, predicate, object}` objects).
#[derive(Debug, Default, Clone, Copy)]
pub struct RelationsJsonExtractor;

#[derive(Deserialize)]
#[serde(untagged)]
enum RelationsDoc {
    Wrapped { relations: Vec<Triple> },
    Bare(Vec<Triple>),
}

impl TripleExtractor for RelationsJsonExtractor {
    fn extract(&self, text: &str) -> Result<Vec<Triple>, GraphError> {
        let doc: RelationsDoc = serde_json::from_str(text)
            .map_err(|e| GraphError::Extraction(format!("relations JSON: {e}")))?;
        Ok(match doc {
            RelationsDoc::Wrapped { relations } | RelationsDoc::Bare(relations) => relations,
        })
    }
}

/// One `subject<TAB>predicate<TAB>object` per line. Blank lines and lines
/// starting with `#` are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct TabSeparatedExtractor;

impl TripleExtractor for TabSeparatedExtractor {
    fn extract(&self, text: &str) -> Result<Vec<Triple>, GraphError> {
        let mut out = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            let [s, p, o] = fields.as_slice() else {
                return Err(GraphError::Extraction(format!(
                    "line {}: expected 3 tab-separated fields, found {}",
                    lineno + 1,
                    fields.len()
                )));
            };
            out.push(Triple::new(s.trim(), p.trim(), o.trim()));
        }
        Ok(out)
    }
}

/// Extract relations from every text and insert them into `graph`.
///
/// Entity names are normalized before insertion. All texts are extracted and
/// validated before the graph is touched, so on error the graph is unchanged.
/// Returns the number of forward relations added.
///
/// # Errors
/// Propagates extractor errors and returns `GraphError::InvalidTriple` for a
/// triple with an empty field after normalization.
pub fn ingest_texts<E, S>(
    graph: &mut ConceptGraph,
    extractor: &E,
    texts: &[S],
    bidirectional: bool,
) -> Result<usize, GraphError>
where
    E: TripleExtractor + ?Sized,
    S: AsRef<str>,
{
    let mut pending: Vec<Triple> = Vec::new();
    for (i, text) in texts.iter().enumerate() {
        let triples = extractor.extract(text.as_ref())?;
        tracing::debug!(text = i, triples = triples.len(), "extracted");
        for t in triples {
            pending.push(validate(t.normalized())?);
        }
    }
    for t in &pending {
        graph.add_triple(t, bidirectional);
    }
    tracing::info!(added = pending.len(), nodes = graph.len(), "ingested relations");
    Ok(pending.len())
}

fn validate(t: Triple) -> Result<Triple, GraphError> {
    if t.subject.is_empty() || t.predicate.trim().is_empty() || t.object.is_empty() {
        return Err(GraphError::InvalidTriple(format!(
            "empty field in ({:?}, {:?}, {:?})",
            t.subject, t.predicate, t.object
        )));
    }
    Ok(t)
}
