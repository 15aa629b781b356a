//! Merging relation lists while skipping duplicates.
use crate::errors::GraphError;
use crate::graph::{normalize_entity, Triple};

/// Decides whether two relations say the same thing.
pub trait SimilarityJudge {
    /// # Errors
    /// Implementations backed by an external service may fail.
    fn is_similar(&self, a: &Triple, b: &Triple) -> Result<bool, GraphError>;
}

/// Field-by-field equality.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactMatch;

impl SimilarityJudge for ExactMatch {
    fn is_similar(&self, a: &Triple, b: &Triple) -> Result<bool, GraphError> {
        Ok(a == b)
    }
}

/// Equality after entity normalization, ignoring case in all three fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct NormalizedMatch;

impl NormalizedMatch {
    fn key(t: &Triple) -> (String, String, String) {
        (
            normalize_entity(&t.subject).to_lowercase(),
            normalize_entity(&t.predicate).to_lowercase(),
            normalize_entity(&t.object).to_lowercase(),
        )
    }
}

impl SimilarityJudge for NormalizedMatch {
    fn is_similar(&self, a: &Triple, b: &Triple) -> Result<bool, GraphError> {
        Ok(Self::key(a) == Self::key(b))
    }
}

/// Append each relation of `new` to a copy of `existing` unless `judge`
/// considers it similar to a relation already in the merged list.
///
/// # Errors
/// Propagates the first judge error.
pub fn merge_relations<J: SimilarityJudge + ?Sized>(
    new: &[Triple],
    existing: &[Triple],
    judge: &J,
) -> Result<Vec<Triple>, GraphError> {
    let mut merged: Vec<Triple> = existing.to_vec();
    for rel in new {
        let mut duplicate = false;
        for ex in &merged {
            if judge.is_similar(rel, ex)? {
                duplicate = true;
                break;
            }
        }
        if duplicate {
            tracing::debug!(subject = %rel.subject, predicate = %rel.predicate, object = %rel.object, "duplicate skipped");
        } else {
            merged.push(rel.clone());
        }
    }
    Ok(merged)
}
