use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Knowledge graph is empty: ingest some relations first")]
    EmptyGraph,

    #[error("Concept '{0}' not found in graph")]
    UnknownConcept(String),

    #[error("Node '{0}' not found in graph")]
    UnknownNode(String),

    #[error("Invalid triple: {0}")]
    InvalidTriple(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Invalid graph document: {0}")]
    InvalidGraph(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
