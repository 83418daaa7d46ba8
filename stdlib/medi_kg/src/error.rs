//! Error types for graph construction, ingestion and persistence.

use thiserror::Error;

/// A strength value outside the half-open interval (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("association strength {strength} is outside (0, 1]")]
pub struct DomainError {
    pub strength: f64,
}

/// Errors raised while building a [`crate::KnowledgeGraph`].
///
/// Any of these aborts the build; no partial graph is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("invalid strength {strength} for disease '{disease}' / symptom '{symptom}': must be in (0, 1]")]
    Domain {
        disease: String,
        symptom: String,
        strength: f64,
    },
    #[error("duplicate edge: symptom '{symptom}' listed more than once for disease '{disease}'")]
    DuplicateEdge { disease: String, symptom: String },
    #[error("empty {kind} name in record for disease '{disease}'")]
    EmptyName { kind: &'static str, disease: String },
}

/// Errors raised while parsing an association dataset.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors raised while saving or loading a graph snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot encoding: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported snapshot version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}
