//! Weighted symptom/disease knowledge graph.
//!
//! Association strengths in (0, 1] become additive costs via
//! [`weight::cost`] (`-ln(strength)`), so a sum of costs ranks the joint
//! likelihood of the evidence.
//!
//! ```
//! use medi_kg::{DiseaseRecord, KnowledgeGraph};
//! let graph = KnowledgeGraph::build([
//!     DiseaseRecord::new("Acid Reflux").with_symptom("heartburn", 0.5),
//!     DiseaseRecord::new("gastritis").with_symptom("heartburn", 0.25),
//! ])
//! .unwrap();
//! assert!(graph.has_symptom("Heartburn"));
//! assert_eq!(graph.neighbors("heartburn").len(), 2);
//! ```
//!
//! Getting started:
//! - Parse the `Diseases,Symptoms` CSV dataset with [`ingest::read_dataset`]
//!   or build straight from it with [`ingest::load_graph_csv`]
//! - Persist a built graph with [`KnowledgeGraph::save`] and reload it with
//!   [`KnowledgeGraph::load`]

pub mod error;
pub mod graph;
pub mod ingest;
pub mod model;
pub mod snapshot;
pub mod weight;

pub use error::{DomainError, GraphError, IngestError, SnapshotError};
pub use graph::{GraphBuilder, KnowledgeGraph};
pub use model::{normalize_name, DiseaseId, DiseaseRecord, Edge, Node, SymptomId};
pub use snapshot::{GraphSnapshot, SnapshotEdge, SNAPSHOT_VERSION};
