//! JSON snapshots of a built graph.
//!
//! A snapshot stores node names and edges with both strength and cost so a
//! reloaded graph reproduces every cost bit for bit. Loading re-validates the
//! document instead of trusting it.

use std::collections::HashSet;
use std::fs::{create_dir_all, read, write};
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::graph::{GraphBuilder, KnowledgeGraph};
use crate::model::normalize_name;
use crate::weight;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEdge {
    pub disease: usize,
    pub symptom: usize,
    pub strength: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub version: u32,
    pub diseases: Vec<String>,
    pub symptoms: Vec<String>,
    pub edges: Vec<SnapshotEdge>,
}

impl KnowledgeGraph {
    pub fn to_snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            version: SNAPSHOT_VERSION,
            diseases: self.diseases().map(str::to_string).collect(),
            symptoms: self.symptoms().map(str::to_string).collect(),
            edges: self
                .edges()
                .iter()
                .map(|e| SnapshotEdge {
                    disease: e.disease.index(),
                    symptom: e.symptom.index(),
                    strength: e.strength,
                    cost: e.cost,
                })
                .collect(),
        }
    }

    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Result<Self, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let mut builder = GraphBuilder::new();
        let diseases = intern_all(&snapshot.diseases, "disease", |n| {
            builder.intern_disease(n).index()
        })?;
        let symptoms = intern_all(&snapshot.symptoms, "symptom", |n| {
            builder.intern_symptom(n).index()
        })?;

        for (i, e) in snapshot.edges.iter().enumerate() {
            if e.disease >= diseases || e.symptom >= symptoms {
                return Err(SnapshotError::Corrupt(format!(
                    "edge {i} references a missing node"
                )));
            }
            let expected = weight::cost(e.strength).map_err(|err| {
                SnapshotError::Corrupt(format!("edge {i}: {err}"))
            })?;
            if expected.to_bits() != e.cost.to_bits() {
                return Err(SnapshotError::Corrupt(format!(
                    "edge {i}: stored cost {} does not match strength {}",
                    e.cost, e.strength
                )));
            }
            let d = builder.intern_disease(&snapshot.diseases[e.disease]);
            let s = builder.intern_symptom(&snapshot.symptoms[e.symptom]);
            if builder.has_pair(d, s) {
                return Err(SnapshotError::Corrupt(format!(
                    "edge {i} duplicates disease '{}' / symptom '{}'",
                    snapshot.diseases[e.disease], snapshot.symptoms[e.symptom]
                )));
            }
            builder.push_edge(d, s, e.strength, e.cost);
        }
        Ok(builder.finish())
    }

    pub fn to_json(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(serde_json::to_vec(&self.to_snapshot())?)
    }

    pub fn from_json(data: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot = serde_json::from_slice::<GraphSnapshot>(data)?;
        Self::from_snapshot(&snapshot)
    }

    /// Write the snapshot to `path`, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(parent).map_err(|source| SnapshotError::Io {
                op: "create_dir_all",
                path: parent.display().to_string(),
                source,
            })?;
        }
        let data = self.to_json()?;
        write(path, data).map_err(|source| SnapshotError::Io {
            op: "write",
            path: path.display().to_string(),
            source,
        })?;
        info!("saved knowledge graph snapshot to {}", path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let data = read(path).map_err(|source| SnapshotError::Io {
            op: "read",
            path: path.display().to_string(),
            source,
        })?;
        let graph = Self::from_json(&data)?;
        debug!(
            "loaded snapshot {}: {} diseases, {} symptoms, {} edges",
            path.display(),
            graph.disease_count(),
            graph.symptom_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}

/// Intern names in order, rejecting non-canonical or repeated ones.
/// Returns the number of names interned.
fn intern_all(
    names: &[String],
    kind: &str,
    mut intern: impl FnMut(&str) -> usize,
) -> Result<usize, SnapshotError> {
    let mut seen = HashSet::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        if name.is_empty() || normalize_name(name) != *name {
            return Err(SnapshotError::Corrupt(format!(
                "{kind} {i} has a non-canonical name '{name}'"
            )));
        }
        if !seen.insert(name.as_str()) {
            return Err(SnapshotError::Corrupt(format!(
                "{kind} '{name}' appears more than once"
            )));
        }
        let id = intern(name);
        if id != i {
            return Err(SnapshotError::Corrupt(format!(
                "{kind} '{name}' could not be placed at index {i}"
            )));
        }
    }
    Ok(names.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DiseaseRecord;

    fn graph() -> KnowledgeGraph {
        KnowledgeGraph::build([
            DiseaseRecord::new("flu")
                .with_symptom("fever", 0.318)
                .with_symptom("cough", 0.119),
            DiseaseRecord::new("cold").with_symptom("cough", 0.3),
        ])
        .unwrap()
    }

    #[test]
    fn json_round_trip_is_bit_exact() {
        let g = graph();
        let back = KnowledgeGraph::from_json(&g.to_json().unwrap()).unwrap();
        assert_eq!(back.edge_count(), g.edge_count());
        for (a, b) in g.edges().iter().zip(back.edges()) {
            assert_eq!(a.cost.to_bits(), b.cost.to_bits());
            assert_eq!(a.strength.to_bits(), b.strength.to_bits());
        }
        assert_eq!(back.neighbors("cough"), g.neighbors("cough"));
    }

    #[test]
    fn tampered_cost_is_rejected() {
        let mut snap = graph().to_snapshot();
        snap.edges[0].cost += 1e-9;
        let err = KnowledgeGraph::from_snapshot(&snap).unwrap_err();
        assert!(matches!(err, SnapshotError::Corrupt(_)));
    }

    #[test]
    fn bad_indices_and_versions_are_rejected() {
        let mut snap = graph().to_snapshot();
        snap.edges[0].symptom = 99;
        assert!(matches!(
            KnowledgeGraph::from_snapshot(&snap),
            Err(SnapshotError::Corrupt(_))
        ));

        let mut snap = graph().to_snapshot();
        snap.version = 7;
        assert!(matches!(
            KnowledgeGraph::from_snapshot(&snap),
            Err(SnapshotError::Version { found: 7, .. })
        ));
    }

    #[test]
    fn duplicate_edges_and_names_are_rejected() {
        let mut snap = graph().to_snapshot();
        let dup = snap.edges[0].clone();
        snap.edges.push(dup);
        assert!(KnowledgeGraph::from_snapshot(&snap).is_err());

        let mut snap = graph().to_snapshot();
        snap.diseases.push("flu".into());
        assert!(KnowledgeGraph::from_snapshot(&snap).is_err());

        let mut snap = graph().to_snapshot();
        snap.symptoms[0] = "Fever".into();
        assert!(KnowledgeGraph::from_snapshot(&snap).is_err());
    }

    #[test]
    fn isolated_nodes_survive() {
        let mut snap = graph().to_snapshot();
        snap.symptoms.push("rash".into());
        let g = KnowledgeGraph::from_snapshot(&snap).unwrap();
        assert!(g.has_symptom("rash"));
        assert!(g.neighbors("rash").is_empty());
    }
}
