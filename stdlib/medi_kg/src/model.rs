use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical form of a disease or symptom name: trimmed and lowercased.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A vertex of the knowledge graph.
///
/// Identity is the variant plus the normalized name, so a disease and a
/// symptom spelled the same way are distinct nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Node {
    Disease(String),
    Symptom(String),
}

impl Node {
    pub fn disease(name: &str) -> Self {
        Node::Disease(normalize_name(name))
    }

    pub fn symptom(name: &str) -> Self {
        Node::Symptom(normalize_name(name))
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Disease(n) | Node::Symptom(n) => n,
        }
    }

    pub fn is_disease(&self) -> bool {
        matches!(self, Node::Disease(_))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Disease(n) => write!(f, "disease:{n}"),
            Node::Symptom(n) => write!(f, "symptom:{n}"),
        }
    }
}

/// Dense index of a disease node inside one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiseaseId(pub(crate) usize);

/// Dense index of a symptom node inside one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymptomId(pub(crate) usize);

impl DiseaseId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl SymptomId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Undirected association between one disease and one symptom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub disease: DiseaseId,
    pub symptom: SymptomId,
    /// Observed co-occurrence weight in (0, 1].
    pub strength: f64,
    /// `-ln(strength)`, always `>= 0`.
    pub cost: f64,
}

/// One row of the association dataset: a disease and its weighted symptoms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRecord {
    pub disease: String,
    pub symptoms: Vec<(String, f64)>,
}

impl DiseaseRecord {
    pub fn new(disease: impl Into<String>) -> Self {
        Self {
            disease: disease.into(),
            symptoms: Vec::new(),
        }
    }

    /// Builder-style helper used by tests and ingestion.
    pub fn with_symptom(mut self, symptom: impl Into<String>, strength: f64) -> Self {
        self.symptoms.push((symptom.into(), strength));
        self
    }
}
