//! Bipartite disease/symptom association graph.

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};

use log::debug;

use crate::error::GraphError;
use crate::model::{normalize_name, DiseaseId, DiseaseRecord, Edge, Node, SymptomId};
use crate::weight;

/// Immutable weighted bipartite graph between diseases and symptoms.
///
/// Every edge joins one disease to one symptom, and each pair carries at most
/// one edge. All name lookups normalize their argument first.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    diseases: Vec<String>,
    symptoms: Vec<String>,
    disease_index: HashMap<String, DiseaseId>,
    symptom_index: HashMap<String, SymptomId>,
    edges: Vec<Edge>,
    by_disease: Vec<Vec<usize>>,
    by_symptom: Vec<Vec<usize>>,
    pairs: HashMap<(DiseaseId, SymptomId), usize>,
}

impl KnowledgeGraph {
    /// Build a graph from dataset records.
    ///
    /// Fails on the first invalid strength, empty name, or duplicated
    /// disease/symptom pair (within one record or across records).
    pub fn build<I, R>(records: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = R>,
        R: Borrow<DiseaseRecord>,
    {
        let mut builder = GraphBuilder::new();
        for record in records {
            builder.add_record(record.borrow())?;
        }
        Ok(builder.finish())
    }

    pub fn has_symptom(&self, name: &str) -> bool {
        self.symptom_id(name).is_some()
    }

    pub fn has_disease(&self, name: &str) -> bool {
        self.disease_id(name).is_some()
    }

    pub fn symptom_id(&self, name: &str) -> Option<SymptomId> {
        self.symptom_index.get(&normalize_name(name)).copied()
    }

    pub fn disease_id(&self, name: &str) -> Option<DiseaseId> {
        self.disease_index.get(&normalize_name(name)).copied()
    }

    pub fn disease_name(&self, id: DiseaseId) -> &str {
        &self.diseases[id.0]
    }

    pub fn symptom_name(&self, id: SymptomId) -> &str {
        &self.symptoms[id.0]
    }

    /// Diseases adjacent to a symptom with their edge costs, in insertion
    /// order. Unknown symptoms have no neighbors.
    pub fn neighbors(&self, symptom: &str) -> Vec<(&str, f64)> {
        match self.symptom_id(symptom) {
            Some(id) => self
                .symptom_edges(id)
                .map(|e| (self.disease_name(e.disease), e.cost))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Symptoms adjacent to a disease with their edge costs.
    pub fn symptoms_of(&self, disease: &str) -> Vec<(&str, f64)> {
        match self.disease_id(disease) {
            Some(id) => self
                .disease_edges(id)
                .map(|e| (self.symptom_name(e.symptom), e.cost))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn symptom_edges(&self, id: SymptomId) -> impl Iterator<Item = &Edge> + '_ {
        self.by_symptom[id.0].iter().map(move |&i| &self.edges[i])
    }

    pub fn disease_edges(&self, id: DiseaseId) -> impl Iterator<Item = &Edge> + '_ {
        self.by_disease[id.0].iter().map(move |&i| &self.edges[i])
    }

    pub fn edge(&self, disease: &str, symptom: &str) -> Option<&Edge> {
        let key = (self.disease_id(disease)?, self.symptom_id(symptom)?);
        self.pairs.get(&key).map(|&i| &self.edges[i])
    }

    /// Cheapest edge incident to a symptom, if it has any.
    pub fn min_incident_cost(&self, id: SymptomId) -> Option<f64> {
        self.symptom_edges(id).map(|e| e.cost).reduce(f64::min)
    }

    pub fn diseases(&self) -> impl Iterator<Item = &str> + '_ {
        self.diseases.iter().map(String::as_str)
    }

    pub fn symptoms(&self) -> impl Iterator<Item = &str> + '_ {
        self.symptoms.iter().map(String::as_str)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// All nodes, diseases first, each group in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.diseases
            .iter()
            .map(|d| Node::Disease(d.clone()))
            .chain(self.symptoms.iter().map(|s| Node::Symptom(s.clone())))
    }

    pub fn disease_count(&self) -> usize {
        self.diseases.len()
    }

    pub fn symptom_count(&self) -> usize {
        self.symptoms.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty() && self.symptoms.is_empty()
    }
}

/// Incremental constructor for [`KnowledgeGraph`].
///
/// `add_record` is all-or-nothing: a rejected record leaves the builder
/// unchanged.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: KnowledgeGraph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, record: &DiseaseRecord) -> Result<(), GraphError> {
        let disease = normalize_name(&record.disease);
        if disease.is_empty() {
            return Err(GraphError::EmptyName {
                kind: "disease",
                disease: record.disease.clone(),
            });
        }

        let existing = self.graph.disease_index.get(&disease).copied();
        let mut seen: HashSet<String> = HashSet::with_capacity(record.symptoms.len());
        let mut staged: Vec<(String, f64, f64)> = Vec::with_capacity(record.symptoms.len());
        for (raw_symptom, strength) in &record.symptoms {
            let symptom = normalize_name(raw_symptom);
            if symptom.is_empty() {
                return Err(GraphError::EmptyName {
                    kind: "symptom",
                    disease: disease.clone(),
                });
            }
            let cost = weight::cost(*strength).map_err(|e| GraphError::Domain {
                disease: disease.clone(),
                symptom: symptom.clone(),
                strength: e.strength,
            })?;
            let already_linked = existing.is_some_and(|d| {
                self.graph
                    .symptom_index
                    .get(&symptom)
                    .is_some_and(|s| self.graph.pairs.contains_key(&(d, *s)))
            });
            if already_linked || !seen.insert(symptom.clone()) {
                return Err(GraphError::DuplicateEdge { disease, symptom });
            }
            staged.push((symptom, *strength, cost));
        }

        let d = self.intern_disease(&disease);
        for (symptom, strength, cost) in staged {
            let s = self.intern_symptom(&symptom);
            self.push_edge(d, s, strength, cost);
        }
        Ok(())
    }

    /// Register a disease node without edges; returns its id.
    pub(crate) fn intern_disease(&mut self, name: &str) -> DiseaseId {
        if let Some(id) = self.graph.disease_index.get(name) {
            return *id;
        }
        let id = DiseaseId(self.graph.diseases.len());
        self.graph.diseases.push(name.to_string());
        self.graph.by_disease.push(Vec::new());
        self.graph.disease_index.insert(name.to_string(), id);
        id
    }

    pub(crate) fn intern_symptom(&mut self, name: &str) -> SymptomId {
        if let Some(id) = self.graph.symptom_index.get(name) {
            return *id;
        }
        let id = SymptomId(self.graph.symptoms.len());
        self.graph.symptoms.push(name.to_string());
        self.graph.by_symptom.push(Vec::new());
        self.graph.symptom_index.insert(name.to_string(), id);
        id
    }

    pub(crate) fn has_pair(&self, d: DiseaseId, s: SymptomId) -> bool {
        self.graph.pairs.contains_key(&(d, s))
    }

    pub(crate) fn push_edge(&mut self, d: DiseaseId, s: SymptomId, strength: f64, cost: f64) {
        let idx = self.graph.edges.len();
        self.graph.edges.push(Edge {
            disease: d,
            symptom: s,
            strength,
            cost,
        });
        self.graph.by_disease[d.0].push(idx);
        self.graph.by_symptom[s.0].push(idx);
        self.graph.pairs.insert((d, s), idx);
    }

    pub fn finish(self) -> KnowledgeGraph {
        debug!(
            "knowledge graph built: {} diseases, {} symptoms, {} edges",
            self.graph.disease_count(),
            self.graph.symptom_count(),
            self.graph.edge_count()
        );
        self.graph
    }
}
