//! Best-first diagnosis search.
//!
//! A virtual origin links at zero cost to every symptom of the effective
//! query. Expanding a symptom adds its edge cost to each adjacent disease
//! once, so a disease ends up scored by the sum of `-ln(strength)` over all
//! matched symptom edges. Diseases without a matched symptom are absent.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use log::{debug, trace};
use medi_kg::{DiseaseId, KnowledgeGraph, SymptomId};
use serde::{Deserialize, Serialize};

use crate::error::DiagnosisError;
use crate::query::{EffectiveQuery, Query, UnmatchedQueryWarning};
use crate::ranking::{rank, RankedDisease};

/// A vertex of the search space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchNode {
    Origin,
    Symptom(SymptomId),
    Disease(DiseaseId),
}

/// Estimate of the remaining cost from a node. Only affects expansion order.
pub trait Heuristic {
    fn estimate(&self, graph: &KnowledgeGraph, node: SearchNode) -> f64;
}

/// Uniform-cost expansion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    fn estimate(&self, _graph: &KnowledgeGraph, _node: SearchNode) -> f64 {
        0.0
    }
}

/// Cheapest incident edge of a symptom; zero elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinIncidentCost;

impl Heuristic for MinIncidentCost {
    fn estimate(&self, graph: &KnowledgeGraph, node: SearchNode) -> f64 {
        match node {
            SearchNode::Symptom(id) => graph.min_incident_cost(id).unwrap_or(0.0),
            SearchNode::Origin | SearchNode::Disease(_) => 0.0,
        }
    }
}

/// Runtime-selectable heuristic, as named in configuration and on the
/// command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeuristicKind {
    #[default]
    Zero,
    MinIncident,
}

impl Heuristic for HeuristicKind {
    fn estimate(&self, graph: &KnowledgeGraph, node: SearchNode) -> f64 {
        match self {
            HeuristicKind::Zero => ZeroHeuristic.estimate(graph, node),
            HeuristicKind::MinIncident => MinIncidentCost.estimate(graph, node),
        }
    }
}

impl fmt::Display for HeuristicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeuristicKind::Zero => write!(f, "zero"),
            HeuristicKind::MinIncident => write!(f, "min-incident"),
        }
    }
}

impl FromStr for HeuristicKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" | "uniform" => Ok(HeuristicKind::Zero),
            "min-incident" | "min_incident" => Ok(HeuristicKind::MinIncident),
            other => Err(format!(
                "unknown heuristic '{other}' (expected 'zero' or 'min-incident')"
            )),
        }
    }
}

/// One matched symptom edge contributing to a disease score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub symptom: String,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseScore {
    /// Sum of the evidence costs.
    pub cost: f64,
    /// Contributing symptoms in effective-query order.
    pub evidence: Vec<Evidence>,
}

/// Output of one search: per-disease scores plus the query bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub scores: BTreeMap<String, DiseaseScore>,
    pub matched: Vec<String>,
    pub ignored: Vec<String>,
}

impl DiagnosisResult {
    pub fn cost_of(&self, disease: &str) -> Option<f64> {
        self.scores
            .get(&medi_kg::normalize_name(disease))
            .map(|s| s.cost)
    }

    /// Disease name to total cost.
    pub fn disease_costs(&self) -> BTreeMap<String, f64> {
        self.scores
            .iter()
            .map(|(name, score)| (name.clone(), score.cost))
            .collect()
    }

    pub fn ranked(&self) -> Vec<RankedDisease> {
        rank(self.scores.iter().map(|(name, score)| (name, score.cost)))
    }

    pub fn warning(&self) -> Option<UnmatchedQueryWarning> {
        (!self.ignored.is_empty()).then(|| UnmatchedQueryWarning {
            ignored: self.ignored.clone(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[derive(Debug)]
struct Frontier {
    priority: f64,
    cost: f64,
    node: SearchNode,
    seq: u64,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    // Reversed so BinaryHeap pops the lowest priority, then the oldest push.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Search driver borrowing an immutable graph.
#[derive(Debug, Clone)]
pub struct DiagnosisSearch<'g, H = ZeroHeuristic> {
    graph: &'g KnowledgeGraph,
    heuristic: H,
}

impl<'g> DiagnosisSearch<'g, ZeroHeuristic> {
    pub fn new(graph: &'g KnowledgeGraph) -> Self {
        Self {
            graph,
            heuristic: ZeroHeuristic,
        }
    }
}

impl<'g, H: Heuristic> DiagnosisSearch<'g, H> {
    pub fn with_heuristic(graph: &'g KnowledgeGraph, heuristic: H) -> Self {
        Self { graph, heuristic }
    }

    pub fn graph(&self) -> &'g KnowledgeGraph {
        self.graph
    }

    /// Resolve `query` against the graph and score every reachable disease.
    pub fn run(&self, query: &Query) -> Result<DiagnosisResult, DiagnosisError> {
        let effective = query.resolve(self.graph)?;
        Ok(self.run_effective(&effective))
    }

    pub fn run_effective(&self, query: &EffectiveQuery) -> DiagnosisResult {
        let graph = self.graph;
        let mut heap = BinaryHeap::new();
        let mut seq = 0u64;
        let mut push = |heap: &mut BinaryHeap<Frontier>, node: SearchNode, cost: f64| {
            let priority = cost + self.heuristic.estimate(graph, node);
            heap.push(Frontier {
                priority,
                cost,
                node,
                seq,
            });
            seq += 1;
        };

        let mut best_known: HashMap<SearchNode, f64> = HashMap::new();
        let mut settled: HashSet<SearchNode> = HashSet::new();
        let mut disease_cost: HashMap<DiseaseId, f64> = HashMap::new();
        let mut counted: HashMap<DiseaseId, Vec<(SymptomId, f64)>> = HashMap::new();

        best_known.insert(SearchNode::Origin, 0.0);
        push(&mut heap, SearchNode::Origin, 0.0);

        while let Some(entry) = heap.pop() {
            match entry.node {
                SearchNode::Origin => {
                    if !settled.insert(SearchNode::Origin) {
                        continue;
                    }
                    for id in query.symptom_ids() {
                        let node = SearchNode::Symptom(id);
                        let candidate = entry.cost;
                        if candidate < best_known.get(&node).copied().unwrap_or(f64::INFINITY) {
                            best_known.insert(node, candidate);
                            push(&mut heap, node, candidate);
                        }
                    }
                }
                SearchNode::Symptom(s) => {
                    if !settled.insert(entry.node) {
                        continue;
                    }
                    trace!("expanding symptom '{}'", graph.symptom_name(s));
                    for edge in graph.symptom_edges(s) {
                        let d = edge.disease;
                        let node = SearchNode::Disease(d);
                        let candidate = entry.cost + edge.cost;
                        let best = best_known.entry(node).or_insert(f64::INFINITY);
                        if candidate < *best {
                            *best = candidate;
                        }

                        let seen = counted.entry(d).or_default();
                        if seen.iter().any(|(counted_s, _)| *counted_s == s) {
                            continue;
                        }
                        seen.push((s, edge.cost));
                        let sum = disease_cost.entry(d).or_insert(0.0);
                        *sum += edge.cost;
                        push(&mut heap, node, *sum);
                    }
                }
                SearchNode::Disease(d) => {
                    // Superseded by a later contribution.
                    if disease_cost.get(&d).copied() != Some(entry.cost) {
                        continue;
                    }
                    trace!(
                        "disease '{}' reached with partial cost {:.3}",
                        graph.disease_name(d),
                        entry.cost
                    );
                }
            }
        }

        let scores: BTreeMap<String, DiseaseScore> = counted
            .into_iter()
            .map(|(d, mut contributions)| {
                contributions.sort_by_key(|(s, _)| query.position(*s));
                let cost = contributions.iter().map(|(_, c)| *c).sum::<f64>();
                let evidence = contributions
                    .into_iter()
                    .map(|(s, c)| Evidence {
                        symptom: graph.symptom_name(s).to_string(),
                        cost: c,
                    })
                    .collect();
                (graph.disease_name(d).to_string(), DiseaseScore { cost, evidence })
            })
            .collect();

        debug!(
            "diagnosis search scored {} diseases from {} symptoms ({} ignored)",
            scores.len(),
            query.len(),
            query.ignored().len()
        );

        DiagnosisResult {
            scores,
            matched: query.matched().map(str::to_string).collect(),
            ignored: query.ignored().to_vec(),
        }
    }
}

/// Convenience wrapper: uniform-cost search for `symptoms` over `graph`.
pub fn diagnose<I, S>(graph: &KnowledgeGraph, symptoms: I) -> Result<DiagnosisResult, DiagnosisError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    DiagnosisSearch::new(graph).run(&Query::new(symptoms))
}
