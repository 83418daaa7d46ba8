//! Differential diagnosis over a [`medi_kg::KnowledgeGraph`].
//!
//! A query's symptoms are resolved against the graph, a best-first search
//! sums `-ln(strength)` over every matched symptom edge of each reachable
//! disease, and the totals are ranked ascending (lower is more likely).
//!
//! ```
//! use medi_dx::{diagnose, RankingReporter};
//! use medi_kg::{DiseaseRecord, KnowledgeGraph};
//!
//! let graph = KnowledgeGraph::build([
//!     DiseaseRecord::new("acid reflux").with_symptom("heartburn", 0.5).with_symptom("nausea", 0.25),
//!     DiseaseRecord::new("gastritis").with_symptom("nausea", 0.5),
//! ])
//! .unwrap();
//! let result = diagnose(&graph, ["Heartburn", "nausea", "hiccups"]).unwrap();
//! assert_eq!(result.ignored, vec!["hiccups".to_string()]);
//! let ranked = result.ranked();
//! assert_eq!(RankingReporter::default().render(&ranked), "gastritis\t0.693\nacid reflux\t2.079\n");
//! ```

pub mod error;
pub mod evaluation;
pub mod query;
pub mod ranking;
pub mod search;
pub mod symptoms;

pub use error::{DiagnosisError, InputError};
pub use evaluation::{
    evaluate_case, evaluate_cases, CaseOutcome, EvaluationPolicy, EvaluationTally, LabelCounts,
    LabeledCase,
};
pub use query::{EffectiveQuery, Query, UnmatchedQueryWarning};
pub use ranking::{rank, RankedDisease, RankingReporter};
pub use search::{
    diagnose, DiagnosisResult, DiagnosisSearch, DiseaseScore, Evidence, Heuristic,
    HeuristicKind, MinIncidentCost, SearchNode, ZeroHeuristic,
};
