//! Symptom queries and their resolution against a graph.

use std::collections::HashSet;
use std::fmt;

use log::warn;
use medi_kg::{normalize_name, KnowledgeGraph, SymptomId};
use serde::{Deserialize, Serialize};

use crate::error::{display_list, DiagnosisError};

/// Ordered, de-duplicated list of normalized symptom names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    symptoms: Vec<String>,
}

impl Query {
    /// Normalize each symptom; blanks are dropped and later duplicates
    /// collapse onto the first occurrence.
    pub fn new<I, S>(symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let symptoms = symptoms
            .into_iter()
            .map(|s| normalize_name(s.as_ref()))
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();
        Self { symptoms }
    }

    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    /// Split the query into symptoms known to `graph` and ignored ones.
    ///
    /// Fails with [`DiagnosisError::NoKnownSymptoms`] when nothing matches.
    pub fn resolve(&self, graph: &KnowledgeGraph) -> Result<EffectiveQuery, DiagnosisError> {
        let mut matched = Vec::new();
        let mut ignored = Vec::new();
        for name in &self.symptoms {
            match graph.symptom_id(name) {
                Some(id) => matched.push((id, name.clone())),
                None => ignored.push(name.clone()),
            }
        }

        if !ignored.is_empty() {
            warn!(
                "the following symptoms are not present in the knowledge graph and will be ignored: {}",
                display_list(&ignored)
            );
        }
        if matched.is_empty() {
            return Err(DiagnosisError::NoKnownSymptoms { ignored });
        }
        Ok(EffectiveQuery { matched, ignored })
    }
}

impl<S: AsRef<str>> FromIterator<S> for Query {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Query::new(iter)
    }
}

/// The non-empty subset of a query that exists in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveQuery {
    matched: Vec<(SymptomId, String)>,
    ignored: Vec<String>,
}

impl EffectiveQuery {
    pub fn symptom_ids(&self) -> impl Iterator<Item = SymptomId> + '_ {
        self.matched.iter().map(|(id, _)| *id)
    }

    pub fn matched(&self) -> impl Iterator<Item = &str> + '_ {
        self.matched.iter().map(|(_, n)| n.as_str())
    }

    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    /// Position of a symptom within the effective query.
    pub(crate) fn position(&self, id: SymptomId) -> Option<usize> {
        self.matched.iter().position(|(s, _)| *s == id)
    }

    pub fn len(&self) -> usize {
        self.matched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

/// Non-fatal notice listing query symptoms absent from the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedQueryWarning {
    pub ignored: Vec<String>,
}

impl fmt::Display for UnmatchedQueryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "the following symptoms are not present in the knowledge graph and were ignored: {}",
            display_list(&self.ignored)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medi_kg::DiseaseRecord;
    use pretty_assertions::assert_eq;

    fn graph() -> KnowledgeGraph {
        KnowledgeGraph::build([DiseaseRecord::new("flu")
            .with_symptom("fever", 0.5)
            .with_symptom("cough", 0.25)])
        .unwrap()
    }

    #[test]
    fn normalizes_and_dedups_in_order() {
        let q = Query::new(["  Fever", "cough", "", "FEVER", "rash"]);
        assert_eq!(q.symptoms(), ["fever", "cough", "rash"]);
    }

    #[test]
    fn resolve_splits_matched_and_ignored() {
        let g = graph();
        let eq = Query::new(["rash", "Cough", "fever"]).resolve(&g).unwrap();
        assert_eq!(eq.matched().collect::<Vec<_>>(), vec!["cough", "fever"]);
        assert_eq!(eq.ignored(), ["rash"]);
        assert_eq!(eq.len(), 2);
    }

    #[test]
    fn empty_effective_query_is_an_error() {
        let g = graph();
        let err = Query::new(["rash", "itching"]).resolve(&g).unwrap_err();
        assert_eq!(
            err,
            DiagnosisError::NoKnownSymptoms {
                ignored: vec!["rash".into(), "itching".into()]
            }
        );
        assert!(Query::default().resolve(&g).is_err());
    }

    #[test]
    fn diseases_do_not_match_as_symptoms() {
        let g = graph();
        assert!(Query::new(["flu"]).resolve(&g).is_err());
    }
}
