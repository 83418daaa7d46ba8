//! Batch evaluation against labeled cases.
//!
//! Statistics live in an [`EvaluationTally`] value that each step consumes
//! and returns.

use std::collections::BTreeMap;
use std::fs::read_to_string;
use std::path::Path;

use log::{debug, info};
use medi_kg::ingest::split_csv_record;
use medi_kg::normalize_name;
use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::query::Query;
use crate::ranking::RankedDisease;
use crate::search::{DiagnosisSearch, Heuristic};
use crate::symptoms::parse_symptom_line;

/// A ground-truth disease label with already-extracted symptoms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledCase {
    pub label: String,
    pub symptoms: Vec<String>,
}

/// Parse a `label,symptoms` CSV; the symptoms column is comma-separated.
pub fn parse_cases(text: &str) -> Result<Vec<LabeledCase>, InputError> {
    let mut cases = Vec::new();
    let mut header_seen = false;
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        if !header_seen {
            header_seen = true;
            continue;
        }
        let fields = split_csv_record(line).ok_or_else(|| InputError::Malformed {
            line: idx + 1,
            reason: "unterminated quoted field".to_string(),
        })?;
        let label = fields.first().map(|l| l.trim()).unwrap_or_default();
        if label.is_empty() || fields.len() < 2 {
            return Err(InputError::Malformed {
                line: idx + 1,
                reason: "expected 'label,symptoms'".to_string(),
            });
        }
        cases.push(LabeledCase {
            label: label.to_string(),
            symptoms: parse_symptom_line(&fields[1]),
        });
    }
    Ok(cases)
}

pub fn read_cases(path: impl AsRef<Path>) -> Result<Vec<LabeledCase>, InputError> {
    let path = path.as_ref();
    let text = read_to_string(path).map_err(|source| InputError::Io {
        op: "read",
        path: path.display().to_string(),
        source,
    })?;
    parse_cases(&text)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationPolicy {
    /// Count a hit only within the first `top_k` ranks; `None` accepts any rank.
    pub top_k: Option<usize>,
    /// Stop after this many cases.
    pub limit: Option<usize>,
}

/// What happened for one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub label: String,
    /// 1-based rank of the label in the result, when counted as a hit.
    pub hit_rank: Option<usize>,
    pub top: Option<RankedDisease>,
    pub ignored: Vec<String>,
    /// Set when no prediction could be made.
    pub failure: Option<String>,
}

impl CaseOutcome {
    pub fn is_correct(&self) -> bool {
        self.hit_rank.is_some()
    }
}

pub fn evaluate_case<H: Heuristic>(
    search: &DiagnosisSearch<'_, H>,
    case: &LabeledCase,
    policy: &EvaluationPolicy,
) -> CaseOutcome {
    let mut outcome = CaseOutcome {
        label: case.label.clone(),
        hit_rank: None,
        top: None,
        ignored: Vec::new(),
        failure: None,
    };

    let result = match search.run(&Query::new(&case.symptoms)) {
        Ok(r) => r,
        Err(e) => {
            outcome.failure = Some(e.to_string());
            return outcome;
        }
    };
    outcome.ignored = result.ignored.clone();

    let ranked = result.ranked();
    if ranked.is_empty() {
        outcome.failure = Some("no diseases matched".to_string());
        return outcome;
    }

    let wanted = normalize_name(&case.label);
    let window = policy.top_k.unwrap_or(ranked.len()).min(ranked.len());
    outcome.hit_rank = ranked[..window]
        .iter()
        .position(|r| r.name == wanted)
        .map(|i| i + 1);
    outcome.top = ranked.into_iter().next();
    debug!(
        "case '{}': top={:?} hit_rank={:?}",
        case.label,
        outcome.top.as_ref().map(|t| t.name.as_str()),
        outcome.hit_rank
    );
    outcome
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub correct: usize,
    pub incorrect: usize,
}

impl LabelCounts {
    pub fn total(&self) -> usize {
        self.correct + self.incorrect
    }

    /// Percentage in [0, 100]; 0 when there are no cases.
    pub fn accuracy(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.correct as f64 / self.total() as f64 * 100.0
        }
    }
}

/// Per-label correct/incorrect counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationTally {
    per_label: BTreeMap<String, LabelCounts>,
}

impl EvaluationTally {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn record(mut self, outcome: &CaseOutcome) -> Self {
        let counts = self.per_label.entry(outcome.label.clone()).or_default();
        if outcome.is_correct() {
            counts.correct += 1;
        } else {
            counts.incorrect += 1;
        }
        self
    }

    pub fn get(&self, label: &str) -> Option<&LabelCounts> {
        self.per_label.get(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, &LabelCounts)> + '_ {
        self.per_label.iter().map(|(l, c)| (l.as_str(), c))
    }

    pub fn overall(&self) -> LabelCounts {
        self.per_label
            .values()
            .fold(LabelCounts::default(), |acc, c| LabelCounts {
                correct: acc.correct + c.correct,
                incorrect: acc.incorrect + c.incorrect,
            })
    }

    /// Statistics block, one section per label in label order.
    pub fn render(&self) -> String {
        let mut out = String::from("---------Diagnosis Statistics---------\n");
        for (label, c) in &self.per_label {
            out.push_str(&format!("Disease: {label}\n"));
            out.push_str(&format!("  Correct Predictions: {}\n", c.correct));
            out.push_str(&format!("  Incorrect Predictions: {}\n", c.incorrect));
            out.push_str(&format!("  Accuracy: {:.2}%\n", c.accuracy()));
            out.push_str("--------------------------------------\n");
        }
        let all = self.overall();
        out.push_str(&format!(
            "Overall: {}/{} correct ({:.2}%)\n",
            all.correct,
            all.total(),
            all.accuracy()
        ));
        out
    }
}

/// Evaluate cases in order, honoring `policy.limit`.
pub fn evaluate_cases<H: Heuristic>(
    search: &DiagnosisSearch<'_, H>,
    cases: &[LabeledCase],
    policy: &EvaluationPolicy,
) -> EvaluationTally {
    let limit = policy.limit.unwrap_or(cases.len());
    let tally = cases
        .iter()
        .take(limit)
        .fold(EvaluationTally::new(), |tally, case| {
            tally.record(&evaluate_case(search, case, policy))
        });
    let all = tally.overall();
    info!(
        "evaluated {} cases: {} correct ({:.2}%)",
        all.total(),
        all.correct,
        all.accuracy()
    );
    tally
}
