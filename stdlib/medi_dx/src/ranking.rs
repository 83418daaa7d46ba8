//! Ordering and rendering of diagnosis results.
//!
//! The result file is one line per disease, `name<TAB>cost`, ascending by
//! cost with ties broken by name.

use std::borrow::Borrow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::InputError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDisease {
    pub name: String,
    pub cost: f64,
}

/// Order `(disease, cost)` pairs ascending by cost, then by name.
pub fn rank<I, K, C>(disease_cost: I) -> Vec<RankedDisease>
where
    I: IntoIterator<Item = (K, C)>,
    K: AsRef<str>,
    C: Borrow<f64>,
{
    let mut out: Vec<RankedDisease> = disease_cost
        .into_iter()
        .map(|(name, cost)| RankedDisease {
            name: name.as_ref().to_string(),
            cost: *cost.borrow(),
        })
        .collect();
    out.sort_by(|a, b| a.cost.total_cmp(&b.cost).then_with(|| a.name.cmp(&b.name)));
    out
}

/// Upper-cases the first letter of each word, for console output.
pub fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats ranked lists for files and the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingReporter {
    pub precision: usize,
    pub top_k: Option<usize>,
}

impl Default for RankingReporter {
    fn default() -> Self {
        Self {
            precision: 3,
            top_k: None,
        }
    }
}

impl RankingReporter {
    pub fn new(precision: usize, top_k: Option<usize>) -> Self {
        Self { precision, top_k }
    }

    fn visible<'a>(&self, ranked: &'a [RankedDisease]) -> &'a [RankedDisease] {
        match self.top_k {
            Some(k) => &ranked[..k.min(ranked.len())],
            None => ranked,
        }
    }

    /// The result file body: `name<TAB>cost` per line.
    pub fn render(&self, ranked: &[RankedDisease]) -> String {
        let mut out = String::new();
        for r in self.visible(ranked) {
            out.push_str(&format!("{}\t{:.*}\n", r.name, self.precision, r.cost));
        }
        out
    }

    pub fn write_to<W: Write>(&self, ranked: &[RankedDisease], mut sink: W) -> std::io::Result<()> {
        sink.write_all(self.render(ranked).as_bytes())?;
        sink.flush()
    }

    pub fn write_file(&self, ranked: &[RankedDisease], path: impl AsRef<Path>) -> Result<(), InputError> {
        let path = path.as_ref();
        let io_err = |op: &'static str| {
            let path = path.display().to_string();
            move |source| InputError::Io { op, path, source }
        };
        let file = File::create(path).map_err(io_err("create"))?;
        self.write_to(ranked, BufWriter::new(file))
            .map_err(io_err("write"))?;
        info!("possible diseases have been saved to {}", path.display());
        Ok(())
    }

    /// Human-readable lines, `Disease: <Name>, Score (lower is better): <cost>`.
    pub fn summary_lines(&self, ranked: &[RankedDisease]) -> Vec<String> {
        self.visible(ranked)
            .iter()
            .map(|r| {
                format!(
                    "Disease: {}, Score (lower is better): {:.*}",
                    title_case(&r.name),
                    self.precision,
                    r.cost
                )
            })
            .collect()
    }
}

/// Read a result file back into ranked entries.
pub fn parse_ranking(text: &str) -> Result<Vec<RankedDisease>, InputError> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (name, cost) = line.rsplit_once('\t').ok_or_else(|| InputError::Malformed {
            line: idx + 1,
            reason: "expected 'name<TAB>cost'".to_string(),
        })?;
        let cost = cost.trim().parse::<f64>().map_err(|e| InputError::Malformed {
            line: idx + 1,
            reason: format!("invalid cost '{cost}': {e}"),
        })?;
        out.push(RankedDisease {
            name: name.to_string(),
            cost,
        });
    }
    Ok(out)
}
