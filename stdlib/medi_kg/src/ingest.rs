//! Association dataset ingestion.
//!
//! The dataset is a two-column CSV file with a header row:
//!
//! ```text
//! Diseases,Symptoms
//! abscess,"pain (0.318), fever (0.119), rectal pain (0.026)"
//! ```
//!
//! Each symptom item is `name (strength)`; the strength is the token after
//! the last space and must be parenthesized.

use std::fs::read_to_string;
use std::path::Path;

use log::{debug, info};

use crate::error::IngestError;
use crate::graph::KnowledgeGraph;
use crate::model::DiseaseRecord;

/// Split one CSV record into fields.
///
/// Supports quoted fields with embedded commas and doubled quotes. Returns
/// `None` when a quoted field is not terminated.
pub fn split_csv_record(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    cur.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                cur.push(ch);
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut cur)),
            _ => cur.push(ch),
        }
    }
    if in_quotes {
        return None;
    }
    fields.push(cur);
    Some(fields)
}

/// Parse a single `name (strength)` item.
pub fn parse_symptom_item(item: &str) -> Result<(String, f64), String> {
    let item = item.trim();
    let (name, weight) = item
        .rsplit_once(' ')
        .ok_or_else(|| format!("expected 'symptom (strength)', found '{item}'"))?;
    let inner = weight
        .strip_prefix('(')
        .and_then(|w| w.strip_suffix(')'))
        .ok_or_else(|| format!("strength '{weight}' must be wrapped in parentheses"))?;
    let strength = inner
        .parse::<f64>()
        .map_err(|e| format!("invalid strength '{inner}': {e}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing symptom name in '{item}'"));
    }
    Ok((name.to_string(), strength))
}

/// Parse the dataset text into records. The first non-blank line is the
/// header and is skipped.
pub fn parse_dataset(text: &str) -> Result<Vec<DiseaseRecord>, IngestError> {
    let mut records = Vec::new();
    let mut header_seen = false;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        if !header_seen {
            header_seen = true;
            continue;
        }

        let fields = split_csv_record(line).ok_or_else(|| IngestError::Malformed {
            line: line_no,
            reason: "unterminated quoted field".to_string(),
        })?;
        if fields.len() < 2 {
            return Err(IngestError::Malformed {
                line: line_no,
                reason: format!("expected 2 columns, found {}", fields.len()),
            });
        }

        let mut record = DiseaseRecord::new(fields[0].trim());
        for item in fields[1].split(',').filter(|s| !s.trim().is_empty()) {
            let (name, strength) = parse_symptom_item(item)
                .map_err(|reason| IngestError::Malformed { line: line_no, reason })?;
            record.symptoms.push((name, strength));
        }
        records.push(record);
    }

    debug!("parsed {} disease records", records.len());
    Ok(records)
}

/// Read a dataset file into records.
pub fn read_dataset(path: impl AsRef<Path>) -> Result<Vec<DiseaseRecord>, IngestError> {
    let path = path.as_ref();
    let text = read_to_string(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_dataset(&text)
}

/// Read a dataset file and build the graph from it.
pub fn load_graph_csv(path: impl AsRef<Path>) -> Result<KnowledgeGraph, IngestError> {
    let path = path.as_ref();
    let records = read_dataset(path)?;
    let graph = KnowledgeGraph::build(&records)?;
    info!(
        "built knowledge graph from {}: {} diseases, {} symptoms, {} edges",
        path.display(),
        graph.disease_count(),
        graph.symptom_count(),
        graph.edge_count()
    );
    Ok(graph)
}
