//! Symptom list input.
//!
//! Symptoms arrive already extracted (by a clinician or an external
//! extraction step), either as a file with one symptom per line or as a single
//! comma-separated line.

use std::fs::{read_to_string, write};
use std::path::Path;

use log::info;

use crate::error::InputError;

/// Split a comma-separated line into lowercased, trimmed symptoms.
pub fn parse_symptom_line(line: &str) -> Vec<String> {
    line.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a symptom list: one symptom per line, blank lines skipped.
pub fn parse_symptom_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect()
}

pub fn load_symptom_file(path: impl AsRef<Path>) -> Result<Vec<String>, InputError> {
    let path = path.as_ref();
    let text = read_to_string(path).map_err(|source| InputError::Io {
        op: "read",
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_symptom_list(&text))
}

pub fn save_symptom_file(symptoms: &[String], path: impl AsRef<Path>) -> Result<(), InputError> {
    let path = path.as_ref();
    let mut body = String::new();
    for s in symptoms {
        body.push_str(s);
        body.push('\n');
    }
    write(path, body).map_err(|source| InputError::Io {
        op: "write",
        path: path.display().to_string(),
        source,
    })?;
    info!("symptoms have been saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn manual_line() {
        assert_eq!(
            parse_symptom_line("Severe Abdominal Pain, nausea,, vomiting "),
            vec!["severe abdominal pain", "nausea", "vomiting"]
        );
        assert!(parse_symptom_line("  ").is_empty());
    }

    #[test]
    fn file_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("symptoms.txt");
        let symptoms = parse_symptom_line("nausea, Heartburn");
        save_symptom_file(&symptoms, &path).unwrap();
        std::fs::write(
            tmp.path().join("extra.txt"),
            "  Nausea\n\n difficulty swallowing \r\n",
        )
        .unwrap();
        assert_eq!(load_symptom_file(&path).unwrap(), vec!["nausea", "heartburn"]);
        assert_eq!(
            load_symptom_file(tmp.path().join("extra.txt")).unwrap(),
            vec!["nausea", "difficulty swallowing"]
        );
        assert!(load_symptom_file(tmp.path().join("missing.txt")).is_err());
    }
}
