use thiserror::Error;

/// Query-time failures. Raised before any cost is computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosisError {
    #[error("no known symptoms in query (ignored: {})", display_list(.ignored))]
    NoKnownSymptoms { ignored: Vec<String> },
}

/// Failures reading or writing symptom lists, result files and case files.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

pub(crate) fn display_list(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
