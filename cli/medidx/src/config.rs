use std::fmt;
use std::path::PathBuf;

use medi_dx::HeuristicKind;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GRAPH: &str = "knowledge_graph.json";
pub const DEFAULT_OUTPUT: &str = "possible_diseases.txt";
pub const DEFAULT_SYMPTOMS: &str = "symptoms.txt";
pub const DEFAULT_PRECISION: usize = 3;

/// Contents of `medidx.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub graph: GraphConfig,

    #[serde(default)]
    pub diagnosis: DiagnosisConfig,

    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosisConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heuristic: Option<HeuristicKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl Config {
    pub fn graph_path(&self) -> PathBuf {
        self.graph
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_GRAPH))
    }

    pub fn output_path(&self) -> PathBuf {
        self.diagnosis
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }

    pub fn precision(&self) -> usize {
        self.diagnosis.precision.unwrap_or(DEFAULT_PRECISION)
    }

    pub fn heuristic(&self) -> HeuristicKind {
        self.diagnosis.heuristic.unwrap_or_default()
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "graph={} output={} precision={} heuristic={}",
            self.graph_path().display(),
            self.output_path().display(),
            self.precision(),
            self.heuristic()
        )
    }
}

pub fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(text)
}

pub fn generate_config() -> String {
    let mut out = String::new();
    out.push_str("# medidx configuration. Command-line flags override these values.\n");
    out.push_str("\n[graph]\n");
    out.push_str(&format!("path = \"{DEFAULT_GRAPH}\"\n"));
    out.push_str("\n[diagnosis]\n");
    out.push_str(&format!("output = \"{DEFAULT_OUTPUT}\"\n"));
    out.push_str(&format!("precision = {DEFAULT_PRECISION}\n"));
    out.push_str("# zero (uniform-cost) or min-incident\n");
    out.push_str("heuristic = \"zero\"\n");
    out.push_str("# top_k = 10\n");
    out.push_str("\n[evaluation]\n");
    out.push_str("# Count a case correct only if the label ranks within top_k\n");
    out.push_str("# top_k = 1\n");
    out.push_str("# limit = 100\n");
    out
}
