//! Shared fixtures for the pipeline tests.

use std::path::{Path, PathBuf};

use medi_kg::ingest::load_graph_csv;
use medi_kg::KnowledgeGraph;

/// A small dataset in the association CSV format.
pub const CLINIC_CSV: &str = "\
Diseases,Symptoms
Acid Reflux,\"heartburn (0.5), nausea (0.25), difficulty swallowing (0.1)\"
Gastritis,\"nausea (0.5), abdominal pain (0.4), bloating (0.3)\"
Bronchitis,\"cough (0.5), fever (0.2), chest discomfort (0.35)\"
Asthma,\"cough (0.5), wheezing (0.8)\"
Influenza,\"fever (0.9), cough (0.3), muscle aches (0.6)\"
Abscess,\"pain (0.318), fever (0.119)\"
";

pub const CLINIC_CASES: &str = "\
label,symptoms
Gastritis,\"nausea, bloating\"
Asthma,\"wheezing, cough\"
Influenza,\"fever, muscle aches\"
Acid Reflux,\"heartburn, difficulty swallowing\"
Abscess,\"pain, dizziness\"
Bronchitis,\"sneezing\"
";

pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

pub fn clinic_graph(dir: &Path) -> KnowledgeGraph {
    let csv = write_fixture(dir, "clinic.csv", CLINIC_CSV);
    load_graph_csv(csv).expect("clinic dataset builds")
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
