use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const DATASET: &str = "\
Diseases,Symptoms
Acid Reflux,\"heartburn (0.5), nausea (0.25), difficulty swallowing (0.1)\"
Gastritis,\"nausea (0.5), abdominal pain (0.4)\"
Bronchitis,\"cough (0.5), fever (0.2)\"
Asthma,cough (0.5)
";

const CASES: &str = "\
label,symptoms
Gastritis,\"nausea, abdominal pain\"
Acid Reflux,heartburn
Asthma,cough
Bronchitis,itchy eyes
";

fn medidx(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_medidx"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("spawn medidx")
}

fn built_workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("kg.csv"), DATASET).unwrap();
    let out = medidx(dir.path(), &["build", "--csv", "kg.csv"]);
    assert!(
        out.status.success(),
        "medidx build failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    dir
}

#[test]
fn e2e_init_writes_config_once() {
    let dir = tempfile::tempdir().unwrap();
    let out = medidx(dir.path(), &["init"]);
    assert!(out.status.success(), "medidx init failed: {:?}", out.status);

    let text = fs::read_to_string(dir.path().join("medidx.toml")).unwrap();
    assert!(text.contains("[diagnosis]"));
    assert!(text.contains("heuristic = \"zero\""));

    let again = medidx(dir.path(), &["init"]);
    assert_eq!(again.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&again.stderr).contains("already exists"));
}

#[test]
fn e2e_build_then_diagnose_from_symptom_file() {
    let dir = built_workspace();
    assert!(dir.path().join("knowledge_graph.json").exists());

    let out = medidx(
        dir.path(),
        &["symptoms", "--line", "Heartburn, nausea, hiccups"],
    );
    assert!(out.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("symptoms.txt")).unwrap(),
        "heartburn\nnausea\nhiccups\n"
    );

    let out = medidx(dir.path(), &["diagnose", "--symptoms", "symptoms.txt"]);
    assert!(
        out.status.success(),
        "medidx diagnose failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("hiccups"), "missing warning: {stderr}");

    let result = fs::read_to_string(dir.path().join("possible_diseases.txt")).unwrap();
    assert_eq!(result, "gastritis\t0.693\nacid reflux\t2.079\n");

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Disease: Gastritis, Score (lower is better): 0.693"));
}

#[test]
fn e2e_diagnose_inline_symptoms_with_flags() {
    let dir = built_workspace();
    let out = medidx(
        dir.path(),
        &[
            "-q",
            "diagnose",
            "-s",
            "cough",
            "--top-k",
            "1",
            "--heuristic",
            "min-incident",
            "-o",
            "out/top.txt",
        ],
    );
    // Parent directory of the result file is not created implicitly.
    assert_eq!(out.status.code(), Some(2));

    fs::create_dir(dir.path().join("out")).unwrap();
    let out = medidx(
        dir.path(),
        &[
            "-q",
            "diagnose",
            "-s",
            "cough",
            "--top-k",
            "1",
            "--heuristic",
            "min-incident",
            "-o",
            "out/top.txt",
        ],
    );
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
    assert_eq!(
        fs::read_to_string(dir.path().join("out/top.txt")).unwrap(),
        "asthma\t0.693\n"
    );
}

#[test]
fn e2e_unknown_symptoms_exit_one() {
    let dir = built_workspace();
    let out = medidx(dir.path(), &["diagnose", "-s", "itchy eyes"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("no valid symptoms"));
    assert!(!dir.path().join("possible_diseases.txt").exists());
}

#[test]
fn e2e_missing_graph_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = medidx(dir.path(), &["diagnose", "-s", "cough"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("medidx build"));
}

#[test]
fn e2e_config_overrides_defaults() {
    let dir = built_workspace();
    fs::write(
        dir.path().join("medidx.toml"),
        "[diagnosis]\noutput = \"ranked.tsv\"\nprecision = 2\n",
    )
    .unwrap();
    let out = medidx(dir.path(), &["diagnose", "-s", "nausea"]);
    assert!(out.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("ranked.tsv")).unwrap(),
        "gastritis\t0.69\nacid reflux\t1.39\n"
    );

    fs::write(dir.path().join("bad.toml"), "[diagnosis]\ncolour = 1\n").unwrap();
    let out = medidx(dir.path(), &["--config", "bad.toml", "diagnose", "-s", "nausea"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn e2e_evaluate_reports_statistics() {
    let dir = built_workspace();
    fs::write(dir.path().join("cases.csv"), CASES).unwrap();

    let out = medidx(dir.path(), &["evaluate", "--cases", "cases.csv"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("---------Diagnosis Statistics---------"));
    assert!(stdout.contains("Disease: Bronchitis\n  Correct Predictions: 0\n  Incorrect Predictions: 1"));
    assert!(stdout.contains("Overall: 3/4 correct (75.00%)"));

    let out = medidx(
        dir.path(),
        &["evaluate", "--cases", "cases.csv", "--limit", "2"],
    );
    assert!(String::from_utf8_lossy(&out.stdout).contains("Overall: 2/2 correct (100.00%)"));
}

#[test]
fn e2e_malformed_dataset_fails_build() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("kg.csv"),
        "Diseases,Symptoms\nFlu,\"fever (1.5)\"\n",
    )
    .unwrap();
    let out = medidx(dir.path(), &["build", "--csv", "kg.csv"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(!dir.path().join("knowledge_graph.json").exists());
}
