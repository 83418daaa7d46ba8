// End-to-end library pipeline: dataset -> graph -> snapshot -> diagnosis -> result file -> evaluation.
use std::fs;

use approx::assert_abs_diff_eq;
use medi_dx::evaluation::read_cases;
use medi_dx::ranking::parse_ranking;
use medi_dx::{
    evaluate_cases, DiagnosisSearch, EvaluationPolicy, HeuristicKind, Query, RankingReporter,
};
use medi_kg::KnowledgeGraph;
use pretty_assertions::assert_eq;
use tests::{clinic_graph, init_logger, write_fixture, CLINIC_CASES};

#[test]
fn dataset_builds_expected_graph() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let g = clinic_graph(dir.path());
    assert_eq!(g.disease_count(), 6);
    assert_eq!(g.symptom_count(), 11);
    assert_eq!(g.edge_count(), 16);
    assert!(g.has_disease("acid reflux"));
    assert!(g.has_symptom("difficulty swallowing"));
    assert_abs_diff_eq!(
        g.edge("influenza", "fever").unwrap().cost,
        -(0.9f64).ln(),
        epsilon = 1e-15
    );
}

#[test]
fn snapshot_reload_then_diagnose_to_file() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let built = clinic_graph(dir.path());
    let snapshot = dir.path().join("state/knowledge_graph.json");
    built.save(&snapshot).unwrap();
    let g = KnowledgeGraph::load(&snapshot).unwrap();

    let search = DiagnosisSearch::new(&g);
    let result = search
        .run(&Query::new(["Fever", "cough", "third eye"]))
        .unwrap();
    assert_eq!(result.ignored, vec!["third eye".to_string()]);
    assert!(result.warning().is_some());

    let ranked = result.ranked();
    let out = dir.path().join("possible_diseases.txt");
    RankingReporter::default().write_file(&ranked, &out).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(
        text,
        "asthma\t0.693\ninfluenza\t1.309\nabscess\t2.129\nbronchitis\t2.303\n"
    );

    let parsed = parse_ranking(&text).unwrap();
    assert_eq!(parsed.len(), ranked.len());
    for (p, r) in parsed.iter().zip(&ranked) {
        assert_eq!(p.name, r.name);
        assert_abs_diff_eq!(p.cost, r.cost, epsilon = 5e-4);
    }
}

#[test]
fn heuristics_agree_exactly_on_every_symptom_pair() {
    let dir = tempfile::tempdir().unwrap();
    let g = clinic_graph(dir.path());
    let symptoms: Vec<&str> = g.symptoms().collect();
    let zero = DiagnosisSearch::new(&g);
    let informed = DiagnosisSearch::with_heuristic(&g, HeuristicKind::MinIncident);

    for a in &symptoms {
        for b in &symptoms {
            let q = Query::new([*a, *b]);
            let lhs = zero.run(&q).unwrap();
            let rhs = informed.run(&q).unwrap();
            assert_eq!(lhs.ranked(), rhs.ranked(), "query {a:?} + {b:?}");
        }
    }
}

#[test]
fn evaluation_over_case_file() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let g = clinic_graph(dir.path());
    let cases = read_cases(write_fixture(dir.path(), "cases.csv", CLINIC_CASES)).unwrap();
    assert_eq!(cases.len(), 6);

    let search = DiagnosisSearch::new(&g);
    let anywhere = evaluate_cases(&search, &cases, &EvaluationPolicy::default());
    assert_eq!(anywhere.overall().correct, 5);
    assert_eq!(anywhere.get("Bronchitis").unwrap().incorrect, 1);

    let strict = evaluate_cases(
        &search,
        &cases,
        &EvaluationPolicy {
            top_k: Some(1),
            limit: None,
        },
    );
    assert_eq!(strict.overall().correct, 3);
    assert_eq!(strict.get("Gastritis").unwrap().correct, 0);
    assert!(strict.render().ends_with("Overall: 3/6 correct (50.00%)\n"));
}
