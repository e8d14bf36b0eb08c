use kubelint::dag::{RuleGraph, apply_fixes, evaluate};
use kubelint::errors::LintError;
use kubelint::resource::ResourceStore;
use kubelint::rule::{ClosureLogic, Rule};
use kubelint_test_utils::builders::RuleBuilder;
use kubelint_test_utils::init_tracing;

#[test]
fn failing_chain_is_fixed_in_order() {
    init_tracing();
    let mut store = ResourceStore::new();
    let (a, a_counts) = RuleBuilder::new("A").failing().fixable(true).build_counted();
    let (b, b_counts) = RuleBuilder::new("B")
        .after("A")
        .failing()
        .fixable(true)
        .build_counted();

    let eval = evaluate(vec![b, a], &store).unwrap();
    let reported: Vec<_> = eval.violations.iter().map(|v| v.rule.as_str()).collect();
    assert_eq!(reported, vec!["A", "B"]);
    assert_eq!(a_counts.checks(), 1);
    assert_eq!(b_counts.checks(), 0);

    let pass = apply_fixes(eval.fix_graph, &mut store).unwrap();
    let descriptions: Vec<_> = pass.applied.iter().map(|f| f.description.as_str()).collect();
    assert_eq!(descriptions, vec!["fixed A", "fixed B"]);
}

#[test]
fn unfixable_prerequisite_stops_the_fix_pass() {
    init_tracing();
    let mut store = ResourceStore::new();
    let (a, a_counts) = RuleBuilder::new("A").failing().build_counted();
    let (b, b_counts) = RuleBuilder::new("B").after("A").fixable(true).build_counted();

    let eval = evaluate(vec![a, b], &store).unwrap();
    assert_eq!(eval.violations.len(), 2);

    let pass = apply_fixes(eval.fix_graph, &mut store).unwrap();
    assert!(pass.applied.is_empty());
    assert_eq!(pass.unfixable, vec!["A"]);
    assert_eq!(pass.skipped, vec!["B"]);
    assert_eq!(a_counts.fixes(), 1);
    assert_eq!(b_counts.fixes(), 0);
}

#[test]
fn passing_prerequisite_frees_its_dependents_for_fixing() {
    let mut store = ResourceStore::new();
    let a = RuleBuilder::new("A").build();
    let (c, c_counts) = RuleBuilder::new("C")
        .after("A")
        .failing()
        .fixable(true)
        .build_counted();

    let eval = evaluate(vec![a, c], &store).unwrap();
    assert!(!eval.fix_graph.contains("A"));

    let pass = apply_fixes(eval.fix_graph, &mut store).unwrap();
    assert_eq!(pass.applied.len(), 1);
    assert_eq!(c_counts.fixes(), 1);
}

#[test]
fn cycle_yields_unsatisfiable_order_and_no_report() {
    let store = ResourceStore::new();
    let rules = vec![
        RuleBuilder::new("A").after("B").build(),
        RuleBuilder::new("B").after("A").build(),
        RuleBuilder::new("C").build(),
    ];

    match evaluate(rules, &store) {
        Err(LintError::UnsatisfiableOrder { waiting }) => {
            let ids: Vec<_> = waiting.iter().map(|(id, _)| id.as_str()).collect();
            assert_eq!(ids, vec!["A", "B"]);
        }
        other => panic!("expected UnsatisfiableOrder, got {other:?}"),
    }
}

#[test]
fn dangling_prerequisite_is_unsatisfiable() {
    let store = ResourceStore::new();
    let err = evaluate(vec![RuleBuilder::new("A").after("GHOST").build()], &store).unwrap_err();
    assert!(matches!(err, LintError::UnsatisfiableOrder { .. }));
    assert!(err.is_fatal());
}

#[test]
fn dependent_check_is_never_invoked() {
    let store = ResourceStore::new();
    let rules = vec![
        RuleBuilder::new("A").failing().build(),
        Rule::new(
            "B",
            ClosureLogic::new().check(|_, _| panic!("B's check must not run")),
        )
        .after(["A"]),
        Rule::new(
            "C",
            ClosureLogic::new().check(|_, _| panic!("C's check must not run")),
        )
        .after(["B"]),
    ];

    let eval = evaluate(rules, &store).unwrap();
    assert_eq!(eval.failed, vec!["A"]);
    assert_eq!(eval.cascaded, vec!["B", "C"]);
    assert!(!eval.violations[0].is_cascaded());
    assert!(
        eval.violations[1..]
            .iter()
            .all(|v| v.is_cascaded() && v.cascaded_from.as_deref() == Some("A"))
    );
}

#[test]
fn cloned_graphs_drain_independently() {
    let mut graph = RuleGraph::new(vec![
        RuleBuilder::new("A").build(),
        RuleBuilder::new("B").after("A").build(),
    ])
    .unwrap();
    let copy = graph.clone();

    assert_eq!(graph.pop_next_available().unwrap().id, "A");
    assert_eq!(graph.pop_next_available().unwrap().id, "B");
    assert!(graph.is_empty());
    assert_eq!(copy.len(), 2);
    assert_eq!(copy.transitive_dependents("A"), vec!["B"]);
}
