// src/dag/evaluator.rs

use std::fmt;

use tracing::{debug, trace};

use crate::errors::Result;
use crate::resource::{ResourceHandle, ResourceStore};
use crate::rule::Rule;
use crate::types::{RuleId, Severity};

use super::graph::RuleGraph;

/// A failed rule, either checked and failed or skipped because a
/// prerequisite failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule: RuleId,
    pub message: String,
    pub severity: Severity,
    pub resources: Vec<ResourceHandle>,
    /// The failed rule this one was cascaded from, if it was never checked.
    pub cascaded_from: Option<RuleId>,
}

impl Violation {
    fn failed(rule: &Rule) -> Self {
        Self {
            rule: rule.id.clone(),
            message: rule.message.clone(),
            severity: rule.severity,
            resources: rule.bound.clone(),
            cascaded_from: None,
        }
    }

    fn cascaded(rule: &Rule, from: &str) -> Self {
        Self {
            cascaded_from: Some(from.to_string()),
            ..Self::failed(rule)
        }
    }

    pub fn is_cascaded(&self) -> bool {
        self.cascaded_from.is_some()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.rule, self.message)?;
        if let Some(from) = &self.cascaded_from {
            write!(f, " (prerequisite {from} failed)")?;
        }
        Ok(())
    }
}

/// Outcome of evaluating one unit.
///
/// Every rule of the unit lands in exactly one of `passed`, `failed` and
/// `cascaded`, each listed in the order it was resolved.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub violations: Vec<Violation>,
    /// Rules that still need fixing: what remains once passing rules have
    /// been removed from the pre-evaluation clone.
    pub fix_graph: RuleGraph,
    pub passed: Vec<RuleId>,
    pub failed: Vec<RuleId>,
    pub cascaded: Vec<RuleId>,
}

/// Build a graph from `rules` and evaluate it against `store`.
pub fn evaluate(rules: impl IntoIterator<Item = Rule>, store: &ResourceStore) -> Result<Evaluation> {
    evaluate_graph(RuleGraph::new(rules)?, store)
}

/// Drain `graph` in dependency order, checking each rule.
///
/// A failing rule is reported, and so is every rule that transitively
/// depends on it; those dependents are never checked. A passing rule is
/// removed from the fix graph so its dependents may be fixed.
///
/// Scheduling errors abort the whole unit: no partial evaluation is
/// returned.
pub fn evaluate_graph(mut graph: RuleGraph, store: &ResourceStore) -> Result<Evaluation> {
    let mut fix_graph = graph.clone();
    let mut violations = Vec::new();
    let mut passed = Vec::new();
    let mut failed = Vec::new();
    let mut cascaded = Vec::new();

    while !graph.is_empty() {
        let rule = graph.pop_next_available()?;

        if rule.check(store) {
            trace!(rule = %rule.id, "rule passed");
            fix_graph.remove(&rule.id);
            passed.push(rule.id);
            continue;
        }

        debug!(rule = %rule.id, "rule failed");
        violations.push(Violation::failed(&rule));
        for dependent in graph.pop_dependent_rules(&rule.id)? {
            debug!(rule = %dependent.id, prerequisite = %rule.id, "rule cascaded from failed prerequisite");
            violations.push(Violation::cascaded(&dependent, &rule.id));
            cascaded.push(dependent.id);
        }
        failed.push(rule.id);
    }

    Ok(Evaluation {
        violations,
        fix_graph,
        passed,
        failed,
        cascaded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LintError;
    use crate::rule::ClosureLogic;

    fn rule(id: &str, prereqs: &[&str], passes: bool) -> Rule {
        Rule::new(id, ClosureLogic::new().check(move |_, _| passes))
            .after(prereqs.iter().copied())
            .message(format!("{id} failed"))
    }

    #[test]
    fn failed_prerequisite_cascades_without_checking_dependents() {
        let store = ResourceStore::new();
        let rules = vec![
            rule("A", &[], false),
            Rule::new(
                "B",
                ClosureLogic::new().check(|_, _| panic!("B must not be checked")),
            )
            .after(["A"]),
        ];

        let eval = evaluate(rules, &store).unwrap();
        assert_eq!(eval.failed, vec!["A"]);
        assert_eq!(eval.cascaded, vec!["B"]);
        assert!(eval.passed.is_empty());

        let reported: Vec<_> = eval.violations.iter().map(|v| v.rule.as_str()).collect();
        assert_eq!(reported, vec!["A", "B"]);
        assert_eq!(eval.violations[1].cascaded_from.as_deref(), Some("A"));
        // Both stay candidates for fixing.
        assert_eq!(eval.fix_graph.len(), 2);
    }

    #[test]
    fn passing_rules_leave_the_fix_graph() {
        let store = ResourceStore::new();
        let rules = vec![rule("A", &[], true), rule("C", &["A"], false)];

        let eval = evaluate(rules, &store).unwrap();
        assert_eq!(eval.passed, vec!["A"]);
        assert_eq!(eval.failed, vec!["C"]);
        assert!(!eval.fix_graph.contains("A"));
        assert!(eval.fix_graph.contains("C"));
    }

    #[test]
    fn absent_check_is_satisfied() {
        let store = ResourceStore::new();
        let eval = evaluate(vec![Rule::new("A", ClosureLogic::new())], &store).unwrap();
        assert!(eval.violations.is_empty());
        assert!(eval.fix_graph.is_empty());
    }

    #[test]
    fn cycle_yields_no_partial_report() {
        let store = ResourceStore::new();
        let rules = vec![
            rule("A", &["B"], false),
            rule("B", &["A"], false),
            rule("C", &[], false),
        ];
        let err = evaluate(rules, &store).unwrap_err();
        assert!(matches!(err, LintError::UnsatisfiableOrder { .. }));
    }

    #[test]
    fn violation_display_names_the_failed_prerequisite() {
        let store = ResourceStore::new();
        let eval = evaluate(
            vec![rule("A", &[], false), rule("B", &["A"], true)],
            &store,
        )
        .unwrap();
        assert_eq!(eval.violations[0].to_string(), "[error] A: A failed");
        assert_eq!(
            eval.violations[1].to_string(),
            "[error] B: B failed (prerequisite A failed)"
        );
    }
}
