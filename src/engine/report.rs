// src/engine/report.rs

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::dag::{self, RuleGraph, Violation};
use crate::errors::LintError;
use crate::resource::{ResourceHandle, ResourceStore};
use crate::types::Severity;

/// Everything one lint batch produced.
#[derive(Debug)]
pub struct LintReport {
    /// The linted resources; fixes are applied to these in place.
    pub store: ResourceStore,
    /// Violations in unit order, then evaluation order within a unit.
    pub violations: Vec<Violation>,
    /// Decode, read and scheduling errors.
    pub errors: Vec<LintError>,
    fix_graphs: Vec<RuleGraph>,
}

/// Result of [`LintReport::apply_fixes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixOutcome {
    /// Resources touched by a successful fix, in the order first fixed.
    pub fixed: Vec<ResourceHandle>,
    /// One description per successful fix, in the order applied.
    pub descriptions: Vec<String>,
}

impl FixOutcome {
    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}

impl LintReport {
    pub(crate) fn new(
        store: ResourceStore,
        violations: Vec<Violation>,
        errors: Vec<LintError>,
        fix_graphs: Vec<RuleGraph>,
    ) -> Self {
        Self {
            store,
            violations,
            errors,
            fix_graphs,
        }
    }

    /// Whether any error aborted the scheduling of a unit.
    pub fn has_fatal_errors(&self) -> bool {
        self.errors.iter().any(LintError::is_fatal)
    }

    /// Violations at or above `threshold`.
    pub fn violations_at_least(&self, threshold: Severity) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.severity >= threshold)
    }

    /// Rules still waiting for the fix pass, summed over all units.
    pub fn pending_fixes(&self) -> usize {
        self.fix_graphs.iter().map(RuleGraph::len).sum()
    }

    /// Drain every unit's fix graph against the store, in unit order.
    ///
    /// The fix graphs are consumed: a second call applies nothing.
    pub fn apply_fixes(&mut self) -> FixOutcome {
        let mut outcome = FixOutcome::default();
        let mut seen: BTreeSet<ResourceHandle> = BTreeSet::new();

        for graph in std::mem::take(&mut self.fix_graphs) {
            let pass = match dag::apply_fixes(graph, &mut self.store) {
                Ok(pass) => pass,
                Err(err) => {
                    warn!(error = %err, "fix pass aborted");
                    self.errors.push(err);
                    continue;
                }
            };

            if !pass.unfixable.is_empty() {
                debug!(
                    unfixable = ?pass.unfixable,
                    skipped = ?pass.skipped,
                    "some fixes could not be applied"
                );
            }

            for fix in pass.applied {
                for handle in fix.resources {
                    if seen.insert(handle) {
                        outcome.fixed.push(handle);
                    }
                }
                outcome.descriptions.push(fix.description);
            }
        }

        info!(
            fixes = outcome.descriptions.len(),
            resources = outcome.fixed.len(),
            "fix pass finished"
        );
        outcome
    }

    /// `Kind/name (path:line)` of every resource a violation is bound to.
    pub fn describe_resources(&self, violation: &Violation) -> String {
        violation
            .resources
            .iter()
            .map(|h| self.store.describe(*h))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// One line per violation, as printed by the CLI.
    pub fn render_violation(&self, violation: &Violation) -> String {
        let resources = self.describe_resources(violation);
        if resources.is_empty() {
            violation.to_string()
        } else {
            format!("{resources}: {violation}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Linter;
    use crate::resource::{Deployment, Resource};
    use crate::rule::ResourceRule;

    const TWO_DEPLOYMENTS: &str = "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: api
  namespace: fruit
";

    fn linter() -> Linter {
        let mut linter = Linter::new();
        linter
            .add_rule(
                ResourceRule::<Deployment>::new("NAMESPACED", "needs a namespace", |d| {
                    d.metadata.namespace.is_some()
                })
                .with_fix(|d| {
                    d.metadata.namespace = Some("default".into());
                    true
                })
                .describe_fix(|d| format!("set namespace of {} to default", d.metadata.name)),
            )
            .add_rule(
                ResourceRule::<Resource>::new("LABELLED", "needs labels", |r| {
                    !r.metadata().labels.is_empty()
                })
                .with_severity(Severity::Info),
            );
        linter
    }

    #[test]
    fn fixes_are_applied_once_in_unit_order() {
        let mut report = linter().lint_str(TWO_DEPLOYMENTS, "d.yaml");
        assert_eq!(report.violations.len(), 3);
        assert_eq!(report.violations_at_least(Severity::Error).count(), 1);
        assert_eq!(report.pending_fixes(), 3);

        let outcome = report.apply_fixes();
        assert_eq!(outcome.descriptions, vec!["set namespace of web to default"]);
        assert_eq!(outcome.fixed.len(), 1);
        assert_eq!(
            report.store.resource(outcome.fixed[0]).unwrap().namespace(),
            Some("default")
        );

        assert!(report.apply_fixes().is_empty());
        assert_eq!(report.pending_fixes(), 0);
    }

    #[test]
    fn relinting_a_fixed_store_only_reports_unfixed_rules() {
        let linter = linter();
        let mut report = linter.lint_str(TWO_DEPLOYMENTS, "d.yaml");
        report.apply_fixes();

        let again = linter.lint_store(report.store);
        let rules: Vec<_> = again.violations.iter().map(|v| v.rule.as_str()).collect();
        assert_eq!(rules, vec!["LABELLED", "LABELLED"]);
    }

    #[test]
    fn rendered_violations_name_their_resources() {
        let report = linter().lint_str(TWO_DEPLOYMENTS, "d.yaml");
        // Within a unit, rules run in ID order.
        assert_eq!(report.violations[0].rule, "LABELLED");
        assert_eq!(
            report.render_violation(&report.violations[1]),
            "Deployment/web (d.yaml:1): [error] NAMESPACED: needs a namespace"
        );
    }
}
