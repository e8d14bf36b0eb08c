// src/engine/linter.rs

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graphmap::DiGraphMap;
use tracing::{Level, debug, error, info, warn};

use crate::dag::{self, Evaluation};
use crate::errors::{LintError, Result};
use crate::fs::FileSystem;
use crate::resource::decode::decode_str;
use crate::resource::kind::{ANY_KIND, SUPPORTED_KINDS};
use crate::resource::read::{InputFilter, read_paths};
use crate::resource::{Kind, ResourceHandle, ResourceStore};
use crate::rule::{CollectionRule, ResourceRule, Rule, RuleEntry};
use crate::types::{RuleId, Severity};

use super::report::LintReport;

/// Registry of rule definitions plus the batch driver that runs them.
///
/// One evaluation unit is built per resource (every resource rule that
/// applies to its kind) and one for the whole collection (every collection
/// rule). Units are evaluated independently.
#[derive(Debug, Clone, Default)]
pub struct Linter {
    entries: Vec<RuleEntry>,
    severity_overrides: BTreeMap<RuleId, Severity>,
    input_filter: InputFilter,
}

impl Linter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule<K: Kind>(&mut self, rule: ResourceRule<K>) -> &mut Self {
        self.entries.push(rule.into());
        self
    }

    pub fn add_collection_rule(&mut self, rule: CollectionRule) -> &mut Self {
        self.entries.push(rule.into());
        self
    }

    pub fn with_rules<I, R>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RuleEntry>,
    {
        self.entries.extend(rules.into_iter().map(Into::into));
        self
    }

    /// Report `rule` at `severity` instead of the severity it declares.
    pub fn override_severity(&mut self, rule: impl Into<RuleId>, severity: Severity) -> &mut Self {
        self.severity_overrides.insert(rule.into(), severity);
        self
    }

    pub fn with_input_filter(mut self, filter: InputFilter) -> Self {
        self.input_filter = filter;
        self
    }

    /// Registered rule IDs, in registration order.
    pub fn rule_ids(&self) -> Vec<&str> {
        self.entries.iter().map(RuleEntry::id).collect()
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    /// Severity a rule is reported at, after overrides.
    pub fn effective_severity(&self, entry: &RuleEntry) -> Severity {
        self.severity_overrides
            .get(entry.id())
            .copied()
            .unwrap_or_else(|| entry.severity())
    }

    /// Check the registered prerequisites without touching any resource.
    ///
    /// For every kind, the rules that can land in one unit (that kind's rules
    /// plus rules for any resource) must have unique IDs, must only name
    /// prerequisites among themselves, and must not form a cycle.
    pub fn validate(&self) -> Result<()> {
        for kind in SUPPORTED_KINDS {
            let unit: Vec<&RuleEntry> = self
                .entries
                .iter()
                .filter(|e| matches!(e.applies_to(), Some(k) if k == *kind || k == ANY_KIND))
                .collect();
            validate_unit(kind, &unit)?;
        }

        let collection: Vec<&RuleEntry> = self
            .entries
            .iter()
            .filter(|e| e.applies_to().is_none())
            .collect();
        validate_unit("collection", &collection)?;

        debug!(rules = self.entries.len(), "rule prerequisites validated");
        Ok(())
    }

    /// Read, decode and lint everything under `paths`.
    pub fn lint_paths(&self, fs: &dyn FileSystem, paths: &[PathBuf]) -> LintReport {
        let (decoded, errors) = read_paths(fs, paths, &self.input_filter);
        let mut store = ResourceStore::new();
        store.extend(decoded);
        self.lint_with_errors(store, errors)
    }

    /// Decode and lint one YAML stream; `path` is only used for locations.
    pub fn lint_str(&self, content: &str, path: impl AsRef<Path>) -> LintReport {
        let (decoded, errors) = decode_str(content, path.as_ref());
        let mut store = ResourceStore::new();
        store.extend(decoded);
        self.lint_with_errors(store, errors.into_iter().map(LintError::from).collect())
    }

    pub fn lint_store(&self, store: ResourceStore) -> LintReport {
        self.lint_with_errors(store, Vec::new())
    }

    fn lint_with_errors(&self, store: ResourceStore, mut errors: Vec<LintError>) -> LintReport {
        let mut violations = Vec::new();
        let mut fix_graphs = Vec::new();

        let handles: Vec<ResourceHandle> = store.handles().collect();
        for handle in handles {
            let rules = self.materialize_for(handle, &store);
            if rules.is_empty() {
                continue;
            }
            let unit = store.describe(handle);
            match dag::evaluate(rules, &store) {
                Ok(eval) => {
                    log_evaluation(&unit, &eval);
                    violations.extend(eval.violations);
                    fix_graphs.push(eval.fix_graph);
                }
                Err(err) => {
                    warn!(unit = %unit, error = %err, "rule scheduling failed");
                    errors.push(err);
                }
            }
        }

        let collection = self.materialize_collection(&store);
        if !collection.is_empty() {
            match dag::evaluate(collection, &store) {
                Ok(eval) => {
                    log_evaluation("collection", &eval);
                    violations.extend(eval.violations);
                    fix_graphs.push(eval.fix_graph);
                }
                Err(err) => {
                    warn!(unit = "collection", error = %err, "rule scheduling failed");
                    errors.push(err);
                }
            }
        }

        info!(
            resources = store.len(),
            violations = violations.len(),
            errors = errors.len(),
            "lint finished"
        );

        LintReport::new(store, violations, errors, fix_graphs)
    }

    fn materialize_for(&self, handle: ResourceHandle, store: &ResourceStore) -> Vec<Rule> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                RuleEntry::Resource(def) => def.materialize(handle, store),
                RuleEntry::Collection(_) => None,
            })
            .map(|rule| self.apply_override(rule))
            .collect()
    }

    fn materialize_collection(&self, store: &ResourceStore) -> Vec<Rule> {
        if store.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                RuleEntry::Collection(rule) => Some(rule.materialize(store)),
                RuleEntry::Resource(_) => None,
            })
            .map(|rule| self.apply_override(rule))
            .collect()
    }

    fn apply_override(&self, mut rule: Rule) -> Rule {
        if let Some(severity) = self.severity_overrides.get(&rule.id) {
            rule.severity = *severity;
        }
        rule
    }
}

fn log_evaluation(unit: &str, eval: &Evaluation) {
    debug!(
        unit = %unit,
        passed = eval.passed.len(),
        failed = eval.failed.len(),
        cascaded = eval.cascaded.len(),
        "evaluated unit"
    );
    for violation in &eval.violations {
        let level = Level::from(violation.severity);
        if level == Level::ERROR {
            error!(unit = %unit, "{violation}");
        } else if level == Level::WARN {
            warn!(unit = %unit, "{violation}");
        } else if level == Level::INFO {
            info!(unit = %unit, "{violation}");
        } else {
            debug!(unit = %unit, "{violation}");
        }
    }
}

fn validate_unit(kind: &str, unit: &[&RuleEntry]) -> Result<()> {
    let mut ids: BTreeSet<&str> = BTreeSet::new();
    for entry in unit {
        if !ids.insert(entry.id()) {
            return Err(LintError::DuplicateRule(entry.id().to_string()));
        }
    }

    // Edge direction: prereq -> rule.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for entry in unit {
        graph.add_node(entry.id());
    }
    for entry in unit {
        for prereq in entry.prereqs() {
            if !ids.contains(prereq.as_str()) {
                return Err(LintError::UnknownPrerequisite {
                    rule: entry.id().to_string(),
                    prereq: prereq.clone(),
                    kind: kind.to_string(),
                });
            }
            graph.add_edge(prereq.as_str(), entry.id(), ());
        }
    }

    if toposort(&graph, None).is_ok() {
        return Ok(());
    }

    // Name every rule that sits on a cycle, and the cycle members it waits on.
    let mut on_cycle: BTreeSet<&str> = BTreeSet::new();
    for component in tarjan_scc(&graph) {
        let cyclic = component.len() > 1
            || component
                .first()
                .is_some_and(|n| graph.contains_edge(*n, *n));
        if cyclic {
            on_cycle.extend(component);
        }
    }

    let waiting = unit
        .iter()
        .filter(|e| on_cycle.contains(e.id()))
        .map(|e| {
            let on = e
                .prereqs()
                .iter()
                .filter(|p| on_cycle.contains(p.as_str()))
                .cloned()
                .collect();
            (e.id().to_string(), on)
        })
        .collect::<BTreeMap<RuleId, Vec<RuleId>>>()
        .into_iter()
        .collect();

    Err(LintError::UnsatisfiableOrder { waiting })
}
