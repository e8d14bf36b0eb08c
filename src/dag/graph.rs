// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use anyhow::anyhow;
use tracing::debug;

use crate::errors::{LintError, Result};
use crate::rule::Rule;
use crate::types::RuleId;

/// Scheduling state over a fixed set of rules.
///
/// `nodes` and the reverse `dependents` index never change after
/// construction and are shared between clones. `pending` maps each rule
/// that is still unresolved to the prerequisites it is still waiting on;
/// every clone owns its own copy, so the evaluation graph and the fix graph
/// can be drained independently.
#[derive(Debug, Clone)]
pub struct RuleGraph {
    nodes: Arc<BTreeMap<RuleId, Rule>>,
    /// Direct dependents of each rule ID, including IDs that are only ever
    /// named as prerequisites.
    dependents: Arc<BTreeMap<RuleId, BTreeSet<RuleId>>>,
    pending: BTreeMap<RuleId, BTreeSet<RuleId>>,
}

impl RuleGraph {
    /// Build a graph from materialized rules.
    ///
    /// Each rule starts out waiting on its direct prerequisites. Prerequisites
    /// that name no registered rule are kept as-is; they surface later as
    /// [`LintError::UnsatisfiableOrder`] when the graph cannot make progress.
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Result<Self> {
        let mut nodes = BTreeMap::new();
        let mut dependents: BTreeMap<RuleId, BTreeSet<RuleId>> = BTreeMap::new();
        let mut pending = BTreeMap::new();

        for rule in rules {
            if nodes.contains_key(&rule.id) {
                return Err(LintError::DuplicateRule(rule.id));
            }
            for prereq in &rule.prereqs {
                dependents
                    .entry(prereq.clone())
                    .or_default()
                    .insert(rule.id.clone());
            }
            pending.insert(rule.id.clone(), rule.prereqs.clone());
            nodes.insert(rule.id.clone(), rule);
        }

        Ok(Self {
            nodes: Arc::new(nodes),
            dependents: Arc::new(dependents),
            pending,
        })
    }

    /// `true` once every rule has been resolved.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of unresolved rules.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether `id` is still unresolved in this graph.
    pub fn contains(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    /// Take the ready rule with the lowest ID and mark it resolved.
    ///
    /// Fails with [`LintError::UnsatisfiableOrder`] when rules remain but
    /// none is ready, which means a prerequisite cycle or a prerequisite that
    /// was never registered.
    pub fn pop_next_available(&mut self) -> Result<Rule> {
        let ready = self
            .pending
            .iter()
            .find(|(_, waiting_on)| waiting_on.is_empty())
            .map(|(id, _)| id.clone());

        let Some(id) = ready else {
            return Err(self.unsatisfiable());
        };

        self.resolve(&id);
        debug!(rule = %id, remaining = self.pending.len(), "popped ready rule");
        self.node(&id).cloned()
    }

    /// Every unresolved rule whose prerequisites lead back to `id`.
    ///
    /// Breadth-first from `id`, visiting each rule once and expanding only
    /// through rules that are still unresolved. Direct dependents come
    /// before indirect ones; siblings are in ID order.
    pub fn transitive_dependents(&self, id: &str) -> Vec<RuleId> {
        let mut found = Vec::new();
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();

        visited.insert(id);
        queue.push_back(id);

        while let Some(current) = queue.pop_front() {
            let Some(direct) = self.dependents.get(current) else {
                continue;
            };
            for dependent in direct {
                if !self.pending.contains_key(dependent) {
                    continue;
                }
                if visited.insert(dependent.as_str()) {
                    found.push(dependent.clone());
                    queue.push_back(dependent.as_str());
                }
            }
        }

        found
    }

    /// Resolve every transitive dependent of `id` without running it, and
    /// return those rules in [`transitive_dependents`](Self::transitive_dependents)
    /// order.
    pub fn pop_dependent_rules(&mut self, id: &str) -> Result<Vec<Rule>> {
        let dependents = self.transitive_dependents(id);
        let mut rules = Vec::with_capacity(dependents.len());
        for dependent in dependents {
            self.resolve(&dependent);
            rules.push(self.node(&dependent)?.clone());
        }
        if !rules.is_empty() {
            debug!(rule = %id, dropped = rules.len(), "popped dependents of rule");
        }
        Ok(rules)
    }

    /// Resolve `id` without running it and without touching its dependents
    /// beyond releasing their wait on it.
    ///
    /// Returns whether `id` was still unresolved.
    pub fn remove(&mut self, id: &str) -> bool {
        let removed = self.resolve(id);
        if removed {
            debug!(rule = %id, "removed rule from graph");
        }
        removed
    }

    /// Drop `id`'s pending entry and release everything waiting on it.
    fn resolve(&mut self, id: &str) -> bool {
        let was_pending = self.pending.remove(id).is_some();
        if let Some(direct) = self.dependents.get(id) {
            for dependent in direct {
                if let Some(waiting_on) = self.pending.get_mut(dependent) {
                    waiting_on.remove(id);
                }
            }
        }
        was_pending
    }

    fn node(&self, id: &str) -> Result<&Rule> {
        self.nodes
            .get(id)
            .ok_or_else(|| LintError::Other(anyhow!("rule '{id}' is pending but has no node")))
    }

    fn unsatisfiable(&self) -> LintError {
        let waiting = self
            .pending
            .iter()
            .map(|(id, on)| (id.clone(), on.iter().cloned().collect()))
            .collect();
        LintError::UnsatisfiableOrder { waiting }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::ClosureLogic;

    fn rule(id: &str, prereqs: &[&str]) -> Rule {
        Rule::new(id, ClosureLogic::new()).after(prereqs.iter().copied())
    }

    fn drain_ids(graph: &mut RuleGraph) -> Vec<RuleId> {
        let mut order = Vec::new();
        while !graph.is_empty() {
            order.push(graph.pop_next_available().unwrap().id);
        }
        order
    }

    #[test]
    fn pops_in_dependency_order_lowest_id_first() {
        let mut graph = RuleGraph::new(vec![
            rule("C", &["A"]),
            rule("B", &[]),
            rule("A", &[]),
            rule("D", &["B", "C"]),
        ])
        .unwrap();

        assert_eq!(graph.len(), 4);
        assert_eq!(drain_ids(&mut graph), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn clones_share_rules_but_not_progress() {
        let mut graph = RuleGraph::new(vec![rule("A", &[]), rule("B", &["A"])]).unwrap();
        let fix_graph = graph.clone();

        drain_ids(&mut graph);
        assert!(graph.is_empty());
        assert_eq!(fix_graph.len(), 2);
        assert!(fix_graph.contains("A"));
        assert!(Arc::ptr_eq(&graph.nodes, &fix_graph.nodes));
    }

    #[test]
    fn cycle_is_unsatisfiable() {
        let mut graph = RuleGraph::new(vec![rule("A", &["B"]), rule("B", &["A"])]).unwrap();
        match graph.pop_next_available() {
            Err(LintError::UnsatisfiableOrder { waiting }) => {
                assert_eq!(
                    waiting,
                    vec![
                        ("A".to_string(), vec!["B".to_string()]),
                        ("B".to_string(), vec!["A".to_string()]),
                    ]
                );
            }
            other => panic!("expected UnsatisfiableOrder, got {other:?}"),
        }
    }

    #[test]
    fn missing_prerequisite_is_unsatisfiable_once_the_rest_drains() {
        let mut graph = RuleGraph::new(vec![rule("A", &[]), rule("B", &["GHOST"])]).unwrap();
        assert_eq!(graph.pop_next_available().unwrap().id, "A");
        let err = graph.pop_next_available().unwrap_err();
        assert!(err.to_string().contains("B waits on [GHOST]"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = RuleGraph::new(vec![rule("A", &[]), rule("A", &[])]).unwrap_err();
        assert!(matches!(err, LintError::DuplicateRule(id) if id == "A"));
    }

    #[test]
    fn transitive_dependents_are_breadth_first_and_unique() {
        // A <- B <- D, A <- C <- D, D <- E
        let graph = RuleGraph::new(vec![
            rule("A", &[]),
            rule("B", &["A"]),
            rule("C", &["A"]),
            rule("D", &["B", "C"]),
            rule("E", &["D"]),
            rule("F", &[]),
        ])
        .unwrap();

        assert_eq!(graph.transitive_dependents("A"), vec!["B", "C", "D", "E"]);
        assert_eq!(graph.transitive_dependents("D"), vec!["E"]);
        assert!(graph.transitive_dependents("F").is_empty());
        assert!(graph.transitive_dependents("UNKNOWN").is_empty());
    }

    #[test]
    fn popping_dependents_resolves_them_without_running() {
        let mut graph = RuleGraph::new(vec![
            rule("A", &[]),
            rule("B", &["A"]),
            rule("C", &["B"]),
            rule("D", &[]),
        ])
        .unwrap();

        let a = graph.pop_next_available().unwrap();
        let dropped: Vec<_> = graph
            .pop_dependent_rules(&a.id)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(dropped, vec!["B", "C"]);
        assert_eq!(drain_ids(&mut graph), vec!["D"]);
    }

    #[test]
    fn remove_releases_dependents_without_cascading() {
        let mut graph = RuleGraph::new(vec![rule("A", &[]), rule("B", &["A"])]).unwrap();

        assert!(graph.remove("A"));
        assert!(!graph.remove("A"));
        assert!(graph.contains("B"));
        assert_eq!(drain_ids(&mut graph), vec!["B"]);
    }

    #[test]
    fn resolved_rules_stop_the_dependent_walk() {
        let mut graph = RuleGraph::new(vec![
            rule("A", &[]),
            rule("B", &["A"]),
            rule("C", &["B"]),
        ])
        .unwrap();
        graph.remove("B");
        assert!(graph.transitive_dependents("A").is_empty());
    }
}
