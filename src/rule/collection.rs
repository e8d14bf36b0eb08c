// src/rule/collection.rs

//! Interdependent rules: conditions over the whole resource collection.
//!
//! The condition runs once, when the rule is materialized, because its
//! offending subset decides which resources the rule is bound to. A rule whose
//! verdict is fixed before scheduling cannot wait on anything, so
//! [`CollectionRule`] has no way to declare prerequisites.

use std::sync::Arc;

use crate::resource::{ResourceHandle, ResourceStore};
use crate::types::{RuleId, Severity};

use super::{Rule, RuleLogic};

/// Result of a collection condition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionVerdict {
    pub passed: bool,
    /// Resources responsible for a failure. May be empty even on failure.
    pub offending: Vec<ResourceHandle>,
}

impl CollectionVerdict {
    pub fn pass() -> Self {
        Self {
            passed: true,
            offending: Vec::new(),
        }
    }

    pub fn fail(offending: Vec<ResourceHandle>) -> Self {
        Self {
            passed: false,
            offending,
        }
    }

    /// Passes iff nothing offends.
    pub fn from_offending(offending: Vec<ResourceHandle>) -> Self {
        Self {
            passed: offending.is_empty(),
            offending,
        }
    }
}

type Condition = Arc<dyn Fn(&ResourceStore) -> CollectionVerdict + Send + Sync>;
type Fix = Arc<dyn Fn(&mut ResourceStore) -> bool + Send + Sync>;
type Describe = Arc<dyn Fn(&ResourceStore) -> String + Send + Sync>;

#[derive(Clone)]
pub struct CollectionRule {
    id: RuleId,
    message: String,
    severity: Severity,
    condition: Condition,
    fix: Option<Fix>,
    describe: Option<Describe>,
}

impl CollectionRule {
    pub fn new<F>(id: impl Into<RuleId>, message: impl Into<String>, condition: F) -> Self
    where
        F: Fn(&ResourceStore) -> CollectionVerdict + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            message: message.into(),
            severity: Severity::default(),
            condition: Arc::new(condition),
            fix: None,
            describe: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_fix<F>(mut self, fix: F) -> Self
    where
        F: Fn(&mut ResourceStore) -> bool + Send + Sync + 'static,
    {
        self.fix = Some(Arc::new(fix));
        self
    }

    pub fn describe_fix<F>(mut self, describe: F) -> Self
    where
        F: Fn(&ResourceStore) -> String + Send + Sync + 'static,
    {
        self.describe = Some(Arc::new(describe));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Evaluate the condition now and bind the result into a [`Rule`].
    ///
    /// The rule is bound to the offending resources, or to every resource in
    /// the store when the verdict names none.
    pub fn materialize(&self, store: &ResourceStore) -> Rule {
        let verdict = (self.condition)(store);
        let bound: Vec<ResourceHandle> = if verdict.offending.is_empty() {
            store.handles().collect()
        } else {
            verdict.offending.clone()
        };

        let logic = ReplayedVerdict {
            passed: verdict.passed,
            fix: self.fix.clone(),
            describe: self.describe.clone(),
        };
        let mut rule = Rule::new(self.id.clone(), logic)
            .message(self.message.clone())
            .severity(self.severity);
        rule.bound = bound;
        rule
    }
}

/// Logic of a materialized collection rule: the check returns the verdict
/// computed at materialization, the fix acts on the whole store.
struct ReplayedVerdict {
    passed: bool,
    fix: Option<Fix>,
    describe: Option<Describe>,
}

impl RuleLogic for ReplayedVerdict {
    fn check(&self, _bound: &[ResourceHandle], _store: &ResourceStore) -> bool {
        self.passed
    }

    fn fix(&self, _bound: &[ResourceHandle], store: &mut ResourceStore) -> bool {
        self.fix.as_ref().is_some_and(|f| f(store))
    }

    fn fix_description(&self, _bound: &[ResourceHandle], store: &ResourceStore) -> Option<String> {
        self.describe.as_ref().map(|d| d(store))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::resource::{Namespace, Resource};

    fn namespaced_store(namespaces: &[&str]) -> ResourceStore {
        let mut store = ResourceStore::new();
        for ns in namespaces {
            let mut r = Resource::Namespace(Namespace {
                api_version: "v1".into(),
                kind: "Namespace".into(),
                ..Default::default()
            });
            r.set_namespace(*ns);
            store.insert(r);
        }
        store
    }

    #[test]
    fn condition_runs_once_at_materialization() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let store = namespaced_store(&["a", "b"]);
        let rule = CollectionRule::new("ONE", "one namespace", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            CollectionVerdict::fail(Vec::new())
        })
        .materialize(&store);

        assert!(!rule.check(&store));
        assert!(!rule.check(&store));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(rule.prereqs.is_empty());
    }

    #[test]
    fn binds_offenders_or_everything() {
        let store = namespaced_store(&["a", "b", "c"]);
        let handles: Vec<_> = store.handles().collect();

        let offenders = handles[1..].to_vec();
        let rule = CollectionRule::new("SOME", "some", move |_| {
            CollectionVerdict::from_offending(offenders.clone())
        })
        .materialize(&store);
        assert_eq!(rule.bound, handles[1..].to_vec());

        let rule = CollectionRule::new("ALL", "all", |_| CollectionVerdict::fail(Vec::new()))
            .materialize(&store);
        assert_eq!(rule.bound, handles);
    }

    #[test]
    fn fix_acts_on_the_whole_store() {
        let mut store = namespaced_store(&["a", "b"]);
        let rule = CollectionRule::new("SAME", "same namespace", |_| {
            CollectionVerdict::fail(Vec::new())
        })
        .with_fix(|store| {
            for r in store.resources_mut() {
                r.set_namespace("a");
            }
            true
        })
        .describe_fix(|_| "moved everything to a".to_string())
        .materialize(&store);

        assert!(rule.fix(&mut store));
        assert!(store.resources().all(|r| r.namespace() == Some("a")));
        assert_eq!(rule.fix_description(&store), "moved everything to a");
    }
}
