// src/rule/mod.rs

//! Rules: the unit the scheduler orders, checks and fixes.
//!
//! - [`Rule`] is a rule bound to concrete resources, ready to be scheduled.
//! - [`RuleLogic`] is the behaviour behind a rule (check / fix / describe).
//! - [`definition`] holds [`ResourceRule`], the declarative per-kind rule that
//!   materializes into one [`Rule`] per matching resource.
//! - [`collection`] holds [`CollectionRule`], the interdependent variant that
//!   looks at the whole resource collection at once.

pub mod collection;
pub mod definition;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::resource::{Kind, ResourceHandle, ResourceStore};
use crate::types::{RuleId, Severity};

pub use collection::{CollectionRule, CollectionVerdict};
pub use definition::{ResourceRule, RuleDefinition};

/// Behaviour of a rule, evaluated against the resources the rule is bound to.
///
/// The defaults describe a rule with neither check nor fix: it is always
/// satisfied, and any attempt to fix it fails.
pub trait RuleLogic: Send + Sync {
    fn check(&self, bound: &[ResourceHandle], store: &ResourceStore) -> bool {
        let _ = (bound, store);
        true
    }

    /// Mutate the bound resources so that `check` holds. Returns whether the
    /// mutation succeeded.
    fn fix(&self, bound: &[ResourceHandle], store: &mut ResourceStore) -> bool {
        let _ = (bound, store);
        false
    }

    fn fix_description(&self, bound: &[ResourceHandle], store: &ResourceStore) -> Option<String> {
        let _ = (bound, store);
        None
    }
}

/// A rule bound to the resource(s) it inspects.
#[derive(Clone)]
pub struct Rule {
    pub id: RuleId,
    /// Rules that must pass before this one may run.
    pub prereqs: BTreeSet<RuleId>,
    pub message: String,
    pub severity: Severity,
    /// Resources the rule's check and fix act on; carried into reports.
    pub bound: Vec<ResourceHandle>,
    logic: Arc<dyn RuleLogic>,
}

impl Rule {
    pub fn new(id: impl Into<RuleId>, logic: impl RuleLogic + 'static) -> Self {
        Self::from_arc(id, Arc::new(logic))
    }

    pub fn from_arc(id: impl Into<RuleId>, logic: Arc<dyn RuleLogic>) -> Self {
        Self {
            id: id.into(),
            prereqs: BTreeSet::new(),
            message: String::new(),
            severity: Severity::default(),
            bound: Vec::new(),
            logic,
        }
    }

    pub fn after<I, S>(mut self, prereqs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<RuleId>,
    {
        self.prereqs.extend(prereqs.into_iter().map(Into::into));
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn bind(mut self, handle: ResourceHandle) -> Self {
        self.bound.push(handle);
        self
    }

    pub fn check(&self, store: &ResourceStore) -> bool {
        self.logic.check(&self.bound, store)
    }

    pub fn fix(&self, store: &mut ResourceStore) -> bool {
        self.logic.fix(&self.bound, store)
    }

    /// Description of an applied fix; falls back to the rule ID when the
    /// logic does not describe itself.
    pub fn fix_description(&self, store: &ResourceStore) -> String {
        self.logic
            .fix_description(&self.bound, store)
            .unwrap_or_else(|| format!("applied fix for {}", self.id))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("prereqs", &self.prereqs)
            .field("severity", &self.severity)
            .field("bound", &self.bound)
            .finish_non_exhaustive()
    }
}

/// A registered rule definition of either flavour.
#[derive(Clone)]
pub enum RuleEntry {
    Resource(Arc<dyn RuleDefinition>),
    Collection(CollectionRule),
}

impl RuleEntry {
    pub fn id(&self) -> &str {
        match self {
            RuleEntry::Resource(def) => def.id(),
            RuleEntry::Collection(rule) => rule.id(),
        }
    }

    /// Declared prerequisites; always empty for collection rules.
    pub fn prereqs(&self) -> &[RuleId] {
        match self {
            RuleEntry::Resource(def) => def.prereqs(),
            RuleEntry::Collection(_) => &[],
        }
    }

    pub fn message(&self) -> &str {
        match self {
            RuleEntry::Resource(def) => def.message(),
            RuleEntry::Collection(rule) => rule.message(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            RuleEntry::Resource(def) => def.severity(),
            RuleEntry::Collection(rule) => rule.severity(),
        }
    }

    /// Kind name for resource rules, `None` for collection rules.
    pub fn applies_to(&self) -> Option<&'static str> {
        match self {
            RuleEntry::Resource(def) => Some(def.applies_to()),
            RuleEntry::Collection(_) => None,
        }
    }
}

impl<K: Kind> From<ResourceRule<K>> for RuleEntry {
    fn from(rule: ResourceRule<K>) -> Self {
        RuleEntry::Resource(Arc::new(rule))
    }
}

impl From<CollectionRule> for RuleEntry {
    fn from(rule: CollectionRule) -> Self {
        RuleEntry::Collection(rule)
    }
}

impl fmt::Debug for RuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEntry")
            .field("id", &self.id())
            .field("applies_to", &self.applies_to())
            .field("prereqs", &self.prereqs())
            .finish()
    }
}

type CheckFn = dyn Fn(&[ResourceHandle], &ResourceStore) -> bool + Send + Sync;
type FixFn = dyn Fn(&[ResourceHandle], &mut ResourceStore) -> bool + Send + Sync;
type DescribeFn = dyn Fn(&[ResourceHandle], &ResourceStore) -> String + Send + Sync;

/// [`RuleLogic`] assembled from closures. Missing pieces fall back to the
/// trait defaults.
#[derive(Default)]
pub struct ClosureLogic {
    check: Option<Box<CheckFn>>,
    fix: Option<Box<FixFn>>,
    describe: Option<Box<DescribeFn>>,
}

impl ClosureLogic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check<F>(mut self, f: F) -> Self
    where
        F: Fn(&[ResourceHandle], &ResourceStore) -> bool + Send + Sync + 'static,
    {
        self.check = Some(Box::new(f));
        self
    }

    pub fn fix<F>(mut self, f: F) -> Self
    where
        F: Fn(&[ResourceHandle], &mut ResourceStore) -> bool + Send + Sync + 'static,
    {
        self.fix = Some(Box::new(f));
        self
    }

    pub fn describe<F>(mut self, f: F) -> Self
    where
        F: Fn(&[ResourceHandle], &ResourceStore) -> String + Send + Sync + 'static,
    {
        self.describe = Some(Box::new(f));
        self
    }
}

impl RuleLogic for ClosureLogic {
    fn check(&self, bound: &[ResourceHandle], store: &ResourceStore) -> bool {
        self.check.as_ref().is_none_or(|f| f(bound, store))
    }

    fn fix(&self, bound: &[ResourceHandle], store: &mut ResourceStore) -> bool {
        self.fix.as_ref().is_some_and(|f| f(bound, store))
    }

    fn fix_description(&self, bound: &[ResourceHandle], store: &ResourceStore) -> Option<String> {
        self.describe.as_ref().map(|f| f(bound, store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoLogic;
    impl RuleLogic for NoLogic {}

    #[test]
    fn rule_without_check_or_fix_passes_and_cannot_be_fixed() {
        let mut store = ResourceStore::new();
        let rule = Rule::new("EMPTY", NoLogic);
        assert!(rule.check(&store));
        assert!(!rule.fix(&mut store));
        assert_eq!(rule.fix_description(&store), "applied fix for EMPTY");
    }

    #[test]
    fn closure_logic_delegates_to_its_closures() {
        let mut store = ResourceStore::new();
        let rule = Rule::new(
            "B",
            ClosureLogic::new()
                .check(|_, _| false)
                .fix(|_, _| true)
                .describe(|_, _| "did it".to_string()),
        )
        .after(["A"])
        .message("B must hold")
        .severity(Severity::Warn);

        assert!(!rule.check(&store));
        assert!(rule.fix(&mut store));
        assert_eq!(rule.fix_description(&store), "did it");
        assert!(rule.prereqs.contains("A"));
        assert_eq!(rule.severity, Severity::Warn);
    }
}
