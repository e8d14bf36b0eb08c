// src/rule/definition.rs

use std::marker::PhantomData;
use std::sync::Arc;

use crate::resource::{Kind, ResourceHandle, ResourceStore};
use crate::types::{RuleId, Severity};

use super::{Rule, RuleLogic};

/// A declarative rule that can be materialized against single resources.
///
/// Implemented by [`ResourceRule`]; the linter keeps its registry as trait
/// objects so rules for different kinds live side by side.
pub trait RuleDefinition: Send + Sync {
    fn id(&self) -> &str;
    fn prereqs(&self) -> &[RuleId];
    fn message(&self) -> &str;
    fn severity(&self) -> Severity;

    /// Kind the rule applies to, or [`crate::resource::kind::ANY_KIND`].
    fn applies_to(&self) -> &'static str;

    /// Bind the rule to the resource behind `handle`.
    ///
    /// Returns `None` when the resource is not of the rule's kind. Only reads
    /// the store.
    fn materialize(&self, handle: ResourceHandle, store: &ResourceStore) -> Option<Rule>;
}

type Condition<K> = Arc<dyn Fn(&K) -> bool + Send + Sync>;
type Fix<K> = Arc<dyn Fn(&mut K) -> bool + Send + Sync>;
type Describe<K> = Arc<dyn Fn(&K) -> String + Send + Sync>;

/// A rule written against one resource kind `K`.
///
/// ```
/// use kubelint::resource::Deployment;
/// use kubelint::rule::ResourceRule;
///
/// let rule = ResourceRule::<Deployment>::new(
///     "DEPLOYMENT_NAME_CONTAINS_APPLE",
///     "A deployment's name needs to contain \"apple\"",
///     |d| d.metadata.name.contains("apple"),
/// )
/// .with_fix(|d| {
///     d.metadata.name.push_str("-apple");
///     true
/// })
/// .describe_fix(|d| format!("renamed deployment to {}", d.metadata.name));
/// # let _ = rule;
/// ```
pub struct ResourceRule<K: Kind> {
    id: RuleId,
    prereqs: Vec<RuleId>,
    message: String,
    severity: Severity,
    condition: Condition<K>,
    fix: Option<Fix<K>>,
    describe: Option<Describe<K>>,
}

impl<K: Kind> Clone for ResourceRule<K> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            prereqs: self.prereqs.clone(),
            message: self.message.clone(),
            severity: self.severity,
            condition: Arc::clone(&self.condition),
            fix: self.fix.clone(),
            describe: self.describe.clone(),
        }
    }
}

impl<K: Kind> ResourceRule<K> {
    pub fn new<F>(id: impl Into<RuleId>, message: impl Into<String>, condition: F) -> Self
    where
        F: Fn(&K) -> bool + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            prereqs: Vec::new(),
            message: message.into(),
            severity: Severity::default(),
            condition: Arc::new(condition),
            fix: None,
            describe: None,
        }
    }

    /// Declare a prerequisite: this rule only runs once `prereq` has passed.
    pub fn after(mut self, prereq: impl Into<RuleId>) -> Self {
        self.prereqs.push(prereq.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_fix<F>(mut self, fix: F) -> Self
    where
        F: Fn(&mut K) -> bool + Send + Sync + 'static,
    {
        self.fix = Some(Arc::new(fix));
        self
    }

    pub fn describe_fix<F>(mut self, describe: F) -> Self
    where
        F: Fn(&K) -> String + Send + Sync + 'static,
    {
        self.describe = Some(Arc::new(describe));
        self
    }
}

impl<K: Kind> RuleDefinition for ResourceRule<K> {
    fn id(&self) -> &str {
        &self.id
    }

    fn prereqs(&self) -> &[RuleId] {
        &self.prereqs
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn applies_to(&self) -> &'static str {
        K::KIND
    }

    fn materialize(&self, handle: ResourceHandle, store: &ResourceStore) -> Option<Rule> {
        let resource = store.resource(handle)?;
        K::from_resource(resource)?;

        let logic = BoundLogic::<K> {
            condition: Arc::clone(&self.condition),
            fix: self.fix.clone(),
            describe: self.describe.clone(),
            _kind: PhantomData,
        };
        Some(
            Rule::new(self.id.clone(), logic)
                .after(self.prereqs.iter().cloned())
                .message(self.message.clone())
                .severity(self.severity)
                .bind(handle),
        )
    }
}

/// The closures of a [`ResourceRule`], applied to the single bound resource.
struct BoundLogic<K: Kind> {
    condition: Condition<K>,
    fix: Option<Fix<K>>,
    describe: Option<Describe<K>>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Kind> BoundLogic<K> {
    fn view<'s>(bound: &[ResourceHandle], store: &'s ResourceStore) -> Option<&'s K> {
        let handle = *bound.first()?;
        K::from_resource(store.resource(handle)?)
    }
}

impl<K: Kind> RuleLogic for BoundLogic<K> {
    fn check(&self, bound: &[ResourceHandle], store: &ResourceStore) -> bool {
        Self::view(bound, store).is_some_and(|k| (self.condition)(k))
    }

    fn fix(&self, bound: &[ResourceHandle], store: &mut ResourceStore) -> bool {
        let Some(fix) = &self.fix else {
            return false;
        };
        let Some(&handle) = bound.first() else {
            return false;
        };
        store
            .resource_mut(handle)
            .and_then(K::from_resource_mut)
            .is_some_and(|k| fix(k))
    }

    fn fix_description(&self, bound: &[ResourceHandle], store: &ResourceStore) -> Option<String> {
        let describe = self.describe.as_ref()?;
        Self::view(bound, store).map(|k| describe(k))
    }
}
