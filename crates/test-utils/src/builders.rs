#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use kubelint::rule::{ClosureLogic, Rule};
use kubelint::types::Severity;

/// How often a built rule's check and fix were called.
#[derive(Debug, Clone, Default)]
pub struct CallCounts {
    checks: Arc<AtomicUsize>,
    fixes: Arc<AtomicUsize>,
}

impl CallCounts {
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    pub fn fixes(&self) -> usize {
        self.fixes.load(Ordering::SeqCst)
    }
}

/// Builder for closure-backed [`Rule`]s with fixed outcomes.
///
/// By default the rule passes its check and cannot be fixed.
pub struct RuleBuilder {
    id: String,
    after: Vec<String>,
    passes: bool,
    fixable: bool,
    severity: Severity,
    message: Option<String>,
}

impl RuleBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            after: vec![],
            passes: true,
            fixable: false,
            severity: Severity::Error,
            message: None,
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.after.push(dep.to_string());
        self
    }

    pub fn failing(mut self) -> Self {
        self.passes = false;
        self
    }

    pub fn passes(mut self, val: bool) -> Self {
        self.passes = val;
        self
    }

    pub fn fixable(mut self, val: bool) -> Self {
        self.fixable = val;
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn build(self) -> Rule {
        self.build_counted().0
    }

    pub fn build_counted(self) -> (Rule, CallCounts) {
        let counts = CallCounts::default();
        let checks = counts.checks.clone();
        let fixes = counts.fixes.clone();
        let passes = self.passes;
        let fixable = self.fixable;
        let description = format!("fixed {}", self.id);

        let logic = ClosureLogic::new()
            .check(move |_, _| {
                checks.fetch_add(1, Ordering::SeqCst);
                passes
            })
            .fix(move |_, _| {
                fixes.fetch_add(1, Ordering::SeqCst);
                fixable
            })
            .describe(move |_, _| description.clone());

        let message = self
            .message
            .unwrap_or_else(|| format!("{} failed", self.id));
        let rule = Rule::new(self.id, logic)
            .after(self.after)
            .message(message)
            .severity(self.severity);
        (rule, counts)
    }
}
