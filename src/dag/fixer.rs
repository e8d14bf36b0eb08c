// src/dag/fixer.rs

use tracing::{debug, info};

use crate::errors::Result;
use crate::resource::{ResourceHandle, ResourceStore};
use crate::types::RuleId;

use super::graph::RuleGraph;

/// A fix that succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedFix {
    pub rule: RuleId,
    pub description: String,
    pub resources: Vec<ResourceHandle>,
}

/// Outcome of draining one fix graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixPass {
    /// Successful fixes, in the order they were applied.
    pub applied: Vec<AppliedFix>,
    /// Rules whose fix failed or that have no fix.
    pub unfixable: Vec<RuleId>,
    /// Dependents of unfixable rules; their fixes were never attempted.
    pub skipped: Vec<RuleId>,
}

/// Drain `fix_graph` in dependency order, applying each rule's fix to `store`.
///
/// When a fix fails, every transitive dependent is dropped from the pass
/// without an attempt and without a report.
pub fn apply_fixes(mut fix_graph: RuleGraph, store: &mut ResourceStore) -> Result<FixPass> {
    let mut pass = FixPass::default();

    while !fix_graph.is_empty() {
        let rule = fix_graph.pop_next_available()?;

        if rule.fix(store) {
            let description = rule.fix_description(store);
            info!(rule = %rule.id, "{description}");
            pass.applied.push(AppliedFix {
                rule: rule.id,
                description,
                resources: rule.bound,
            });
            continue;
        }

        let dropped = fix_graph.pop_dependent_rules(&rule.id)?;
        debug!(
            rule = %rule.id,
            skipped = dropped.len(),
            "fix failed; skipping fixes of dependents"
        );
        pass.skipped.extend(dropped.into_iter().map(|r| r.id));
        pass.unfixable.push(rule.id);
    }

    Ok(pass)
}
