// src/dag/mod.rs

//! Rule scheduling.
//!
//! - [`graph`] holds [`RuleGraph`], the per-unit scheduling state: which rules
//!   are still waiting, and on what.
//! - [`evaluator`] drains a graph, checking rules and cascading failures to
//!   their dependents.
//! - [`fixer`] drains the fix graph left by the evaluator, applying fixes and
//!   silently dropping dependents of anything that could not be fixed.

pub mod evaluator;
pub mod fixer;
pub mod graph;

pub use evaluator::{Evaluation, Violation, evaluate, evaluate_graph};
pub use fixer::{AppliedFix, FixPass, apply_fixes};
pub use graph::RuleGraph;
