// src/engine/mod.rs

//! Batch driver.
//!
//! [`Linter`] holds the registered rule definitions, turns a batch of
//! resources into evaluation units and evaluates them. The outcome is a
//! [`LintReport`], which also carries each unit's fix graph so fixes can be
//! applied afterwards.

pub mod linter;
pub mod report;

pub use linter::Linter;
pub use report::{FixOutcome, LintReport};
