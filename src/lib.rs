// src/lib.rs

pub mod catalog;
pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod resource;
pub mod rule;
pub mod types;

use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::catalog::predefined_linter;
use crate::cli::CliArgs;
use crate::config::load_or_default;
use crate::engine::{Linter, LintReport};
use crate::fs::{FileSystem, RealFileSystem};
use crate::resource::Resource;
use crate::resource::encode::{to_yaml, write_yaml};
use crate::types::Severity;

/// What a run found, used by `main.rs` for the exit status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub resources: usize,
    /// Violations reported, before any fix.
    pub violations: usize,
    /// Violations at or above `fail_on` left after fixing.
    pub failing: usize,
    pub fixes: usize,
    pub errors: usize,
    pub fatal: bool,
}

impl RunSummary {
    pub fn is_failure(&self) -> bool {
        self.failing > 0 || self.errors > 0
    }

    /// Process exit status: 0 when clean, 1 for findings or per-file errors,
    /// 2 when the rule set itself could not be scheduled.
    pub fn exit_code(&self) -> i32 {
        if self.fatal {
            2
        } else if self.is_failure() {
            1
        } else {
            0
        }
    }
}

/// High-level entry point used by `main.rs`.
///
/// Findings go to stdout, unless `--fix` writes YAML there, in which case
/// they go to stderr.
pub fn run(args: CliArgs) -> Result<RunSummary> {
    let stdout = io::stdout();
    let stderr = io::stderr();
    run_with(&args, &RealFileSystem, &mut stdout.lock(), &mut stderr.lock())
}

/// [`run`] against an arbitrary filesystem and output streams.
pub fn run_with(
    args: &CliArgs,
    fs: &dyn FileSystem,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<RunSummary> {
    let config = load_or_default(fs, args.config.as_deref()).context("loading config")?;
    let linter = predefined_linter(&config).context("building rule set")?;

    if args.list_rules {
        print_rules(&linter, out)?;
        return Ok(RunSummary::default());
    }

    let yaml_on_stdout = args.fix && args.output.is_none();
    let findings: &mut dyn Write = if yaml_on_stdout { &mut *err } else { &mut *out };

    let mut report = linter.lint_paths(fs, &args.paths);
    print_findings(&report, findings)?;

    let mut summary = RunSummary {
        resources: report.store.len(),
        violations: report.violations.len(),
        failing: report.violations_at_least(config.fail_on).count(),
        fixes: 0,
        errors: report.errors.len(),
        fatal: report.has_fatal_errors(),
    };

    if args.fix {
        let outcome = report.apply_fixes();
        for description in &outcome.descriptions {
            writeln!(findings, "fixed: {description}")?;
        }
        summary.fixes = outcome.descriptions.len();

        let fixed: Vec<&Resource> = outcome
            .fixed
            .iter()
            .filter_map(|h| report.store.resource(*h))
            .collect();
        match &args.output {
            Some(path) => {
                write_yaml(fs, path, fixed)
                    .with_context(|| format!("writing fixed resources to {}", path.display()))?;
                debug!(path = %path.display(), "fixed resources written");
            }
            None if !fixed.is_empty() => {
                out.write_all(to_yaml(fixed)?.as_bytes())?;
            }
            None => {}
        }

        summary.failing = remaining_failures(&linter, report, config.fail_on);
    }

    info!(
        resources = summary.resources,
        violations = summary.violations,
        failing = summary.failing,
        fixes = summary.fixes,
        errors = summary.errors,
        "run finished"
    );
    Ok(summary)
}

/// Re-lint the fixed store and count what is still at or above `fail_on`.
fn remaining_failures(linter: &Linter, report: LintReport, fail_on: Severity) -> usize {
    let relinted = linter.lint_store(report.store);
    relinted.violations_at_least(fail_on).count()
}

fn print_findings(report: &LintReport, w: &mut dyn Write) -> Result<()> {
    for violation in &report.violations {
        writeln!(w, "{}", report.render_violation(violation))?;
    }
    for error in &report.errors {
        writeln!(w, "error: {error}")?;
    }
    Ok(())
}

fn print_rules(linter: &Linter, w: &mut dyn Write) -> Result<()> {
    writeln!(w, "Rules ({}):", linter.entries().len())?;
    for entry in linter.entries() {
        let kind = entry.applies_to().unwrap_or("collection");
        let severity = linter.effective_severity(entry);
        if entry.prereqs().is_empty() {
            writeln!(w, "  - {} [{kind}, {severity}]", entry.id())?;
        } else {
            writeln!(
                w,
                "  - {} [{kind}, {severity}] after: {}",
                entry.id(),
                entry.prereqs().join(", ")
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_separates_findings_from_fatal_errors() {
        assert_eq!(RunSummary::default().exit_code(), 0);

        let findings = RunSummary {
            violations: 2,
            failing: 1,
            ..Default::default()
        };
        assert_eq!(findings.exit_code(), 1);

        let below_threshold = RunSummary {
            violations: 2,
            ..Default::default()
        };
        assert_eq!(below_threshold.exit_code(), 0);

        let unschedulable = RunSummary {
            errors: 1,
            fatal: true,
            ..Default::default()
        };
        assert_eq!(unschedulable.exit_code(), 2);
    }
}
