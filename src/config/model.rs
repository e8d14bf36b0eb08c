// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::{RuleId, Severity};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [lint]
/// rules = ["DEPLOYMENT_WITHIN_NAMESPACE"]
/// disable = ["JOB_EXISTS_TTL"]
/// fail_on = "error"
///
/// [input]
/// include = ["**/*.yaml", "**/*.yml"]
/// exclude = ["**/kustomization.yaml"]
///
/// [rule.SERVICE_WITHIN_NAMESPACE]
/// severity = "warn"
/// ```
///
/// All sections are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub lint: LintSection,

    #[serde(default)]
    pub input: InputSection,

    /// Per-rule settings from `[rule.<ID>]`.
    #[serde(default)]
    pub rule: BTreeMap<String, RuleSection>,
}

/// `[lint]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LintSection {
    /// Rules to run. Empty means the whole catalog.
    #[serde(default)]
    pub rules: Vec<String>,

    /// Rules to leave out.
    #[serde(default)]
    pub disable: Vec<String>,

    /// Lowest severity that makes the run fail. Defaults to `"error"`.
    #[serde(default)]
    pub fail_on: Option<Severity>,
}

/// `[input]` section: which files inside directory arguments are read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputSection {
    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,
}

/// `[rule.<ID>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSection {
    #[serde(default)]
    pub severity: Option<Severity>,
}

/// Validated configuration.
///
/// Only built through `TryFrom<RawConfigFile>` (see `config::validate`) or
/// [`Default`], so every rule name in here exists in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    /// Enabled rules; empty means all.
    pub rules: Vec<RuleId>,
    pub disable: Vec<RuleId>,
    pub fail_on: Severity,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub severity_overrides: BTreeMap<RuleId, Severity>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        rules: Vec<RuleId>,
        disable: Vec<RuleId>,
        fail_on: Severity,
        include: Vec<String>,
        exclude: Vec<String>,
        severity_overrides: BTreeMap<RuleId, Severity>,
    ) -> Self {
        Self {
            rules,
            disable,
            fail_on,
            include,
            exclude,
            severity_overrides,
        }
    }

    /// Whether the rule with `id` should be registered.
    pub fn is_enabled(&self, id: &str) -> bool {
        let selected = self.rules.is_empty() || self.rules.iter().any(|r| r == id);
        selected && !self.disable.iter().any(|r| r == id)
    }
}
