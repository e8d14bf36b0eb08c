// src/config/validate.rs

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{LintError, Result};
use crate::resource::read::InputFilter;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = LintError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;

        let fail_on = raw.lint.fail_on.unwrap_or_default();
        let severity_overrides: BTreeMap<_, _> = raw
            .rule
            .iter()
            .filter_map(|(id, section)| section.severity.map(|s| (id.clone(), s)))
            .collect();

        Ok(ConfigFile::new_unchecked(
            raw.lint.rules,
            raw.lint.disable,
            fail_on,
            raw.input.include,
            raw.input.exclude,
            severity_overrides,
        ))
    }
}

/// Validate a raw config without converting it.
pub fn validate_config(raw: &RawConfigFile) -> Result<()> {
    validate_raw_config(raw)
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_rule_names(cfg)?;
    validate_enabled_disabled(cfg)?;
    validate_globs(cfg)?;
    Ok(())
}

fn validate_rule_names(cfg: &RawConfigFile) -> Result<()> {
    let ids = catalog::rule_ids();
    let known: BTreeSet<&str> = ids.iter().map(String::as_str).collect();

    let named = cfg
        .lint
        .rules
        .iter()
        .map(|id| ("[lint].rules", id))
        .chain(cfg.lint.disable.iter().map(|id| ("[lint].disable", id)))
        .chain(cfg.rule.keys().map(|id| ("[rule.<ID>]", id)));

    for (location, id) in named {
        if !known.contains(id.as_str()) {
            return Err(LintError::ConfigError(format!(
                "unknown rule '{id}' in {location}"
            )));
        }
    }
    Ok(())
}

fn validate_enabled_disabled(cfg: &RawConfigFile) -> Result<()> {
    for id in &cfg.lint.rules {
        if cfg.lint.disable.contains(id) {
            return Err(LintError::ConfigError(format!(
                "rule '{id}' is both enabled in [lint].rules and listed in [lint].disable"
            )));
        }
    }
    Ok(())
}

fn validate_globs(cfg: &RawConfigFile) -> Result<()> {
    InputFilter::new(&cfg.input.include, &cfg.input.exclude)?;
    Ok(())
}
