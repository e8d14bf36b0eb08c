// src/catalog/mod.rs

//! Predefined rules shipped with the binary.
//!
//! Grouped by what they look at:
//! - [`deployment`]: namespaces, labels, pod security context, containers
//!   and probes of deployments.
//! - [`job`]: jobs and cronjobs.
//! - [`naming`]: DNS-safe names for namespaces and services.
//! - [`interdependent`]: rules over the whole batch.

pub mod deployment;
pub mod interdependent;
pub mod job;
pub mod naming;

use tracing::debug;

use crate::config::ConfigFile;
use crate::engine::Linter;
use crate::errors::Result;
use crate::resource::read::InputFilter;
use crate::rule::RuleEntry;

pub use deployment::{
    DEPLOYMENT_CONTAINER_EXISTS_LIVENESS, DEPLOYMENT_CONTAINER_EXISTS_READINESS,
    DEPLOYMENT_CONTAINER_LIMITS, DEPLOYMENT_CONTAINERS_EXIST, DEPLOYMENT_EXISTS_APP_K8S_LABEL,
    DEPLOYMENT_LIVENESS_READINESS_NONMATCHING, DEPLOYMENT_NON_NIL_SECURITY_CONTEXT,
    DEPLOYMENT_RUN_AS_NON_ROOT, DEPLOYMENT_WITHIN_NAMESPACE,
};
pub use interdependent::{
    INTERDEPENDENT_MATCHING_NAMESPACE, INTERDEPENDENT_NETWORK_POLICY_REQUIRED,
    INTERDEPENDENT_ONE_NAMESPACE,
};
pub use job::{
    CRONJOB_FORBID_CONCURRENT, CRONJOB_WITHIN_NAMESPACE, JOB_EXISTS_TTL, JOB_RESTART_NEVER,
    JOB_WITHIN_NAMESPACE,
};
pub use naming::{NAMESPACE_VALID_DNS, SERVICE_NAME_VALID_DNS, SERVICE_WITHIN_NAMESPACE};

/// Every predefined rule, in catalog order.
pub fn all() -> Vec<RuleEntry> {
    let mut rules = deployment::rules();
    rules.extend(job::rules());
    rules.extend(naming::rules());
    rules.extend(interdependent::rules());
    rules
}

/// IDs of every predefined rule, in catalog order.
pub fn rule_ids() -> Vec<String> {
    all().iter().map(|r| r.id().to_string()).collect()
}

/// Build a [`Linter`] from the catalog as selected by `config`.
///
/// Disabling a rule that others wait on is caught here: the resulting
/// linter fails [`Linter::validate`] with an unknown prerequisite.
pub fn predefined_linter(config: &ConfigFile) -> Result<Linter> {
    let filter = InputFilter::new(&config.include, &config.exclude)?;
    let rules: Vec<RuleEntry> = all()
        .into_iter()
        .filter(|r| config.is_enabled(r.id()))
        .collect();
    debug!(rules = rules.len(), "selected predefined rules");

    let mut linter = Linter::new().with_rules(rules).with_input_filter(filter);
    for (id, severity) in &config.severity_overrides {
        linter.override_severity(id.clone(), *severity);
    }
    linter.validate()?;
    Ok(linter)
}
