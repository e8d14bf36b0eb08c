// src/catalog/naming.rs

use std::sync::LazyLock;

use regex::Regex;

use crate::resource::{Namespace, Service};
use crate::rule::{ResourceRule, RuleEntry};

pub const NAMESPACE_VALID_DNS: &str = "NAMESPACE_VALID_DNS";
pub const SERVICE_NAME_VALID_DNS: &str = "SERVICE_NAME_VALID_DNS";
pub const SERVICE_WITHIN_NAMESPACE: &str = "SERVICE_WITHIN_NAMESPACE";

/// RFC 1123 label: lowercase alphanumerics and `-`, alphanumeric at both ends.
static DNS_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("static regex"));

const DNS_LABEL_MAX_LEN: usize = 63;

pub fn is_dns_label(name: &str) -> bool {
    name.len() <= DNS_LABEL_MAX_LEN && DNS_LABEL.is_match(name)
}

pub(super) fn rules() -> Vec<RuleEntry> {
    vec![
        ResourceRule::<Namespace>::new(
            NAMESPACE_VALID_DNS,
            "A namespace needs a valid DNS label as its name",
            |ns| is_dns_label(&ns.metadata.name),
        )
        .into(),
        ResourceRule::<Service>::new(
            SERVICE_NAME_VALID_DNS,
            "A service needs a valid DNS label as its name",
            |svc| is_dns_label(&svc.metadata.name),
        )
        .into(),
        ResourceRule::<Service>::new(
            SERVICE_WITHIN_NAMESPACE,
            "A service should have a namespace specified",
            |svc| svc.metadata.namespace.as_deref().is_some_and(|ns| !ns.is_empty()),
        )
        .into(),
    ]
}
