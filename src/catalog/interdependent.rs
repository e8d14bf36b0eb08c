// src/catalog/interdependent.rs

//! Rules over the whole batch. These can't declare prerequisites, so each
//! condition guards itself (e.g. the network policy rule passes when there
//! isn't exactly one namespace to attach a policy to).

use crate::resource::{
    Kind, Namespace, NetworkPolicy, Resource, ResourceHandle, ResourceStore,
};
use crate::rule::{CollectionRule, CollectionVerdict, RuleEntry};

pub const INTERDEPENDENT_ONE_NAMESPACE: &str = "INTERDEPENDENT_ONE_NAMESPACE";
pub const INTERDEPENDENT_MATCHING_NAMESPACE: &str = "INTERDEPENDENT_MATCHING_NAMESPACE";
pub const INTERDEPENDENT_NETWORK_POLICY_REQUIRED: &str = "INTERDEPENDENT_NETWORK_POLICY_REQUIRED";

pub(super) fn rules() -> Vec<RuleEntry> {
    vec![
        CollectionRule::new(
            INTERDEPENDENT_ONE_NAMESPACE,
            "The unit should contain exactly one namespace",
            |store| {
                let namespaces = namespaces(store);
                CollectionVerdict {
                    passed: namespaces.len() == 1,
                    offending: namespaces,
                }
            },
        )
        .into(),
        CollectionRule::new(
            INTERDEPENDENT_MATCHING_NAMESPACE,
            "All resources must be under the unit's namespace",
            |store| {
                let Some(namespace) = unit_namespace(store) else {
                    return CollectionVerdict::pass();
                };
                let offending = store
                    .iter()
                    .filter(|(_, d)| !is_namespace(&d.resource))
                    .filter(|(_, d)| d.resource.namespace() != Some(namespace.as_str()))
                    .map(|(h, _)| h)
                    .collect();
                CollectionVerdict::from_offending(offending)
            },
        )
        .with_fix(|store| {
            let Some(namespace) = unit_namespace(store) else {
                return false;
            };
            for resource in store.resources_mut() {
                if !is_namespace(resource) {
                    resource.set_namespace(namespace.clone());
                }
            }
            true
        })
        .describe_fix(|store| match unit_namespace(store) {
            Some(ns) => format!("moved every resource into namespace {ns}"),
            None => "moved every resource into the unit's namespace".to_string(),
        })
        .into(),
        CollectionRule::new(
            INTERDEPENDENT_NETWORK_POLICY_REQUIRED,
            "There must be a network policy defined",
            |store| {
                if namespaces(store).len() != 1 {
                    return CollectionVerdict::pass();
                }
                let found = store
                    .resources()
                    .any(|r| NetworkPolicy::from_resource(r).is_some());
                if found {
                    CollectionVerdict::pass()
                } else {
                    CollectionVerdict::fail(Vec::new())
                }
            },
        )
        .into(),
    ]
}

fn is_namespace(resource: &Resource) -> bool {
    Namespace::from_resource(resource).is_some()
}

fn namespaces(store: &ResourceStore) -> Vec<ResourceHandle> {
    store
        .iter()
        .filter(|(_, d)| is_namespace(&d.resource))
        .map(|(h, _)| h)
        .collect()
}

/// Name of the first namespace in the batch.
fn unit_namespace(store: &ResourceStore) -> Option<String> {
    store
        .resources()
        .find(|r| is_namespace(r))
        .map(|r| r.name().to_string())
}
