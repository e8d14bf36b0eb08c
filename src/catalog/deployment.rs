// src/catalog/deployment.rs

use crate::resource::Deployment;
use crate::resource::model::{Container, PodSecurityContext, Probe};
use crate::rule::{ResourceRule, RuleEntry};
use crate::types::Severity;

pub const DEPLOYMENT_WITHIN_NAMESPACE: &str = "DEPLOYMENT_WITHIN_NAMESPACE";
pub const DEPLOYMENT_EXISTS_APP_K8S_LABEL: &str = "DEPLOYMENT_EXISTS_APP_K8S_LABEL";
pub const DEPLOYMENT_NON_NIL_SECURITY_CONTEXT: &str = "DEPLOYMENT_NON_NIL_SECURITY_CONTEXT";
pub const DEPLOYMENT_RUN_AS_NON_ROOT: &str = "DEPLOYMENT_RUN_AS_NON_ROOT";
pub const DEPLOYMENT_CONTAINERS_EXIST: &str = "DEPLOYMENT_CONTAINERS_EXIST";
pub const DEPLOYMENT_CONTAINER_LIMITS: &str = "DEPLOYMENT_CONTAINER_LIMITS";
pub const DEPLOYMENT_CONTAINER_EXISTS_LIVENESS: &str = "DEPLOYMENT_CONTAINER_EXISTS_LIVENESS";
pub const DEPLOYMENT_CONTAINER_EXISTS_READINESS: &str = "DEPLOYMENT_CONTAINER_EXISTS_READINESS";
pub const DEPLOYMENT_LIVENESS_READINESS_NONMATCHING: &str =
    "DEPLOYMENT_LIVENESS_READINESS_NONMATCHING";

const APP_LABEL: &str = "app";
const APP_K8S_LABEL: &str = "app.kubernetes.io/name";

pub(super) fn rules() -> Vec<RuleEntry> {
    vec![
        ResourceRule::<Deployment>::new(
            DEPLOYMENT_WITHIN_NAMESPACE,
            "The deployment must be within a namespace",
            |d| d.metadata.namespace.as_deref().is_some_and(|ns| !ns.is_empty()),
        )
        .into(),
        ResourceRule::<Deployment>::new(
            DEPLOYMENT_EXISTS_APP_K8S_LABEL,
            "There should be an app.kubernetes.io/name label on the deployment's spec.template",
            |d| d.spec.template.metadata.labels.contains_key(APP_K8S_LABEL),
        )
        .with_fix(|d| {
            let labels = &mut d.spec.template.metadata.labels;
            match labels.remove(APP_LABEL) {
                Some(value) => {
                    labels.insert(APP_K8S_LABEL.to_string(), value);
                    true
                }
                None => false,
            }
        })
        .describe_fix(|d| {
            format!(
                "moved the app label of deployment {} to {APP_K8S_LABEL}",
                d.metadata.name
            )
        })
        .into(),
        ResourceRule::<Deployment>::new(
            DEPLOYMENT_NON_NIL_SECURITY_CONTEXT,
            "The pod template should declare a security context",
            |d| d.spec.template.spec.security_context.is_some(),
        )
        .with_fix(|d| {
            d.spec.template.spec.security_context = Some(PodSecurityContext::default());
            true
        })
        .describe_fix(|d| {
            format!(
                "set the pod security context of deployment {} to an empty map",
                d.metadata.name
            )
        })
        .into(),
        ResourceRule::<Deployment>::new(
            DEPLOYMENT_RUN_AS_NON_ROOT,
            "The pod template should enforce that containers run as non-root users",
            |d| {
                d.spec
                    .template
                    .spec
                    .security_context
                    .as_ref()
                    .and_then(|ctx| ctx.run_as_non_root)
                    == Some(true)
            },
        )
        .after(DEPLOYMENT_NON_NIL_SECURITY_CONTEXT)
        .with_fix(|d| match d.spec.template.spec.security_context.as_mut() {
            Some(ctx) => {
                ctx.run_as_non_root = Some(true);
                true
            }
            None => false,
        })
        .describe_fix(|d| format!("set runAsNonRoot to true on deployment {}", d.metadata.name))
        .into(),
        ResourceRule::<Deployment>::new(
            DEPLOYMENT_CONTAINERS_EXIST,
            "The pod template should declare at least one container",
            |d| !d.spec.template.spec.containers.is_empty(),
        )
        .into(),
        ResourceRule::<Deployment>::new(
            DEPLOYMENT_CONTAINER_LIMITS,
            "Every container must set resources.limits and resources.requests",
            |d| d.spec.template.spec.containers.iter().all(has_limits_and_requests),
        )
        .after(DEPLOYMENT_CONTAINERS_EXIST)
        .into(),
        ResourceRule::<Deployment>::new(
            DEPLOYMENT_CONTAINER_EXISTS_LIVENESS,
            "The first container should declare an HTTP liveness probe",
            |d| first_container(d).is_some_and(|c| http_probe_path(c.liveness_probe.as_ref()).is_some()),
        )
        .after(DEPLOYMENT_CONTAINERS_EXIST)
        .into(),
        ResourceRule::<Deployment>::new(
            DEPLOYMENT_CONTAINER_EXISTS_READINESS,
            "The first container should declare an HTTP readiness probe",
            |d| first_container(d).is_some_and(|c| http_probe_path(c.readiness_probe.as_ref()).is_some()),
        )
        .after(DEPLOYMENT_CONTAINERS_EXIST)
        .into(),
        ResourceRule::<Deployment>::new(
            DEPLOYMENT_LIVENESS_READINESS_NONMATCHING,
            "The liveness and readiness probes should not hit the same endpoint",
            |d| {
                first_container(d).is_some_and(|c| {
                    http_probe_path(c.liveness_probe.as_ref())
                        != http_probe_path(c.readiness_probe.as_ref())
                })
            },
        )
        .after(DEPLOYMENT_CONTAINER_EXISTS_LIVENESS)
        .after(DEPLOYMENT_CONTAINER_EXISTS_READINESS)
        .with_severity(Severity::Warn)
        .into(),
    ]
}

fn first_container(d: &Deployment) -> Option<&Container> {
    d.spec.template.spec.containers.first()
}

fn http_probe_path(probe: Option<&Probe>) -> Option<&str> {
    let action = probe?.http_get.as_ref()?;
    Some(action.path.as_deref().unwrap_or("/"))
}

fn has_limits_and_requests(c: &Container) -> bool {
    c.resources
        .as_ref()
        .is_some_and(|r| !r.limits.is_empty() && !r.requests.is_empty())
}
