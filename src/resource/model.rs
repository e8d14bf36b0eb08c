// src/resource/model.rs

//! Serde models for the resource kinds the linter understands.
//!
//! Only the fields that rules actually inspect are typed. Everything else is
//! kept in a flattened `extra` map on each struct, so a resource that goes
//! through a fix and is re-encoded does not lose data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Untyped fields preserved for round-tripping.
pub type Extra = BTreeMap<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl ObjectMeta {
    pub fn is_empty(&self) -> bool {
        self == &ObjectMeta::default()
    }
}

/// `is_empty` for nested specs, so absent sections are not written back as
/// empty maps.
macro_rules! impl_is_empty {
    ($($ty:ident),* $(,)?) => {
        $(
            impl $ty {
                pub fn is_empty(&self) -> bool {
                    self == &$ty::default()
                }
            }
        )*
    };
}

impl_is_empty!(
    DeploymentSpec,
    PodTemplateSpec,
    PodSpec,
    JobSpec,
    CronJobSpec,
    JobTemplateSpec,
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub api_version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "ObjectMeta::is_empty")]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "DeploymentSpec::is_empty")]
    pub spec: DeploymentSpec,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(default, skip_serializing_if = "PodTemplateSpec::is_empty")]
    pub template: PodTemplateSpec,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodTemplateSpec {
    #[serde(default, skip_serializing_if = "ObjectMeta::is_empty")]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "PodSpec::is_empty")]
    pub spec: PodSpec,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<Container>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<PodSecurityContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSecurityContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_non_root: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_user: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_group: Option<i64>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<SecurityContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<Probe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<Probe>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_privilege_escalation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_non_root: Option<bool>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// CPU / memory quantities stay untyped (`"500m"`, `1`, `"64Mi"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_get: Option<HttpGetAction>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpGetAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub api_version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "ObjectMeta::is_empty")]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "JobSpec::is_empty")]
    pub spec: JobSpec,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_seconds_after_finished: Option<i32>,
    #[serde(default, skip_serializing_if = "PodTemplateSpec::is_empty")]
    pub template: PodTemplateSpec,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJob {
    pub api_version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "ObjectMeta::is_empty")]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "CronJobSpec::is_empty")]
    pub spec: CronJobSpec,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJobSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub schedule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency_policy: Option<String>,
    #[serde(default, skip_serializing_if = "JobTemplateSpec::is_empty")]
    pub job_template: JobTemplateSpec,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTemplateSpec {
    #[serde(default, skip_serializing_if = "ObjectMeta::is_empty")]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "JobSpec::is_empty")]
    pub spec: JobSpec,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Kinds whose bodies no rule looks into: only identity is typed, the rest
/// (`spec`, `rules`, `secrets`, ...) is carried in `extra`.
macro_rules! metadata_only_kind {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            pub api_version: String,
            pub kind: String,
            #[serde(default, skip_serializing_if = "ObjectMeta::is_empty")]
            pub metadata: ObjectMeta,
            #[serde(flatten)]
            pub extra: Extra,
        }
    };
}

metadata_only_kind!(Namespace);
metadata_only_kind!(Service);
metadata_only_kind!(ServiceAccount);
metadata_only_kind!(
    /// Both `networking.k8s.io/v1` and the legacy `extensions/v1beta1`
    /// policies decode into this type.
    NetworkPolicy
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let yaml = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  uid: "1234"
spec:
  replicas: 2
  strategy:
    type: Recreate
  template:
    spec:
      hostNetwork: true
      containers:
        - name: web
          image: nginx
          ports:
            - containerPort: 80
"#;
        let deployment: Deployment = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(deployment.metadata.name, "web");
        assert_eq!(deployment.spec.replicas, Some(2));
        assert!(deployment.spec.extra.contains_key("strategy"));
        assert!(deployment.spec.template.spec.extra.contains_key("hostNetwork"));
        assert!(deployment.metadata.extra.contains_key("uid"));

        let encoded = serde_yaml::to_string(&deployment).unwrap();
        let again: Deployment = serde_yaml::from_str(&encoded).unwrap();
        assert_eq!(deployment, again);
    }

    #[test]
    fn empty_template_metadata_is_not_emitted() {
        let deployment = Deployment {
            api_version: "apps/v1".into(),
            kind: "Deployment".into(),
            ..Default::default()
        };
        let encoded = serde_yaml::to_string(&deployment).unwrap();
        assert!(!encoded.contains("labels"));
        assert!(!encoded.contains("namespace"));
    }

    #[test]
    fn absent_sections_are_not_invented() {
        let yaml = "apiVersion: batch/v1\nkind: CronJob\nmetadata:\n  name: nightly\n";
        let cron: CronJob = serde_yaml::from_str(yaml).unwrap();
        let encoded = serde_yaml::to_string(&cron).unwrap();
        assert_eq!(encoded, yaml);

        let bare = Deployment {
            api_version: "apps/v1".into(),
            kind: "Deployment".into(),
            ..Default::default()
        };
        let encoded = serde_yaml::to_string(&bare).unwrap();
        assert!(!encoded.contains("spec"), "{encoded}");
        assert!(!encoded.contains("containers"), "{encoded}");
        assert!(!encoded.contains("metadata"), "{encoded}");
    }

    #[test]
    fn nested_untyped_fields_are_kept() {
        let yaml = r#"
apiVersion: batch/v1
kind: Job
metadata:
  name: train
spec:
  template:
    priority: high
    spec:
      containers:
        - name: train
          resources:
            limits:
              cpu: "2"
            claims:
              - name: gpu
"#;
        let job: Job = serde_yaml::from_str(yaml).unwrap();
        assert!(job.spec.template.extra.contains_key("priority"));
        let resources = job.spec.template.spec.containers[0]
            .resources
            .as_ref()
            .unwrap();
        assert!(resources.extra.contains_key("claims"));

        let encoded = serde_yaml::to_string(&job).unwrap();
        assert!(encoded.contains("priority: high"), "{encoded}");
        assert!(encoded.contains("- name: gpu"), "{encoded}");
    }
}
