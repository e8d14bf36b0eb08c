// src/catalog/job.rs

use crate::resource::{CronJob, Job};
use crate::rule::{ResourceRule, RuleEntry};

pub const JOB_WITHIN_NAMESPACE: &str = "JOB_WITHIN_NAMESPACE";
pub const JOB_RESTART_NEVER: &str = "JOB_RESTART_NEVER";
pub const JOB_EXISTS_TTL: &str = "JOB_EXISTS_TTL";
pub const CRONJOB_WITHIN_NAMESPACE: &str = "CRONJOB_WITHIN_NAMESPACE";
pub const CRONJOB_FORBID_CONCURRENT: &str = "CRONJOB_FORBID_CONCURRENT";

const NEVER: &str = "Never";
const FORBID: &str = "Forbid";

pub(super) fn rules() -> Vec<RuleEntry> {
    vec![
        ResourceRule::<Job>::new(
            JOB_WITHIN_NAMESPACE,
            "A job should have a namespace specified",
            |job| job.metadata.namespace.as_deref().is_some_and(|ns| !ns.is_empty()),
        )
        .into(),
        ResourceRule::<Job>::new(
            JOB_RESTART_NEVER,
            "A job's restart policy should be set to Never",
            |job| job.spec.template.spec.restart_policy.as_deref() == Some(NEVER),
        )
        .with_fix(|job| {
            job.spec.template.spec.restart_policy = Some(NEVER.to_string());
            true
        })
        .describe_fix(|job| format!("set the restart policy of job {} to Never", job.metadata.name))
        .into(),
        ResourceRule::<Job>::new(
            JOB_EXISTS_TTL,
            "A job should set ttlSecondsAfterFinished",
            |job| job.spec.ttl_seconds_after_finished.is_some(),
        )
        .into(),
        ResourceRule::<CronJob>::new(
            CRONJOB_WITHIN_NAMESPACE,
            "A cronjob should have a namespace specified",
            |cron| cron.metadata.namespace.as_deref().is_some_and(|ns| !ns.is_empty()),
        )
        .into(),
        ResourceRule::<CronJob>::new(
            CRONJOB_FORBID_CONCURRENT,
            "A cronjob should forbid concurrent runs",
            |cron| cron.spec.concurrency_policy.as_deref() == Some(FORBID),
        )
        .with_fix(|cron| {
            cron.spec.concurrency_policy = Some(FORBID.to_string());
            true
        })
        .describe_fix(|cron| {
            format!(
                "set the concurrency policy of cronjob {} to Forbid",
                cron.metadata.name
            )
        })
        .into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Linter;

    const JOB: &str = "\
apiVersion: batch/v1
kind: Job
metadata:
  name: migrate
  namespace: db
spec:
  template:
    spec:
      restartPolicy: OnFailure
      containers:
      - name: migrate
        image: migrate:1
";

    #[test]
    fn restart_policy_is_fixed_and_ttl_is_not() {
        let linter = Linter::new().with_rules(rules());
        let mut report = linter.lint_str(JOB, "job.yaml");
        let failing: Vec<_> = report.violations.iter().map(|v| v.rule.as_str()).collect();
        assert_eq!(failing, vec![JOB_EXISTS_TTL, JOB_RESTART_NEVER]);

        let outcome = report.apply_fixes();
        assert_eq!(outcome.descriptions, vec!["set the restart policy of job migrate to Never"]);

        let yaml = crate::resource::encode::to_yaml(report.store.resources()).unwrap();
        assert!(yaml.contains("restartPolicy: Never"));
        assert!(yaml.contains("migrate:1"));
    }

    #[test]
    fn cronjob_concurrency_policy_is_fixed() {
        let yaml = "apiVersion: batch/v1\nkind: CronJob\nmetadata:\n  name: nightly\nspec:\n  schedule: \"0 0 * * *\"\n";
        let linter = Linter::new().with_rules(rules());
        let mut report = linter.lint_str(yaml, "cron.yaml");
        assert_eq!(report.violations.len(), 2);

        report.apply_fixes();
        let again = linter.lint_store(report.store);
        let failing: Vec<_> = again.violations.iter().map(|v| v.rule.as_str()).collect();
        assert_eq!(failing, vec![CRONJOB_WITHIN_NAMESPACE]);
    }
}
