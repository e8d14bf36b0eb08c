use std::path::Path;

use kubelint::catalog::predefined_linter;
use kubelint::config::{load_and_validate, load_or_default};
use kubelint::errors::LintError;
use kubelint::fs::mock::MockFileSystem;
use kubelint::types::Severity;

fn load(toml_src: &str) -> Result<kubelint::config::ConfigFile, LintError> {
    let fs = MockFileSystem::new();
    fs.add_file("Kubelint.toml", toml_src);
    load_and_validate(&fs, "Kubelint.toml")
}

#[test]
fn selected_rules_drive_the_linter() {
    let cfg = load(
        r#"
[lint]
rules = ["NAMESPACE_VALID_DNS", "SERVICE_NAME_VALID_DNS"]
fail_on = "warn"

[rule.NAMESPACE_VALID_DNS]
severity = "info"
"#,
    )
    .unwrap();
    assert_eq!(cfg.fail_on, Severity::Warn);

    let linter = predefined_linter(&cfg).unwrap();
    assert_eq!(
        linter.rule_ids(),
        vec!["NAMESPACE_VALID_DNS", "SERVICE_NAME_VALID_DNS"]
    );

    let report = linter.lint_str(
        "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: Bad_Name\n",
        "ns.yaml",
    );
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].severity, Severity::Info);
    assert_eq!(report.violations_at_least(cfg.fail_on).count(), 0);
}

#[test]
fn malformed_toml_is_a_toml_error() {
    assert!(matches!(load("[lint\n"), Err(LintError::TomlError(_))));
}

#[test]
fn wrong_value_types_are_toml_errors() {
    assert!(matches!(
        load("[lint]\nrules = \"DEPLOYMENT_WITHIN_NAMESPACE\"\n"),
        Err(LintError::TomlError(_))
    ));
}

#[test]
fn unknown_severities_are_toml_errors() {
    for src in [
        "[lint]\nfail_on = \"catastrophic\"\n",
        "[rule.JOB_EXISTS_TTL]\nseverity = \"loud\"\n",
    ] {
        match load(src) {
            Err(err @ LintError::TomlError(_)) => {
                assert!(err.to_string().contains("invalid severity"), "{err}")
            }
            other => panic!("expected TomlError for {src:?}, got {other:?}"),
        }
    }
}

#[test]
fn severity_names_are_case_insensitive_in_config() {
    let cfg = load("[lint]\nfail_on = \"Warning\"\n").unwrap();
    assert_eq!(cfg.fail_on, Severity::Warn);
}

#[test]
fn semantic_errors_are_config_errors() {
    for src in [
        "[lint]\nrules = [\"NOT_A_RULE\"]\n",
        "[input]\nexclude = [\"{unclosed\"]\n",
    ] {
        match load(src) {
            Err(LintError::ConfigError(msg)) => assert!(!msg.is_empty()),
            other => panic!("expected ConfigError for {src:?}, got {other:?}"),
        }
    }
}

#[test]
fn disabling_a_prerequisite_surfaces_when_building_the_linter() {
    let cfg = load("[lint]\ndisable = [\"DEPLOYMENT_CONTAINERS_EXIST\"]\n").unwrap();
    let err = predefined_linter(&cfg).unwrap_err();
    assert!(matches!(err, LintError::UnknownPrerequisite { .. }));
    assert!(err.to_string().contains("DEPLOYMENT_CONTAINERS_EXIST"));
}

#[test]
fn explicit_config_path_must_exist() {
    let fs = MockFileSystem::new();
    let err = load_or_default(&fs, Some(Path::new("missing.toml"))).unwrap_err();
    assert!(matches!(err, LintError::ConfigError(_)));
}
