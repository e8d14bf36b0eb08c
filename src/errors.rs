// src/errors.rs

//! Crate-wide error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::RuleId;

/// A document that could not be turned into a typed resource.
///
/// Decode errors never abort a batch; the offending document is simply left
/// out of scheduling and the error is reported next to the lint results.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{}:{line}: empty YAML document", .path.display())]
    EmptyDocument { path: PathBuf, line: usize },

    #[error("{}:{line}: invalid YAML: {source}", .path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{}:{line}: document has no `{field}` field", .path.display())]
    MissingField {
        path: PathBuf,
        line: usize,
        field: &'static str,
    },

    #[error("{}:{line}: resources of kind `{kind}` are not supported", .path.display())]
    UnsupportedKind {
        path: PathBuf,
        line: usize,
        kind: String,
    },

    #[error("{}:{line}: `{kind}` does not match the expected shape: {source}", .path.display())]
    Shape {
        path: PathBuf,
        line: usize,
        kind: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Error, Debug)]
pub enum LintError {
    /// No rule is ready but some are still waiting: either a prerequisite
    /// cycle or a prerequisite that was never registered.
    #[error(
        "unsatisfiable rule order: either there is a cycle in the prerequisites or a prerequisite rule is missing ({})",
        describe_waiting(.waiting)
    )]
    UnsatisfiableOrder { waiting: Vec<(RuleId, Vec<RuleId>)> },

    #[error("rule '{0}' is registered more than once in the same batch")]
    DuplicateRule(RuleId),

    #[error("rule '{rule}' for kind '{kind}' has unknown prerequisite '{prereq}'")]
    UnknownPrerequisite {
        rule: RuleId,
        prereq: RuleId,
        kind: String,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LintError {
    /// Whether this error aborts scheduling (as opposed to being a per-document
    /// or per-path problem that only excludes some input).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LintError::UnsatisfiableOrder { .. }
                | LintError::DuplicateRule(_)
                | LintError::UnknownPrerequisite { .. }
        )
    }
}

fn describe_waiting(waiting: &[(RuleId, Vec<RuleId>)]) -> String {
    waiting
        .iter()
        .map(|(rule, on)| format!("{rule} waits on [{}]", on.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, LintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsatisfiable_order_lists_waiting_rules() {
        let err = LintError::UnsatisfiableOrder {
            waiting: vec![
                ("A".to_string(), vec!["B".to_string()]),
                ("B".to_string(), vec!["A".to_string()]),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("A waits on [B]"));
        assert!(msg.contains("B waits on [A]"));
        assert!(err.is_fatal());
    }

    #[test]
    fn decode_errors_are_not_fatal() {
        let err = LintError::from(DecodeError::EmptyDocument {
            path: PathBuf::from("a.yaml"),
            line: 3,
        });
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "a.yaml:3: empty YAML document");
    }
}
