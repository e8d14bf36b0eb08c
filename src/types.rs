use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Identifier of a rule, unique within one evaluation unit.
///
/// Prerequisites refer to other rules by this identifier.
pub type RuleId = String;

/// How bad a violation is.
///
/// Variants are ordered from least to most severe, so `Severity::Error` is the
/// maximum and `fail_on` thresholds can be compared with `>=`.
///
/// Deserialized through [`FromStr`], so config values accept the same
/// spellings as the parser (`warning`, any case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Error
    }
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            other => Err(format!(
                "invalid severity: {other} (expected \"error\", \"warn\", \"info\" or \"debug\")"
            )),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, <Self as TryFrom<String>>::Error> {
        value.parse()
    }
}

impl From<Severity> for tracing::Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Debug => tracing::Level::DEBUG,
            Severity::Info => tracing::Level::INFO,
            Severity::Warn => tracing::Level::WARN,
            Severity::Error => tracing::Level::ERROR,
        }
    }
}
