// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `kubelint`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "kubelint",
    version,
    about = "Lint and fix Kubernetes manifests with dependency-ordered rules.",
    long_about = None
)]
pub struct CliArgs {
    /// Manifest files or directories to lint.
    #[arg(value_name = "PATHS", required_unless_present = "list_rules")]
    pub paths: Vec<PathBuf>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Kubelint.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Apply fixes for failing rules and emit the fixed resources.
    #[arg(long)]
    pub fix: bool,

    /// Where to write fixed YAML with `--fix`. Default: stdout.
    #[arg(long, value_name = "PATH", requires = "fix")]
    pub output: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `KUBELINT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the active rules and their prerequisites, then exit.
    #[arg(long)]
    pub list_rules: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_required_unless_listing_rules() {
        assert!(CliArgs::try_parse_from(["kubelint"]).is_err());

        let args = CliArgs::try_parse_from(["kubelint", "--list-rules"]).unwrap();
        assert!(args.list_rules);
        assert!(args.paths.is_empty());
    }

    #[test]
    fn output_requires_fix() {
        assert!(CliArgs::try_parse_from(["kubelint", "a.yaml", "--output", "o.yaml"]).is_err());

        let args = CliArgs::try_parse_from([
            "kubelint",
            "a.yaml",
            "dir",
            "--fix",
            "--output",
            "o.yaml",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.paths, vec![PathBuf::from("a.yaml"), PathBuf::from("dir")]);
        assert_eq!(args.output, Some(PathBuf::from("o.yaml")));
        assert_eq!(args.log_level, Some(LogLevel::Debug));
    }
}
