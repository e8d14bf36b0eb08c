// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - `model.rs`: the TOML-backed raw model and the validated [`ConfigFile`].
//! - `loader.rs`: reading a config file through the [`crate::fs::FileSystem`].
//! - `validate.rs`: rule names, enable/disable conflicts, severities, globs.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{ConfigFile, InputSection, LintSection, RawConfigFile, RuleSection};
pub use validate::validate_config;
