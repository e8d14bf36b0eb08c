// src/resource/read.rs

//! Collect and decode manifests from files and directories.

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};

use crate::errors::{LintError, Result};
use crate::fs::FileSystem;

use super::DecodedResource;
use super::decode::decode_str;

/// Default patterns used when expanding directories.
pub const DEFAULT_INCLUDE: &[&str] = &["**/*.yaml", "**/*.yml"];

/// Decides which files inside a directory argument are manifests.
///
/// Files named explicitly on the command line are always read; the filter only
/// applies while walking directories. Patterns are matched against the path
/// relative to the directory being walked.
#[derive(Clone)]
pub struct InputFilter {
    include: GlobSet,
    exclude: Option<GlobSet>,
}

impl fmt::Debug for InputFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputFilter")
            .field("include", &self.include.len())
            .field("exclude", &self.exclude.as_ref().map(GlobSet::len))
            .finish()
    }
}

impl InputFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        let include = if include.is_empty() {
            let defaults: Vec<String> = DEFAULT_INCLUDE.iter().map(|s| s.to_string()).collect();
            compile_globs(&defaults)?
        } else {
            compile_globs(include)?
        };
        let exclude = if exclude.is_empty() {
            None
        } else {
            Some(compile_globs(exclude)?)
        };
        Ok(Self { include, exclude })
    }

    /// `rel_path` uses `/` separators, e.g. `"apps/web/deployment.yaml"`.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        match &self.exclude {
            Some(exclude) => !exclude.is_match(rel_path),
            None => true,
        }
    }
}

impl Default for InputFilter {
    fn default() -> Self {
        // The default patterns are static and known to compile.
        Self::new(&[], &[]).unwrap_or_else(|_| Self {
            include: GlobSet::empty(),
            exclude: None,
        })
    }
}

pub fn compile_globs(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).map_err(|e| {
            LintError::ConfigError(format!("invalid glob pattern {pat:?}: {e}"))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| LintError::ConfigError(format!("building glob set: {e}")))
}

/// Read and decode everything under `paths`.
///
/// Unreadable paths and undecodable documents are returned as errors next to
/// the resources that did decode; nothing here aborts the batch.
pub fn read_paths(
    fs: &dyn FileSystem,
    paths: &[PathBuf],
    filter: &InputFilter,
) -> (Vec<DecodedResource>, Vec<LintError>) {
    let mut resources = Vec::new();
    let mut errors = Vec::new();

    for path in paths {
        let files = if fs.is_dir(path) {
            match expand_dir(fs, path, filter) {
                Ok(files) => files,
                Err(err) => {
                    errors.push(err);
                    continue;
                }
            }
        } else {
            vec![path.clone()]
        };

        for file in files {
            let (mut decoded, mut errs) = read_file(fs, &file);
            resources.append(&mut decoded);
            errors.append(&mut errs);
        }
    }

    (resources, errors)
}

/// Read and decode a single file.
pub fn read_file(fs: &dyn FileSystem, path: &Path) -> (Vec<DecodedResource>, Vec<LintError>) {
    match fs.read_to_string(path) {
        Ok(content) => {
            let (resources, errors) = decode_str(&content, path);
            debug!(
                path = %path.display(),
                resources = resources.len(),
                errors = errors.len(),
                "read manifest file"
            );
            (resources, errors.into_iter().map(LintError::from).collect())
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not read manifest file");
            (Vec::new(), vec![LintError::Other(err)])
        }
    }
}

fn expand_dir(fs: &dyn FileSystem, root: &Path, filter: &InputFilter) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let mut entries = fs.read_dir(&dir)?;
        entries.sort();
        // Reverse so the stack pops subdirectories in name order.
        for entry in entries.into_iter().rev() {
            if fs.is_dir(&entry) {
                stack.push(entry);
            } else if fs.is_file(&entry) {
                let rel = relative_slash_path(root, &entry);
                if filter.matches(&rel) {
                    files.push(entry);
                } else {
                    debug!(path = %entry.display(), "skipping file not matched by input filter");
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
