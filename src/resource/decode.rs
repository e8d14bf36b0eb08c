// src/resource/decode.rs

//! Multi-document YAML → typed resources.
//!
//! A buffer is split on `---` separator lines. Every document is decoded on
//! its own, so one broken document only costs that document: it shows up as a
//! [`DecodeError`] and its siblings are still returned.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_yaml::Value;
use tracing::debug;

use super::kind::Kind;
use super::model::{
    CronJob, Deployment, Job, Namespace, NetworkPolicy, Service, ServiceAccount,
};
use super::{DecodedResource, Resource, SourceLocation};
use crate::errors::DecodeError;

/// One `---`-delimited document of a YAML stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document<'a> {
    pub text: String,
    /// 1-based line of the first meaningful line of the document.
    pub line: usize,
    lines: Vec<&'a str>,
}

impl Document<'_> {
    /// Only whitespace and comments.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| is_blank_line(l))
    }
}

fn is_blank_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

fn is_separator(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Split a YAML stream into its documents.
///
/// Blank text before the first separator or after the last one is not a
/// document. Blank documents between two separators are kept so the caller
/// can report them.
pub fn split_documents(content: &str) -> Vec<Document<'_>> {
    let mut documents = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut start = 1;
    let mut seen_separator = false;

    for (idx, line) in content.lines().enumerate() {
        if is_separator(line) {
            let leading = !seen_separator && current.iter().all(|l| is_blank_line(l));
            if !leading {
                documents.push(make_document(std::mem::take(&mut current), start));
            } else {
                current.clear();
            }
            seen_separator = true;
            start = idx + 2;
        } else {
            current.push(line);
        }
    }

    // Whatever follows the last separator. A blank tail (a file ending in
    // `---`) is not a document, but a file with nothing in it at all is.
    let blank_tail = current.iter().all(|l| is_blank_line(l));
    if !blank_tail || (!seen_separator && documents.is_empty()) {
        documents.push(make_document(current, start));
    }

    documents
}

fn make_document(lines: Vec<&str>, start: usize) -> Document<'_> {
    let offset = lines.iter().position(|l| !is_blank_line(l)).unwrap_or(0);
    Document {
        text: lines.join("\n"),
        line: start + offset,
        lines,
    }
}

/// Decode every document in `content`, attributing them to `path`.
pub fn decode_str(content: &str, path: &Path) -> (Vec<DecodedResource>, Vec<DecodeError>) {
    let mut resources = Vec::new();
    let mut errors = Vec::new();

    for document in split_documents(content) {
        match decode_document(&document, path) {
            Ok(resource) => {
                debug!(
                    path = %path.display(),
                    line = document.line,
                    resource = %resource,
                    "decoded resource"
                );
                resources.push(DecodedResource {
                    resource,
                    source: SourceLocation {
                        path: path.to_path_buf(),
                        line: document.line,
                    },
                });
            }
            Err(err) => errors.push(err),
        }
    }

    (resources, errors)
}

/// Decode a single document into a [`Resource`].
pub fn decode_document(document: &Document<'_>, path: &Path) -> Result<Resource, DecodeError> {
    let line = document.line;
    if document.is_blank() {
        return Err(DecodeError::EmptyDocument {
            path: path.to_path_buf(),
            line,
        });
    }

    let value: Value =
        serde_yaml::from_str(&document.text).map_err(|source| DecodeError::Syntax {
            path: path.to_path_buf(),
            line,
            source,
        })?;

    let missing = |field| DecodeError::MissingField {
        path: path.to_path_buf(),
        line,
        field,
    };
    let kind = value
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| missing("kind"))?
        .to_string();
    if value.get("apiVersion").and_then(Value::as_str).is_none() {
        return Err(missing("apiVersion"));
    }

    let resource = match kind.as_str() {
        Deployment::KIND => Resource::Deployment(typed(value, &kind, path, line)?),
        Namespace::KIND => Resource::Namespace(typed(value, &kind, path, line)?),
        Service::KIND => Resource::Service(typed(value, &kind, path, line)?),
        ServiceAccount::KIND => Resource::ServiceAccount(typed(value, &kind, path, line)?),
        Job::KIND => Resource::Job(typed(value, &kind, path, line)?),
        CronJob::KIND => Resource::CronJob(typed(value, &kind, path, line)?),
        NetworkPolicy::KIND => Resource::NetworkPolicy(typed(value, &kind, path, line)?),
        _ => {
            return Err(DecodeError::UnsupportedKind {
                path: path.to_path_buf(),
                line,
                kind,
            });
        }
    };
    Ok(resource)
}

fn typed<T: DeserializeOwned>(
    value: Value,
    kind: &str,
    path: &Path,
    line: usize,
) -> Result<T, DecodeError> {
    serde_yaml::from_value(value).map_err(|source| DecodeError::Shape {
        path: path.to_path_buf(),
        line,
        kind: kind.to_string(),
        source,
    })
}
