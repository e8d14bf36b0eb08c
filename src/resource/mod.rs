// src/resource/mod.rs

//! Typed resources and everything around them.
//!
//! - [`model`] holds the serde models for each supported kind.
//! - [`kind`] provides the [`Kind`] trait used to write rules against one
//!   concrete kind (or against any resource).
//! - [`store`] owns decoded resources and hands out [`ResourceHandle`]s that
//!   rules bind to.
//! - [`decode`] / [`encode`] convert between YAML documents and resources.
//! - [`read`] collects manifests from files and directories.

pub mod decode;
pub mod encode;
pub mod kind;
pub mod model;
pub mod read;
pub mod store;

use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};

pub use kind::Kind;
pub use model::{
    CronJob, Deployment, Job, Namespace, NetworkPolicy, ObjectMeta, Service, ServiceAccount,
};
pub use store::{ResourceHandle, ResourceStore};

/// A decoded resource of one of the supported kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Deployment(Deployment),
    Namespace(Namespace),
    Service(Service),
    ServiceAccount(ServiceAccount),
    Job(Job),
    CronJob(CronJob),
    NetworkPolicy(NetworkPolicy),
}

macro_rules! each_variant {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            Resource::Deployment($inner) => $body,
            Resource::Namespace($inner) => $body,
            Resource::Service($inner) => $body,
            Resource::ServiceAccount($inner) => $body,
            Resource::Job($inner) => $body,
            Resource::CronJob($inner) => $body,
            Resource::NetworkPolicy($inner) => $body,
        }
    };
}

impl Resource {
    /// The `kind` as written in the document (e.g. `"Deployment"`).
    pub fn kind(&self) -> &str {
        each_variant!(self, r => r.kind.as_str())
    }

    pub fn api_version(&self) -> &str {
        each_variant!(self, r => r.api_version.as_str())
    }

    pub fn metadata(&self) -> &ObjectMeta {
        each_variant!(self, r => &r.metadata)
    }

    pub fn metadata_mut(&mut self) -> &mut ObjectMeta {
        each_variant!(self, r => &mut r.metadata)
    }

    pub fn name(&self) -> &str {
        &self.metadata().name
    }

    /// Namespace, or `None` when absent or empty.
    pub fn namespace(&self) -> Option<&str> {
        self.metadata()
            .namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
    }

    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.metadata_mut().namespace = Some(namespace.into());
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        each_variant!(self, r => r.serialize(serializer))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind(), self.name())
    }
}

/// Where a resource was read from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub path: PathBuf,
    /// 1-based line on which the document starts.
    pub line: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line)
    }
}

/// A resource together with the location it was decoded from.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedResource {
    pub resource: Resource,
    pub source: SourceLocation,
}
