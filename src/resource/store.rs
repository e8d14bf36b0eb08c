// src/resource/store.rs

use std::fmt;

use super::{DecodedResource, Resource, SourceLocation};

/// Stable reference to a resource inside a [`ResourceStore`].
///
/// Rules carry handles instead of borrowing resources, so a rule graph can be
/// cloned freely and the fix pass can later take the store mutably.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceHandle(usize);

impl ResourceHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owns every resource in a lint batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct ResourceStore {
    entries: Vec<DecodedResource>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, decoded: DecodedResource) -> ResourceHandle {
        self.entries.push(decoded);
        ResourceHandle(self.entries.len() - 1)
    }

    /// Convenience for resources that did not come from a file.
    pub fn insert(&mut self, resource: Resource) -> ResourceHandle {
        self.push(DecodedResource {
            resource,
            source: SourceLocation::default(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, handle: ResourceHandle) -> Option<&DecodedResource> {
        self.entries.get(handle.0)
    }

    pub fn resource(&self, handle: ResourceHandle) -> Option<&Resource> {
        self.entries.get(handle.0).map(|d| &d.resource)
    }

    pub fn resource_mut(&mut self, handle: ResourceHandle) -> Option<&mut Resource> {
        self.entries.get_mut(handle.0).map(|d| &mut d.resource)
    }

    pub fn handles(&self) -> impl Iterator<Item = ResourceHandle> + '_ {
        (0..self.entries.len()).map(ResourceHandle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceHandle, &DecodedResource)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, d)| (ResourceHandle(i), d))
    }

    /// Resources only, in input order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entries.iter().map(|d| &d.resource)
    }

    pub fn resources_mut(&mut self) -> impl Iterator<Item = &mut Resource> {
        self.entries.iter_mut().map(|d| &mut d.resource)
    }

    /// Human-readable `Kind/name (path:line)` for log and report output.
    pub fn describe(&self, handle: ResourceHandle) -> String {
        match self.get(handle) {
            Some(d) if d.source.path.as_os_str().is_empty() => d.resource.to_string(),
            Some(d) => format!("{} ({})", d.resource, d.source),
            None => format!("<unknown resource {handle}>"),
        }
    }
}

impl Extend<DecodedResource> for ResourceStore {
    fn extend<T: IntoIterator<Item = DecodedResource>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::model::Namespace;
    use std::path::PathBuf;

    fn namespace(name: &str) -> Resource {
        let mut ns = Namespace {
            api_version: "v1".into(),
            kind: "Namespace".into(),
            ..Default::default()
        };
        ns.metadata.name = name.into();
        Resource::Namespace(ns)
    }

    #[test]
    fn handles_follow_insertion_order() {
        let mut store = ResourceStore::new();
        let a = store.insert(namespace("a"));
        let b = store.push(DecodedResource {
            resource: namespace("b"),
            source: SourceLocation {
                path: PathBuf::from("ns.yaml"),
                line: 5,
            },
        });

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(store.handles().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(store.describe(a), "Namespace/a");
        assert_eq!(store.describe(b), "Namespace/b (ns.yaml:5)");
    }

    #[test]
    fn resources_can_be_mutated_through_handles() {
        let mut store = ResourceStore::new();
        let h = store.insert(namespace("a"));
        store.resource_mut(h).unwrap().metadata_mut().name = "renamed".into();
        assert_eq!(store.resource(h).unwrap().name(), "renamed");
    }
}
