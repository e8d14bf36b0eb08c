// src/resource/kind.rs

use super::Resource;
use super::model::{
    CronJob, Deployment, Job, Namespace, NetworkPolicy, Service, ServiceAccount,
};

/// A typed view into a [`Resource`].
///
/// Rule definitions are generic over a `Kind`: a `ResourceRule<Deployment>`
/// only materializes for deployments, while a `ResourceRule<Resource>`
/// materializes for every resource.
pub trait Kind: Send + Sync + 'static {
    /// Kind name the view matches, or [`ANY_KIND`] for `Resource` itself.
    const KIND: &'static str;

    fn from_resource(resource: &Resource) -> Option<&Self>;
    fn from_resource_mut(resource: &mut Resource) -> Option<&mut Self>;
}

/// Marker used by rules that apply to every kind.
pub const ANY_KIND: &str = "*";

impl Kind for Resource {
    const KIND: &'static str = ANY_KIND;

    fn from_resource(resource: &Resource) -> Option<&Self> {
        Some(resource)
    }

    fn from_resource_mut(resource: &mut Resource) -> Option<&mut Self> {
        Some(resource)
    }
}

macro_rules! impl_kind {
    ($ty:ident) => {
        impl Kind for $ty {
            const KIND: &'static str = stringify!($ty);

            fn from_resource(resource: &Resource) -> Option<&Self> {
                match resource {
                    Resource::$ty(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_resource_mut(resource: &mut Resource) -> Option<&mut Self> {
                match resource {
                    Resource::$ty(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_kind!(Deployment);
impl_kind!(Namespace);
impl_kind!(Service);
impl_kind!(ServiceAccount);
impl_kind!(Job);
impl_kind!(CronJob);
impl_kind!(NetworkPolicy);

/// Every concrete kind name, in the order the decoder tries them.
pub const SUPPORTED_KINDS: &[&str] = &[
    Deployment::KIND,
    Namespace::KIND,
    Service::KIND,
    ServiceAccount::KIND,
    Job::KIND,
    CronJob::KIND,
    NetworkPolicy::KIND,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_view_only_matches_its_own_kind() {
        let mut resource = Resource::Namespace(Namespace {
            api_version: "v1".into(),
            kind: "Namespace".into(),
            ..Default::default()
        });
        assert!(Namespace::from_resource(&resource).is_some());
        assert!(Deployment::from_resource(&resource).is_none());
        assert!(Resource::from_resource(&resource).is_some());
        assert!(Namespace::from_resource_mut(&mut resource).is_some());
    }

    #[test]
    fn kind_names_match_the_type_names() {
        assert_eq!(Deployment::KIND, "Deployment");
        assert_eq!(NetworkPolicy::KIND, "NetworkPolicy");
        assert_eq!(<Resource as Kind>::KIND, ANY_KIND);
        assert_eq!(SUPPORTED_KINDS.len(), 7);
    }
}
