//!
//! # CRD Definition
//!
//! Static identity of resources served by the API: group, version and names.
//!
use std::fmt;

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Crd {
    pub group: &'static str,
    pub version: &'static str,
    pub names: CrdNames,
}

impl Crd {
    /// Subresource identity as reported by another API group,
    /// e.g. `replicationcontrollers/scale.autoscaling`.
    pub fn subresource_in(&self, group: &str, sub: &str) -> GroupResource {
        GroupResource::new(group, format!("{}/{}", self.names.plural, sub))
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct CrdNames {
    pub kind: &'static str,
    pub plural: &'static str,
    pub singular: &'static str,
}

pub const APIEXTENSIONS_GROUP: &str = "apiextensions.k8s.io";
pub const AUTOSCALING_GROUP: &str = "autoscaling";
pub const V1: &str = "v1";
pub const V1BETA1: &str = "v1beta1";

/// resource identity used in client visible errors
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct GroupResource {
    pub group: String,
    pub resource: String,
}

impl GroupResource {
    pub fn new<G, R>(group: G, resource: R) -> Self
    where
        G: Into<String>,
        R: Into<String>,
    {
        Self {
            group: group.into(),
            resource: resource.into(),
        }
    }
}

impl fmt::Display for GroupResource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.resource)
        } else {
            write!(f, "{}.{}", self.resource, self.group)
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct GroupKind {
    pub group: String,
    pub kind: String,
}

impl GroupKind {
    pub fn new<G, K>(group: G, kind: K) -> Self
    where
        G: Into<String>,
        K: Into<String>,
    {
        Self {
            group: group.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}.{}", self.kind, self.group)
        }
    }
}
