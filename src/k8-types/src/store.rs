use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::DynamicObj;
use crate::K8Obj;
use crate::ObjectMeta;
use crate::Spec;

/// Object that can be kept in an object store.
/// Typed (`K8Obj`) and schemaless (`DynamicObj`) objects share this contract so stores
/// and projections can be written once for both.
pub trait StoreObject:
    Sized + Debug + Clone + Default + Serialize + DeserializeOwned + Send + Sync
{
    fn metadata(&self) -> &ObjectMeta;

    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    /// objects with empty version token have never been persisted
    fn is_persisted(&self) -> bool {
        !self.metadata().resource_version.is_empty()
    }
}

impl<S> StoreObject for K8Obj<S>
where
    S: Spec,
{
    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl StoreObject for DynamicObj {
    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}
