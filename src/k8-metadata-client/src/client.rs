use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use k8_types::store::StoreObject;
use k8_types::ApiError;
use k8_types::GroupResource;
use k8_types::K8Meta;

/// Caller supplied expectations an update must meet before it is applied
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Preconditions {
    pub uid: Option<String>,
    pub resource_version: Option<String>,
}

impl Preconditions {
    pub fn uid<S: Into<String>>(uid: S) -> Self {
        Self {
            uid: Some(uid.into()),
            ..Default::default()
        }
    }

    pub fn resource_version<S: Into<String>>(resource_version: S) -> Self {
        Self {
            resource_version: Some(resource_version.into()),
            ..Default::default()
        }
    }

    /// check preconditions against the currently stored object
    pub fn check<O: StoreObject>(
        &self,
        resource: &GroupResource,
        existing: &O,
    ) -> Result<(), ApiError> {
        let meta = existing.metadata();
        if let Some(uid) = &self.uid {
            if uid != &meta.uid {
                debug!(%resource, name = %meta.name, "uid precondition failed");
                return Err(ApiError::conflict(
                    resource.clone(),
                    meta.name.clone(),
                    format!(
                        "Precondition failed: UID in precondition: {}, UID in object meta: {}",
                        uid, meta.uid
                    ),
                ));
            }
        }
        if let Some(resource_version) = &self.resource_version {
            if resource_version != &meta.resource_version {
                return Err(ApiError::conflict(
                    resource.clone(),
                    meta.name.clone(),
                    format!(
                        "Precondition failed: ResourceVersion in precondition: {}, ResourceVersion in object meta: {}",
                        resource_version, meta.resource_version
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Transformation applied to the stored object inside a store update.
/// Receives the current object, or an empty one (no version token) if nothing is stored.
pub type UpdateFn<'a, O> = &'a (dyn Fn(O) -> Result<O, ApiError> + Send + Sync);

/// Object store with compare-and-swap on the object's `resource_version`
#[async_trait]
pub trait ObjectStore: Send + Sync {
    type Object: StoreObject;

    /// resource this store holds, used to name errors
    fn resource(&self) -> &GroupResource;

    /// retrieval a single item
    async fn retrieve_item<M>(&self, metadata: &M) -> Result<Self::Object, ApiError>
    where
        M: K8Meta + Send + Sync;

    /// create new object
    async fn create_item(&self, value: Self::Object) -> Result<Self::Object, ApiError>;

    /// Run `update` against the current object and store the result.
    /// A non-empty `resource_version` on the returned object must match the stored one,
    /// otherwise the update fails with a conflict. Returns the stored object and whether
    /// it was created.
    async fn update_item<M>(
        &self,
        metadata: &M,
        preconditions: Option<&Preconditions>,
        update: UpdateFn<'_, Self::Object>,
        allow_create: bool,
    ) -> Result<(Self::Object, bool), ApiError>
    where
        M: K8Meta + Send + Sync;

    /// Check if the object exists, return true or false.
    async fn exists<M>(&self, metadata: &M) -> Result<bool, ApiError>
    where
        M: K8Meta + Send + Sync,
    {
        match self.retrieve_item(metadata).await {
            Ok(_) => Ok(true),
            Err(err) => {
                if err.is_not_found() {
                    Ok(false)
                } else {
                    Err(err)
                }
            }
        }
    }
}
