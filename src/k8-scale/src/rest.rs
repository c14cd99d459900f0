use tracing::debug;
use tracing::instrument;

use k8_metadata_client::ObjectStore;
use k8_metadata_client::SharedStore;
use k8_types::apiextensions::Scale;
use k8_types::ApiError;
use k8_types::K8Meta;

use crate::scale_updated_object;
use crate::ScaleProjection;

/// Scale subresource endpoint over a store of the parent resource
pub struct ScaleRest<C, P> {
    store: SharedStore<C>,
    projection: P,
}

impl<C, P> ScaleRest<C, P>
where
    C: ObjectStore,
    P: ScaleProjection<Object = C::Object>,
{
    pub fn new(store: SharedStore<C>, projection: P) -> Self {
        Self { store, projection }
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    /// missing parents are reported against the scale resource the caller asked for
    fn remap_not_found(&self, err: ApiError, name: &str) -> ApiError {
        if err.is_not_found() {
            ApiError::not_found(self.projection.scale_resource().clone(), name)
        } else {
            err
        }
    }

    #[instrument(skip(self, metadata), fields(name = metadata.name()))]
    pub async fn get_scale<M>(&self, metadata: &M) -> Result<Scale, ApiError>
    where
        M: K8Meta + Send + Sync,
    {
        let obj = self
            .store
            .retrieve_item(metadata)
            .await
            .map_err(|err| self.remap_not_found(err, metadata.name()))?;
        self.projection.scale_from(&obj)
    }

    /// Apply `transform` to the current scale and store the result in the parent.
    /// The parent is never created, the returned flag is always false.
    #[instrument(skip(self, metadata, transform), fields(name = metadata.name()))]
    pub async fn update_scale<M, F>(
        &self,
        metadata: &M,
        transform: F,
    ) -> Result<(Scale, bool), ApiError>
    where
        M: K8Meta + Send + Sync,
        F: Fn(&Scale) -> Result<Option<Scale>, ApiError> + Send + Sync,
    {
        let name = metadata.name();
        let projection = &self.projection;
        let update =
            |existing: C::Object| scale_updated_object(projection, name, existing, &transform);

        let (updated, _) = self
            .store
            .update_item(metadata, None, &update, false)
            .await
            .map_err(|err| self.remap_not_found(err, name))?;

        let scale = self.projection.scale_from(&updated)?;
        debug!(
            replicas = scale.spec.replicas,
            resource_version = %scale.metadata.resource_version,
            "scale updated"
        );
        Ok((scale, false))
    }
}
