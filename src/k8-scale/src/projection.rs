use tracing::debug;

use k8_types::apiextensions::Scale;
use k8_types::store::StoreObject;
use k8_types::ApiError;
use k8_types::GroupResource;
use k8_types::ObjectMeta;

use crate::validate_scale;

/// Two way mapping between a resource and its `Scale` view
pub trait ScaleProjection: Send + Sync {
    type Object: StoreObject;

    /// identity used in errors, e.g. `replicationcontrollers/scale.autoscaling`
    fn scale_resource(&self) -> &GroupResource;

    fn scale_from(&self, obj: &Self::Object) -> Result<Scale, ApiError>;

    /// write desired replicas of `scale` into `obj`
    fn apply_scale(&self, obj: &mut Self::Object, scale: &Scale) -> Result<(), ApiError>;
}

/// metadata a scale carries over from the resource it was built from
pub fn scale_metadata(meta: &ObjectMeta) -> ObjectMeta {
    ObjectMeta {
        name: meta.name.clone(),
        namespace: meta.namespace.clone(),
        uid: meta.uid.clone(),
        resource_version: meta.resource_version.clone(),
        creation_timestamp: meta.creation_timestamp.clone(),
        ..Default::default()
    }
}

/// Apply a scale change to a stored object.
/// Runs as the store's update function: project the stored object, let `transform`
/// produce the new scale, validate it and fold it back in. The new scale's
/// `resource_version` is copied onto the object so the store compares against it.
pub fn scale_updated_object<P, F>(
    projection: &P,
    name: &str,
    existing: P::Object,
    transform: &F,
) -> Result<P::Object, ApiError>
where
    P: ScaleProjection + ?Sized,
    F: Fn(&Scale) -> Result<Option<Scale>, ApiError> + ?Sized,
{
    // never create the parent through its subresource
    if !existing.is_persisted() {
        return Err(ApiError::not_found(
            projection.scale_resource().clone(),
            name,
        ));
    }

    let old_scale = projection.scale_from(&existing)?;
    let scale = transform(&old_scale)?
        .ok_or_else(|| ApiError::bad_request("nil update passed to Scale"))?;

    let errors = validate_scale(&scale);
    if !errors.is_empty() {
        return Err(ApiError::invalid(
            Scale::group_kind(),
            name,
            errors,
        ));
    }

    let uid = &existing.metadata().uid;
    if !scale.metadata.uid.is_empty() && &scale.metadata.uid != uid {
        debug!(name, "scale uid precondition failed");
        return Err(ApiError::conflict(
            projection.scale_resource().clone(),
            name,
            format!(
                "Precondition failed: UID in precondition: {}, UID in object meta: {}",
                scale.metadata.uid, uid
            ),
        ));
    }

    let mut updated = existing;
    projection.apply_scale(&mut updated, &scale)?;
    updated.metadata_mut().resource_version = scale.metadata.resource_version.clone();
    debug!(
        name,
        replicas = scale.spec.replicas,
        resource_version = %scale.metadata.resource_version,
        "scale applied"
    );
    Ok(updated)
}
