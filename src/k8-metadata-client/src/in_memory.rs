use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use tracing::trace;

use k8_types::store::StoreObject;
use k8_types::ApiError;
use k8_types::GroupResource;
use k8_types::ItemMeta;
use k8_types::K8Meta;

use crate::ObjectStore;
use crate::Preconditions;
use crate::UpdateFn;

type ItemMap = HashMap<ItemMeta, Value>;

/// Store kept in memory, objects are held as JSON like a real backend would.
/// Every write happens inside a single critical section, so a write is either fully
/// applied or not at all; a future dropped before it runs writes nothing.
#[derive(Debug)]
pub struct InMemoryStore<O> {
    resource: GroupResource,
    store: RwLock<ItemMap>,
    version: AtomicU64,
    data: PhantomData<fn() -> O>,
}

impl<O> InMemoryStore<O>
where
    O: StoreObject,
{
    pub fn new(resource: GroupResource) -> Self {
        Self {
            resource,
            store: RwLock::new(HashMap::new()),
            version: AtomicU64::new(0),
            data: PhantomData,
        }
    }

    fn read_store(&self) -> Result<RwLockReadGuard<'_, ItemMap>, ApiError> {
        self.store
            .read()
            .map_err(|_| ApiError::Internal("lock poison error".to_owned()))
    }

    fn write_store(&self) -> Result<RwLockWriteGuard<'_, ItemMap>, ApiError> {
        self.store
            .write()
            .map_err(|_| ApiError::Internal("lock poison error".to_owned()))
    }

    fn next_version(&self) -> String {
        (self.version.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    fn item_key(metadata: &dyn K8Meta) -> ItemMeta {
        ItemMeta::new(metadata.name(), metadata.namespace())
    }

    /// number of stored items
    pub fn len(&self) -> Result<usize, ApiError> {
        Ok(self.read_store()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, ApiError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl<O> ObjectStore for InMemoryStore<O>
where
    O: StoreObject,
{
    type Object = O;

    fn resource(&self) -> &GroupResource {
        &self.resource
    }

    async fn retrieve_item<M>(&self, metadata: &M) -> Result<O, ApiError>
    where
        M: K8Meta + Send + Sync,
    {
        let store = self.read_store()?;
        let item_value = store
            .get(&Self::item_key(metadata))
            .ok_or_else(|| ApiError::not_found(self.resource.clone(), metadata.name()))?;
        Ok(serde_json::from_value(item_value.clone())?)
    }

    async fn create_item(&self, mut value: O) -> Result<O, ApiError> {
        let mut store = self.write_store()?;
        let item_key = Self::item_key(value.metadata());
        if store.contains_key(&item_key) {
            return Err(ApiError::AlreadyExists {
                resource: self.resource.clone(),
                name: item_key.name,
            });
        }

        let version = self.next_version();
        let meta = value.metadata_mut();
        if meta.uid.is_empty() {
            meta.uid = format!("{}-{}", item_key.name, version);
        }
        meta.resource_version = version;
        debug!(resource = %self.resource, name = %item_key.name, "creating item");

        store.insert(item_key, serde_json::to_value(&value)?);
        Ok(value)
    }

    async fn update_item<M>(
        &self,
        metadata: &M,
        preconditions: Option<&Preconditions>,
        update: UpdateFn<'_, O>,
        allow_create: bool,
    ) -> Result<(O, bool), ApiError>
    where
        M: K8Meta + Send + Sync,
    {
        let mut store = self.write_store()?;
        let item_key = Self::item_key(metadata);

        let existing: Option<O> = match store.get(&item_key) {
            Some(value) => Some(serde_json::from_value(value.clone())?),
            None => None,
        };

        if let (Some(preconditions), Some(existing)) = (preconditions, existing.as_ref()) {
            preconditions.check(&self.resource, existing)?;
        }

        let current = existing.clone().unwrap_or_default();
        let mut updated = update(current)?;
        trace!(resource = %self.resource, name = %item_key.name, "updated: {:#?}", updated);

        match existing {
            None => {
                if !allow_create {
                    return Err(ApiError::not_found(self.resource.clone(), item_key.name));
                }
                let version = self.next_version();
                let meta = updated.metadata_mut();
                meta.name = item_key.name.clone();
                meta.namespace = item_key.namespace.clone();
                if meta.uid.is_empty() {
                    meta.uid = format!("{}-{}", item_key.name, version);
                }
                meta.resource_version = version;
                debug!(resource = %self.resource, name = %item_key.name, "created on update");
                store.insert(item_key, serde_json::to_value(&updated)?);
                Ok((updated, true))
            }
            Some(existing) => {
                let stored = existing.metadata();
                let requested_version = &updated.metadata().resource_version;
                if !requested_version.is_empty() && requested_version != &stored.resource_version
                {
                    debug!(
                        resource = %self.resource,
                        name = %item_key.name,
                        requested = %requested_version,
                        stored = %stored.resource_version,
                        "version conflict"
                    );
                    return Err(ApiError::conflict(
                        self.resource.clone(),
                        item_key.name,
                        "the object has been modified; please apply your changes to the latest version and try again",
                    ));
                }

                let version = self.next_version();
                let meta = updated.metadata_mut();
                meta.name = item_key.name.clone();
                meta.namespace = item_key.namespace.clone();
                meta.uid = stored.uid.clone();
                meta.creation_timestamp = stored.creation_timestamp.clone();
                meta.resource_version = version;
                debug!(resource = %self.resource, name = %item_key.name, "updated item");
                store.insert(item_key, serde_json::to_value(&updated)?);
                Ok((updated, false))
            }
        }
    }
}

#[cfg(test)]
mod tests {

    use futures::executor::block_on;

    use k8_types::core::replication_controller::ReplicationController;
    use k8_types::core::replication_controller::ReplicationControllerSpec;
    use k8_types::ApiError;
    use k8_types::GroupResource;
    use k8_types::ItemMeta;
    use k8_types::K8Obj;
    use k8_types::ObjectMeta;

    use crate::ObjectStore;
    use crate::Preconditions;

    use super::InMemoryStore;

    fn new_store() -> InMemoryStore<ReplicationController> {
        InMemoryStore::new(GroupResource::new("", "replicationcontrollers"))
    }

    fn new_rc(name: &str, replicas: i32) -> ReplicationController {
        K8Obj::new(
            name,
            ReplicationControllerSpec {
                replicas: Some(replicas),
                ..Default::default()
            },
        )
        .set_metadata(ObjectMeta::new(name, "default"))
    }

    fn set_replicas(
        replicas: i32,
    ) -> impl Fn(ReplicationController) -> Result<ReplicationController, ApiError> + Send + Sync
    {
        move |mut rc| {
            rc.spec.replicas = Some(replicas);
            Ok(rc)
        }
    }

    #[test]
    fn test_create_and_retrieve() {
        let store = new_store();
        let item = block_on(store.create_item(new_rc("frontend", 2))).expect("create");
        assert_eq!(item.metadata.resource_version, "1");
        assert!(!item.metadata.uid.is_empty());

        let retrieved =
            block_on(store.retrieve_item(&ItemMeta::new("frontend", "default"))).expect("get");
        assert_eq!(retrieved.spec, item.spec);
        assert_eq!(retrieved.metadata, item.metadata);

        let dup = block_on(store.create_item(new_rc("frontend", 2))).expect_err("dup");
        assert!(dup.is_already_exists());
    }

    #[test]
    fn test_retrieve_missing() {
        let store = new_store();
        let err = block_on(store.retrieve_item(&ItemMeta::new("missing", "default")))
            .expect_err("missing");
        assert!(err.is_not_found());
        assert!(!block_on(store.exists(&ItemMeta::new("missing", "default"))).expect("exists"));
    }

    #[test]
    fn test_update_bumps_version() {
        let store = new_store();
        block_on(store.create_item(new_rc("frontend", 2))).expect("create");
        let key = ItemMeta::new("frontend", "default");

        let update = set_replicas(5);
        let (updated, created) =
            block_on(store.update_item(&key, None, &update, false)).expect("update");
        assert!(!created);
        assert_eq!(updated.spec.replicas, Some(5));
        assert_eq!(updated.metadata.resource_version, "2");
    }

    #[test]
    fn test_update_stale_version_conflicts() {
        let store = new_store();
        let item = block_on(store.create_item(new_rc("frontend", 2))).expect("create");
        let key = item.metadata.as_item();

        let first = set_replicas(3);
        block_on(store.update_item(&key, None, &first, false)).expect("first update");

        // carries the version read before the first update
        let stale_version = item.metadata.resource_version.clone();
        type UpdateResult = Result<ReplicationController, ApiError>;
        let stale = move |mut rc: ReplicationController| -> UpdateResult {
            rc.metadata.resource_version = stale_version.clone();
            rc.spec.replicas = Some(7);
            Ok(rc)
        };
        let err = block_on(store.update_item(&key, None, &stale, false)).expect_err("conflict");
        assert!(err.is_conflict());

        let current = block_on(store.retrieve_item(&key)).expect("get");
        assert_eq!(current.spec.replicas, Some(3));
    }

    #[test]
    fn test_update_missing_without_create() {
        let store = new_store();
        let key = ItemMeta::new("frontend", "default");
        let update = set_replicas(1);
        let err = block_on(store.update_item(&key, None, &update, false)).expect_err("missing");
        assert!(err.is_not_found());
        assert!(store.is_empty().expect("len"));

        let (created_item, created) =
            block_on(store.update_item(&key, None, &update, true)).expect("create");
        assert!(created);
        assert_eq!(created_item.metadata.name, "frontend");
        assert_eq!(store.len().expect("len"), 1);
    }

    #[test]
    fn test_uid_precondition() {
        let store = new_store();
        block_on(store.create_item(new_rc("frontend", 2))).expect("create");
        let key = ItemMeta::new("frontend", "default");
        let update = set_replicas(4);

        let err = block_on(store.update_item(
            &key,
            Some(&Preconditions::uid("other-uid")),
            &update,
            false,
        ))
        .expect_err("precondition");
        assert!(err.is_conflict());
        assert!(err.to_string().contains("Precondition failed"));
    }

    #[test]
    fn test_failed_transform_writes_nothing() {
        let store = new_store();
        block_on(store.create_item(new_rc("frontend", 2))).expect("create");
        let key = ItemMeta::new("frontend", "default");

        let reject =
            |_rc: ReplicationController| -> Result<ReplicationController, ApiError> {
                Err(ApiError::bad_request("rejected"))
            };
        let err = block_on(store.update_item(&key, None, &reject, false)).expect_err("reject");
        assert!(err.is_bad_request());

        let current = block_on(store.retrieve_item(&key)).expect("get");
        assert_eq!(current.metadata.resource_version, "1");
    }
}
