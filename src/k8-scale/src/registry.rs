use std::collections::HashMap;

use tracing::debug;

use k8_config::ApiExtConfig;
use k8_types::GroupResource;

use crate::jsonpath::JsonPathError;
use crate::CustomResourceScale;
use crate::ScalePaths;

/// Custom resources that serve a scale subresource, built once at startup and handed
/// to whatever serves scale requests.
#[derive(Debug, Default, Clone)]
pub struct ScaleRegistry {
    entries: HashMap<GroupResource, ScalePaths>,
}

impl ScaleRegistry {
    pub fn from_config(config: &ApiExtConfig) -> Result<Self, JsonPathError> {
        let mut registry = Self::default();
        for scale in &config.scale {
            let paths = ScalePaths::from_config(scale)?;
            registry.register(
                GroupResource::new(scale.group.clone(), scale.resource.clone()),
                paths,
            );
        }
        debug!(resources = registry.entries.len(), "scale registry loaded");
        Ok(registry)
    }

    /// add or replace paths for a resource, returns previous
    pub fn register(&mut self, resource: GroupResource, paths: ScalePaths) -> Option<ScalePaths> {
        self.entries.insert(resource, paths)
    }

    pub fn paths(&self, resource: &GroupResource) -> Option<&ScalePaths> {
        self.entries.get(resource)
    }

    /// projection for a resource, None if it has no scale subresource
    pub fn projection(&self, resource: &GroupResource) -> Option<CustomResourceScale> {
        self.paths(resource)
            .map(|paths| CustomResourceScale::new(resource, paths.clone()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod test {

    use k8_config::ApiExtConfig;
    use k8_config::ScaleConfig;
    use k8_types::GroupResource;

    use crate::jsonpath::JsonPath;
    use crate::ScalePaths;
    use crate::ScaleProjection;

    use super::ScaleRegistry;

    #[test]
    fn test_from_config() {
        let mut config = ApiExtConfig::default();
        config.put_scale(ScaleConfig::new("stable.example.com", "crontabs"));
        let mut jobs = ScaleConfig::new("batch.example.com", "jobs");
        jobs.spec_replicas_path = "{.spec.parallelism}".to_owned();
        jobs.label_selector_path = None;
        config.put_scale(jobs);

        let registry = ScaleRegistry::from_config(&config).expect("registry");
        assert_eq!(registry.len(), 2);

        let crontabs = GroupResource::new("stable.example.com", "crontabs");
        assert_eq!(registry.paths(&crontabs), Some(&ScalePaths::default()));

        let jobs = GroupResource::new("batch.example.com", "jobs");
        let projection = registry.projection(&jobs).expect("projection");
        assert_eq!(
            projection.paths().spec_replicas,
            JsonPath::from_fields(&["spec", "parallelism"])
        );
        assert!(projection.paths().label_selector.is_none());
        assert_eq!(
            projection.scale_resource(),
            &GroupResource::new("batch.example.com", "jobs/scale")
        );

        assert!(registry
            .projection(&GroupResource::new("batch.example.com", "other"))
            .is_none());
    }

    #[test]
    fn test_invalid_path_rejected() {
        let mut config = ApiExtConfig::default();
        let mut bad = ScaleConfig::new("stable.example.com", "crontabs");
        bad.status_replicas_path = ".status..replicas".to_owned();
        config.put_scale(bad);
        assert!(ScaleRegistry::from_config(&config).is_err());
    }
}
