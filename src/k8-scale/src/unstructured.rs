use serde_json::Value;
use tracing::trace;

use k8_config::ScaleConfig;
use k8_types::apiextensions::Scale;
use k8_types::apiextensions::ScaleSpec;
use k8_types::apiextensions::ScaleStatus;
use k8_types::ApiError;
use k8_types::DynamicObj;
use k8_types::GroupResource;

use crate::jsonpath::JsonPath;
use crate::jsonpath::JsonPathError;
use crate::scale_metadata;
use crate::ScaleProjection;
use crate::SCALE_SUBRESOURCE;

/// where replicas and selector are found in a custom resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalePaths {
    pub spec_replicas: JsonPath,
    pub status_replicas: JsonPath,
    /// no selector path means the scale reports an empty selector
    pub label_selector: Option<JsonPath>,
}

impl ScalePaths {
    pub fn new(
        spec_replicas: &str,
        status_replicas: &str,
        label_selector: Option<&str>,
    ) -> Result<Self, JsonPathError> {
        Ok(Self {
            spec_replicas: JsonPath::parse(spec_replicas)?,
            status_replicas: JsonPath::parse(status_replicas)?,
            label_selector: label_selector.map(JsonPath::parse).transpose()?,
        })
    }

    pub fn from_config(config: &ScaleConfig) -> Result<Self, JsonPathError> {
        Self::new(
            &config.spec_replicas_path,
            &config.status_replicas_path,
            config.label_selector_path.as_deref(),
        )
    }
}

/// `.spec.replicas`, `.status.replicas` and `.status.selector`
impl Default for ScalePaths {
    fn default() -> Self {
        Self {
            spec_replicas: JsonPath::from_fields(&["spec", "replicas"]),
            status_replicas: JsonPath::from_fields(&["status", "replicas"]),
            label_selector: Some(JsonPath::from_fields(&["status", "selector"])),
        }
    }
}

/// Scale over a schemaless custom resource, fields located by `ScalePaths`
#[derive(Debug, Clone)]
pub struct CustomResourceScale {
    scale_resource: GroupResource,
    paths: ScalePaths,
}

impl CustomResourceScale {
    /// `resource` is the custom resource itself, e.g. `crontabs` in `stable.example.com`
    pub fn new(resource: &GroupResource, paths: ScalePaths) -> Self {
        Self {
            scale_resource: GroupResource::new(
                resource.group.clone(),
                format!("{}/{}", resource.resource, SCALE_SUBRESOURCE),
            ),
            paths,
        }
    }

    pub fn paths(&self) -> &ScalePaths {
        &self.paths
    }
}

fn find_replicas(document: &Value, path: &JsonPath, field: &str) -> Result<i32, ApiError> {
    let value = path
        .find(document)
        .ok_or_else(|| ApiError::bad_request(format!("{} not found at {}", field, path)))?;
    value
        .as_i64()
        .and_then(|replicas| i32::try_from(replicas).ok())
        .ok_or_else(|| {
            ApiError::bad_request(format!(
                "{} at {} is not a valid integer: {}",
                field, path, value
            ))
        })
}

fn find_selector(document: &Value, path: &JsonPath) -> Result<String, ApiError> {
    match path.find(document) {
        Some(Value::String(selector)) => Ok(selector.clone()),
        Some(other) => Err(ApiError::bad_request(format!(
            "label selector at {} is not a string: {}",
            path, other
        ))),
        None => Err(ApiError::bad_request(format!(
            "label selector not found at {}",
            path
        ))),
    }
}

impl ScaleProjection for CustomResourceScale {
    type Object = DynamicObj;

    fn scale_resource(&self) -> &GroupResource {
        &self.scale_resource
    }

    fn scale_from(&self, obj: &DynamicObj) -> Result<Scale, ApiError> {
        let document = obj.to_document()?;
        trace!(name = %obj.metadata.name, "projecting custom resource: {}", document);

        let spec_replicas = find_replicas(&document, &self.paths.spec_replicas, "specReplicas")?;
        let status_replicas =
            find_replicas(&document, &self.paths.status_replicas, "statusReplicas")?;
        let selector = match &self.paths.label_selector {
            Some(path) => find_selector(&document, path)?,
            None => String::new(),
        };

        Ok(Scale::new(
            scale_metadata(&obj.metadata),
            ScaleSpec {
                replicas: spec_replicas,
            },
            ScaleStatus {
                replicas: status_replicas,
                selector,
            },
        ))
    }

    fn apply_scale(&self, obj: &mut DynamicObj, scale: &Scale) -> Result<(), ApiError> {
        let mut document = Value::Object(std::mem::take(&mut obj.data));
        let result = self
            .paths
            .spec_replicas
            .set(&mut document, Value::from(scale.spec.replicas));
        if let Value::Object(data) = document {
            obj.data = data;
        }
        result.map_err(|err| ApiError::bad_request(format!("cannot set specReplicas: {}", err)))
    }
}

#[cfg(test)]
mod test {

    use serde_json::json;

    use k8_config::ScaleConfig;
    use k8_types::DynamicObj;
    use k8_types::GroupResource;

    use crate::ScaleProjection;

    use super::CustomResourceScale;
    use super::ScalePaths;

    fn cron_tab(spec: serde_json::Value, status: serde_json::Value) -> DynamicObj {
        serde_json::from_value(json!({
            "apiVersion": "stable.example.com/v1",
            "kind": "CronTab",
            "metadata": {
                "name": "my-cron",
                "namespace": "default",
                "uid": "u1",
                "resourceVersion": "4"
            },
            "spec": spec,
            "status": status
        }))
        .expect("cron tab")
    }

    fn projection(paths: ScalePaths) -> CustomResourceScale {
        CustomResourceScale::new(
            &GroupResource::new("stable.example.com", "crontabs"),
            paths,
        )
    }

    #[test]
    fn test_scale_from_default_paths() {
        let obj = cron_tab(
            json!({ "replicas": 3 }),
            json!({ "replicas": 2, "selector": "app=cron" }),
        );
        let projection = projection(ScalePaths::default());
        assert_eq!(
            projection.scale_resource().to_string(),
            "crontabs/scale.stable.example.com"
        );

        let scale = projection.scale_from(&obj).expect("scale");
        assert_eq!(scale.spec.replicas, 3);
        assert_eq!(scale.status.replicas, 2);
        assert_eq!(scale.status.selector, "app=cron");
        assert_eq!(scale.metadata.uid, "u1");
        assert_eq!(scale.metadata.resource_version, "4");
    }

    #[test]
    fn test_missing_field_is_bad_request() {
        let obj = cron_tab(json!({}), json!({ "replicas": 2, "selector": "" }));
        let err = projection(ScalePaths::default())
            .scale_from(&obj)
            .expect_err("missing");
        assert!(err.is_bad_request());
        assert_eq!(err.to_string(), "specReplicas not found at {.spec.replicas}");

        let obj = cron_tab(
            json!({ "replicas": "three" }),
            json!({ "replicas": 2, "selector": "" }),
        );
        let err = projection(ScalePaths::default())
            .scale_from(&obj)
            .expect_err("not integer");
        assert!(err.is_bad_request());
    }

    #[test]
    fn test_default_paths_match_config_defaults() {
        let config = ScaleConfig::new("stable.example.com", "crontabs");
        assert_eq!(
            ScalePaths::from_config(&config).expect("paths"),
            ScalePaths::default()
        );
    }

    #[test]
    fn test_custom_paths_without_selector() {
        let paths = ScalePaths::new("{.spec.parallelism}", ".status.active", None).expect("paths");
        let mut obj = cron_tab(json!({ "parallelism": 5 }), json!({ "active": 1 }));
        let projection = projection(paths);

        let mut scale = projection.scale_from(&obj).expect("scale");
        assert_eq!(scale.spec.replicas, 5);
        assert_eq!(scale.status.replicas, 1);
        assert_eq!(scale.status.selector, "");

        scale.spec.replicas = 8;
        projection.apply_scale(&mut obj, &scale).expect("apply");
        assert_eq!(obj.data["spec"]["parallelism"], 8);
        assert_eq!(obj.data["status"]["active"], 1);
    }
}
