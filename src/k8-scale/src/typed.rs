use k8_types::apiextensions::Scale;
use k8_types::apiextensions::ScaleSpec;
use k8_types::apiextensions::ScaleStatus;
use k8_types::app::deployment::Deployment;
use k8_types::app::deployment::DeploymentSpec;
use k8_types::core::replication_controller::ReplicationController;
use k8_types::core::replication_controller::ReplicationControllerSpec;
use k8_types::format_label_set;
use k8_types::ApiError;
use k8_types::AUTOSCALING_GROUP;
use k8_types::GroupResource;
use k8_types::Spec;

use crate::scale_metadata;
use crate::ScaleProjection;

/// unset replicas on a workload means one
const DEFAULT_REPLICAS: i32 = 1;

pub const SCALE_SUBRESOURCE: &str = "scale";

#[derive(Debug, Clone)]
pub struct ReplicationControllerScale {
    scale_resource: GroupResource,
}

impl Default for ReplicationControllerScale {
    fn default() -> Self {
        Self {
            scale_resource: ReplicationControllerSpec::metadata()
                .subresource_in(AUTOSCALING_GROUP, SCALE_SUBRESOURCE),
        }
    }
}

impl ScaleProjection for ReplicationControllerScale {
    type Object = ReplicationController;

    fn scale_resource(&self) -> &GroupResource {
        &self.scale_resource
    }

    fn scale_from(&self, rc: &ReplicationController) -> Result<Scale, ApiError> {
        Ok(Scale::new(
            scale_metadata(&rc.metadata),
            ScaleSpec {
                replicas: rc.spec.replicas.unwrap_or(DEFAULT_REPLICAS),
            },
            ScaleStatus {
                replicas: rc.status.replicas,
                selector: format_label_set(&rc.spec.selector),
            },
        ))
    }

    fn apply_scale(&self, rc: &mut ReplicationController, scale: &Scale) -> Result<(), ApiError> {
        rc.spec.replicas = Some(scale.spec.replicas);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DeploymentScale {
    scale_resource: GroupResource,
}

impl Default for DeploymentScale {
    fn default() -> Self {
        Self {
            scale_resource: DeploymentSpec::metadata()
                .subresource_in(AUTOSCALING_GROUP, SCALE_SUBRESOURCE),
        }
    }
}

impl ScaleProjection for DeploymentScale {
    type Object = Deployment;

    fn scale_resource(&self) -> &GroupResource {
        &self.scale_resource
    }

    fn scale_from(&self, deployment: &Deployment) -> Result<Scale, ApiError> {
        Ok(Scale::new(
            scale_metadata(&deployment.metadata),
            ScaleSpec {
                replicas: deployment.spec.replicas.unwrap_or(DEFAULT_REPLICAS),
            },
            ScaleStatus {
                replicas: deployment.status.replicas.unwrap_or_default(),
                selector: deployment.spec.selector.to_selector_string(),
            },
        ))
    }

    fn apply_scale(&self, deployment: &mut Deployment, scale: &Scale) -> Result<(), ApiError> {
        deployment.spec.replicas = Some(scale.spec.replicas);
        Ok(())
    }
}

#[cfg(test)]
mod test {

    use serde_json::json;

    use k8_types::app::deployment::Deployment;
    use k8_types::core::replication_controller::ReplicationController;

    use crate::ScaleProjection;

    use super::DeploymentScale;
    use super::ReplicationControllerScale;

    #[test]
    fn test_rc_scale() {
        let rc: ReplicationController = serde_json::from_value(json!({
            "metadata": {
                "name": "frontend",
                "namespace": "default",
                "uid": "abc",
                "resourceVersion": "7",
                "labels": { "ignored": "true" }
            },
            "spec": { "replicas": 3, "selector": { "foo": "bar", "app": "web" } },
            "status": { "replicas": 2 }
        }))
        .expect("rc");

        let projection = ReplicationControllerScale::default();
        assert_eq!(
            projection.scale_resource().to_string(),
            "replicationcontrollers/scale.autoscaling"
        );

        let scale = projection.scale_from(&rc).expect("scale");
        assert_eq!(scale.spec.replicas, 3);
        assert_eq!(scale.status.replicas, 2);
        assert_eq!(scale.status.selector, "app=web,foo=bar");
        assert_eq!(scale.metadata.uid, "abc");
        assert_eq!(scale.metadata.resource_version, "7");
        assert!(scale.metadata.labels.is_empty());
        assert_eq!(scale.api_version, "autoscaling/v1");
    }

    #[test]
    fn test_rc_default_replicas() {
        let rc = ReplicationController::default();
        let scale = ReplicationControllerScale::default()
            .scale_from(&rc)
            .expect("scale");
        assert_eq!(scale.spec.replicas, 1);
    }

    #[test]
    fn test_deployment_scale() {
        let mut deployment: Deployment = serde_json::from_value(json!({
            "metadata": { "name": "nginx", "namespace": "default", "resourceVersion": "1" },
            "spec": {
                "replicas": 4,
                "selector": {
                    "matchLabels": { "app": "nginx" },
                    "matchExpressions": [
                        { "key": "tier", "operator": "In", "values": ["web", "cache"] }
                    ]
                }
            },
            "status": {
                "replicas": 4,
                "availableReplicas": 3,
                "conditions": [ { "type": "Available", "status": "True" } ]
            }
        }))
        .expect("deployment");

        let projection = DeploymentScale::default();
        assert_eq!(
            projection.scale_resource().to_string(),
            "deployments/scale.autoscaling"
        );

        let mut scale = projection.scale_from(&deployment).expect("scale");
        assert_eq!(scale.status.replicas, 4);
        assert_eq!(scale.status.selector, "app=nginx,tier in (cache,web)");

        scale.spec.replicas = 0;
        projection
            .apply_scale(&mut deployment, &scale)
            .expect("apply");
        assert_eq!(deployment.spec.replicas, Some(0));
    }
}
