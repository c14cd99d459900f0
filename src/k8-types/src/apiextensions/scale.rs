use serde::Deserialize;
use serde::Serialize;

use crate::GroupKind;
use crate::ObjectMeta;
use crate::AUTOSCALING_GROUP;
use crate::V1;

pub const SCALE_KIND: &str = "Scale";

/// Replica count view over a resource. Never stored; built from the underlying object on
/// every read and folded back into it on every write.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scale {
    #[serde(default = "Scale::api_version")]
    pub api_version: String,
    #[serde(default = "Scale::kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ScaleSpec,
    #[serde(default)]
    pub status: ScaleStatus,
}

impl Scale {
    pub fn api_version() -> String {
        format!("{}/{}", AUTOSCALING_GROUP, V1)
    }

    pub fn kind() -> String {
        SCALE_KIND.to_owned()
    }

    pub fn group_kind() -> GroupKind {
        GroupKind::new(AUTOSCALING_GROUP, SCALE_KIND)
    }

    pub fn new(metadata: ObjectMeta, spec: ScaleSpec, status: ScaleStatus) -> Self {
        Self {
            api_version: Self::api_version(),
            kind: Self::kind(),
            metadata,
            spec,
            status,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScaleSpec {
    /// desired number of instances
    pub replicas: i32,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScaleStatus {
    /// actual number of observed instances
    pub replicas: i32,
    /// label query over pods that should match the replicas count, in string form
    pub selector: String,
}
