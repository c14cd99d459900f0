use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::Crd;
use crate::CrdNames;
use crate::DefaultHeader;
use crate::K8Obj;
use crate::Spec;
use crate::Status;

const REPLICATION_CONTROLLER_API: Crd = Crd {
    group: "core",
    version: "v1",
    names: CrdNames {
        kind: "ReplicationController",
        plural: "replicationcontrollers",
        singular: "replicationcontroller",
    },
};

pub type ReplicationController = K8Obj<ReplicationControllerSpec>;

#[derive(Deserialize, Serialize, Debug, Default, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplicationControllerSpec {
    /// unset means a single replica
    pub replicas: Option<i32>,
    pub min_ready_seconds: Option<i32>,
    pub selector: HashMap<String, String>,
}

impl Spec for ReplicationControllerSpec {
    type Status = ReplicationControllerStatus;
    type Header = DefaultHeader;

    fn metadata() -> &'static Crd {
        &REPLICATION_CONTROLLER_API
    }
}

#[derive(Deserialize, Serialize, Default, Debug, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplicationControllerStatus {
    pub replicas: i32,
    pub fully_labeled_replicas: Option<i32>,
    pub ready_replicas: Option<i32>,
    pub available_replicas: Option<i32>,
    pub observed_generation: Option<i64>,
}

impl Status for ReplicationControllerStatus {}
