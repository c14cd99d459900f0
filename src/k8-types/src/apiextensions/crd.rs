use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::Crd;
use crate::CrdNames;
use crate::DefaultHeader;
use crate::K8Obj;
use crate::Spec;
use crate::Status;
use crate::APIEXTENSIONS_GROUP;
use crate::V1BETA1;

use super::JsonSchemaProps;

const CRD_API: Crd = Crd {
    group: APIEXTENSIONS_GROUP,
    version: V1BETA1,
    names: CrdNames {
        kind: "CustomResourceDefinition",
        plural: "customresourcedefinitions",
        singular: "customresourcedefinition",
    },
};

pub type CustomResourceDefinition = K8Obj<CustomResourceDefinitionSpec>;

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomResourceDefinitionSpec {
    /// group this resource belongs in
    pub group: String,
    /// version this resource belongs in
    pub version: String,
    pub names: CustomResourceDefinitionNames,
    /// whether the resource is cluster or namespace scoped
    pub scope: Option<ResourceScope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<CustomResourceValidation>,
}

impl Spec for CustomResourceDefinitionSpec {
    type Status = CustomResourceDefinitionStatus;
    type Header = DefaultHeader;
    const NAME_SPACED: bool = false;

    fn metadata() -> &'static Crd {
        &CRD_API
    }
}

impl CustomResourceDefinitionSpec {
    /// name the definition itself must be stored under
    pub fn required_name(&self) -> String {
        format!("{}.{}", self.names.plural, self.group)
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomResourceDefinitionNames {
    pub plural: String,
    pub singular: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub short_names: Vec<String>,
    pub kind: String,
    pub list_kind: String,
}

/// `Other` keeps values we do not recognize so they can be reported
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum ResourceScope {
    Cluster,
    Namespaced,
    Other(String),
}

impl ResourceScope {
    pub const CLUSTER: &'static str = "Cluster";
    pub const NAMESPACED: &'static str = "Namespaced";

    pub fn as_str(&self) -> &str {
        match self {
            Self::Cluster => Self::CLUSTER,
            Self::Namespaced => Self::NAMESPACED,
            Self::Other(other) => other,
        }
    }
}

impl From<String> for ResourceScope {
    fn from(value: String) -> Self {
        if value == Self::CLUSTER {
            Self::Cluster
        } else if value == Self::NAMESPACED {
            Self::Namespaced
        } else {
            Self::Other(value)
        }
    }
}

impl From<ResourceScope> for String {
    fn from(scope: ResourceScope) -> Self {
        scope.as_str().to_owned()
    }
}

impl fmt::Display for ResourceScope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// validation schema, in one of the two supported dialects
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomResourceValidation {
    #[serde(rename = "openAPIV2Schema", skip_serializing_if = "Option::is_none")]
    pub open_api_v2_schema: Option<JsonSchemaProps>,
    #[serde(rename = "openAPIV3Schema", skip_serializing_if = "Option::is_none")]
    pub open_api_v3_schema: Option<JsonSchemaProps>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomResourceDefinitionStatus {
    pub conditions: Vec<CustomResourceDefinitionCondition>,
    /// names actually being served, may differ from spec after a rename
    pub accepted_names: CustomResourceDefinitionNames,
}

impl Status for CustomResourceDefinitionStatus {}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrdConditionType {
    Established,
    NamesAccepted,
    Terminating,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomResourceDefinitionCondition {
    #[serde(rename = "type")]
    pub type_: CrdConditionType,
    pub status: ConditionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
}

impl CustomResourceDefinitionCondition {
    pub fn new(type_: CrdConditionType, status: ConditionStatus) -> Self {
        Self {
            type_,
            status,
            last_transition_time: None,
            reason: String::new(),
            message: String::new(),
        }
    }

    pub fn with_reason<S: Into<String>>(mut self, reason: S, message: S) -> Self {
        self.reason = reason.into();
        self.message = message.into();
        self
    }

    pub fn with_transition_time<S: Into<String>>(mut self, time: S) -> Self {
        self.last_transition_time = Some(time.into());
        self
    }
}

impl CustomResourceDefinitionStatus {
    pub fn find_condition(
        &self,
        condition_type: CrdConditionType,
    ) -> Option<&CustomResourceDefinitionCondition> {
        self.conditions.iter().find(|c| c.type_ == condition_type)
    }

    pub fn is_condition_true(&self, condition_type: CrdConditionType) -> bool {
        self.is_condition_present_and_equal(condition_type, ConditionStatus::True)
    }

    pub fn is_condition_false(&self, condition_type: CrdConditionType) -> bool {
        self.is_condition_present_and_equal(condition_type, ConditionStatus::False)
    }

    pub fn is_condition_present_and_equal(
        &self,
        condition_type: CrdConditionType,
        status: ConditionStatus,
    ) -> bool {
        self.find_condition(condition_type)
            .map(|c| c.status == status)
            .unwrap_or(false)
    }

    /// insert or replace condition of the same type.
    /// transition time is kept when status did not change.
    pub fn set_condition(&mut self, mut condition: CustomResourceDefinitionCondition) {
        match self
            .conditions
            .iter_mut()
            .find(|c| c.type_ == condition.type_)
        {
            Some(existing) => {
                if existing.status == condition.status {
                    condition.last_transition_time = existing.last_transition_time.clone();
                }
                *existing = condition;
            }
            None => self.conditions.push(condition),
        }
    }

    pub fn remove_condition(&mut self, condition_type: CrdConditionType) {
        self.conditions.retain(|c| c.type_ != condition_type);
    }

    pub fn is_established(&self) -> bool {
        self.is_condition_true(CrdConditionType::Established)
    }
}
