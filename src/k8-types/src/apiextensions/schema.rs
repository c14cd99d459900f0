use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// One node of a declared validation schema.
/// Children are owned by their parent, documents are parsed so there are no cycles.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct JsonSchemaProps {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "$schema", skip_serializing_if = "String::is_empty")]
    pub schema: String,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<JsonSchemaType>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub format: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "is_false")]
    pub exclusive_maximum: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "is_false")]
    pub exclusive_minimum: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<i64>,
    #[serde(skip_serializing_if = "is_false")]
    pub unique_items: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<JsonSchemaPropsOrArray>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<JsonSchemaProps>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<JsonSchemaProps>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<JsonSchemaProps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<JsonSchemaProps>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, JsonSchemaProps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<JsonSchemaPropsOrBool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub pattern_properties: BTreeMap<String, JsonSchemaProps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeMap<String, JsonSchemaPropsOrStringArray>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_items: Option<JsonSchemaPropsOrBool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, JsonSchemaProps>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl JsonSchemaProps {
    /// shorthand for a node with only a type
    pub fn typed<S: Into<String>>(type_name: S) -> Self {
        Self {
            type_: Some(JsonSchemaType::Single(type_name.into())),
            ..Default::default()
        }
    }

    /// declared type names, in order
    pub fn type_names(&self) -> Vec<&str> {
        match &self.type_ {
            None => vec![],
            Some(type_) => type_.names(),
        }
    }
}

/// `type` is a single name, legacy documents may carry an ordered list
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum JsonSchemaType {
    Single(String),
    Multiple(Vec<String>),
}

impl JsonSchemaType {
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Single(name) => vec![name.as_str()],
            Self::Multiple(names) => names.iter().map(|n| n.as_str()).collect(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum JsonSchemaPropsOrArray {
    Schemas(Vec<JsonSchemaProps>),
    Schema(Box<JsonSchemaProps>),
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum JsonSchemaPropsOrBool {
    Allows(bool),
    Schema(Box<JsonSchemaProps>),
}

impl JsonSchemaPropsOrBool {
    /// a nested schema always implies allowing
    pub fn allows(&self) -> bool {
        match self {
            Self::Allows(allows) => *allows,
            Self::Schema(_) => true,
        }
    }

    pub fn schema(&self) -> Option<&JsonSchemaProps> {
        match self {
            Self::Allows(_) => None,
            Self::Schema(schema) => Some(schema),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum JsonSchemaPropsOrStringArray {
    Property(Vec<String>),
    Schema(Box<JsonSchemaProps>),
}
