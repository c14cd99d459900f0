//!
//! # Schema validation
//!
//! Structural checks over a declared `JSONSchemaProps` tree. The whole tree is walked and
//! every violation is collected, nothing fails fast.
//!
use std::fmt;

use once_cell::sync::Lazy;
use tracing::debug;
use tracing::trace;
use url::Url;

use k8_types::apiextensions::CustomResourceValidation;
use k8_types::apiextensions::JsonSchemaProps;
use k8_types::apiextensions::JsonSchemaPropsOrArray;
use k8_types::apiextensions::JsonSchemaPropsOrBool;
use k8_types::field::ErrorList;
use k8_types::field::FieldError;
use k8_types::field::FieldPath;

pub const OPEN_API_V2_SCHEMA: &str = "openAPIV2Schema";
pub const OPEN_API_V3_SCHEMA: &str = "openAPIV3Schema";

/// relative references are resolved against this before checking
static REF_BASE: Lazy<Option<Url>> = Lazy::new(|| Url::parse("http://localhost/").ok());

/// OpenAPI dialect a schema is declared in. Each restricts the schema differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    V2,
    V3,
}

impl Dialect {
    /// field of `CustomResourceValidation` holding schemas of this dialect
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::V2 => OPEN_API_V2_SCHEMA,
            Self::V3 => OPEN_API_V3_SCHEMA,
        }
    }

    /// dialect specific restrictions for a single node, children are not visited
    fn forbidden_constructs(&self, schema: &JsonSchemaProps, path: &FieldPath) -> ErrorList {
        match self {
            Self::V3 => v3_forbidden_constructs(schema, path),
            Self::V2 => {
                let mut errors = v3_forbidden_constructs(schema, path);
                errors.append(&mut v2_forbidden_constructs(schema, path));
                errors
            }
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::V2 => write!(f, "v2"),
            Self::V3 => write!(f, "v3"),
        }
    }
}

fn v3_forbidden_constructs(schema: &JsonSchemaProps, path: &FieldPath) -> ErrorList {
    let mut errors = vec![];

    if schema.default.is_some() {
        errors.push(FieldError::forbidden(
            &path.child("default"),
            "default is not supported",
        ));
    }

    if !schema.id.is_empty() {
        errors.push(FieldError::forbidden(&path.child("id"), "id is not supported"));
    }

    if schema.additional_items.is_some() {
        errors.push(FieldError::forbidden(
            &path.child("additionalItems"),
            "additionalItems is not supported",
        ));
    }

    if !schema.pattern_properties.is_empty() {
        errors.push(FieldError::forbidden(
            &path.child("patternProperties"),
            "patternProperties is not supported",
        ));
    }

    if !schema.definitions.is_empty() {
        errors.push(FieldError::forbidden(
            &path.child("definitions"),
            "definitions is not supported",
        ));
    }

    if schema.dependencies.is_some() {
        errors.push(FieldError::forbidden(
            &path.child("dependencies"),
            "dependencies is not supported",
        ));
    }

    let type_names = schema.type_names();
    if type_names.len() > 1 {
        errors.push(FieldError::forbidden(
            &path.child("type"),
            "multiple types are not supported",
        ));
    } else if type_names.contains(&"null") {
        errors.push(FieldError::forbidden(
            &path.child("type"),
            "type cannot be set to null",
        ));
    }

    if let Some(JsonSchemaPropsOrArray::Schemas(_)) = &schema.items {
        errors.push(FieldError::forbidden(
            &path.child("items"),
            "items must be a schema object and not an array",
        ));
    }

    errors
}

/// v2 has no boolean combinators
fn v2_forbidden_constructs(schema: &JsonSchemaProps, path: &FieldPath) -> ErrorList {
    let mut errors = vec![];

    if !schema.one_of.is_empty() {
        errors.push(FieldError::forbidden(
            &path.child("oneOf"),
            "oneOf is not supported in OpenAPI Spec v2.",
        ));
    }

    if !schema.any_of.is_empty() {
        errors.push(FieldError::forbidden(
            &path.child("anyOf"),
            "anyOf is not supported in OpenAPI Spec v2.",
        ));
    }

    if schema.not.is_some() {
        errors.push(FieldError::forbidden(
            &path.child("not"),
            "not is not supported in OpenAPI Spec v2.",
        ));
    }

    errors
}

/// validate a schema document, violation paths are relative to the document root
pub fn validate_json_schema_props(schema: &JsonSchemaProps, dialect: Dialect) -> ErrorList {
    validate_json_schema_props_at(schema, dialect, &FieldPath::root())
}

/// validate a schema document embedded at `path`
pub fn validate_json_schema_props_at(
    schema: &JsonSchemaProps,
    dialect: Dialect,
    path: &FieldPath,
) -> ErrorList {
    let mut errors = vec![];
    validate_node(schema, dialect, path, &mut errors);
    debug!(%dialect, %path, violations = errors.len(), "schema validated");
    errors
}

fn validate_node(
    schema: &JsonSchemaProps,
    dialect: Dialect,
    path: &FieldPath,
    errors: &mut ErrorList,
) {
    trace!(%path, "validating schema node");

    if schema.unique_items {
        errors.push(FieldError::forbidden(
            &path.child("uniqueItems"),
            "uniqueItems cannot be set to true since the runtime complexity becomes quadratic",
        ));
    }

    if let Some(additional) = &schema.additional_properties {
        match additional {
            JsonSchemaPropsOrBool::Allows(false) => errors.push(FieldError::forbidden(
                &path.child("additionalProperties"),
                "additionalProperties cannot be set to false",
            )),
            JsonSchemaPropsOrBool::Allows(true) => {}
            JsonSchemaPropsOrBool::Schema(nested) => validate_node(
                nested,
                dialect,
                &path.child("additionalProperties"),
                errors,
            ),
        }
    }

    if let Some(reference) = &schema.ref_ {
        if let Some(detail) = invalid_reference(reference) {
            errors.push(FieldError::invalid(&path.child("$ref"), reference, detail));
        }
    }

    errors.append(&mut dialect.forbidden_constructs(schema, path));

    if let Some(not) = &schema.not {
        validate_node(not, dialect, &path.child("not"), errors);
    }

    for (index, child) in schema.all_of.iter().enumerate() {
        validate_node(child, dialect, &path.child("allOf").index(index), errors);
    }

    for (index, child) in schema.one_of.iter().enumerate() {
        validate_node(child, dialect, &path.child("oneOf").index(index), errors);
    }

    for (index, child) in schema.any_of.iter().enumerate() {
        validate_node(child, dialect, &path.child("anyOf").index(index), errors);
    }

    for (name, property) in &schema.properties {
        validate_node(
            property,
            dialect,
            &path.child("properties").key(name),
            errors,
        );
    }

    if let Some(JsonSchemaPropsOrBool::Schema(nested)) = &schema.additional_items {
        validate_node(nested, dialect, &path.child("additionalItems"), errors);
    }

    match &schema.items {
        None => {}
        Some(JsonSchemaPropsOrArray::Schema(item)) => {
            validate_node(item, dialect, &path.child("items"), errors)
        }
        // already reported, still look inside so every problem shows up at once
        Some(JsonSchemaPropsOrArray::Schemas(items)) => {
            for (index, item) in items.iter().enumerate() {
                validate_node(item, dialect, &path.child("items").index(index), errors);
            }
        }
    }
}

/// message for a reference that is not a well formed URI, None if it is fine
fn invalid_reference(reference: &str) -> Option<String> {
    if reference.is_empty() {
        return None;
    }

    if reference
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Some(
            "must be a valid URI reference: contains whitespace or control characters".to_owned(),
        );
    }

    let base = match REF_BASE.as_ref() {
        Some(base) => base,
        None => return Some("unable to resolve reference".to_owned()),
    };

    match base.join(reference) {
        Ok(_) => None,
        Err(err) => Some(format!("must be a valid URI reference: {}", err)),
    }
}

/// Validate the `validation` section of a definition. Exactly one dialect may be used.
pub fn validate_custom_resource_validation(
    validation: &CustomResourceValidation,
    path: &FieldPath,
) -> ErrorList {
    let mut errors = vec![];

    match (
        &validation.open_api_v2_schema,
        &validation.open_api_v3_schema,
    ) {
        (None, None) => {
            errors.push(FieldError::required(
                path,
                format!(
                    "one of {} or {} must be set",
                    OPEN_API_V2_SCHEMA, OPEN_API_V3_SCHEMA
                ),
            ));
        }
        (v2, v3) => {
            if v2.is_some() && v3.is_some() {
                errors.push(FieldError::forbidden(
                    &path.child(OPEN_API_V2_SCHEMA),
                    format!("may not be set together with {}", OPEN_API_V3_SCHEMA),
                ));
            }
            if let Some(schema) = v2 {
                errors.append(&mut validate_json_schema_props_at(
                    schema,
                    Dialect::V2,
                    &path.child(Dialect::V2.field_name()),
                ));
            }
            if let Some(schema) = v3 {
                errors.append(&mut validate_json_schema_props_at(
                    schema,
                    Dialect::V3,
                    &path.child(Dialect::V3.field_name()),
                ));
            }
        }
    }

    errors
}

#[cfg(test)]
mod test {

    use serde_json::json;

    use k8_types::apiextensions::CustomResourceValidation;
    use k8_types::apiextensions::JsonSchemaProps;
    use k8_types::field::ErrorType;
    use k8_types::field::FieldPath;

    use super::invalid_reference;
    use super::validate_custom_resource_validation;
    use super::validate_json_schema_props;
    use super::Dialect;

    fn schema(value: serde_json::Value) -> JsonSchemaProps {
        serde_json::from_value(value).expect("schema")
    }

    fn fields(errors: &[k8_types::field::FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_unique_items_forbidden() {
        let doc = schema(json!({ "uniqueItems": true }));
        for dialect in [Dialect::V2, Dialect::V3] {
            let errors = validate_json_schema_props(&doc, dialect);
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "uniqueItems");
            assert_eq!(errors[0].error_type, ErrorType::Forbidden);
        }
    }

    #[test]
    fn test_unique_items_nested_path() {
        let doc = schema(json!({
            "type": "object",
            "properties": {
                "spec": {
                    "type": "object",
                    "properties": {
                        "tags": { "type": "array", "uniqueItems": true }
                    }
                }
            }
        }));
        let errors = validate_json_schema_props(&doc, Dialect::V3);
        assert_eq!(
            fields(&errors),
            vec!["properties[spec].properties[tags].uniqueItems"]
        );
    }

    #[test]
    fn test_additional_properties() {
        let denied = schema(json!({ "additionalProperties": false }));
        let errors = validate_json_schema_props(&denied, Dialect::V3);
        assert_eq!(fields(&errors), vec!["additionalProperties"]);

        let allowed = schema(json!({ "additionalProperties": true }));
        assert!(validate_json_schema_props(&allowed, Dialect::V3).is_empty());

        let nested = schema(json!({
            "additionalProperties": { "type": "string", "uniqueItems": true }
        }));
        let errors = validate_json_schema_props(&nested, Dialect::V3);
        assert_eq!(fields(&errors), vec!["additionalProperties.uniqueItems"]);
    }

    #[test]
    fn test_combinators_by_dialect() {
        let doc = schema(json!({
            "properties": {
                "a": { "oneOf": [ { "type": "string" } ] },
                "b": { "anyOf": [ { "type": "string" } ] },
                "c": { "not": { "type": "string" } }
            }
        }));

        let v2 = validate_json_schema_props(&doc, Dialect::V2);
        assert_eq!(
            fields(&v2),
            vec![
                "properties[a].oneOf",
                "properties[b].anyOf",
                "properties[c].not"
            ]
        );
        assert_eq!(v2[2].detail, "not is not supported in OpenAPI Spec v2.");

        assert!(validate_json_schema_props(&doc, Dialect::V3).is_empty());
    }

    #[test]
    fn test_v3_forbidden_constructs() {
        let doc = schema(json!({
            "id": "foo",
            "default": 1,
            "additionalItems": true,
            "patternProperties": { "^a": { "type": "string" } },
            "definitions": { "d": { "type": "string" } },
            "dependencies": { "a": ["b"] },
            "type": ["string", "integer"],
            "items": [ { "type": "string" } ]
        }));
        let errors = validate_json_schema_props(&doc, Dialect::V3);
        assert_eq!(
            fields(&errors),
            vec![
                "default",
                "id",
                "additionalItems",
                "patternProperties",
                "definitions",
                "dependencies",
                "type",
                "items"
            ]
        );
        assert!(errors
            .iter()
            .all(|e| e.error_type == ErrorType::Forbidden));
    }

    #[test]
    fn test_null_type() {
        let doc = schema(json!({ "type": "null" }));
        let errors = validate_json_schema_props(&doc, Dialect::V3);
        assert_eq!(fields(&errors), vec!["type"]);

        let single = schema(json!({ "type": ["string"] }));
        assert!(validate_json_schema_props(&single, Dialect::V3).is_empty());
    }

    #[test]
    fn test_items_array_elements_visited() {
        let doc = schema(json!({
            "items": [ { "type": "string" }, { "uniqueItems": true } ]
        }));
        let errors = validate_json_schema_props(&doc, Dialect::V3);
        assert_eq!(fields(&errors), vec!["items", "items[1].uniqueItems"]);
    }

    #[test]
    fn test_valid_schema_has_no_violations() {
        let doc = schema(json!({
            "type": "object",
            "description": "a cron tab",
            "required": ["spec"],
            "$ref": "#/definitions/crontab",
            "properties": {
                "spec": {
                    "type": "object",
                    "properties": {
                        "cronSpec": {
                            "type": "string",
                            "pattern": "^(\\d+|\\*)(/\\d+)?(\\s+(\\d+|\\*)(/\\d+)?){4}$"
                        },
                        "replicas": { "type": "integer", "minimum": 1, "maximum": 10 },
                        "tags": { "type": "array", "items": { "type": "string" }, "maxItems": 5 }
                    },
                    "allOf": [ { "required": ["cronSpec"] } ]
                }
            }
        }));
        assert!(validate_json_schema_props(&doc, Dialect::V2).is_empty());
        assert!(validate_json_schema_props(&doc, Dialect::V3).is_empty());
    }

    #[test]
    fn test_reference() {
        assert!(invalid_reference("#/definitions/foo").is_none());
        assert!(invalid_reference("http://example.com/schema.json#foo").is_none());
        assert!(invalid_reference("other.json").is_none());
        assert!(invalid_reference("has space").is_some());
        assert!(invalid_reference("http://[::1").is_some());

        let doc = schema(json!({
            "$ref": "http://[::1",
            "properties": { "a": { "uniqueItems": true } }
        }));
        let errors = validate_json_schema_props(&doc, Dialect::V3);
        assert_eq!(fields(&errors), vec!["$ref", "properties[a].uniqueItems"]);
        assert_eq!(errors[0].error_type, ErrorType::Invalid);
    }

    #[test]
    fn test_validation_dialect_selection() {
        let path = FieldPath::new("spec").child("validation");

        let none = CustomResourceValidation::default();
        let errors = validate_custom_resource_validation(&none, &path);
        assert_eq!(fields(&errors), vec!["spec.validation"]);
        assert_eq!(errors[0].error_type, ErrorType::Required);

        let both = CustomResourceValidation {
            open_api_v2_schema: Some(JsonSchemaProps::typed("object")),
            open_api_v3_schema: Some(JsonSchemaProps::typed("object")),
        };
        let errors = validate_custom_resource_validation(&both, &path);
        assert_eq!(fields(&errors), vec!["spec.validation.openAPIV2Schema"]);
        assert_eq!(errors[0].error_type, ErrorType::Forbidden);

        let v2 = CustomResourceValidation {
            open_api_v2_schema: Some(schema(json!({ "not": { "type": "string" } }))),
            open_api_v3_schema: None,
        };
        let errors = validate_custom_resource_validation(&v2, &path);
        assert_eq!(
            fields(&errors),
            vec!["spec.validation.openAPIV2Schema.not"]
        );
    }
}
