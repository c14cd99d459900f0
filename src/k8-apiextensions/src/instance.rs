//!
//! # Instance validation
//!
//! Checks a custom resource document against the schema declared by its definition.
//! Runs at admission, after the schema itself was accepted. The declared schema is
//! relaxed before it is compiled: `uniqueItems` is never enforced and additional
//! properties are always allowed.
//!
use jsonschema::error::ValidationErrorKind;
use jsonschema::ValidationError;
use serde_json::Value;
use tracing::debug;

use k8_types::apiextensions::CustomResourceDefinitionSpec;
use k8_types::apiextensions::JsonSchemaProps;
use k8_types::apiextensions::JsonSchemaPropsOrArray;
use k8_types::apiextensions::JsonSchemaPropsOrBool;
use k8_types::apiextensions::JsonSchemaPropsOrStringArray;
use k8_types::field::ErrorList;
use k8_types::field::FieldError;
use k8_types::field::FieldPath;

/// declared schemas follow draft 4, e.g. boolean `exclusiveMinimum`
const DRAFT4_SCHEMA: &str = "http://json-schema.org/draft-04/schema#";

/// field name reported for violations of the document itself
pub const ROOT_FIELD: &str = "(root)";

/// Validate a custom resource against the definition's schema.
/// The v3 schema wins when both are present; no schema means anything goes.
pub fn validate_custom_resource(obj: &Value, crd: &CustomResourceDefinitionSpec) -> ErrorList {
    let schema = match crd.validation.as_ref().and_then(|v| {
        v.open_api_v3_schema
            .as_ref()
            .or(v.open_api_v2_schema.as_ref())
    }) {
        Some(schema) => schema,
        None => return vec![],
    };

    let errors = validate_value(obj, schema, &FieldPath::root());
    debug!(
        group = %crd.group,
        kind = %crd.names.kind,
        violations = errors.len(),
        "validated custom resource"
    );
    errors
}

/// validate `value` located at `path` against `schema`
pub fn validate_value(value: &Value, schema: &JsonSchemaProps, path: &FieldPath) -> ErrorList {
    let document = match instance_schema(schema) {
        Ok(document) => document,
        Err(err) => {
            return vec![FieldError::invalid(
                &display_path(path.clone()),
                value,
                format!("schema can not be encoded: {}", err),
            )]
        }
    };

    let validator = match jsonschema::validator_for(&document) {
        Ok(validator) => validator,
        Err(err) => {
            return vec![FieldError::invalid(
                &display_path(path.clone()),
                value,
                format!("schema can not be compiled: {}", err),
            )]
        }
    };

    let mut errors: ErrorList = validator
        .iter_errors(value)
        .filter_map(|error| field_error(value, path, error))
        .collect();
    errors.sort_by(|a, b| a.field.cmp(&b.field));
    errors
}

/// schema document handed to the validator
fn instance_schema(schema: &JsonSchemaProps) -> Result<Value, serde_json::Error> {
    let mut relaxed = schema.clone();
    relax(&mut relaxed);
    relaxed.schema = DRAFT4_SCHEMA.to_owned();
    serde_json::to_value(&relaxed)
}

/// Drop what admission does not enforce. References, ids and definitions never pass
/// schema validation, they are removed so nothing needs resolving.
fn relax(schema: &mut JsonSchemaProps) {
    schema.unique_items = false;
    schema.ref_ = None;
    schema.id.clear();
    schema.schema.clear();
    schema.definitions.clear();
    if let Some(JsonSchemaPropsOrBool::Allows(false)) = schema.additional_properties {
        schema.additional_properties = None;
    }

    let mut children: Vec<&mut JsonSchemaProps> = vec![];
    match &mut schema.items {
        Some(JsonSchemaPropsOrArray::Schema(item)) => children.push(item.as_mut()),
        Some(JsonSchemaPropsOrArray::Schemas(items)) => children.extend(items.iter_mut()),
        None => {}
    }
    children.extend(schema.all_of.iter_mut());
    children.extend(schema.one_of.iter_mut());
    children.extend(schema.any_of.iter_mut());
    children.extend(schema.not.as_deref_mut());
    children.extend(schema.properties.values_mut());
    children.extend(schema.pattern_properties.values_mut());
    if let Some(JsonSchemaPropsOrBool::Schema(nested)) = &mut schema.additional_properties {
        children.push(nested.as_mut());
    }
    if let Some(JsonSchemaPropsOrBool::Schema(nested)) = &mut schema.additional_items {
        children.push(nested.as_mut());
    }
    if let Some(dependencies) = &mut schema.dependencies {
        for dependency in dependencies.values_mut() {
            if let JsonSchemaPropsOrStringArray::Schema(nested) = dependency {
                children.push(nested.as_mut());
            }
        }
    }

    for child in children {
        relax(child);
    }
}

fn field_error(
    document: &Value,
    base: &FieldPath,
    error: ValidationError<'_>,
) -> Option<FieldError> {
    let path = instance_field_path(document, base, &error.instance_path.to_string());
    let instance: &Value = &error.instance;

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let name = match property {
                Value::String(name) => name.clone(),
                other => other.to_string(),
            };
            Some(FieldError::required(&path.child(&name), ""))
        }
        ValidationErrorKind::Enum { options } => {
            let allowed: Vec<String> = match options {
                Value::Array(options) => options.iter().map(enum_label).collect(),
                other => vec![enum_label(other)],
            };
            let allowed: Vec<&str> = allowed.iter().map(|a| a.as_str()).collect();
            Some(FieldError::not_supported(
                &display_path(path),
                instance,
                &allowed,
            ))
        }
        ValidationErrorKind::MultipleOf { multiple_of }
            if instance
                .as_f64()
                .map(|number| is_multiple_of(number, *multiple_of))
                .unwrap_or(false) =>
        {
            None
        }
        _ => Some(FieldError::invalid(
            &display_path(path),
            instance,
            error.to_string(),
        )),
    }
}

/// Quotient computed the way the apiserver does, so decimal factors such as 0.1 divide
/// decimal values exactly.
fn is_multiple_of(number: f64, factor: f64) -> bool {
    if factor <= 0.0 {
        return false;
    }
    let quotient = if factor < 1.0 {
        (1.0 / factor) * number
    } else {
        number / factor
    };
    quotient == quotient.trunc()
}

/// Turn a JSON pointer into a field path. Numeric tokens are indexes only when the
/// value they address is an array.
fn instance_field_path(document: &Value, base: &FieldPath, pointer: &str) -> FieldPath {
    let mut path = base.clone();
    let mut current = Some(document);
    for token in pointer.split('/').skip(1) {
        let token = token.replace("~1", "/").replace("~0", "~");
        current = match current {
            Some(Value::Array(items)) => match token.parse::<usize>() {
                Ok(index) => {
                    path = path.index(index);
                    items.get(index)
                }
                Err(_) => {
                    path = path.child(&token);
                    None
                }
            },
            Some(Value::Object(properties)) => {
                path = path.child(&token);
                properties.get(&token)
            }
            _ => {
                path = path.child(&token);
                None
            }
        };
    }
    path
}

fn display_path(path: FieldPath) -> FieldPath {
    if path.as_str().is_empty() {
        FieldPath::new(ROOT_FIELD)
    } else {
        path
    }
}

fn enum_label(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
