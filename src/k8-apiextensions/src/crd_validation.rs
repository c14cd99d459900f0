use tracing::debug;

use k8_types::apiextensions::CrdConditionType;
use k8_types::apiextensions::CustomResourceDefinition;
use k8_types::apiextensions::CustomResourceDefinitionNames;
use k8_types::apiextensions::CustomResourceDefinitionSpec;
use k8_types::apiextensions::CustomResourceDefinitionStatus;
use k8_types::apiextensions::ResourceScope;
use k8_types::field::validate_immutable_field;
use k8_types::field::ErrorList;
use k8_types::field::FieldError;
use k8_types::field::FieldPath;
use k8_types::ObjectMeta;

use crate::dns::is_dns1035_label;
use crate::dns::is_dns1123_subdomain;
use crate::validate_custom_resource_validation;

/// Validate a definition being created: its name, spec and status
pub fn validate_custom_resource_definition(crd: &CustomResourceDefinition) -> ErrorList {
    let metadata_path = FieldPath::new("metadata");
    let mut errors = validate_definition_name(&crd.metadata, &crd.spec, &metadata_path);
    errors.append(&mut validate_custom_resource_definition_spec(
        &crd.spec,
        &FieldPath::new("spec"),
    ));
    errors.append(&mut validate_custom_resource_definition_status(
        &crd.status,
        &FieldPath::new("status"),
    ));
    debug!(name = %crd.metadata.name, violations = errors.len(), "validated definition");
    errors
}

/// Validate an update. Established is taken from the stored object.
pub fn validate_custom_resource_definition_update(
    crd: &CustomResourceDefinition,
    old: &CustomResourceDefinition,
) -> ErrorList {
    let metadata_path = FieldPath::new("metadata");
    let mut errors = validate_name_update(&crd.metadata, &old.metadata, &metadata_path);
    errors.append(&mut validate_custom_resource_definition_spec_update(
        &crd.spec,
        &old.spec,
        old.status.is_established(),
        &FieldPath::new("spec"),
    ));
    errors.append(&mut validate_custom_resource_definition_status(
        &crd.status,
        &FieldPath::new("status"),
    ));
    debug!(name = %crd.metadata.name, violations = errors.len(), "validated definition update");
    errors
}

/// Validate a write to the status subresource
pub fn validate_update_custom_resource_definition_status(
    crd: &CustomResourceDefinition,
    old: &CustomResourceDefinition,
) -> ErrorList {
    let status_path = FieldPath::new("status");
    let metadata_path = FieldPath::new("metadata");
    let mut errors = validate_name_update(&crd.metadata, &old.metadata, &metadata_path);
    errors.append(&mut validate_custom_resource_definition_status(
        &crd.status,
        &status_path,
    ));

    // once established a definition stays established until deleted
    if old.status.is_established() && !crd.status.is_established() {
        let conditions_path = status_path.child("conditions");
        let error = match crd
            .status
            .conditions
            .iter()
            .position(|c| c.type_ == CrdConditionType::Established)
        {
            Some(index) => FieldError::forbidden(
                &conditions_path.index(index),
                "Established condition may not be reverted once true",
            ),
            None => FieldError::forbidden(
                &conditions_path,
                "Established condition may not be removed once true",
            ),
        };
        errors.push(error);
    }

    errors
}

fn validate_definition_name(
    meta: &ObjectMeta,
    spec: &CustomResourceDefinitionSpec,
    path: &FieldPath,
) -> ErrorList {
    let name_path = path.child("name");
    if meta.name.is_empty() {
        return vec![FieldError::required(&name_path, "name is required")];
    }

    let mut messages = is_dns1123_subdomain(&meta.name);
    if meta.name != spec.required_name() {
        messages.push(r#"must be spec.names.plural+"."+spec.group"#.to_owned());
    }
    messages
        .into_iter()
        .map(|message| FieldError::invalid(&name_path, &meta.name, message))
        .collect()
}

fn validate_name_update(meta: &ObjectMeta, old: &ObjectMeta, path: &FieldPath) -> ErrorList {
    validate_immutable_field(&meta.name, &old.name, &path.child("name"))
}

/// Validate spec of a definition, `path` is where the spec is located
pub fn validate_custom_resource_definition_spec(
    spec: &CustomResourceDefinitionSpec,
    path: &FieldPath,
) -> ErrorList {
    let mut errors = vec![];

    let group_path = path.child("group");
    if spec.group.is_empty() {
        errors.push(FieldError::required(&group_path, ""));
    } else {
        let messages = is_dns1123_subdomain(&spec.group);
        if !messages.is_empty() {
            errors.push(FieldError::invalid(
                &group_path,
                &spec.group,
                messages.join(","),
            ));
        } else if spec.group.split('.').count() < 2 {
            errors.push(FieldError::invalid(
                &group_path,
                &spec.group,
                "should be a domain with at least one dot",
            ));
        }
    }

    let version_path = path.child("version");
    if spec.version.is_empty() {
        errors.push(FieldError::required(&version_path, ""));
    } else {
        let messages = is_dns1035_label(&spec.version);
        if !messages.is_empty() {
            errors.push(FieldError::invalid(
                &version_path,
                &spec.version,
                messages.join(","),
            ));
        }
    }

    let scope_path = path.child("scope");
    match &spec.scope {
        None => errors.push(FieldError::required(&scope_path, "")),
        Some(ResourceScope::Other(scope)) if scope.is_empty() => {
            errors.push(FieldError::required(&scope_path, ""))
        }
        Some(ResourceScope::Other(scope)) => errors.push(FieldError::not_supported(
            &scope_path,
            scope,
            &[ResourceScope::CLUSTER, ResourceScope::NAMESPACED],
        )),
        Some(ResourceScope::Cluster) | Some(ResourceScope::Namespaced) => {}
    }

    // spec requires all names, status does not
    let names_path = path.child("names");
    let names = &spec.names;
    for (field, value) in [
        ("plural", &names.plural),
        ("singular", &names.singular),
        ("kind", &names.kind),
        ("listKind", &names.list_kind),
    ] {
        if value.is_empty() {
            errors.push(FieldError::required(&names_path.child(field), ""));
        }
    }

    errors.append(&mut validate_custom_resource_definition_names(
        names,
        &names_path,
    ));

    if let Some(validation) = &spec.validation {
        errors.append(&mut validate_custom_resource_validation(
            validation,
            &path.child("validation"),
        ));
    }

    errors
}

/// Spec update: everything checked on create, plus the fields that may not change.
/// Group and plural name the stored resource so they never change; version, scope and
/// kind are frozen once the definition has been established.
pub fn validate_custom_resource_definition_spec_update(
    spec: &CustomResourceDefinitionSpec,
    old: &CustomResourceDefinitionSpec,
    established: bool,
    path: &FieldPath,
) -> ErrorList {
    let mut errors = validate_custom_resource_definition_spec(spec, path);

    if established {
        errors.append(&mut validate_immutable_field(
            &spec.version,
            &old.version,
            &path.child("version"),
        ));
        errors.append(&mut validate_immutable_field(
            &spec.scope,
            &old.scope,
            &path.child("scope"),
        ));
        errors.append(&mut validate_immutable_field(
            &spec.names.kind,
            &old.names.kind,
            &path.child("names").child("kind"),
        ));
    }

    errors.append(&mut validate_immutable_field(
        &spec.group,
        &old.group,
        &path.child("group"),
    ));
    errors.append(&mut validate_immutable_field(
        &spec.names.plural,
        &old.names.plural,
        &path.child("names").child("plural"),
    ));

    errors
}

pub fn validate_custom_resource_definition_status(
    status: &CustomResourceDefinitionStatus,
    path: &FieldPath,
) -> ErrorList {
    validate_custom_resource_definition_names(&status.accepted_names, &path.child("acceptedNames"))
}

/// Name syntax checks. Empty names are skipped, callers decide what is required.
pub fn validate_custom_resource_definition_names(
    names: &CustomResourceDefinitionNames,
    path: &FieldPath,
) -> ErrorList {
    let mut errors = vec![];

    for (field, value) in [("plural", &names.plural), ("singular", &names.singular)] {
        if value.is_empty() {
            continue;
        }
        let messages = is_dns1035_label(value);
        if !messages.is_empty() {
            errors.push(FieldError::invalid(
                &path.child(field),
                value,
                messages.join(","),
            ));
        }
    }

    for (field, value) in [("kind", &names.kind), ("listKind", &names.list_kind)] {
        if value.is_empty() {
            continue;
        }
        let messages = is_dns1035_label(&value.to_lowercase());
        if !messages.is_empty() {
            errors.push(FieldError::invalid(
                &path.child(field),
                value,
                format!(
                    "may have mixed case, but should otherwise match: {}",
                    messages.join(",")
                ),
            ));
        }
    }

    for (index, short_name) in names.short_names.iter().enumerate() {
        let messages = is_dns1035_label(short_name);
        if !messages.is_empty() {
            errors.push(FieldError::invalid(
                &path.child("shortNames").index(index),
                short_name,
                messages.join(","),
            ));
        }
    }

    // request routing would be ambiguous otherwise
    if !names.kind.is_empty() && names.kind == names.list_kind {
        errors.push(FieldError::invalid(
            &path.child("listKind"),
            &names.list_kind,
            "kind and listKind may not be the same",
        ));
    }

    errors
}
