use thiserror::Error;

use crate::field::format_error_list;
use crate::field::ErrorList;
use crate::GroupKind;
use crate::GroupResource;

/// Status style error returned by stores and registries
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{resource} \"{name}\" not found")]
    NotFound { resource: GroupResource, name: String },
    #[error("{resource} \"{name}\" already exists")]
    AlreadyExists { resource: GroupResource, name: String },
    #[error("Operation cannot be fulfilled on {resource} \"{name}\": {message}")]
    Conflict {
        resource: GroupResource,
        name: String,
        message: String,
    },
    #[error("{0}")]
    BadRequest(String),
    #[error("{kind} \"{name}\" is invalid: {}", format_error_list(.errors))]
    Invalid {
        kind: GroupKind,
        name: String,
        errors: ErrorList,
    },
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    pub fn not_found<N: Into<String>>(resource: GroupResource, name: N) -> Self {
        Self::NotFound {
            resource,
            name: name.into(),
        }
    }

    pub fn conflict<N, M>(resource: GroupResource, name: N, message: M) -> Self
    where
        N: Into<String>,
        M: Into<String>,
    {
        Self::Conflict {
            resource,
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn bad_request<M: Into<String>>(message: M) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn invalid<N: Into<String>>(kind: GroupKind, name: N, errors: ErrorList) -> Self {
        Self::Invalid {
            kind,
            name: name.into(),
            errors,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest(_))
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }
}

#[cfg(test)]
mod test {

    use crate::field::FieldError;
    use crate::field::FieldPath;
    use crate::GroupKind;
    use crate::GroupResource;

    use super::ApiError;

    #[test]
    fn test_not_found_message() {
        let err = ApiError::not_found(
            GroupResource::new("", "replicationcontrollers/scale"),
            "frontend",
        );
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "replicationcontrollers/scale \"frontend\" not found"
        );
    }

    #[test]
    fn test_invalid_message() {
        let path = FieldPath::new("spec").child("replicas");
        let err = ApiError::invalid(
            GroupKind::new("autoscaling", "Scale"),
            "frontend",
            vec![FieldError::invalid(&path, -1, "must be greater than or equal to 0")],
        );
        assert!(err.is_invalid());
        assert_eq!(
            err.to_string(),
            "Scale.autoscaling \"frontend\" is invalid: spec.replicas: Invalid value: -1: must be greater than or equal to 0"
        );
    }
}
