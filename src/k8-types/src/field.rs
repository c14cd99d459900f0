//!
//! # Field errors
//!
//! Path annotated validation errors. Validators collect these into an `ErrorList`
//! instead of failing on the first problem.
//!
use std::fmt;

use serde::Serialize;
use serde_json::Value;

pub const FIELD_IMMUTABLE_ERROR_MSG: &str = "field is immutable";

/// dotted/bracketed path to a field, e.g. `spec.names.shortNames[0]`
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new<S: Into<String>>(root: S) -> Self {
        Self(root.into())
    }

    /// empty path, children render without leading dot
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_owned())
        } else {
            Self(format!("{}.{}", self.0, name))
        }
    }

    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    pub fn key(&self, key: &str) -> Self {
        Self(format!("{}[{}]", self.0, key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    Required,
    Invalid,
    Forbidden,
    NotSupported,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Required => write!(f, "Required value"),
            Self::Invalid => write!(f, "Invalid value"),
            Self::Forbidden => write!(f, "Forbidden"),
            Self::NotSupported => write!(f, "Unsupported value"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub error_type: ErrorType,
    pub field: String,
    pub bad_value: Option<Value>,
    /// previous value, only set for immutability violations
    pub old_value: Option<Value>,
    pub detail: String,
}

impl FieldError {
    fn new<D: Into<String>>(
        error_type: ErrorType,
        path: &FieldPath,
        bad_value: Option<Value>,
        detail: D,
    ) -> Self {
        Self {
            error_type,
            field: path.to_string(),
            bad_value,
            old_value: None,
            detail: detail.into(),
        }
    }

    pub fn required<D: Into<String>>(path: &FieldPath, detail: D) -> Self {
        Self::new(ErrorType::Required, path, None, detail)
    }

    pub fn invalid<V, D>(path: &FieldPath, value: V, detail: D) -> Self
    where
        V: Serialize,
        D: Into<String>,
    {
        Self::new(ErrorType::Invalid, path, to_value(value), detail)
    }

    pub fn forbidden<D: Into<String>>(path: &FieldPath, detail: D) -> Self {
        Self::new(ErrorType::Forbidden, path, None, detail)
    }

    pub fn not_supported<V: Serialize>(path: &FieldPath, value: V, valid: &[&str]) -> Self {
        let quoted: Vec<String> = valid.iter().map(|v| format!("\"{}\"", v)).collect();
        Self::new(
            ErrorType::NotSupported,
            path,
            to_value(value),
            format!("supported values: {}", quoted.join(", ")),
        )
    }

    /// a protected field changed between old and new object
    pub fn immutable<V: Serialize>(path: &FieldPath, new_value: V, old_value: V) -> Self {
        let mut error = Self::new(
            ErrorType::Invalid,
            path,
            to_value(new_value),
            FIELD_IMMUTABLE_ERROR_MSG,
        );
        error.old_value = to_value(old_value);
        error
    }

    pub fn is_immutable(&self) -> bool {
        self.error_type == ErrorType::Invalid && self.detail == FIELD_IMMUTABLE_ERROR_MSG
    }
}

fn to_value<V: Serialize>(value: V) -> Option<Value> {
    serde_json::to_value(value).ok()
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.error_type, &self.bad_value) {
            (ErrorType::Required, _) | (ErrorType::Forbidden, _) | (_, None) => {
                write!(f, "{}: {}", self.field, self.error_type)?;
            }
            (_, Some(value)) => {
                write!(f, "{}: {}: {}", self.field, self.error_type, value)?;
            }
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

pub type ErrorList = Vec<FieldError>;

/// render a list the way aggregated errors are shown: `[a, b]`, or the single error
pub fn format_error_list(errors: &[FieldError]) -> String {
    match errors {
        [] => String::new(),
        [single] => single.to_string(),
        many => {
            let items: Vec<String> = many.iter().map(|e| e.to_string()).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

/// check that a field has not changed
pub fn validate_immutable_field<V>(new_value: &V, old_value: &V, path: &FieldPath) -> ErrorList
where
    V: PartialEq + Serialize,
{
    if new_value == old_value {
        vec![]
    } else {
        vec![FieldError::immutable(path, new_value, old_value)]
    }
}

#[cfg(test)]
mod test {

    use super::format_error_list;
    use super::validate_immutable_field;
    use super::ErrorType;
    use super::FieldError;
    use super::FieldPath;

    #[test]
    fn test_path_rendering() {
        let path = FieldPath::new("spec")
            .child("names")
            .child("shortNames")
            .index(1);
        assert_eq!(path.as_str(), "spec.names.shortNames[1]");

        let root = FieldPath::root().child("properties").key("foo").child("not");
        assert_eq!(root.to_string(), "properties[foo].not");
    }

    #[test]
    fn test_error_display() {
        let path = FieldPath::new("spec").child("group");
        let err = FieldError::invalid(&path, "widgets", "should be a domain with at least one dot");
        assert_eq!(
            err.to_string(),
            "spec.group: Invalid value: \"widgets\": should be a domain with at least one dot"
        );

        let required = FieldError::required(&path, "");
        assert_eq!(required.to_string(), "spec.group: Required value");
    }

    #[test]
    fn test_immutable() {
        let path = FieldPath::new("spec").child("version");
        let errors = validate_immutable_field(&"v2".to_owned(), &"v1".to_owned(), &path);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_immutable());
        assert_eq!(errors[0].error_type, ErrorType::Invalid);
        assert_eq!(errors[0].old_value, Some("v1".into()));

        let same = validate_immutable_field(&"v1".to_owned(), &"v1".to_owned(), &path);
        assert!(same.is_empty());
    }

    #[test]
    fn test_format_list() {
        let path = FieldPath::new("spec");
        let errors = vec![
            FieldError::forbidden(&path.child("a"), "no"),
            FieldError::forbidden(&path.child("b"), "no"),
        ];
        assert_eq!(
            format_error_list(&errors),
            "[spec.a: Forbidden: no, spec.b: Forbidden: no]"
        );
    }
}
