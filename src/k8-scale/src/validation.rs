use k8_types::apiextensions::Scale;
use k8_types::field::ErrorList;
use k8_types::field::FieldError;
use k8_types::field::FieldPath;

pub fn validate_scale(scale: &Scale) -> ErrorList {
    let mut errors = vec![];
    if scale.spec.replicas < 0 {
        errors.push(FieldError::invalid(
            &FieldPath::new("spec").child("replicas"),
            scale.spec.replicas,
            "must be greater than or equal to 0",
        ));
    }
    errors
}
