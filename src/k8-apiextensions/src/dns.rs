//!
//! # DNS name checks
//!
//! Return human readable messages, empty when the value is valid.
//!
use once_cell::sync::Lazy;
use regex::Regex;

pub const DNS1035_LABEL_MAX_LENGTH: usize = 63;
pub const DNS1123_LABEL_MAX_LENGTH: usize = 63;
pub const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;

const DNS1035_LABEL_FMT: &str = "[a-z]([-a-z0-9]*[a-z0-9])?";
const DNS1123_LABEL_FMT: &str = "[a-z0-9]([-a-z0-9]*[a-z0-9])?";

static DNS1035_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^{}$", DNS1035_LABEL_FMT)).expect("valid dns1035 regex")
});

static DNS1123_SUBDOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^{label}(\.{label})*$",
        label = DNS1123_LABEL_FMT
    ))
    .expect("valid dns1123 regex")
});

fn max_len_error(length: usize) -> String {
    format!("must be no more than {} characters", length)
}

/// a label as used for versions and resource names: lower case, starts with a letter
pub fn is_dns1035_label(value: &str) -> Vec<String> {
    let mut errors = vec![];
    if value.len() > DNS1035_LABEL_MAX_LENGTH {
        errors.push(max_len_error(DNS1035_LABEL_MAX_LENGTH));
    }
    if !DNS1035_LABEL.is_match(value) {
        errors.push(format!(
            "a DNS-1035 label must consist of lower case alphanumeric characters or '-', start with an alphabetic character, and end with an alphanumeric character (e.g. 'my-name', or 'abc-123', regex used for validation is '{}')",
            DNS1035_LABEL_FMT
        ));
    }
    errors
}

/// dot separated sequence of DNS-1123 labels
pub fn is_dns1123_subdomain(value: &str) -> Vec<String> {
    let mut errors = vec![];
    if value.len() > DNS1123_SUBDOMAIN_MAX_LENGTH {
        errors.push(max_len_error(DNS1123_SUBDOMAIN_MAX_LENGTH));
    }
    if !DNS1123_SUBDOMAIN.is_match(value) {
        errors.push(format!(
            "a DNS-1123 subdomain must consist of lower case alphanumeric characters, '-' or '.', and must start and end with an alphanumeric character (e.g. 'example.com', regex used for validation is '{label}(\\.{label})*')",
            label = DNS1123_LABEL_FMT
        ));
    }
    errors
}

#[cfg(test)]
mod test {

    use super::is_dns1035_label;
    use super::is_dns1123_subdomain;

    #[test]
    fn test_dns1035_label() {
        assert!(is_dns1035_label("crontabs").is_empty());
        assert!(is_dns1035_label("v1beta1").is_empty());
        assert!(is_dns1035_label("a-b").is_empty());

        assert_eq!(is_dns1035_label("1abc").len(), 1);
        assert_eq!(is_dns1035_label("CronTab").len(), 1);
        assert_eq!(is_dns1035_label("abc-").len(), 1);
        assert_eq!(is_dns1035_label("").len(), 1);

        let too_long = "a".repeat(64);
        let errors = is_dns1035_label(&too_long);
        assert_eq!(errors, vec!["must be no more than 63 characters".to_owned()]);
    }

    #[test]
    fn test_dns1123_subdomain() {
        assert!(is_dns1123_subdomain("stable.example.com").is_empty());
        assert!(is_dns1123_subdomain("widgets").is_empty());
        assert!(is_dns1123_subdomain("1.example").is_empty());

        assert_eq!(is_dns1123_subdomain("Example.com").len(), 1);
        assert_eq!(is_dns1123_subdomain("example..com").len(), 1);
        assert_eq!(is_dns1123_subdomain(".example.com").len(), 1);
    }
}
