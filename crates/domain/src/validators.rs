use crate::errors::DomainError;

const MAX_NAME_LENGTH: usize = 255;
const MAX_LABEL_LENGTH: usize = 63;

/// Syntax check for a presentation-format domain name.
///
/// The empty name is the root zone. A trailing dot is accepted. A label made of
/// a single `*` is allowed for wildcard owners.
pub fn is_domain_name_valid(domain: &str) -> bool {
    check_domain_name(domain).is_ok()
}

/// Like [`is_domain_name_valid`], but the error names the offending rule.
pub fn validate_domain_name(domain: &str) -> Result<(), DomainError> {
    check_domain_name(domain)
        .map_err(|reason| DomainError::InvalidDomainName(format!("{}: {}", domain, reason)))
}

fn check_domain_name(domain: &str) -> Result<(), String> {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    if domain.is_empty() {
        return Ok(());
    }
    if domain.len() > MAX_NAME_LENGTH {
        return Err(format!("length cannot exceed {} bytes", MAX_NAME_LENGTH));
    }

    domain.split('.').try_for_each(check_label)
}

fn check_label(label: &str) -> Result<(), String> {
    if label == "*" {
        return Ok(());
    }
    if label.is_empty() {
        return Err("label length cannot be 0 bytes".to_string());
    }
    if label.len() > MAX_LABEL_LENGTH {
        return Err(format!(
            "label length cannot exceed {} bytes",
            MAX_LABEL_LENGTH
        ));
    }
    if label.starts_with('-') {
        return Err("label cannot start with a hyphen".to_string());
    }
    if label.ends_with('-') {
        return Err("label cannot end with a hyphen".to_string());
    }

    match label
        .chars()
        .find(|&c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
    {
        Some(c) => Err(format!("invalid character '{}' was found", c.escape_default())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(domain: &str) -> String {
        match validate_domain_name(domain) {
            Err(DomainError::InvalidDomainName(message)) => message,
            other => panic!("expected InvalidDomainName, got {:?}", other),
        }
    }

    #[test]
    fn test_root_is_valid() {
        assert!(is_domain_name_valid(""));
        assert!(is_domain_name_valid("."));
    }

    #[test]
    fn test_common_names() {
        assert!(is_domain_name_valid("example.com"));
        assert!(is_domain_name_valid("_dmarc.example.com."));
        assert!(is_domain_name_valid("*.example.com"));
        assert!(is_domain_name_valid("xn--bcher-kva.example"));
    }

    #[test]
    fn test_rejects_bad_labels() {
        assert!(!is_domain_name_valid("-bad.example"));
        assert!(!is_domain_name_valid("bad-.example"));
        assert!(!is_domain_name_valid("a..b"));
        assert!(!is_domain_name_valid("sp ace.example"));
        assert!(!is_domain_name_valid("a*b.example"));
        assert!(!is_domain_name_valid(&format!("{}.com", "a".repeat(64))));
    }

    #[test]
    fn test_rejects_long_names() {
        let label = "a".repeat(63);
        let name = [label.as_str(); 5].join(".");
        assert!(name.len() > 255);
        assert!(!is_domain_name_valid(&name));
        assert!(reason(&name).ends_with(": length cannot exceed 255 bytes"));
    }

    #[test]
    fn test_validate_names_domain_and_reason() {
        assert_eq!(
            reason("bad..name"),
            "bad..name: label length cannot be 0 bytes"
        );
        let err = validate_domain_name("bad..name").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid domain name: bad..name: label length cannot be 0 bytes"
        );
    }

    #[test]
    fn test_reason_for_each_label_rule() {
        let long = format!("{}.com", "a".repeat(64));
        assert_eq!(
            reason(&long),
            format!("{}: label length cannot exceed 63 bytes", long)
        );
        assert_eq!(
            reason("-bad.example"),
            "-bad.example: label cannot start with a hyphen"
        );
        assert_eq!(
            reason("bad-.example"),
            "bad-.example: label cannot end with a hyphen"
        );
        assert_eq!(
            reason("sp ace.example"),
            "sp ace.example: invalid character ' ' was found"
        );
        assert_eq!(
            reason("a*b.example"),
            "a*b.example: invalid character '*' was found"
        );
    }

    #[test]
    fn test_first_failing_label_wins() {
        assert_eq!(
            reason("-a..b"),
            "-a..b: label cannot start with a hyphen"
        );
    }
}
