use crate::engine::error::ValidationError;

/// Characters permitted in the local part of an address
const LOCAL_PART_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~.-";

/// Validate a resolved email value, returning the trimmed address
///
/// A malformed value is reported exactly as submitted, surrounding whitespace included.
pub fn validate_email(value: Option<&str>) -> Result<String, ValidationError> {
    let submitted = value.unwrap_or_default();
    let email = submitted.trim();

    if email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }

    if !is_email(email) {
        return Err(ValidationError::InvalidEmail(submitted.to_string()));
    }

    Ok(email.to_string())
}

/// Structural email check: `local@domain.tld`, conservative character sets,
/// no empty or hyphen-bounded domain labels.
pub fn is_email(email: &str) -> bool {
    if email.len() < 6 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty()
        || !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || LOCAL_PART_SPECIALS.contains(c))
    {
        return false;
    }

    if domain.contains("..") || domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_addresses() {
        assert!(is_email("jane@example.com"));
        assert!(is_email("jane.doe+news@mail.example.co.uk"));
        assert!(is_email("a@b.co"));
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(!is_email("not-an-email"));
        assert!(!is_email("a@b.c"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("jane@example"));
        assert!(!is_email("jane@@example.com"));
        assert!(!is_email("jane@exa..mple.com"));
        assert!(!is_email("jane@.example.com"));
        assert!(!is_email("jane@-example.com"));
        assert!(!is_email("ja ne@example.com"));
        assert!(!is_email("First Last"));
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(None), Err(ValidationError::MissingEmail));
        assert_eq!(validate_email(Some("")), Err(ValidationError::MissingEmail));
        assert_eq!(validate_email(Some("  \t ")), Err(ValidationError::MissingEmail));
        assert_eq!(
            validate_email(Some("not-an-email")),
            Err(ValidationError::InvalidEmail("not-an-email".to_string()))
        );
        assert_eq!(
            validate_email(Some(" not-an-email ")),
            Err(ValidationError::InvalidEmail(" not-an-email ".to_string()))
        );
        assert_eq!(
            validate_email(Some(" jane@example.com ")),
            Ok("jane@example.com".to_string())
        );
    }
}
