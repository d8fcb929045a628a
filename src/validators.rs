/// Input validators module
///
/// Length limits bound every field before it reaches storage; formats are
/// checked with compiled-once regexes.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MAX_USERNAME_LENGTH: usize = 32;
const MIN_USERNAME_LENGTH: usize = 3;
const MAX_DISPLAY_NAME_LENGTH: usize = 128;
const MAX_ROLE_NAME_LENGTH: usize = 64;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    // Usernames start with a letter or digit and continue with
    // letters, digits, dots, underscores, or hyphens.
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._-]*$").unwrap();
}

/// Validates a username and returns the trimmed value.
pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    let trimmed = username.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("username"));
    }

    if trimmed.len() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::TooShort("username", MIN_USERNAME_LENGTH));
    }

    if trimmed.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong("username", MAX_USERNAME_LENGTH));
    }

    if !USERNAME_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat(
            "username may only contain letters, digits, dots, underscores, and hyphens"
                .to_string(),
        ));
    }

    Ok(trimmed.to_string())
}

/// Validates an email address and returns the trimmed value.
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email"));
    }

    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email", MIN_EMAIL_LENGTH));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email", MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat(
            "email has invalid format".to_string(),
        ));
    }

    if has_suspicious_email_patterns(trimmed) {
        return Err(ValidationError::SuspiciousContent("email"));
    }

    Ok(trimmed.to_string())
}

/// Validates an optional display name and returns the trimmed value.
pub fn is_valid_display_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("display name"));
    }

    if trimmed.len() > MAX_DISPLAY_NAME_LENGTH {
        return Err(ValidationError::TooLong(
            "display name",
            MAX_DISPLAY_NAME_LENGTH,
        ));
    }

    if trimmed.contains('\0') || trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::SuspiciousContent("display name"));
    }

    Ok(trimmed.to_string())
}

/// Validates a role name and returns the trimmed value.
pub fn is_valid_role_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("role name"));
    }

    if trimmed.len() > MAX_ROLE_NAME_LENGTH {
        return Err(ValidationError::TooLong("role name", MAX_ROLE_NAME_LENGTH));
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::SuspiciousContent("role name"));
    }

    Ok(trimmed.to_string())
}

/// Detects suspicious patterns in email addresses
fn has_suspicious_email_patterns(email: &str) -> bool {
    // Extremely long local part (before @)
    if let Some(at_pos) = email.find('@') {
        let local_part = &email[..at_pos];
        if local_part.len() > 64 {
            return true;
        }
    }

    // Multiple @ symbols
    if email.matches('@').count() != 1 {
        return true;
    }

    // Null bytes
    if email.contains('\0') {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com").is_ok());
        assert!(is_valid_email("test.email@domain.co.uk").is_ok());
        assert!(is_valid_email("user+tag@example.com").is_ok());
    }

    #[test]
    fn test_invalid_email_format() {
        assert!(is_valid_email("invalid").is_err());
        assert!(is_valid_email("user@").is_err());
        assert!(is_valid_email("@example.com").is_err());
        assert!(is_valid_email("user@@example.com").is_err());
    }

    #[test]
    fn test_email_length_limits() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert!(is_valid_email(&too_long).is_err());

        assert!(is_valid_email("a@a").is_err()); // Too short
    }

    #[test]
    fn test_valid_username() {
        assert!(is_valid_username("alice").is_ok());
        assert!(is_valid_username("bob-42").is_ok());
        assert!(is_valid_username("jean.pierre_2").is_ok());
    }

    #[test]
    fn test_username_rejects_bad_characters() {
        assert!(is_valid_username("alice bob").is_err());
        assert!(is_valid_username("_leading").is_err());
        assert!(is_valid_username("semi;colon").is_err());
        assert!(is_valid_username("tab\tchar").is_err());
    }

    #[test]
    fn test_username_length_limits() {
        assert!(is_valid_username("ab").is_err());
        assert!(is_valid_username(&"a".repeat(33)).is_err());
        assert!(is_valid_username(&"a".repeat(32)).is_ok());
    }

    #[test]
    fn test_username_is_trimmed() {
        assert_eq!(is_valid_username("  alice  ").unwrap(), "alice");
    }

    #[test]
    fn test_valid_display_name() {
        assert!(is_valid_display_name("John Doe").is_ok());
        assert!(is_valid_display_name("Jean-Pierre").is_ok());
        assert!(is_valid_display_name("O'Brien").is_ok());
    }

    #[test]
    fn test_display_name_limits() {
        assert!(is_valid_display_name("").is_err());
        assert!(is_valid_display_name(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_display_name_control_characters() {
        assert!(is_valid_display_name("Name\0with\0null").is_err());
        assert!(is_valid_display_name("line\nbreak").is_err());
    }

    #[test]
    fn test_role_name() {
        assert_eq!(is_valid_role_name(" Auditor ").unwrap(), "Auditor");
        assert!(is_valid_role_name("").is_err());
        assert!(is_valid_role_name("   ").is_err());
        assert!(is_valid_role_name(&"r".repeat(65)).is_err());
        assert!(is_valid_role_name("bad\u{7}name").is_err());
    }
}
