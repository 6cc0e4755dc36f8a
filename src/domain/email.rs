//! Email addresses
//!
//! Shape validation for addresses supplied in commands, and the Gravatar hash
//! the read model derives from them.

use super::DomainError;

/// Trim and shape-check an email address.
///
/// This is a sanity check (one `@`, non-empty local part and domain, no
/// whitespace), not RFC 5322 validation.
pub fn normalise_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim();
    let invalid = || DomainError::InvalidEmail(raw.to_string());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    Ok(email.to_string())
}

/// Gravatar identifier for an email address
pub fn gravatar_hash(email: &str) -> String {
    format!("{:x}", md5::compute(email.trim().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_email() {
        assert_eq!(normalise_email(" ada@example.com ").unwrap(), "ada@example.com");
        assert!(normalise_email("ada.example.com").is_err());
        assert!(normalise_email("@example.com").is_err());
        assert!(normalise_email("ada@").is_err());
        assert!(normalise_email("a@b@c").is_err());
        assert!(normalise_email("ada lovelace@example.com").is_err());
    }

    #[test]
    fn test_gravatar_hash_ignores_case_and_padding() {
        // Reference value from the Gravatar documentation
        assert_eq!(
            gravatar_hash("MyEmailAddress@example.com "),
            "0bc83cb571cd1c50ba6f3e8a78ef1346"
        );
        assert_eq!(gravatar_hash("a@b.c"), gravatar_hash("A@B.C"));
    }
}
