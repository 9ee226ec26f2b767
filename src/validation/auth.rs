use garde::Validate;

use crate::error::{AppError, Result};

/// Normalizes an email for storage and lookup.
///
/// # Arguments
///
/// * `email` - The email as submitted.
///
/// # Returns
///
/// The trimmed, lowercased email.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Runs a payload's `garde` rules.
///
/// # Arguments
///
/// * `payload` - The payload to validate.
///
/// # Returns
///
/// A `Result<()>` carrying every failed rule in one message.
pub fn validate_payload<T>(payload: &T) -> Result<()>
where
    T: Validate,
    T::Context: Default,
{
    payload
        .validate()
        .map_err(|report| AppError::Validation(report.to_string().trim().to_string()))
}

/// Checks that both login fields were supplied. Shape is not checked here so
/// a malformed email fails the same way as a wrong one.
pub fn require_credentials(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Probe {
        #[garde(email)]
        email: String,
        #[garde(length(min = 8, max = 128))]
        password: String,
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn collects_garde_failures_as_validation_error() {
        let probe = Probe {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };
        match validate_payload(&probe) {
            Err(AppError::Validation(msg)) => {
                assert!(msg.contains("email"));
                assert!(msg.contains("password"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let ok = Probe {
            email: "ada@example.com".to_string(),
            password: "correct horse".to_string(),
        };
        assert!(validate_payload(&ok).is_ok());
    }

    #[test]
    fn login_needs_both_fields() {
        assert!(require_credentials("", "secret").is_err());
        assert!(require_credentials("a@b.c", "").is_err());
        assert!(require_credentials("whatever", "x").is_ok());
    }
}
