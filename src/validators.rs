/// Input validators for the authentication flows
///
/// Length limits keep oversized input away from bcrypt and the database.

use crate::error::ValidationError;

const MAX_LOGIN_LENGTH: usize = 255;
// bcrypt ignores everything past 72 bytes
const MAX_PASSWORD_LENGTH: usize = 72;
const MAX_REFRESH_TOKEN_LENGTH: usize = 512;

/// Validates a login and returns it trimmed
pub fn validate_login(login: &str) -> Result<String, ValidationError> {
    let trimmed = login.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("login".to_string()));
    }

    if trimmed.len() > MAX_LOGIN_LENGTH {
        return Err(ValidationError::TooLong("login".to_string(), MAX_LOGIN_LENGTH));
    }

    if trimmed.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat("login".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates a password. Passwords are used verbatim, whitespace included.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        ));
    }

    Ok(())
}

/// Validates the presence of a refresh token
pub fn validate_refresh_token(token: &str) -> Result<&str, ValidationError> {
    let trimmed = token.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("refresh_token".to_string()));
    }

    if trimmed.len() > MAX_REFRESH_TOKEN_LENGTH {
        return Err(ValidationError::TooLong(
            "refresh_token".to_string(),
            MAX_REFRESH_TOKEN_LENGTH,
        ));
    }

    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_login() {
        assert_eq!(validate_login("alice").unwrap(), "alice");
        assert_eq!(validate_login("  alice ").unwrap(), "alice");
    }

    #[test]
    fn test_empty_login() {
        assert_eq!(
            validate_login(""),
            Err(ValidationError::EmptyField("login".to_string()))
        );
        assert!(validate_login("   ").is_err());
    }

    #[test]
    fn test_login_too_long() {
        let long = "a".repeat(MAX_LOGIN_LENGTH + 1);
        assert!(matches!(
            validate_login(&long),
            Err(ValidationError::TooLong(_, MAX_LOGIN_LENGTH))
        ));
    }

    #[test]
    fn test_login_with_control_characters() {
        assert!(validate_login("ali\u{0000}ce").is_err());
        assert!(validate_login("ali\nce").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("secret123").is_ok());
        assert!(validate_password(" spaced ").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"p".repeat(72)).is_ok());
        assert!(validate_password(&"p".repeat(73)).is_err());
    }

    #[test]
    fn test_refresh_token_presence() {
        assert_eq!(validate_refresh_token(" abc ").unwrap(), "abc");
        assert!(validate_refresh_token("").is_err());
        assert!(validate_refresh_token(&"x".repeat(513)).is_err());
    }
}
