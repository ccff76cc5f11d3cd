use super::ValidationError;

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Length is counted in characters, not bytes.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordEmpty);
    }

    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooLong);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_bounds() {
        assert_eq!(validate_password("").unwrap_err(), ValidationError::PasswordEmpty);
        assert_eq!(validate_password("abc12").unwrap_err(), ValidationError::PasswordTooShort);
        assert!(validate_password("abc123").is_ok());
        assert!(validate_password(&"x".repeat(MAX_PASSWORD_LENGTH)).is_ok());
        assert_eq!(
            validate_password(&"x".repeat(MAX_PASSWORD_LENGTH + 1)).unwrap_err(),
            ValidationError::PasswordTooLong
        );
    }

    #[test]
    fn test_multibyte_characters_count_once() {
        // six characters, eighteen bytes
        assert!(validate_password("日本語日本語").is_ok());
    }
}
