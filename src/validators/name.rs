use super::ValidationError;

const MAX_NAME_LENGTH: usize = 100;

pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::NameEmpty);
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong);
    }

    Ok(())
}

pub fn validate_team_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::TeamNameEmpty);
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TeamNameTooLong);
    }

    Ok(())
}
