use crate::models::AppError;

pub fn require_field(value: &str, message: &str) -> Result<(), AppError> {
    if value.is_empty() {
        return Err(AppError::ValidationError(message.to_string()));
    }

    Ok(())
}

pub fn validate_url(url: &str) -> Result<(), AppError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(AppError::InvalidUrl(url.to_string()));
    }

    Ok(())
}
