use hh_core::error::{ApiError, ApiResult};

const MAX_HASH_LEN: usize = 256;

/// Validate password strength before it is hashed
pub fn validate_password(password: &str) -> ApiResult<()> {
    let length = password.chars().count();
    if length < 8 {
        return Err(ApiError::Unprocessable(
            "password must be at least 8 characters".into(),
        ));
    }

    if length > 128 {
        return Err(ApiError::Unprocessable(
            "password too long (max 128 characters)".into(),
        ));
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_number = password.chars().any(|c| c.is_numeric());

    if !has_letter || !has_number {
        return Err(ApiError::Unprocessable(
            "password must contain at least one letter and one number".into(),
        ));
    }

    Ok(())
}

/// Cheap shape check on a stored hash; the hasher does the real parsing.
pub fn validate_hash(hash: &str) -> ApiResult<()> {
    if !hash.starts_with('$') || hash.len() > MAX_HASH_LEN {
        return Err(ApiError::BadRequest("malformed password hash".into()));
    }
    Ok(())
}
