use super::ApiError;

pub fn validate_id(kind: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {kind} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

pub fn validate_limit(limit: u64) -> Result<u64, ApiError> {
    const MAX_LIMIT: u64 = 500;
    const MIN_LIMIT: u64 = 1;

    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {limit}. Limit must be between {MIN_LIMIT} and {MAX_LIMIT}"
        )));
    }
    Ok(limit)
}

/// Trims the value and treats blank input as absent.
pub fn optional_query(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("battler", 1).is_ok());
        assert!(validate_id("battler", 0).is_err());
        assert!(validate_id("badge", -4).is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(500).is_ok());
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(501).is_err());
    }

    #[test]
    fn test_optional_query() {
        assert_eq!(optional_query(Some("  clash ".into())), Some("clash".into()));
        assert_eq!(optional_query(Some("   ".into())), None);
        assert_eq!(optional_query(None), None);
    }
}
