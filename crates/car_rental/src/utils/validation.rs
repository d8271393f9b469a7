use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ServiceError;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// 去除首尾空白后必须非空，且不超过最大长度（按字符计）
pub fn required_text(field: &str, value: &str, max_len: usize) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > max_len {
        return Err(ServiceError::Validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("client@example.com"));
        assert!(!is_valid_email("client@example"));
        assert!(!is_valid_email("client example@mail.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("Phone", "  +380501112233 ", 20).unwrap(), "+380501112233");
        assert_matches!(required_text("Phone", "   ", 20), Err(ServiceError::Validation(_)));
        assert_matches!(required_text("Brand", &"x".repeat(51), 50), Err(ServiceError::Validation(_)));
        // 非 ASCII 字符按字符计数
        assert!(required_text("Name", &"ї".repeat(50), 50).is_ok());
    }
}
