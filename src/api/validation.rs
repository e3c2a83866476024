use regex::Regex;
use std::sync::OnceLock;

use super::ApiError;

const MAX_NAME_LEN: usize = 100;
const MAX_PAGE_SIZE: u64 = 100;
const MAX_PAGE: u64 = 100_000;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex pattern defined in code")
    })
}

fn color_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^#[0-9a-fA-F]{6}$").expect("Invalid regex pattern defined in code")
    })
}

pub fn validate_id(kind: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {kind} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

/// Trims and lowercases the address before checking its shape.
pub fn validate_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim().to_lowercase();
    if !email_regex().is_match(&email) {
        return Err(ApiError::validation("Invalid email address"));
    }
    Ok(email)
}

pub fn validate_name<'a>(field: &str, name: &'a str) -> Result<&'a str, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::validation(format!(
            "{field} must be {MAX_NAME_LEN} characters or less"
        )));
    }
    Ok(trimmed)
}

pub fn validate_color(color: &str) -> Result<&str, ApiError> {
    if !color_regex().is_match(color) {
        return Err(ApiError::validation(
            "Color must be a hex value such as #3b82f6",
        ));
    }
    Ok(color)
}

pub fn validate_progress(progress: i32) -> Result<i32, ApiError> {
    if !(0..=100).contains(&progress) {
        return Err(ApiError::validation(format!(
            "Invalid progress: {progress}. Progress must be between 0 and 100"
        )));
    }
    Ok(progress)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.len() < 8 {
        return Err(ApiError::validation(
            "Password must be at least 8 characters",
        ));
    }
    Ok(password)
}

pub fn validate_pagination(page: Option<u64>, page_size: Option<u64>) -> Result<(u64, u64), ApiError> {
    let page = page.unwrap_or(1);
    let page_size = page_size.unwrap_or(20);

    if page == 0 {
        return Err(ApiError::validation("Page numbers start at 1"));
    }
    if page > MAX_PAGE {
        return Err(ApiError::validation(format!(
            "Invalid page: {page}. Page must be at most {MAX_PAGE}"
        )));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ApiError::validation(format!(
            "Invalid page size: {page_size}. Page size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    Ok((page, page_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert_eq!(
            validate_email("  Alice@Example.COM ").unwrap(),
            "alice@example.com"
        );
        assert!(validate_email("alice").is_err());
        assert!(validate_email("alice@localhost").is_err());
        assert!(validate_email("a b@example.com").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("Workspace name", "  Core ").unwrap(), "Core");
        assert!(validate_name("Workspace name", "   ").is_err());
        assert!(validate_name("Workspace name", &"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_color() {
        assert!(validate_color("#3b82f6").is_ok());
        assert!(validate_color("#FFFFFF").is_ok());
        assert!(validate_color("3b82f6").is_err());
        assert!(validate_color("#xyzxyz").is_err());
    }

    #[test]
    fn test_validate_progress() {
        assert!(validate_progress(0).is_ok());
        assert!(validate_progress(100).is_ok());
        assert!(validate_progress(-1).is_err());
        assert!(validate_progress(101).is_err());
    }

    #[test]
    fn test_validate_pagination() {
        assert_eq!(validate_pagination(None, None).unwrap(), (1, 20));
        assert_eq!(validate_pagination(Some(3), Some(50)).unwrap(), (3, 50));
        assert!(validate_pagination(Some(0), None).is_err());
        assert!(validate_pagination(None, Some(0)).is_err());
        assert!(validate_pagination(None, Some(101)).is_err());
        assert_eq!(
            validate_pagination(Some(MAX_PAGE), Some(MAX_PAGE_SIZE)).unwrap(),
            (MAX_PAGE, MAX_PAGE_SIZE)
        );
        assert!(validate_pagination(Some(MAX_PAGE + 1), None).is_err());
        assert!(validate_pagination(Some(u64::MAX), Some(MAX_PAGE_SIZE)).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("workspace", 1).is_ok());
        assert!(validate_id("workspace", 0).is_err());
    }
}
