//! Input validation utilities
//!
//! Everything here runs before a request is built, so refused input never
//! reaches the network.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{ContactRequest, ReportRequest};

/// Longest comment the client will send
pub const MAX_COMMENT_LENGTH: usize = 2200;

/// Validate login input
pub fn validate_login(username: &str, password: &str) -> Result<(), String> {
    if username.trim().is_empty() {
        return Err("Username is required".to_string());
    }

    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    Ok(())
}

/// Validate comment text
pub fn validate_comment(text: &str) -> Result<(), String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("Comment cannot be empty".to_string());
    }

    if text.chars().count() > MAX_COMMENT_LENGTH {
        return Err(format!(
            "Comment must be at most {MAX_COMMENT_LENGTH} characters long"
        ));
    }

    Ok(())
}

/// Validate a post report
pub fn validate_report(report: &ReportRequest) -> Result<(), String> {
    if report.post_id.trim().is_empty() {
        return Err("Post is required".to_string());
    }

    if report.reason.trim().is_empty() {
        return Err("Please choose a reason for the report".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a support ticket
pub fn validate_contact(request: &ContactRequest) -> Result<(), String> {
    if request.subject.trim().is_empty() {
        return Err("Subject is required".to_string());
    }

    if request.message.trim().is_empty() {
        return Err("Message is required".to_string());
    }

    if let Some(email) = &request.email {
        validate_email(email)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_login() {
        assert!(validate_login("ada", "secret").is_ok());
        assert!(validate_login("", "secret").is_err());
        assert!(validate_login("   ", "secret").is_err());
        assert!(validate_login("ada", "").is_err());
    }

    #[test]
    fn test_validate_comment() {
        assert!(validate_comment("nice").is_ok());
        assert!(validate_comment(" \n ").is_err());
        assert!(validate_comment(&"x".repeat(MAX_COMMENT_LENGTH)).is_ok());
        assert!(validate_comment(&"x".repeat(MAX_COMMENT_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_report() {
        let mut report = ReportRequest {
            post_id: "p1".to_string(),
            reason: "spam".to_string(),
            details: None,
        };
        assert!(validate_report(&report).is_ok());

        report.reason = " ".to_string();
        assert!(validate_report(&report).is_err());
    }

    #[test]
    fn test_validate_contact() {
        let mut request = ContactRequest {
            subject: "Locked out".to_string(),
            message: "Cannot log in since yesterday".to_string(),
            email: None,
        };
        assert!(validate_contact(&request).is_ok());

        request.email = Some("ada@example.com".to_string());
        assert!(validate_contact(&request).is_ok());

        request.email = Some("not-an-email".to_string());
        assert_eq!(
            validate_contact(&request),
            Err("Invalid email format".to_string())
        );

        request.email = None;
        request.message = String::new();
        assert!(validate_contact(&request).is_err());
    }
}
