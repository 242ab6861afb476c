//! User input validation rules
//!
//! # Rules
//!
//! - Name: required, at most 100 characters after trimming
//! - Email: syntactically valid, stored trimmed and lowercased
//! - Password: 8 to 128 characters

use validator::ValidateEmail;

use crate::error::IdentityError;

/// Maximum length of a display name
pub const MAX_NAME_LEN: usize = 100;
/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 8;
/// Maximum password length
pub const MAX_PASSWORD_LEN: usize = 128;

/// Collects validation failures before reporting them together
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// List of validation errors
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Creates an empty result
    pub fn ok() -> Self {
        Self::default()
    }

    /// Adds an error to the result
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Returns true when no errors were recorded
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts into a `Result`, joining all messages on failure
    pub fn into_result(self) -> Result<(), IdentityError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(IdentityError::validation_failed(self.errors))
        }
    }
}

/// Trims an email and lowercases it
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Checks a display name
pub fn check_name(name: &str, result: &mut ValidationResult) {
    let name = name.trim();
    if name.is_empty() {
        result.add_error("Name is required");
    } else if name.chars().count() > MAX_NAME_LEN {
        result.add_error(format!("Name must be at most {} characters", MAX_NAME_LEN));
    }
}

/// Checks an already-normalized email
pub fn check_email(email: &str, result: &mut ValidationResult) {
    if email.is_empty() {
        result.add_error("Email is required");
    } else if !email.validate_email() {
        result.add_error("Email is not a valid address");
    }
}

/// Checks a plaintext password
pub fn check_password(password: &str, result: &mut ValidationResult) {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        result.add_error(format!(
            "Password must be between {} and {} characters",
            MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn test_collects_all_errors() {
        let mut result = ValidationResult::ok();
        check_name("", &mut result);
        check_email("not-an-email", &mut result);
        check_password("short", &mut result);
        assert_eq!(result.errors.len(), 3);
        assert!(result.into_result().is_err());
    }

    #[test]
    fn test_name_too_long() {
        let mut result = ValidationResult::ok();
        check_name(&"x".repeat(101), &mut result);
        assert!(!result.is_valid());

        let mut result = ValidationResult::ok();
        check_name(&"x".repeat(100), &mut result);
        assert!(result.is_valid());
    }

    #[test]
    fn test_password_bounds() {
        let mut result = ValidationResult::ok();
        check_password(&"p".repeat(8), &mut result);
        check_password(&"p".repeat(128), &mut result);
        assert!(result.is_valid());

        check_password(&"p".repeat(129), &mut result);
        assert!(!result.is_valid());
    }
}
