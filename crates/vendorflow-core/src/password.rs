//! Local password strength checks run before registration or reset.

use serde::Serialize;

const MIN_LENGTH: usize = 8;
const STRONG_LENGTH: usize = 12;
const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub strength: PasswordStrength,
}

/// Check a password against the account password policy.
pub fn validate_password(password: &str) -> PasswordValidation {
    let mut errors = Vec::new();

    if password.chars().count() < MIN_LENGTH {
        errors.push(format!(
            "Password must be at least {} characters long",
            MIN_LENGTH
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one number".to_string());
    }

    let specials = password.chars().filter(|c| SPECIAL_CHARS.contains(*c)).count();
    if specials == 0 {
        errors.push("Password must contain at least one special character".to_string());
    }

    let strength = if !errors.is_empty() {
        PasswordStrength::Weak
    } else if password.chars().count() >= STRONG_LENGTH && specials >= 2 {
        PasswordStrength::Strong
    } else {
        PasswordStrength::Medium
    };

    PasswordValidation {
        is_valid: errors.is_empty(),
        errors,
        strength,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_password_lists_every_failure() {
        let result = validate_password("abc");
        assert!(!result.is_valid);
        assert_eq!(result.strength, PasswordStrength::Weak);
        assert_eq!(result.errors.len(), 4);
        assert!(result.errors[0].contains("at least 8 characters"));
    }

    #[test]
    fn valid_password_is_medium() {
        let result = validate_password("Vendor#2024");
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert_eq!(result.strength, PasswordStrength::Medium);
    }

    #[test]
    fn long_password_with_two_specials_is_strong() {
        let result = validate_password("Vendor#Flow!2024");
        assert!(result.is_valid);
        assert_eq!(result.strength, PasswordStrength::Strong);
    }

    #[test]
    fn long_password_with_one_special_stays_medium() {
        let result = validate_password("VendorFlow#2024");
        assert_eq!(result.strength, PasswordStrength::Medium);
    }
}
