use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating username fields
    /// Must contain only alphanumeric characters and underscores
    /// - Valid: "john_doe", "user123", "_admin", "JohnDoe"
    /// - Invalid: "user-name", "user name", "user@host"
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_]+$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_regex_valid() {
        assert!(USERNAME_REGEX.is_match("john_doe"));
        assert!(USERNAME_REGEX.is_match("user123"));
        assert!(USERNAME_REGEX.is_match("_admin"));
        assert!(USERNAME_REGEX.is_match("JohnDoe"));
    }

    #[test]
    fn test_username_regex_invalid() {
        assert!(!USERNAME_REGEX.is_match("user-name")); // hyphen
        assert!(!USERNAME_REGEX.is_match("user name")); // space
        assert!(!USERNAME_REGEX.is_match("user@host")); // symbol
        assert!(!USERNAME_REGEX.is_match("")); // empty
    }
}
