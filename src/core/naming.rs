//! core::naming
//!
//! Naming rules for user-controlled identifiers.
//!
//! The same rule applies to schema keys, set path segments and the keys
//! produced by export re-keying.
//!
//! # Rule
//!
//! - Non-empty
//! - Only ASCII letters, digits, `_` and `-`
//! - Not a reserved word (compared case-insensitively)
//!
//! # Example
//!
//! ```
//! use cfgsync::core::naming::validate_naming;
//!
//! assert!(validate_naming("DATABASE_URL"));
//! assert!(validate_naming("api-key"));
//! assert!(!validate_naming("has space"));
//! assert!(!validate_naming("Schema"));
//! ```

/// Words that cannot be used as names.
pub const RESERVED_NAMES: &[&str] = &[
    "_", "-", "this", "cfgu", "config", "store", "query", "set", "schema",
];

/// Human-readable description of the naming rule, used in error messages.
pub const NAMING_ERROR_MESSAGE: &str = "must contain only alphanumeric characters, \
     underscores and hyphens, and must not be one of the reserved names \
     (_, -, this, cfgu, config, store, query, set, schema)";

/// Check a candidate name against the naming rule.
pub fn validate_naming(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }

    let charset_ok = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !charset_ok {
        return false;
    }

    let lowered = name.to_ascii_lowercase();
    !RESERVED_NAMES.contains(&lowered.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        assert!(validate_naming("A"));
        assert!(validate_naming("DATABASE_URL"));
        assert!(validate_naming("feature-flag-2"));
        assert!(validate_naming("_private"));
    }

    #[test]
    fn rejects_empty() {
        assert!(!validate_naming(""));
    }

    #[test]
    fn rejects_invalid_chars() {
        assert!(!validate_naming("a.b"));
        assert!(!validate_naming("a/b"));
        assert!(!validate_naming("key with space"));
        assert!(!validate_naming("ключ"));
        assert!(!validate_naming("key="));
    }

    #[test]
    fn rejects_reserved_case_insensitive() {
        assert!(!validate_naming("_"));
        assert!(!validate_naming("-"));
        assert!(!validate_naming("this"));
        assert!(!validate_naming("CONFIG"));
        assert!(!validate_naming("Schema"));
    }

    #[test]
    fn message_lists_reserved_names() {
        for name in RESERVED_NAMES {
            assert!(NAMING_ERROR_MESSAGE.contains(name));
        }
    }
}
