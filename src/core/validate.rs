//! core::validate
//!
//! Value checks against a key's declared constraints.
//!
//! Two independent checks are exposed, matching how callers use them:
//!
//! - [`validate_type`] - does the value parse as the declared [`CfguType`]?
//! - [`validate_options`] - is the value one of the declared options?
//!
//! Neither check looks at `lazy`/`template`/`required`; those are
//! declaration-level rules handled by the schema and the upsert engine.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

use base64::Engine as _;
use regex::Regex;
use thiserror::Error;

use super::schema::{Cfgu, CfguType};

/// Errors from value validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("value \"{value}\" must be of type \"{expected}\"")]
    InvalidType { value: String, expected: CfguType },

    #[error("value \"{value}\" must be one of {options}")]
    NotInOptions { value: String, options: String },

    #[error("type \"RegEx\" requires a pattern")]
    MissingPattern,

    #[error("invalid pattern \"{pattern}\": {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Check that `value` is allowed by the declared options, if any.
pub fn validate_options(cfgu: &Cfgu, value: &str) -> Result<(), ValidationError> {
    match &cfgu.options {
        Some(options) if !options.iter().any(|o| o == value) => {
            Err(ValidationError::NotInOptions {
                value: value.to_string(),
                options: options
                    .iter()
                    .map(|o| format!("\"{}\"", o))
                    .collect::<Vec<_>>()
                    .join(", "),
            })
        }
        _ => Ok(()),
    }
}

/// Check that `value` conforms to the declared type.
pub fn validate_type(cfgu: &Cfgu, value: &str) -> Result<(), ValidationError> {
    let valid = match cfgu.cfgu_type {
        CfguType::String => true,
        CfguType::Boolean => matches!(value, "true" | "false" | "1" | "0"),
        CfguType::Number => value.trim().parse::<f64>().is_ok_and(f64::is_finite),
        CfguType::RegEx => {
            let pattern = cfgu
                .pattern
                .as_deref()
                .ok_or(ValidationError::MissingPattern)?;
            compile_pattern(pattern)?.is_match(value)
        }
        CfguType::Uuid => uuid::Uuid::parse_str(value).is_ok(),
        CfguType::SemVer => semver_regex().is_match(value),
        CfguType::Email => email_regex().is_match(value),
        CfguType::Url => url_regex().is_match(value),
        CfguType::IPv4 => value.parse::<Ipv4Addr>().is_ok(),
        CfguType::IPv6 => value.parse::<Ipv6Addr>().is_ok(),
        CfguType::Domain => is_domain(value),
        CfguType::Hex => is_hex(value),
        CfguType::Base64 => {
            !value.is_empty() && base64::engine::general_purpose::STANDARD.decode(value).is_ok()
        }
        CfguType::AlphaNumeric => {
            !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric())
        }
        CfguType::DateTime => chrono::DateTime::parse_from_rfc3339(value).is_ok(),
        CfguType::Json => serde_json::from_str::<serde_json::Value>(value).is_ok(),
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidType {
            value: value.to_string(),
            expected: cfgu.cfgu_type,
        })
    }
}

/// Compile a declared RegEx pattern.
pub fn compile_pattern(pattern: &str) -> Result<Regex, ValidationError> {
    Regex::new(pattern).map_err(|e| ValidationError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn semver_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(?:-((?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$",
        )
        .expect("semver pattern is valid")
    })
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://[^\s/?#]+[^\s]*$").expect("url pattern is valid")
    })
}

fn is_domain(value: &str) -> bool {
    if value.len() > 253 || !value.contains('.') {
        return false;
    }
    value.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

fn is_hex(value: &str) -> bool {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfgu(cfgu_type: CfguType) -> Cfgu {
        Cfgu::new(cfgu_type)
    }

    fn ok(cfgu_type: CfguType, value: &str) -> bool {
        validate_type(&cfgu(cfgu_type), value).is_ok()
    }

    #[test]
    fn string_accepts_anything() {
        assert!(ok(CfguType::String, ""));
        assert!(ok(CfguType::String, "any thing at all"));
    }

    #[test]
    fn boolean() {
        for v in ["true", "false", "1", "0"] {
            assert!(ok(CfguType::Boolean, v), "{v}");
        }
        assert!(!ok(CfguType::Boolean, "yes"));
        assert!(!ok(CfguType::Boolean, "TRUE"));
    }

    #[test]
    fn number() {
        assert!(ok(CfguType::Number, "42"));
        assert!(ok(CfguType::Number, "-3.5"));
        assert!(ok(CfguType::Number, "1e3"));
        assert!(!ok(CfguType::Number, "NaN"));
        assert!(!ok(CfguType::Number, "inf"));
        assert!(!ok(CfguType::Number, "12abc"));
    }

    #[test]
    fn regex_requires_pattern() {
        let err = validate_type(&cfgu(CfguType::RegEx), "x").unwrap_err();
        assert_eq!(err, ValidationError::MissingPattern);
    }

    #[test]
    fn regex_matches_pattern() {
        let mut c = cfgu(CfguType::RegEx);
        c.pattern = Some("^v[0-9]+$".into());
        assert!(validate_type(&c, "v12").is_ok());
        assert!(validate_type(&c, "12").is_err());
    }

    #[test]
    fn regex_invalid_pattern() {
        let mut c = cfgu(CfguType::RegEx);
        c.pattern = Some("(unclosed".into());
        assert!(matches!(
            validate_type(&c, "x"),
            Err(ValidationError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn uuid_semver_email_url() {
        assert!(ok(CfguType::Uuid, "67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert!(!ok(CfguType::Uuid, "not-a-uuid"));
        assert!(ok(CfguType::SemVer, "1.2.3-beta.1+build.5"));
        assert!(!ok(CfguType::SemVer, "1.2"));
        assert!(ok(CfguType::Email, "dev@example.com"));
        assert!(!ok(CfguType::Email, "dev@localhost"));
        assert!(ok(CfguType::Url, "https://example.com/path?q=1"));
        assert!(!ok(CfguType::Url, "example.com"));
    }

    #[test]
    fn network_types() {
        assert!(ok(CfguType::IPv4, "10.0.0.1"));
        assert!(!ok(CfguType::IPv4, "10.0.0.256"));
        assert!(ok(CfguType::IPv6, "::1"));
        assert!(!ok(CfguType::IPv6, "10.0.0.1"));
        assert!(ok(CfguType::Domain, "api.example.com"));
        assert!(!ok(CfguType::Domain, "-bad.example.com"));
        assert!(!ok(CfguType::Domain, "localhost"));
    }

    #[test]
    fn encodings() {
        assert!(ok(CfguType::Hex, "0xdeadBEEF"));
        assert!(ok(CfguType::Hex, "abc"));
        assert!(!ok(CfguType::Hex, "0x"));
        assert!(!ok(CfguType::Hex, "xyz"));
        assert!(ok(CfguType::Base64, "aGVsbG8="));
        assert!(!ok(CfguType::Base64, "not base64!"));
        assert!(ok(CfguType::AlphaNumeric, "abc123"));
        assert!(!ok(CfguType::AlphaNumeric, "abc_123"));
    }

    #[test]
    fn datetime_and_json() {
        assert!(ok(CfguType::DateTime, "2024-01-15T10:30:00Z"));
        assert!(!ok(CfguType::DateTime, "yesterday"));
        assert!(ok(CfguType::Json, r#"{"a":[1,2]}"#));
        assert!(!ok(CfguType::Json, "{a:1}"));
    }

    #[test]
    fn options_unset_allows_anything() {
        assert!(validate_options(&cfgu(CfguType::String), "x").is_ok());
    }

    #[test]
    fn options_enforced() {
        let mut c = cfgu(CfguType::String);
        c.options = Some(vec!["dev".into(), "prod".into()]);
        assert!(validate_options(&c, "prod").is_ok());

        let err = validate_options(&c, "staging").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("staging"));
        assert!(msg.contains("\"dev\", \"prod\""));
    }

    #[test]
    fn type_error_names_type() {
        let err = validate_type(&cfgu(CfguType::Number), "abc").unwrap_err();
        assert_eq!(err.to_string(), "value \"abc\" must be of type \"Number\"");
    }
}
