//! Built-in redaction patterns.
//!
//! Patterns for credentials that commonly appear in request payloads:
//! form fields, JSON bodies, and raw upload text.

use regex::Regex;

/// A compiled redaction pattern.
#[derive(Debug)]
pub struct RedactionPattern {
    /// Name of the pattern for identification.
    pub name: &'static str,

    /// Description of what this pattern matches.
    pub description: &'static str,

    regex: Regex,
}

impl RedactionPattern {
    /// Create a new redaction pattern.
    ///
    /// # Panics
    ///
    /// Panics if the regex pattern is invalid.
    #[must_use]
    pub fn new(name: &'static str, description: &'static str, pattern: &str) -> Self {
        Self {
            name,
            description,
            regex: Regex::new(pattern).expect("Invalid regex pattern"),
        }
    }

    /// Check if the text matches this pattern.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Replace every match with `placeholder`.
    #[must_use]
    pub fn redact(&self, text: &str, placeholder: &str) -> String {
        self.regex.replace_all(text, placeholder).into_owned()
    }
}

/// Get all built-in redaction patterns.
#[must_use]
pub fn builtin_patterns() -> Vec<RedactionPattern> {
    vec![
        RedactionPattern::new(
            "bearer_token",
            "Bearer authentication tokens",
            r"(?i)bearer\s+[a-zA-Z0-9_.=-]+",
        ),
        RedactionPattern::new(
            "jwt",
            "JSON Web Tokens",
            r"eyJ[a-zA-Z0-9_-]+\.[a-zA-Z0-9_-]+\.[a-zA-Z0-9_-]+",
        ),
        RedactionPattern::new(
            "credential_assignment",
            "key=value pairs naming passwords, secrets, and tokens",
            r#"(?i)(password|passwd|secret|api[_-]?key|access[_-]?token|refresh[_-]?token)\s*[:=]\s*['"]?[^\s&'"]{4,}['"]?"#,
        ),
        RedactionPattern::new(
            "aws_key",
            "AWS access key IDs",
            r"(AKIA|ABIA|ACCA|ASIA)[A-Z0-9]{16}",
        ),
        RedactionPattern::new(
            "private_key",
            "PEM-encoded private keys",
            r"-----BEGIN (?:RSA |EC |DSA |OPENSSH )?PRIVATE KEY-----",
        ),
        RedactionPattern::new(
            "github_token",
            "GitHub personal access and app tokens",
            r"(ghp_|gho_|ghu_|ghs_|ghr_)[a-zA-Z0-9]{36}",
        ),
    ]
}

/// Body field names whose values are always redacted.
#[must_use]
pub fn sensitive_field_names() -> Vec<&'static str> {
    vec![
        "password",
        "passwd",
        "pwd",
        "secret",
        "client_secret",
        "token",
        "access_token",
        "refresh_token",
        "api_key",
        "apikey",
    ]
}
