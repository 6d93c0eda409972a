//! Redaction of captured request data.
//!
//! The redactor runs on capture events before they reach the ledger, so
//! stored records never hold the original secret.

use regex::Regex;
use serde_json::Value;
use tracing::{trace, warn};

use super::patterns::{builtin_patterns, sensitive_field_names, RedactionPattern};
use crate::config::PrivacyConfig;
use crate::request::{CaptureEvent, HttpHeader};

/// Redacts sensitive headers and body content.
#[derive(Debug)]
pub struct Redactor {
    enabled: bool,
    placeholder: String,
    sensitive_headers: Vec<String>,
    sensitive_fields: Vec<String>,
    patterns: Vec<RedactionPattern>,
    custom_regexes: Vec<Regex>,
}

impl Redactor {
    /// Create a redactor with the default privacy configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&PrivacyConfig::default())
    }

    /// Create a redactor that passes everything through unchanged.
    #[must_use]
    pub fn disabled() -> Self {
        Self::with_config(&PrivacyConfig {
            redaction_enabled: false,
            ..PrivacyConfig::default()
        })
    }

    /// Create a redactor from configuration.
    #[must_use]
    pub fn with_config(config: &PrivacyConfig) -> Self {
        let patterns = if config.builtin_patterns {
            builtin_patterns()
        } else {
            Vec::new()
        };

        let custom_regexes = config
            .body_patterns
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(r) => Some(r),
                Err(e) => {
                    warn!(pattern = %p, error = %e, "Invalid custom redaction pattern");
                    None
                }
            })
            .collect();

        Self {
            enabled: config.redaction_enabled,
            placeholder: config.placeholder.clone(),
            sensitive_headers: config.sensitive_headers.clone(),
            sensitive_fields: sensitive_field_names()
                .into_iter()
                .map(String::from)
                .collect(),
            patterns,
            custom_regexes,
        }
    }

    /// Check if redaction is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a header's value is always redacted.
    #[must_use]
    pub fn is_sensitive_header(&self, name: &str) -> bool {
        self.sensitive_headers
            .iter()
            .any(|h| h.eq_ignore_ascii_case(name))
    }

    /// Redact an event in place.
    pub fn redact_event(&self, event: &mut CaptureEvent) {
        if !self.enabled {
            return;
        }
        match event {
            CaptureEvent::Start(start) => {
                if let Some(body) = start.body.as_mut() {
                    self.redact_value(body);
                }
            }
            CaptureEvent::Completed(completion) => {
                self.redact_headers(&mut completion.response_headers);
            }
            CaptureEvent::Error(_) => {}
        }
    }

    /// Replace the values of sensitive headers.
    pub fn redact_headers(&self, headers: &mut [HttpHeader]) {
        for header in headers
            .iter_mut()
            .filter(|h| self.is_sensitive_header(&h.name))
        {
            trace!(header = %header.name, "Redacted header value");
            header.value.clone_from(&self.placeholder);
        }
    }

    /// Redact every string in a JSON body.
    pub fn redact_value(&self, value: &mut Value) {
        match value {
            Value::String(text) => {
                if let Some(redacted) = self.redact_text(text) {
                    *text = redacted;
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.redact_value(item);
                }
            }
            Value::Object(fields) => {
                for (key, field) in fields.iter_mut() {
                    if self.is_sensitive_field(key) {
                        trace!(field = %key, "Redacted body field");
                        *field = blank_out(field, &self.placeholder);
                    } else {
                        self.redact_value(field);
                    }
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    /// Apply every pattern to `text`; `None` if nothing matched.
    #[must_use]
    pub fn redact_text(&self, text: &str) -> Option<String> {
        let mut result: Option<String> = None;

        for pattern in &self.patterns {
            let current = result.as_deref().unwrap_or(text);
            if pattern.matches(current) {
                trace!(pattern = %pattern.name, "Body text redacted by pattern");
                result = Some(pattern.redact(current, &self.placeholder));
            }
        }

        for (i, regex) in self.custom_regexes.iter().enumerate() {
            let current = result.as_deref().unwrap_or(text);
            if regex.is_match(current) {
                trace!(pattern_index = %i, "Body text redacted by custom pattern");
                result = Some(regex.replace_all(current, &self.placeholder).into_owned());
            }
        }

        result
    }

    fn is_sensitive_field(&self, key: &str) -> bool {
        self.sensitive_fields
            .iter()
            .any(|f| f.eq_ignore_ascii_case(key))
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new()
    }
}

/// Form fields arrive as arrays of strings; keep the shape, drop the content.
fn blank_out(value: &Value, placeholder: &str) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|_| Value::String(placeholder.to_string()))
                .collect(),
        ),
        _ => Value::String(placeholder.to_string()),
    }
}
