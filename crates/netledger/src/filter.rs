//! Query predicates over request records.
//!
//! A [`RequestFilter`] is a conjunction of optional predicates. Any field that
//! is absent, blank, or set to the `ALL`/`ANY` sentinel matches every record.

use serde::{Deserialize, Serialize};

use crate::request::RequestRecord;

/// Filter values that mean "do not filter on this field".
const ANY_SENTINELS: &[&str] = &["all", "any"];

/// Filter over request records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestFilter {
    /// Case-insensitive substring of the URL.
    pub url: Option<String>,
    /// Exact HTTP method.
    pub method: Option<String>,
    /// Exact resource type.
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    /// Substring of the stringified status (`200`, `Pending`, `ERROR`).
    pub status: Option<String>,
}

impl RequestFilter {
    /// A filter that matches everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to URLs containing `url` (case-insensitive).
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Restrict to one HTTP method.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Restrict to one resource type.
    #[must_use]
    pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    /// Restrict to statuses containing `status`.
    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Whether no predicate is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        active_text(self.url.as_deref()).is_none()
            && active_exact(self.method.as_deref()).is_none()
            && active_exact(self.resource_type.as_deref()).is_none()
            && active_text(self.status.as_deref()).is_none()
    }

    /// Check a record against every active predicate.
    #[must_use]
    pub fn matches(&self, record: &RequestRecord) -> bool {
        if let Some(needle) = active_text(self.url.as_deref()) {
            if !contains_ignore_case(&record.url, needle) {
                return false;
            }
        }

        if let Some(method) = active_exact(self.method.as_deref()) {
            if record.method != method {
                return false;
            }
        }

        if let Some(resource_type) = active_exact(self.resource_type.as_deref()) {
            if record.resource_type != resource_type {
                return false;
            }
        }

        if let Some(needle) = active_text(self.status.as_deref()) {
            if !contains_ignore_case(&record.status_label(), needle) {
                return false;
            }
        }

        true
    }
}

/// Substring predicates are disabled only by blank input.
fn active_text(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Exact-match predicates are also disabled by the `ALL`/`ANY` sentinels.
fn active_exact(value: Option<&str>) -> Option<&str> {
    active_text(value).filter(|v| {
        !ANY_SENTINELS
            .iter()
            .any(|sentinel| v.eq_ignore_ascii_case(sentinel))
    })
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
