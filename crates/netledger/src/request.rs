//! Core request types for netledger.
//!
//! This module defines the stored representation of an observed network
//! request and the three lifecycle events a capture source reports for it.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Stringified form of a request that has not completed yet.
pub const PENDING_LABEL: &str = "Pending";

/// Stringified form of the error sentinel.
pub const ERROR_LABEL: &str = "ERROR";

/// Tab id reported for requests that are not tied to a browsing context.
pub const NO_TAB: i64 = -1;

/// Lifecycle status of a request.
///
/// Serialized in its display form: `"Pending"`, `"404"`, or `"ERROR"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RequestStatus {
    /// No completion or error has been observed.
    #[default]
    Pending,
    /// The request completed with an HTTP status code.
    Completed(u16),
    /// The request failed before a response was received.
    Error,
}

impl RequestStatus {
    /// Whether this status will receive no further updates.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// The HTTP status code, if the request completed.
    #[must_use]
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Completed(code) => Some(*code),
            Self::Pending | Self::Error => None,
        }
    }

    /// Display class of this status.
    #[must_use]
    pub fn class(&self) -> StatusClass {
        match self {
            Self::Pending => StatusClass::Pending,
            Self::Error => StatusClass::Error,
            Self::Completed(code) => match code {
                200..=299 => StatusClass::Success,
                300..=399 => StatusClass::Redirect,
                400..=499 => StatusClass::ClientError,
                500.. => StatusClass::ServerError,
                _ => StatusClass::Unknown,
            },
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str(PENDING_LABEL),
            Self::Completed(code) => write!(f, "{code}"),
            Self::Error => f.write_str(ERROR_LABEL),
        }
    }
}

impl FromStr for RequestStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            PENDING_LABEL => Ok(Self::Pending),
            ERROR_LABEL => Ok(Self::Error),
            code => code
                .parse()
                .map(Self::Completed)
                .map_err(|_| Error::InvalidStatus {
                    value: s.to_string(),
                }),
        }
    }
}

impl From<RequestStatus> for String {
    fn from(status: RequestStatus) -> Self {
        status.to_string()
    }
}

impl TryFrom<String> for RequestStatus {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, <Self as TryFrom<String>>::Error> {
        value.parse()
    }
}

/// Coarse grouping of statuses used when rendering requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusClass {
    /// Still waiting for a response.
    Pending,
    /// 2xx responses.
    Success,
    /// 3xx responses.
    Redirect,
    /// 4xx responses.
    ClientError,
    /// 5xx and above.
    ServerError,
    /// The request errored out.
    Error,
    /// Informational or otherwise unexpected codes.
    Unknown,
}

impl std::fmt::Display for StatusClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Redirect => "redirect",
            Self::ClientError => "client-error",
            Self::ServerError => "server-error",
            Self::Error => "error",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// A single response header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpHeader {
    /// Header name as reported by the capture source.
    pub name: String,
    /// Header value.
    #[serde(default)]
    pub value: String,
}

impl HttpHeader {
    /// Create a new header pair.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An observed network request and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Identifier assigned by the capturing environment.
    pub id: String,

    /// Full request URL.
    pub url: String,

    /// HTTP method.
    pub method: String,

    /// Resource type (`xmlhttprequest`, `script`, `image`, ...).
    #[serde(rename = "type")]
    pub resource_type: String,

    /// When the request was first observed.
    pub created_at: DateTime<Utc>,

    /// Originating tab, or [`NO_TAB`].
    pub tab_id: i64,

    /// Payload captured when the request started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,

    /// Current lifecycle status.
    pub status: RequestStatus,

    /// Response headers, set on completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<Vec<HttpHeader>>,

    /// Remote address, set on completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    /// Error detail, set only when the request errored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RequestRecord {
    /// Build a pending record from a start event.
    #[must_use]
    pub fn from_start(start: RequestStart) -> Self {
        Self {
            id: start.id,
            url: start.url,
            method: start.method,
            resource_type: start.resource_type,
            created_at: start.timestamp,
            tab_id: start.tab_id,
            body: start.body,
            status: RequestStatus::Pending,
            response_headers: None,
            ip: None,
            error: None,
        }
    }

    /// Whether the record is still waiting for completion or error.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Stringified status, as matched by status filters.
    #[must_use]
    pub fn status_label(&self) -> String {
        self.status.to_string()
    }
}

/// Start of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestStart {
    /// Request identifier.
    pub id: String,
    /// Request URL.
    #[serde(default)]
    pub url: String,
    /// HTTP method.
    #[serde(default)]
    pub method: String,
    /// Resource type.
    #[serde(rename = "type", default)]
    pub resource_type: String,
    /// Observation time; defaults to the time the event is parsed.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Originating tab.
    #[serde(default = "no_tab")]
    pub tab_id: i64,
    /// Optional request payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl RequestStart {
    /// Create a start event observed now, with no tab and no body.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        method: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            method: method.into(),
            resource_type: resource_type.into(),
            timestamp: Utc::now(),
            tab_id: NO_TAB,
            body: None,
        }
    }

    /// Attach a request payload.
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach the originating tab.
    #[must_use]
    pub fn with_tab(mut self, tab_id: i64) -> Self {
        self.tab_id = tab_id;
        self
    }
}

fn no_tab() -> i64 {
    NO_TAB
}

/// Completion of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCompletion {
    /// Request identifier.
    pub id: String,
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers in the order received.
    #[serde(default)]
    pub response_headers: Vec<HttpHeader>,
    /// Remote address the response came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

/// Failure of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFailure {
    /// Request identifier.
    pub id: String,
    /// Error reported by the capture source (e.g. `net::ERR_BLOCKED_BY_CLIENT`).
    #[serde(default)]
    pub error: String,
}

/// A lifecycle event emitted by a capture source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CaptureEvent {
    /// A request was sent.
    Start(RequestStart),
    /// A response was received.
    Completed(RequestCompletion),
    /// The request failed.
    Error(RequestFailure),
}

impl CaptureEvent {
    /// Id of the request this event refers to.
    #[must_use]
    pub fn request_id(&self) -> &str {
        match self {
            Self::Start(start) => &start.id,
            Self::Completed(completion) => &completion.id,
            Self::Error(failure) => &failure.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(RequestStatus::Pending.to_string(), "Pending");
        assert_eq!(RequestStatus::Completed(404).to_string(), "404");
        assert_eq!(RequestStatus::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("Pending".parse::<RequestStatus>().unwrap(), RequestStatus::Pending);
        assert_eq!("ERROR".parse::<RequestStatus>().unwrap(), RequestStatus::Error);
        assert_eq!(
            "503".parse::<RequestStatus>().unwrap(),
            RequestStatus::Completed(503)
        );
        assert!("done".parse::<RequestStatus>().is_err());
        assert!("-1".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_as_label() {
        assert_eq!(
            serde_json::to_value(RequestStatus::Completed(200)).unwrap(),
            "200"
        );
        assert_eq!(serde_json::to_value(RequestStatus::Pending).unwrap(), "Pending");
        assert_eq!(
            serde_json::from_str::<RequestStatus>("\"ERROR\"").unwrap(),
            RequestStatus::Error
        );
        assert!(serde_json::from_str::<RequestStatus>("\"ok\"").is_err());
    }

    #[test]
    fn test_status_is_terminal() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Completed(200).is_terminal());
        assert!(RequestStatus::Error.is_terminal());
    }

    #[test]
    fn test_status_code() {
        assert_eq!(RequestStatus::Completed(201).code(), Some(201));
        assert_eq!(RequestStatus::Pending.code(), None);
        assert_eq!(RequestStatus::Error.code(), None);
    }

    #[test]
    fn test_status_class() {
        assert_eq!(RequestStatus::Pending.class(), StatusClass::Pending);
        assert_eq!(RequestStatus::Error.class(), StatusClass::Error);
        assert_eq!(RequestStatus::Completed(204).class(), StatusClass::Success);
        assert_eq!(RequestStatus::Completed(301).class(), StatusClass::Redirect);
        assert_eq!(
            RequestStatus::Completed(404).class(),
            StatusClass::ClientError
        );
        assert_eq!(
            RequestStatus::Completed(503).class(),
            StatusClass::ServerError
        );
        assert_eq!(RequestStatus::Completed(101).class(), StatusClass::Unknown);
    }

    #[test]
    fn test_status_class_display() {
        assert_eq!(StatusClass::ClientError.to_string(), "client-error");
        assert_eq!(StatusClass::ServerError.to_string(), "server-error");
    }

    #[test]
    fn test_record_from_start() {
        let start = RequestStart::new("a", "https://x.com/api", "GET", "xmlhttprequest")
            .with_tab(7)
            .with_body(serde_json::json!({"raw": ["abc"]}));
        let record = RequestRecord::from_start(start.clone());

        assert_eq!(record.id, "a");
        assert_eq!(record.url, "https://x.com/api");
        assert_eq!(record.method, "GET");
        assert_eq!(record.resource_type, "xmlhttprequest");
        assert_eq!(record.created_at, start.timestamp);
        assert_eq!(record.tab_id, 7);
        assert!(record.body.is_some());
        assert!(record.is_pending());
        assert!(record.response_headers.is_none());
        assert!(record.ip.is_none());
        assert!(record.error.is_none());
        assert_eq!(record.status_label(), "Pending");
    }

    #[test]
    fn test_capture_event_parse_start() {
        let json = r#"{"event":"start","id":"17","url":"https://a.test/","method":"POST","type":"main_frame","tab_id":3}"#;
        let event: CaptureEvent = serde_json::from_str(json).unwrap();

        let CaptureEvent::Start(start) = event else {
            panic!("Expected Start event");
        };
        assert_eq!(start.id, "17");
        assert_eq!(start.method, "POST");
        assert_eq!(start.resource_type, "main_frame");
        assert_eq!(start.tab_id, 3);
        assert!(start.body.is_none());
    }

    #[test]
    fn test_capture_event_parse_defaults_tab() {
        let json = r#"{"event":"start","id":"1","url":"u","method":"GET","type":"other"}"#;
        let event: CaptureEvent = serde_json::from_str(json).unwrap();
        let CaptureEvent::Start(start) = event else {
            panic!("Expected Start event");
        };
        assert_eq!(start.tab_id, NO_TAB);
    }

    #[test]
    fn test_capture_event_parse_completed() {
        let json = r#"{"event":"completed","id":"17","status_code":200,"response_headers":[{"name":"content-type","value":"text/html"}],"ip":"1.2.3.4"}"#;
        let event: CaptureEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.request_id(), "17");
        let CaptureEvent::Completed(completion) = event else {
            panic!("Expected Completed event");
        };
        assert_eq!(completion.status_code, 200);
        assert_eq!(completion.response_headers.len(), 1);
        assert_eq!(completion.ip.as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn test_capture_event_parse_error() {
        let json = r#"{"event":"error","id":"9","error":"net::ERR_FAILED"}"#;
        let event: CaptureEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, CaptureEvent::Error(ref f) if f.error == "net::ERR_FAILED"));
    }

    #[test]
    fn test_capture_event_requires_id() {
        let json = r#"{"event":"error","error":"boom"}"#;
        assert!(serde_json::from_str::<CaptureEvent>(json).is_err());
    }

    #[test]
    fn test_record_serialization_uses_type_key() {
        let record = RequestRecord::from_start(RequestStart::new("a", "u", "GET", "script"));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["type"], "script");
        assert_eq!(json["status"], "Pending");
        assert!(json.get("body").is_none());
        assert!(json.get("error").is_none());
    }
}
