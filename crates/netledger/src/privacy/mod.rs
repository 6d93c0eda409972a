//! Privacy redaction for captured requests.
//!
//! Capture events pass through a [`Redactor`] before they reach the ledger:
//!
//! - **Headers**: values of sensitive response headers (`Set-Cookie`,
//!   `Authorization`, ...) are replaced with a placeholder.
//!
//! - **Bodies**: fields named like credentials are blanked, and every string in
//!   the payload is scanned with built-in and custom regex patterns.
//!
//! # Example
//!
//! ```
//! use netledger::privacy::Redactor;
//!
//! let redactor = Redactor::new();
//! let redacted = redactor.redact_text("login?password=hunter22");
//! assert_eq!(redacted.as_deref(), Some("login?[REDACTED]"));
//! ```

mod patterns;
mod redactor;

pub use patterns::{builtin_patterns, sensitive_field_names, RedactionPattern};
pub use redactor::Redactor;
