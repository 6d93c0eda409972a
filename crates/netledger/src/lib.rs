//! `netledger` - A bounded ledger of captured network requests
//!
//! This library ingests request lifecycle events (start, completion, error),
//! keeps the most recent requests in a capacity-bounded ledger, and answers
//! filtered queries over it.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod ledger;
pub mod logging;
pub mod privacy;
pub mod request;
pub mod service;

pub use capture::{CaptureSource, CaptureStats, EventListSource, JsonLinesSource};
pub use config::Config;
pub use error::{Error, Result};
pub use filter::RequestFilter;
pub use ledger::{Ledger, LedgerStats, PatchOutcome};
pub use logging::init_logging;
pub use request::{
    CaptureEvent, HttpHeader, RequestCompletion, RequestFailure, RequestRecord, RequestStart,
    RequestStatus, StatusClass,
};
pub use service::{LedgerHandle, LedgerService};
