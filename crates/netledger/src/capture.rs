//! Capture sources for netledger.
//!
//! A capture source produces [`CaptureEvent`]s and sends them to the ledger
//! service. Browser `webRequest` hooks are one such source; this crate ships
//! a replay source that reads newline-delimited JSON.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::privacy::Redactor;
use crate::request::CaptureEvent;

const JSON_LINES_SOURCE: &str = "jsonl";
const EVENT_LIST_SOURCE: &str = "events";

/// Counters reported when a capture source finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Events delivered to the ledger.
    pub accepted: usize,
    /// Input that could not be turned into an event.
    pub rejected: usize,
}

/// Trait for anything that produces capture events.
#[async_trait]
pub trait CaptureSource: Send {
    /// The name of this capture source (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Produce events until the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or the receiving side
    /// has gone away.
    async fn run(&mut self, sender: mpsc::Sender<CaptureEvent>) -> Result<CaptureStats>;
}

/// Replays capture events from newline-delimited JSON.
///
/// Each non-blank line holds one event, e.g.
/// `{"event":"completed","id":"42","status_code":200}`. Lines that fail to
/// parse are logged and skipped.
#[derive(Debug)]
pub struct JsonLinesSource<R> {
    reader: R,
    redactor: Option<Arc<Redactor>>,
}

impl JsonLinesSource<BufReader<File>> {
    /// Open an event file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).await.map_err(|e| {
            Error::capture_source(JSON_LINES_SOURCE, format!("{}: {e}", path.display()))
        })?;
        debug!("Opened event file {}", path.display());
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R> JsonLinesSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// Read events from any buffered reader.
    #[must_use]
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            redactor: None,
        }
    }

    /// Redact events before they are sent.
    #[must_use]
    pub fn with_redactor(mut self, redactor: Arc<Redactor>) -> Self {
        self.redactor = Some(redactor);
        self
    }
}

#[async_trait]
impl<R> CaptureSource for JsonLinesSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    fn name(&self) -> &'static str {
        JSON_LINES_SOURCE
    }

    async fn run(&mut self, sender: mpsc::Sender<CaptureEvent>) -> Result<CaptureStats> {
        let mut stats = CaptureStats::default();
        let mut buf = Vec::new();
        let mut line_no = 0;

        loop {
            buf.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|e| Error::capture_source(JSON_LINES_SOURCE, e.to_string()))?;
            if read == 0 {
                break;
            }
            line_no += 1;

            let text = match std::str::from_utf8(&buf) {
                Ok(text) => text.trim(),
                Err(e) => {
                    warn!(line = line_no, error = %e, "Skipping line that is not UTF-8");
                    stats.rejected += 1;
                    continue;
                }
            };
            if text.is_empty() {
                continue;
            }

            let mut event = match serde_json::from_str::<CaptureEvent>(text) {
                Ok(event) => event,
                Err(source) => {
                    let err = Error::EventParse {
                        line: line_no,
                        source,
                    };
                    warn!(error = %err, "Skipping capture event");
                    stats.rejected += 1;
                    continue;
                }
            };

            if let Some(redactor) = &self.redactor {
                redactor.redact_event(&mut event);
            }

            sender
                .send(event)
                .await
                .map_err(|_| Error::ServiceClosed)?;
            stats.accepted += 1;
        }

        info!(
            accepted = stats.accepted,
            rejected = stats.rejected,
            "Finished replaying capture events"
        );
        Ok(stats)
    }
}

/// Sends a fixed list of events.
#[derive(Debug, Default)]
pub struct EventListSource {
    events: Vec<CaptureEvent>,
}

impl EventListSource {
    /// Create a source from events in delivery order.
    #[must_use]
    pub fn new(events: Vec<CaptureEvent>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl CaptureSource for EventListSource {
    fn name(&self) -> &'static str {
        EVENT_LIST_SOURCE
    }

    async fn run(&mut self, sender: mpsc::Sender<CaptureEvent>) -> Result<CaptureStats> {
        let mut stats = CaptureStats::default();
        for event in self.events.drain(..) {
            sender
                .send(event)
                .await
                .map_err(|_| Error::ServiceClosed)?;
            stats.accepted += 1;
        }
        Ok(stats)
    }
}
