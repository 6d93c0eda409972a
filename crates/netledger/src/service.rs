//! The ledger service.
//!
//! One task owns the [`Ledger`]. Capture sources feed it through an event
//! channel; display-layer callers talk to it through a cloneable
//! [`LedgerHandle`] whose requests carry a oneshot reply. Every reply is an
//! owned copy, so a caller holding a result never sees later mutations.

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::filter::RequestFilter;
use crate::ledger::{Ledger, LedgerStats};
use crate::request::{CaptureEvent, RequestRecord};

/// Requests the display layer can make.
#[derive(Debug)]
enum Command {
    Snapshot {
        reply: oneshot::Sender<Vec<RequestRecord>>,
    },
    Query {
        filter: RequestFilter,
        reply: oneshot::Sender<Vec<RequestRecord>>,
    },
    Get {
        id: String,
        reply: oneshot::Sender<Option<RequestRecord>>,
    },
    Clear {
        reply: oneshot::Sender<usize>,
    },
    Stats {
        reply: oneshot::Sender<LedgerStats>,
    },
}

/// Owns a ledger and serves it over channels.
#[derive(Debug)]
pub struct LedgerService {
    ledger: Ledger,
    events: mpsc::Receiver<CaptureEvent>,
    commands: mpsc::Receiver<Command>,
    count: watch::Sender<usize>,
}

/// Cloneable handle to a running [`LedgerService`].
#[derive(Debug, Clone)]
pub struct LedgerHandle {
    events: mpsc::Sender<CaptureEvent>,
    commands: mpsc::Sender<Command>,
    count: watch::Receiver<usize>,
}

impl LedgerService {
    /// Create a service around `ledger` and a handle to reach it.
    ///
    /// Nothing is processed until [`LedgerService::run`] is awaited.
    #[must_use]
    pub fn new(ledger: Ledger, config: &ServiceConfig) -> (Self, LedgerHandle) {
        let (event_tx, event_rx) = mpsc::channel(config.event_buffer.max(1));
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer.max(1));
        let (count_tx, count_rx) = watch::channel(ledger.len());

        let service = Self {
            ledger,
            events: event_rx,
            commands: command_rx,
            count: count_tx,
        };
        let handle = LedgerHandle {
            events: event_tx,
            commands: command_tx,
            count: count_rx,
        };
        (service, handle)
    }

    /// Spawn the service on the current tokio runtime.
    #[must_use]
    pub fn spawn(
        ledger: Ledger,
        config: &ServiceConfig,
    ) -> (tokio::task::JoinHandle<Ledger>, LedgerHandle) {
        let (service, handle) = Self::new(ledger, config);
        (tokio::spawn(service.run()), handle)
    }

    /// Process events and commands until every sender is dropped.
    ///
    /// Capture events queued before a command are always applied before it,
    /// so a query issued after a capture source finishes observes all of its
    /// events.
    /// Returns the ledger in its final state.
    pub async fn run(mut self) -> Ledger {
        let mut events_open = true;
        let mut commands_open = true;
        debug!(capacity = self.ledger.capacity(), "Ledger service started");

        while events_open || commands_open {
            tokio::select! {
                biased;

                event = self.events.recv(), if events_open => match event {
                    Some(event) => self.handle_event(event),
                    None => events_open = false,
                },
                command = self.commands.recv(), if commands_open => match command {
                    Some(command) => self.handle_command(command),
                    None => commands_open = false,
                },
            }
        }

        info!(records = self.ledger.len(), "Ledger service stopped");
        self.ledger
    }

    fn handle_event(&mut self, event: CaptureEvent) {
        self.ledger.apply(event);
        self.publish_count();
    }

    fn handle_command(&mut self, command: Command) {
        // Events sent before this command must be visible to it.
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }

        // A dropped reply receiver means the caller gave up; nothing to do.
        match command {
            Command::Snapshot { reply } => {
                let _ = reply.send(self.ledger.snapshot());
            }
            Command::Query { filter, reply } => {
                let _ = reply.send(self.ledger.query(&filter));
            }
            Command::Get { id, reply } => {
                let _ = reply.send(self.ledger.get(&id).cloned());
            }
            Command::Clear { reply } => {
                let removed = self.ledger.clear();
                self.publish_count();
                let _ = reply.send(removed);
            }
            Command::Stats { reply } => {
                let _ = reply.send(self.ledger.stats());
            }
        }
    }

    fn publish_count(&self) {
        self.count.send_if_modified(|count| {
            let len = self.ledger.len();
            let changed = *count != len;
            *count = len;
            changed
        });
    }
}

impl LedgerHandle {
    /// Sender for capture sources.
    #[must_use]
    pub fn capture_sender(&self) -> mpsc::Sender<CaptureEvent> {
        self.events.clone()
    }

    /// Deliver a single capture event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceClosed`] if the service has stopped.
    pub async fn capture(&self, event: CaptureEvent) -> Result<()> {
        self.events
            .send(event)
            .await
            .map_err(|_| Error::ServiceClosed)
    }

    /// Every record, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceClosed`] if the service has stopped.
    pub async fn snapshot(&self) -> Result<Vec<RequestRecord>> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Records matching `filter`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceClosed`] if the service has stopped.
    pub async fn query(&self, filter: RequestFilter) -> Result<Vec<RequestRecord>> {
        self.request(|reply| Command::Query { filter, reply }).await
    }

    /// The most recent record with `id`, if it is still held.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceClosed`] if the service has stopped.
    pub async fn get(&self, id: impl Into<String>) -> Result<Option<RequestRecord>> {
        let id = id.into();
        self.request(|reply| Command::Get { id, reply }).await
    }

    /// Drop every record, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceClosed`] if the service has stopped.
    pub async fn clear(&self) -> Result<usize> {
        self.request(|reply| Command::Clear { reply }).await
    }

    /// Counts by lifecycle state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceClosed`] if the service has stopped.
    pub async fn stats(&self) -> Result<LedgerStats> {
        self.request(|reply| Command::Stats { reply }).await
    }

    /// Last published record count.
    #[must_use]
    pub fn count(&self) -> usize {
        *self.count.borrow()
    }

    /// Watch the record count, e.g. to drive a badge.
    #[must_use]
    pub fn subscribe_count(&self) -> watch::Receiver<usize> {
        self.count.clone()
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| Error::ServiceClosed)?;
        response.await.map_err(|_| Error::ServiceClosed)
    }
}
