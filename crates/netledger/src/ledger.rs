//! The request ledger.
//!
//! A bounded, most-recent-first collection of [`RequestRecord`]s. Starts are
//! pushed to the front and the oldest records fall off the back once the
//! capacity is exceeded. Completions and errors patch a pending record in
//! place; updates for unknown or already-terminal ids are no-ops.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::filter::RequestFilter;
use crate::request::{
    CaptureEvent, HttpHeader, RequestCompletion, RequestFailure, RequestRecord, RequestStart,
    RequestStatus,
};

/// Default number of records retained.
pub const DEFAULT_CAPACITY: usize = 500;

/// What happened when a completion or error was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// A pending record was updated.
    Applied,
    /// No record with that id is in the ledger.
    Missing,
    /// The record had already completed or errored.
    AlreadyTerminal,
}

impl PatchOutcome {
    /// Whether the ledger was modified.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Bounded in-memory store of observed requests.
#[derive(Debug, Clone)]
pub struct Ledger {
    records: VecDeque<RequestRecord>,
    capacity: usize,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Ledger {
    /// Create an empty ledger holding at most `capacity` records.
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        }
    }

    /// Maximum number of records retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of records currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record the start of a request, evicting the oldest records if full.
    pub fn record_start(&mut self, start: RequestStart) {
        trace!(id = %start.id, url = %start.url, "Recording request start");
        self.records.push_front(RequestRecord::from_start(start));

        while self.records.len() > self.capacity {
            if let Some(evicted) = self.records.pop_back() {
                trace!(id = %evicted.id, "Evicted oldest request");
            }
        }
    }

    /// Record the completion of a pending request.
    pub fn record_completion(
        &mut self,
        id: &str,
        status_code: u16,
        response_headers: Vec<HttpHeader>,
        ip: Option<String>,
    ) -> PatchOutcome {
        let outcome = self.patch(id, |record| {
            record.status = RequestStatus::Completed(status_code);
            record.response_headers = Some(response_headers);
            record.ip = ip;
        });
        debug!(id, status_code, ?outcome, "Recorded request completion");
        outcome
    }

    /// Record the failure of a pending request.
    pub fn record_error(&mut self, id: &str, error: impl Into<String>) -> PatchOutcome {
        let error = error.into();
        let outcome = self.patch(id, |record| {
            record.status = RequestStatus::Error;
            record.error = Some(error);
        });
        debug!(id, ?outcome, "Recorded request error");
        outcome
    }

    /// Apply a capture event.
    ///
    /// Returns `None` for start events, which always succeed.
    pub fn apply(&mut self, event: CaptureEvent) -> Option<PatchOutcome> {
        match event {
            CaptureEvent::Start(start) => {
                self.record_start(start);
                None
            }
            CaptureEvent::Completed(RequestCompletion {
                id,
                status_code,
                response_headers,
                ip,
            }) => Some(self.record_completion(&id, status_code, response_headers, ip)),
            CaptureEvent::Error(RequestFailure { id, error }) => {
                Some(self.record_error(&id, error))
            }
        }
    }

    /// Remove every record, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        info!(removed, "Cleared request ledger");
        removed
    }

    /// Records matching `filter`, most recent first.
    #[must_use]
    pub fn query(&self, filter: &RequestFilter) -> Vec<RequestRecord> {
        self.records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect()
    }

    /// Copy of every record, most recent first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<RequestRecord> {
        self.records.iter().cloned().collect()
    }

    /// Look up a record by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RequestRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Iterate over records, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &RequestRecord> {
        self.records.iter()
    }

    /// Counts by lifecycle state.
    #[must_use]
    pub fn stats(&self) -> LedgerStats {
        let mut stats = LedgerStats {
            total: self.records.len(),
            capacity: self.capacity,
            ..LedgerStats::default()
        };
        for record in &self.records {
            match record.status {
                RequestStatus::Pending => stats.pending += 1,
                RequestStatus::Completed(_) => stats.completed += 1,
                RequestStatus::Error => stats.errored += 1,
            }
        }
        stats
    }

    fn patch(&mut self, id: &str, update: impl FnOnce(&mut RequestRecord)) -> PatchOutcome {
        match self.records.iter_mut().find(|record| record.id == id) {
            None => PatchOutcome::Missing,
            Some(record) if record.status.is_terminal() => PatchOutcome::AlreadyTerminal,
            Some(record) => {
                update(record);
                PatchOutcome::Applied
            }
        }
    }
}

/// Summary of ledger contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    /// Records currently held.
    pub total: usize,
    /// Records still waiting for a response.
    pub pending: usize,
    /// Records that completed with a status code.
    pub completed: usize,
    /// Records that errored.
    pub errored: usize,
    /// Maximum number of records retained.
    pub capacity: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(id: &str) -> RequestStart {
        RequestStart::new(id, format!("https://x.com/{id}"), "GET", "xmlhttprequest")
    }

    fn ids(records: &[RequestRecord]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_default_capacity() {
        let ledger = Ledger::default();
        assert_eq!(ledger.capacity(), 500);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut ledger = Ledger::new(0);
        assert_eq!(ledger.capacity(), 1);

        ledger.record_start(start("a"));
        ledger.record_start(start("b"));
        assert_eq!(ids(&ledger.snapshot()), vec!["b"]);
    }

    #[test]
    fn test_record_start_inserts_at_front() {
        let mut ledger = Ledger::new(10);
        ledger.record_start(start("a"));
        ledger.record_start(start("b"));
        ledger.record_start(start("c"));

        assert_eq!(ids(&ledger.snapshot()), vec!["c", "b", "a"]);
        assert!(ledger.iter().all(RequestRecord::is_pending));
    }

    #[test]
    fn test_eviction_drops_oldest() {
        let mut ledger = Ledger::new(500);
        for i in 1..=501 {
            ledger.record_start(start(&i.to_string()));
        }

        assert_eq!(ledger.len(), 500);
        let snapshot = ledger.snapshot();
        assert_eq!(snapshot[0].id, "501");
        assert_eq!(snapshot[499].id, "2");
        assert!(ledger.get("1").is_none());
    }

    #[test]
    fn test_duplicate_ids_are_distinct_entries() {
        let mut ledger = Ledger::new(10);
        ledger.record_start(start("dup"));
        ledger.record_start(start("dup"));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_completion_updates_pending_record() {
        let mut ledger = Ledger::new(10);
        ledger.record_start(start("a"));
        ledger.record_start(start("b"));

        let outcome = ledger.record_completion(
            "a",
            200,
            vec![HttpHeader::new("content-type", "application/json")],
            Some("1.2.3.4".to_string()),
        );
        assert_eq!(outcome, PatchOutcome::Applied);

        let a = ledger.get("a").unwrap();
        assert_eq!(a.status, RequestStatus::Completed(200));
        assert_eq!(a.response_headers.as_ref().unwrap().len(), 1);
        assert_eq!(a.ip.as_deref(), Some("1.2.3.4"));

        let b = ledger.get("b").unwrap();
        assert!(b.is_pending());
        assert!(b.response_headers.is_none());
    }

    #[test]
    fn test_error_updates_pending_record() {
        let mut ledger = Ledger::new(10);
        ledger.record_start(start("a"));

        let outcome = ledger.record_error("a", "net::ERR_CONNECTION_RESET");
        assert!(outcome.is_applied());

        let a = ledger.get("a").unwrap();
        assert_eq!(a.status, RequestStatus::Error);
        assert_eq!(a.error.as_deref(), Some("net::ERR_CONNECTION_RESET"));
    }

    #[test]
    fn test_second_terminal_write_is_noop() {
        let mut ledger = Ledger::new(10);
        ledger.record_start(start("a"));
        ledger.record_completion("a", 200, Vec::new(), None);
        let before = ledger.snapshot();

        assert_eq!(
            ledger.record_completion("a", 500, Vec::new(), Some("9.9.9.9".to_string())),
            PatchOutcome::AlreadyTerminal
        );
        assert_eq!(
            ledger.record_error("a", "late"),
            PatchOutcome::AlreadyTerminal
        );
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn test_error_then_completion_is_noop() {
        let mut ledger = Ledger::new(10);
        ledger.record_start(start("a"));
        ledger.record_error("a", "failed");

        let outcome = ledger.record_completion("a", 200, Vec::new(), None);
        assert_eq!(outcome, PatchOutcome::AlreadyTerminal);

        let a = ledger.get("a").unwrap();
        assert_eq!(a.status, RequestStatus::Error);
        assert!(a.response_headers.is_none());
    }

    #[test]
    fn test_update_for_missing_id_is_noop() {
        let mut ledger = Ledger::new(10);
        assert_eq!(
            ledger.record_error("missing-id", "whatever"),
            PatchOutcome::Missing
        );
        assert_eq!(ledger.len(), 0);

        ledger.record_start(start("a"));
        let before = ledger.snapshot();
        assert_eq!(
            ledger.record_completion("b", 200, Vec::new(), None),
            PatchOutcome::Missing
        );
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn test_update_for_evicted_id_is_noop() {
        let mut ledger = Ledger::new(2);
        ledger.record_start(start("a"));
        ledger.record_start(start("b"));
        ledger.record_start(start("c"));

        assert_eq!(
            ledger.record_completion("a", 200, Vec::new(), None),
            PatchOutcome::Missing
        );
        assert_eq!(ids(&ledger.snapshot()), vec!["c", "b"]);
    }

    #[test]
    fn test_clear() {
        let mut ledger = Ledger::new(10);
        ledger.record_start(start("a"));
        ledger.record_start(start("b"));

        assert_eq!(ledger.clear(), 2);
        assert!(ledger.is_empty());
        assert_eq!(ledger.record_error("a", "x"), PatchOutcome::Missing);
    }

    #[test]
    fn test_query_by_status_after_completion() {
        let mut ledger = Ledger::new(10);
        ledger.record_start(RequestStart::new(
            "a",
            "https://x.com/api",
            "GET",
            "xmlhttprequest",
        ));
        ledger.record_start(start("b"));
        ledger.record_completion("a", 200, Vec::new(), Some("1.2.3.4".to_string()));

        let results = ledger.query(&RequestFilter::new().status("200"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "a");
        assert_eq!(results[0].status, RequestStatus::Completed(200));
    }

    #[test]
    fn test_empty_query_equals_snapshot() {
        let mut ledger = Ledger::new(10);
        for id in ["a", "b", "c"] {
            ledger.record_start(start(id));
        }
        assert_eq!(ledger.query(&RequestFilter::new()), ledger.snapshot());
    }

    #[test]
    fn test_query_result_is_a_copy() {
        let mut ledger = Ledger::new(10);
        ledger.record_start(start("a"));

        let results = ledger.query(&RequestFilter::new());
        ledger.record_completion("a", 204, Vec::new(), None);
        ledger.record_start(start("b"));

        assert_eq!(results.len(), 1);
        assert!(results[0].is_pending());
    }

    #[test]
    fn test_query_method_all_equals_unfiltered() {
        let mut ledger = Ledger::new(10);
        ledger.record_start(RequestStart::new("a", "https://x.com/a", "GET", "script"));
        ledger.record_start(RequestStart::new("b", "https://x.com/b", "POST", "script"));
        ledger.record_start(RequestStart::new("c", "https://y.com/c", "PUT", "image"));

        let all = ledger.query(&RequestFilter::new().method("ALL").url("x.com"));
        let unfiltered = ledger.query(&RequestFilter::new().url("x.com"));
        assert_eq!(all, unfiltered);
        assert_eq!(ids(&all), vec!["b", "a"]);
    }

    #[test]
    fn test_apply_dispatches_events() {
        let mut ledger = Ledger::new(10);
        assert!(ledger.apply(CaptureEvent::Start(start("a"))).is_none());
        let outcome = ledger.apply(CaptureEvent::Error(RequestFailure {
            id: "a".to_string(),
            error: "blocked".to_string(),
        }));
        assert_eq!(outcome, Some(PatchOutcome::Applied));
        assert_eq!(ledger.get("a").unwrap().status, RequestStatus::Error);
    }

    #[test]
    fn test_stats() {
        let mut ledger = Ledger::new(10);
        for id in ["a", "b", "c", "d"] {
            ledger.record_start(start(id));
        }
        ledger.record_completion("a", 200, Vec::new(), None);
        ledger.record_completion("b", 404, Vec::new(), None);
        ledger.record_error("c", "failed");

        let stats = ledger.stats();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.errored, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.capacity, 10);
    }
}
