//! Text rendering of requests for the terminal.

use std::fmt::Write as _;

use crate::ledger::LedgerStats;
use crate::request::RequestRecord;

/// URLs longer than this are shortened in listings.
pub const MAX_URL_WIDTH: usize = 80;

const ELLIPSIS: &str = "...";

/// Shorten `url` to at most `max` characters, ending in `...` when cut.
///
/// Widths too narrow for the ellipsis cut the URL without one.
#[must_use]
pub fn truncate_url(url: &str, max: usize) -> String {
    if url.chars().count() <= max {
        return url.to_string();
    }
    if max < ELLIPSIS.len() {
        return url.chars().take(max).collect();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut short: String = url.chars().take(keep).collect();
    short.push_str(ELLIPSIS);
    short
}

/// `"1 request"`, `"3 requests"`.
#[must_use]
pub fn request_count(n: usize) -> String {
    format!("{n} request{}", if n == 1 { "" } else { "s" })
}

/// One line per request: time, method, status, class, type, url.
#[must_use]
pub fn render_plain(records: &[RequestRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let _ = writeln!(
            out,
            "{} {} {} {} {} {}",
            record.created_at.format("%H:%M:%S"),
            record.method,
            record.status,
            record.status.class(),
            record.resource_type,
            record.url
        );
    }
    out
}

/// Aligned columns with a header and a count footer.
#[must_use]
pub fn render_table(records: &[RequestRecord]) -> String {
    if records.is_empty() {
        return "No network requests captured yet.\n".to_string();
    }

    let method_width = column_width(records, "METHOD", |r| r.method.chars().count());
    let status_width = column_width(records, "STATUS", |r| r.status_label().chars().count());
    let class_width = column_width(records, "CLASS", |r| {
        r.status.class().to_string().chars().count()
    });
    let type_width = column_width(records, "TYPE", |r| r.resource_type.chars().count());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8}  {:<method_width$}  {:<status_width$}  {:<class_width$}  {:<type_width$}  URL",
        "TIME", "METHOD", "STATUS", "CLASS", "TYPE"
    );
    for record in records {
        let _ = writeln!(
            out,
            "{:<8}  {:<method_width$}  {:<status_width$}  {:<class_width$}  {:<type_width$}  {}",
            record.created_at.format("%H:%M:%S").to_string(),
            record.method,
            record.status_label(),
            record.status.class().to_string(),
            record.resource_type,
            truncate_url(&record.url, MAX_URL_WIDTH)
        );
    }
    let _ = writeln!(out, "\n{}", request_count(records.len()));
    out
}

/// Human-readable ledger summary.
#[must_use]
pub fn render_stats(stats: &LedgerStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Requests:   {} / {}", stats.total, stats.capacity);
    let _ = writeln!(out, "Pending:    {}", stats.pending);
    let _ = writeln!(out, "Completed:  {}", stats.completed);
    let _ = writeln!(out, "Errored:    {}", stats.errored);
    out
}

fn column_width(
    records: &[RequestRecord],
    header: &str,
    width: impl Fn(&RequestRecord) -> usize,
) -> usize {
    records
        .iter()
        .map(width)
        .max()
        .unwrap_or(0)
        .max(header.chars().count())
}
