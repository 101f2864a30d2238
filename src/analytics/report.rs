//! Human-readable rendering of the usage summary.
//!
//! Rendering is a pure function over a [`UsageRecord`] so it can be tested
//! without capturing stdout; [`UsageTracker::show_stats`] prints its output.
//!
//! [`UsageTracker::show_stats`]: crate::analytics::UsageTracker::show_stats

use crate::analytics::UsageRecord;
use chrono::{DateTime, Local, Utc};
use std::fmt::Write as _;

/// Line printed when no statistics exist or the file could not be read.
pub const NO_STATS_MESSAGE: &str = "No usage statistics available.";

/// Render a usage record as the multi-line summary shown to the user.
///
/// Commands appear in the record's stored order. A record without a
/// `commands` map simply lists no entries.
pub fn render(record: &UsageRecord) -> String {
    let mut out = String::new();
    out.push_str("📊 Usage Statistics:\n");
    let _ = writeln!(out, "First used: {}", format_date(record.first_used));
    let _ = writeln!(out, "Last used: {}", format_date(record.last_used));
    out.push_str("\nCommand usage:\n");

    for (command, count) in &record.commands {
        let _ = writeln!(out, "  {command}: {count} times");
    }

    out
}

/// Format a timestamp as a calendar date in the local timezone.
fn format_date(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => ts.with_timezone(&Local).format("%x").to_string(),
        None => "unknown".to_string(),
    }
}
