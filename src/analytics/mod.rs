//! # Usage Analytics Module
//!
//! This module provides anonymous, strictly local tracking of command usage
//! for a CLI tool: how often each command ran and whether it succeeded.
//!
//! ## Overview
//!
//! The surrounding CLI dispatcher calls [`UsageTracker::track`] once after
//! each command completes. A separate "show stats" command calls
//! [`UsageTracker::show_stats`] to print a summary. Tracking is best-effort:
//! no analytics failure is ever surfaced to the caller, so recording usage
//! can never break or change the exit status of the tool being tracked.
//!
//! ## Storage
//!
//! Statistics live in a single JSON file under the user's home directory:
//!
//! ```text
//! ~/.{tool-name}/stats.json
//! ```
//!
//! ## Data Format
//!
//! ```json
//! {
//!   "commands": {
//!     "publish_success": 3,
//!     "publish_error": 1
//!   },
//!   "firstUsed": "2026-02-05T10:30:00Z",
//!   "lastUsed": "2026-02-05T11:00:00Z"
//! }
//! ```
//!
//! ## Opting out
//!
//! Setting `<TOOL_NAME>_ANALYTICS=false` in the environment (for example
//! `CONFLUENCE_CLI_ANALYTICS=false` for a tool named `confluence-cli`)
//! disables all tracking for the lifetime of the process.

mod report;
mod tracker;

pub use report::{render, NO_STATS_MESSAGE};
pub use tracker::{UsageRecord, UsageTracker, STATS_FILE_NAME};
