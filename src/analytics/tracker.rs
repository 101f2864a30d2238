//! # Usage Tracker
//!
//! Records command invocations to a per-user JSON file.
//!
//! ## Storage Location
//!
//! ```text
//! ~/.{tool-name}/stats.json
//! ```
//!
//! Every [`UsageTracker::track`] call performs a full read-modify-write of
//! the file. There is no locking; two processes racing on the same file may
//! lose an update (last writer wins), which is accepted for a single-user,
//! low-frequency tool.

use crate::analytics::report;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the persisted statistics document.
pub const STATS_FILE_NAME: &str = "stats.json";

/// The persisted usage statistics document.
///
/// `commands` maps a composite key (`<command>_success` / `<command>_error`)
/// to the number of times that outcome was recorded. The map keeps insertion
/// order, so a summary lists commands in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    /// Map of composite command key -> invocation count.
    #[serde(default)]
    pub commands: IndexMap<String, u64>,
    /// When the tool was first used. Set once, never changed afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_used: Option<DateTime<Utc>>,
    /// When the tool was last used. Updated on every tracked event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

/// Tracks command usage with best-effort persistence.
///
/// Construction resolves the opt-out toggle and the stats file path once;
/// after that, [`track`](Self::track) never fails from the caller's point of
/// view and [`get_stats`](Self::get_stats) never fails either, reporting
/// missing or unreadable data as `None`.
#[derive(Debug)]
pub struct UsageTracker {
    /// Whether tracking is active. Resolved once from the environment.
    enabled: bool,
    /// Directory holding the stats file, created on first write.
    config_dir: PathBuf,
    /// Full path of the stats file.
    stats_file: PathBuf,
}

impl UsageTracker {
    /// Create a tracker for the named tool, storing statistics under
    /// `~/.{tool_name}/stats.json`.
    ///
    /// Fails only if the user's home directory cannot be determined.
    pub fn new(tool_name: &str) -> Result<Self> {
        let base_dirs = directories::BaseDirs::new()
            .context("Could not determine the user's home directory")?;
        let config_dir = base_dirs.home_dir().join(format!(".{tool_name}"));

        Ok(Self::with_config_dir(tool_name, config_dir))
    }

    /// Create a tracker with an explicit config directory.
    ///
    /// The opt-out toggle is still resolved from the environment based on
    /// `tool_name`. Intended for embedding tools that manage their own
    /// config location, and for tests.
    pub fn with_config_dir(tool_name: &str, config_dir: PathBuf) -> Self {
        let stats_file = config_dir.join(STATS_FILE_NAME);

        Self {
            enabled: resolve_enabled(tool_name),
            config_dir,
            stats_file,
        }
    }

    /// Record a command invocation.
    ///
    /// Does nothing when tracking is disabled. Never propagates a failure:
    /// a corrupt stats file, a missing directory, or a failed write all
    /// leave the caller unaffected.
    pub fn track(&self, command: &str, success: bool) {
        if !self.enabled {
            return;
        }

        // Analytics must never break the tool itself, so the failure
        // branch is dropped here.
        let _ = self.try_track(command, success);
    }

    /// Load the current statistics.
    ///
    /// Returns `None` if the stats file does not exist or does not parse as
    /// a valid record. Corrupt content is indistinguishable from absence.
    pub fn get_stats(&self) -> Option<UsageRecord> {
        let content = fs::read_to_string(&self.stats_file).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Print the usage summary to stdout.
    pub fn show_stats(&self) {
        match self.get_stats() {
            Some(record) => print!("{}", report::render(&record)),
            None => println!("{}", report::NO_STATS_MESSAGE),
        }
    }

    /// Whether tracking is active for this instance.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Path of the persisted stats file.
    pub fn stats_file(&self) -> &Path {
        &self.stats_file
    }

    /// Fallible body of [`track`](Self::track).
    ///
    /// A file that exists but fails to parse is treated exactly like a
    /// missing file: the write starts from an empty record, replacing the
    /// corrupt content with a fresh valid document.
    fn try_track(&self, command: &str, success: bool) -> Result<()> {
        let mut record = self.get_stats().unwrap_or_default();

        let now = Utc::now();
        if record.first_used.is_none() {
            record.first_used = Some(now);
        }
        record.last_used = Some(now);

        let key = command_key(command, success);
        *record.commands.entry(key).or_insert(0) += 1;

        fs::create_dir_all(&self.config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                self.config_dir.display()
            )
        })?;

        let json =
            serde_json::to_string_pretty(&record).context("Failed to serialize usage record")?;
        fs::write(&self.stats_file, json).with_context(|| {
            format!("Failed to write stats file: {}", self.stats_file.display())
        })?;

        Ok(())
    }
}

/// Build the composite counter key for a command and its outcome.
fn command_key(command: &str, success: bool) -> String {
    let outcome = if success { "success" } else { "error" };
    format!("{command}_{outcome}")
}

/// Name of the opt-out environment variable for a tool.
///
/// `confluence-cli` -> `CONFLUENCE_CLI_ANALYTICS`.
fn env_toggle_name(tool_name: &str) -> String {
    let prefix: String = tool_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{prefix}_ANALYTICS")
}

/// Tracking is enabled unless the toggle is set to the literal `false`.
fn resolve_enabled(tool_name: &str) -> bool {
    std::env::var(env_toggle_name(tool_name)).map_or(true, |value| value != "false")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tracker_in(temp_dir: &TempDir, tool_name: &str) -> UsageTracker {
        UsageTracker::with_config_dir(tool_name, temp_dir.path().join(format!(".{tool_name}")))
    }

    #[test]
    fn test_command_key() {
        assert_eq!(command_key("publish", true), "publish_success");
        assert_eq!(command_key("publish", false), "publish_error");
    }

    #[test]
    fn test_env_toggle_name() {
        assert_eq!(env_toggle_name("confluence-cli"), "CONFLUENCE_CLI_ANALYTICS");
        assert_eq!(env_toggle_name("mytool"), "MYTOOL_ANALYTICS");
    }

    #[test]
    fn test_get_stats_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker_in(&temp_dir, "fresh-tool");

        assert!(tracker.get_stats().is_none());
    }

    #[test]
    fn test_track_creates_record() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker_in(&temp_dir, "create-tool");

        tracker.track("publish", true);

        let record = tracker.get_stats().unwrap();
        assert_eq!(record.commands.get("publish_success"), Some(&1));
        assert!(record.first_used.is_some());
        assert!(record.last_used.is_some());
    }

    #[test]
    fn test_track_counts_per_outcome() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker_in(&temp_dir, "count-tool");

        tracker.track("init", true);
        tracker.track("init", true);
        tracker.track("init", false);
        tracker.track("publish", true);

        let record = tracker.get_stats().unwrap();
        assert_eq!(record.commands.get("init_success"), Some(&2));
        assert_eq!(record.commands.get("init_error"), Some(&1));
        assert_eq!(record.commands.get("publish_success"), Some(&1));
        assert_eq!(record.commands.len(), 3);
    }

    #[test]
    fn test_first_used_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker_in(&temp_dir, "stable-tool");

        tracker.track("init", true);
        let first = tracker.get_stats().unwrap().first_used;
        assert!(first.is_some());

        tracker.track("publish", true);
        tracker.track("publish", false);

        let record = tracker.get_stats().unwrap();
        assert_eq!(record.first_used, first);
        assert!(record.last_used >= first);
    }

    #[test]
    fn test_disabled_tracker_is_a_noop() {
        let temp_dir = TempDir::new().unwrap();
        // The toggle name is derived from the tool name, so a unique tool
        // name per test keeps parallel tests from interfering.
        std::env::set_var("NOOP_TOOL_ANALYTICS", "false");
        let tracker = tracker_in(&temp_dir, "noop-tool");
        std::env::remove_var("NOOP_TOOL_ANALYTICS");

        assert!(!tracker.is_enabled());
        tracker.track("publish", true);

        assert!(!tracker.stats_file().exists());
        assert!(tracker.get_stats().is_none());
    }

    #[test]
    fn test_toggle_other_values_keep_tracking_enabled() {
        let temp_dir = TempDir::new().unwrap();
        std::env::set_var("LOUD_TOOL_ANALYTICS", "0");
        let tracker = tracker_in(&temp_dir, "loud-tool");
        std::env::remove_var("LOUD_TOOL_ANALYTICS");

        assert!(tracker.is_enabled());
        tracker.track("publish", true);
        assert!(tracker.get_stats().is_some());
    }

    #[test]
    fn test_corrupt_file_reads_as_absent_and_self_heals() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker_in(&temp_dir, "heal-tool");

        fs::create_dir_all(tracker.stats_file().parent().unwrap()).unwrap();
        fs::write(tracker.stats_file(), "not valid json").unwrap();

        assert!(tracker.get_stats().is_none());

        // The next track starts from an empty record and overwrites the
        // corrupt content with a fresh valid document.
        tracker.track("publish", true);

        let record = tracker.get_stats().unwrap();
        assert_eq!(record.commands.get("publish_success"), Some(&1));
        assert_eq!(record.commands.len(), 1);
    }

    #[test]
    fn test_get_stats_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker_in(&temp_dir, "idem-tool");

        tracker.track("init", true);

        let first = tracker.get_stats();
        let second = tracker.get_stats();
        assert_eq!(first, second);
    }

    #[test]
    fn test_record_tolerates_missing_fields() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker_in(&temp_dir, "sparse-tool");

        fs::create_dir_all(tracker.stats_file().parent().unwrap()).unwrap();
        fs::write(tracker.stats_file(), "{}").unwrap();

        let record = tracker.get_stats().unwrap();
        assert!(record.commands.is_empty());
        assert!(record.first_used.is_none());
        assert!(record.last_used.is_none());
    }

    #[test]
    fn test_record_serialization_round_trip() {
        let mut record = UsageRecord::default();
        record.commands.insert("init_success".to_string(), 3);
        record.first_used = Some(Utc::now());
        record.last_used = record.first_used;

        let json = serde_json::to_string_pretty(&record).unwrap();
        assert!(json.contains("firstUsed"));
        assert!(json.contains("lastUsed"));

        let parsed: UsageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_commands_keep_insertion_order() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker_in(&temp_dir, "order-tool");

        tracker.track("zeta", true);
        tracker.track("alpha", true);
        tracker.track("zeta", false);

        let record = tracker.get_stats().unwrap();
        let keys: Vec<&str> = record.commands.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta_success", "alpha_success", "zeta_error"]);
    }
}
