//! # cmdtally CLI Entry Point
//!
//! A small dispatcher around the usage tracker: shell-based CLI tools call
//! `cmdtally record` after each of their commands to tally usage, and
//! `cmdtally show` to print the summary.
//!
//! ## Usage
//!
//! ```bash
//! # Record a successful invocation of "publish" for the tool "confluence-cli"
//! cmdtally --tool confluence-cli record publish
//!
//! # Record a failed invocation
//! cmdtally --tool confluence-cli record publish --error
//!
//! # Print the usage summary
//! cmdtally --tool confluence-cli show
//!
//! # Print the stats file path
//! cmdtally --tool confluence-cli path
//!
//! # Delete all recorded statistics
//! cmdtally --tool confluence-cli clear
//! ```
//!
//! Set `<TOOL_NAME>_ANALYTICS=false` to disable recording entirely.

use cmdtally::analytics::UsageTracker;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::Path;

/// cmdtally - Anonymous local usage tracking for command-line tools
#[derive(Parser, Debug)]
#[command(name = "cmdtally")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tally command usage for a CLI tool, locally", long_about = None)]
struct Args {
    /// Name of the tool whose usage is tracked (stats live in ~/.{tool}/)
    #[arg(short, long, value_name = "NAME")]
    tool: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record one command invocation
    Record {
        /// The command that ran
        command: String,

        /// Record the invocation as failed instead of successful
        #[arg(long)]
        error: bool,
    },
    /// Print the usage summary
    Show,
    /// Print the path of the stats file
    Path,
    /// Delete all recorded statistics
    Clear,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let tracker = UsageTracker::new(&args.tool)?;

    match args.command {
        Command::Record { command, error } => {
            // Best-effort by contract: this never fails, so a tool wiring
            // cmdtally into its dispatch loop cannot be broken by it.
            tracker.track(&command, !error);
        }
        Command::Show => tracker.show_stats(),
        Command::Path => println!("{}", tracker.stats_file().display()),
        Command::Clear => clear_stats(tracker.stats_file())?,
    }

    Ok(())
}

/// Delete the stats file if it exists.
///
/// Deletion lives here rather than in the tracker: the tracker itself only
/// ever creates and updates the record.
fn clear_stats(stats_file: &Path) -> Result<()> {
    if stats_file.exists() {
        fs::remove_file(stats_file).with_context(|| {
            format!("Failed to delete stats file: {}", stats_file.display())
        })?;
        println!("Usage statistics cleared.");
    } else {
        println!("No usage statistics to clear.");
    }

    Ok(())
}
