//! cmdtally - Anonymous local usage tracking for command-line tools
//!
//! This library lets a CLI dispatcher record which commands ran and whether
//! they succeeded, persisting counts to a per-user JSON file and printing a
//! human-readable summary on demand. Nothing ever leaves the machine.

pub mod analytics;
