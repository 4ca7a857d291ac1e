use std::collections::BTreeMap;

use tracing::{error, warn};

use crate::model::{FilenameGroup, RowError};

/// Trait for reporting per-run diagnostics.
///
/// The engine owns no output streams; everything user-visible flows through
/// here. All methods have default no-op implementations.
pub trait RunReporter: Send + Sync {
    fn on_rejected_row(&self, _raw: &BTreeMap<String, String>, _reason: &RowError) {}
    fn on_duplicate_group(&self, _group: &FilenameGroup) {}
    fn on_count_query(&self, _statement: &str) {}
}

/// No-op reporter for silent operation.
pub struct SilentReporter;

impl RunReporter for SilentReporter {}

/// Reporter used by the CLI: rejections and duplicate warnings go to the
/// log, duplicate row dumps to stderr, the diagnostic query to stdout.
pub struct ConsoleReporter;

impl RunReporter for ConsoleReporter {
    fn on_rejected_row(&self, raw: &BTreeMap<String, String>, reason: &RowError) {
        error!("Failed to parse row {:?}: {}", raw, reason);
    }

    fn on_duplicate_group(&self, group: &FilenameGroup) {
        warn!(
            "Found duplicates for '{}': {}",
            group.filename,
            group.rows.len()
        );
        match serde_json::to_string_pretty(&group.rows) {
            Ok(dump) => eprintln!("{}", dump),
            Err(err) => error!(
                "Failed to dump duplicate rows for '{}': {}",
                group.filename, err
            ),
        }
    }

    fn on_count_query(&self, statement: &str) {
        println!("{}", statement);
    }
}
