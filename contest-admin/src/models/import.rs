//! Bulk import bookkeeping types

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// The two bulk-import targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Team,
    Result,
}

impl EntityKind {
    /// Table name and plural noun ("teams", "results")
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Team => "teams",
            EntityKind::Result => "results",
        }
    }

    /// Success message returned by the upload endpoint
    pub fn uploaded_message(&self) -> &'static str {
        match self {
            EntityKind::Team => "Teams uploaded successfully",
            EntityKind::Result => "Results uploaded successfully",
        }
    }

    /// Error text when the scoped delete fails
    pub fn clear_failed_message(&self) -> &'static str {
        match self {
            EntityKind::Team => "Failed to clear existing teams",
            EntityKind::Result => "Failed to clear existing results",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Team => f.write_str("team"),
            EntityKind::Result => f.write_str("result"),
        }
    }
}

/// Diagnostics for one rejected CSV row; never persisted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    /// Line number as seen in a spreadsheet (data index + header offset)
    pub row_number: usize,
    /// Cells of the row keyed by normalized column name
    pub raw_row: BTreeMap<String, String>,
    pub violations: Vec<String>,
}

/// Outcome of a successful import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted_count: usize,
    pub replaced: bool,
    pub session_label: String,
}
