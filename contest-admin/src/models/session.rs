//! Contest sessions (one per contest edition)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque session identifier supplied by the caller
///
/// Every imported team and result belongs to exactly one session. The id is
/// never read from CSV content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Accept a raw form value; blank input yields `None`
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session row as stored
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub year: String,
    pub is_active: bool,
}

impl Session {
    /// Human-readable label, e.g. "Asia West Regional 2024"
    pub fn label(&self) -> String {
        format!("{} {}", self.name, self.year)
    }
}
