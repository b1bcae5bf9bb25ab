//! Bulk CSV ingestion pipeline
//!
//! Data flows strictly downward:
//! file text → raw rows ([`batch`]) → typed rows ([`schema`]) → entities
//! ([`teams`], [`results`]) → persisted rows ([`replace`]).

pub mod batch;
pub mod replace;
pub mod results;
pub mod schema;
pub mod teams;

pub use batch::{process_batch, BatchError, HEADER_ROW_OFFSET};
pub use replace::{persist_batch, PersistError, SessionLocks, StoredEntity};
pub use schema::{normalize_header, validate_row, FieldSpec, FieldValue, RawRow, TypedRow};

use crate::models::{EntityKind, SessionId};

/// An entity kind that can be built from a validated CSV row
pub trait CsvEntity: Sized {
    const KIND: EntityKind;

    /// Schema table applied to every raw row
    const FIELDS: &'static [FieldSpec];

    /// Transform a validated row; the session id comes from the caller, never the row
    fn from_row(row: &TypedRow, session_id: &SessionId) -> Self;

    /// Whole-entity invariants checked after the transform
    fn violations(&self) -> Vec<String>;
}
