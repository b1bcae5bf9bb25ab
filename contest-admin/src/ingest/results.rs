//! Result rows: schema table and field copy

use super::schema::{FieldSpec, TypedRow};
use super::CsvEntity;
use crate::models::{EntityKind, ResultRecord, SessionId};

/// Field contract for the results CSV
pub const RESULT_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("title")
        .required("Title is required")
        .max_len(200),
    FieldSpec::text("description"),
    FieldSpec::integer("rank").min(1),
    FieldSpec::text("team_name").max_len(200),
    FieldSpec::integer("score").min(0),
    FieldSpec::text("total_time").max_len(50),
    FieldSpec::text("country").max_len(100),
    FieldSpec::text("institute_name").max_len(200),
];

impl CsvEntity for ResultRecord {
    const KIND: EntityKind = EntityKind::Result;
    const FIELDS: &'static [FieldSpec] = RESULT_FIELDS;

    fn from_row(row: &TypedRow, session_id: &SessionId) -> Self {
        ResultRecord {
            session_id: session_id.clone(),
            title: row.owned_text("title").unwrap_or_default(),
            description: row.owned_text("description"),
            rank: row.integer("rank"),
            team_name: row.owned_text("team_name"),
            score: row.integer("score"),
            total_time: row.owned_text("total_time"),
            country: row.owned_text("country"),
            institute_name: row.owned_text("institute_name"),
        }
    }

    fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.title.trim().is_empty() {
            violations.push("title: Title is required".to_string());
        }
        if let Some(rank) = self.rank.filter(|rank| *rank < 1) {
            violations.push(format!("rank: must be at least 1 (got {})", rank));
        }
        if let Some(score) = self.score.filter(|score| *score < 0) {
            violations.push(format!("score: must be at least 0 (got {})", score));
        }

        violations
    }
}
