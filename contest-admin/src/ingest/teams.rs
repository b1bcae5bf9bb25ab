//! Team rows: schema table and member decomposition
//!
//! A teams row carries its members as two comma-joined cells,
//! `member_names` and `member_roles`. The name list is authoritative for
//! member count and order; roles pair up by position.

use super::schema::{FieldSpec, TypedRow};
use super::CsvEntity;
use crate::models::{EntityKind, MemberRecord, SessionId, TeamRecord, TeamStatus};

const STATUS_VALUES: &[&str] = &["selected", "qualified", "disqualified", "withdrawn"];

/// Field contract for the teams CSV
pub const TEAM_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("team_name")
        .required("Team name is required")
        .max_len(100),
    FieldSpec::text("institution").max_len(200),
    FieldSpec::text("member_names").required("At least one member name is required"),
    FieldSpec::text("member_roles"),
    FieldSpec::enumeration("status", STATUS_VALUES).default_value("selected"),
    FieldSpec::integer("display_order").aliases(&["display_ord"]),
    FieldSpec::text("selected_from").max_len(200),
    FieldSpec::text("awc_venue").max_len(200),
];

/// Split a comma-joined cell into trimmed tokens
fn split_cell(cell: &str) -> impl Iterator<Item = &str> {
    cell.split(',').map(str::trim)
}

/// Build the ordered member list from the names and roles cells
///
/// Blank name tokens are dropped. A member whose role token is missing or
/// blank gets [`crate::models::DEFAULT_MEMBER_ROLE`]; role tokens past the
/// end of the name list are ignored.
pub fn decompose_members(member_names: &str, member_roles: Option<&str>) -> Vec<MemberRecord> {
    let roles: Vec<&str> = member_roles.map(|cell| split_cell(cell).collect()).unwrap_or_default();

    split_cell(member_names)
        .filter(|name| !name.is_empty())
        .enumerate()
        .map(|(index, name)| {
            let role = roles.get(index).copied().filter(|role| !role.is_empty());
            MemberRecord::new(name, role)
        })
        .collect()
}

/// Transform a validated teams row into a team for `session_id`
pub fn decompose_team(row: &TypedRow, session_id: &SessionId) -> TeamRecord {
    let members = decompose_members(
        row.text("member_names").unwrap_or_default(),
        row.text("member_roles"),
    );

    let status: TeamStatus = row
        .text("status")
        .and_then(|status| status.parse().ok())
        .unwrap_or_default();

    TeamRecord {
        session_id: session_id.clone(),
        team_name: row.owned_text("team_name").unwrap_or_default(),
        institution: row.owned_text("institution"),
        members,
        status,
        display_order: row.integer("display_order"),
        selected_from: row.owned_text("selected_from"),
        awc_venue: row.owned_text("awc_venue"),
    }
}

impl CsvEntity for TeamRecord {
    const KIND: EntityKind = EntityKind::Team;
    const FIELDS: &'static [FieldSpec] = TEAM_FIELDS;

    fn from_row(row: &TypedRow, session_id: &SessionId) -> Self {
        decompose_team(row, session_id)
    }

    fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.team_name.trim().is_empty() {
            violations.push("team_name: Team name is required".to_string());
        }
        if self.members.is_empty() {
            violations.push("members: At least one team member is required".to_string());
        }
        if self.members.iter().any(|m| m.name.trim().is_empty()) {
            violations.push("members: Member name is required".to_string());
        }
        violations
    }
}
