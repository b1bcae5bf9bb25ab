//! Team read queries

use contest_common::Result;
use sqlx::types::Json;
use sqlx::{Row, SqlitePool};

use crate::models::{MemberRecord, SessionId, StoredTeam, TeamRecord, TeamStatus};

/// Teams, optionally for one session, by display order (nulls last) then id
pub async fn list_teams(pool: &SqlitePool, session_id: Option<&SessionId>) -> Result<Vec<StoredTeam>> {
    let rows = sqlx::query(
        r#"
        SELECT id, session_id, team_name, institution, members, status,
               display_order, selected_from, awc_venue
        FROM teams
        WHERE (?1 IS NULL OR session_id = ?1)
        ORDER BY display_order IS NULL, display_order ASC, id ASC
        "#,
    )
    .bind(session_id.map(SessionId::as_str))
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<StoredTeam> {
            let session_id: String = row.get("session_id");
            let status: String = row.get("status");
            let Json(members): Json<Vec<MemberRecord>> = row.try_get("members")?;

            Ok(StoredTeam {
                id: row.get("id"),
                team: TeamRecord {
                    session_id: SessionId::parse(&session_id).ok_or_else(|| {
                        contest_common::Error::InvalidInput("blank session_id in teams".to_string())
                    })?,
                    team_name: row.get("team_name"),
                    institution: row.get("institution"),
                    members,
                    status: status.parse::<TeamStatus>().map_err(contest_common::Error::InvalidInput)?,
                    display_order: row.get("display_order"),
                    selected_from: row.get("selected_from"),
                    awc_venue: row.get("awc_venue"),
                },
            })
        })
        .collect()
}
