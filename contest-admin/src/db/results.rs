//! Result read queries

use contest_common::Result;
use sqlx::{Row, SqlitePool};

use crate::models::{ResultRecord, SessionId, StoredResult};

/// Results, optionally for one session, in insertion order
pub async fn list_results(
    pool: &SqlitePool,
    session_id: Option<&SessionId>,
) -> Result<Vec<StoredResult>> {
    let rows = sqlx::query(
        r#"
        SELECT id, session_id, title, description, rank, team_name, score,
               total_time, country, institute_name
        FROM results
        WHERE (?1 IS NULL OR session_id = ?1)
        ORDER BY id ASC
        "#,
    )
    .bind(session_id.map(SessionId::as_str))
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<StoredResult> {
            let session_id: String = row.get("session_id");
            Ok(StoredResult {
                id: row.get("id"),
                result: ResultRecord {
                    session_id: SessionId::parse(&session_id).ok_or_else(|| {
                        contest_common::Error::InvalidInput("blank session_id in results".to_string())
                    })?,
                    title: row.get("title"),
                    description: row.get("description"),
                    rank: row.get("rank"),
                    team_name: row.get("team_name"),
                    score: row.get("score"),
                    total_time: row.get("total_time"),
                    country: row.get("country"),
                    institute_name: row.get("institute_name"),
                },
            })
        })
        .collect()
}
