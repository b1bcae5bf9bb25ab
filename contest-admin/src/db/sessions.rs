//! Session queries

use contest_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{Session, SessionId};

/// Create a session with a fresh UUID v4 id
pub async fn create_session(
    pool: &SqlitePool,
    name: &str,
    year: &str,
    is_active: bool,
) -> Result<SessionId> {
    let id = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO sessions (id, name, year, is_active) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(name)
        .bind(year)
        .bind(is_active)
        .execute(pool)
        .await?;

    tracing::info!(session_id = %id, name, year, "Session created");

    SessionId::parse(&id).ok_or_else(|| contest_common::Error::InvalidInput(id))
}

pub async fn find_session(pool: &SqlitePool, session_id: &SessionId) -> Result<Option<Session>> {
    let session = sqlx::query_as::<_, Session>(
        "SELECT id, name, year, is_active FROM sessions WHERE id = ?",
    )
    .bind(session_id.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

/// All sessions, newest year first
pub async fn list_sessions(pool: &SqlitePool) -> Result<Vec<Session>> {
    let sessions = sqlx::query_as::<_, Session>(
        "SELECT id, name, year, is_active FROM sessions ORDER BY year DESC, name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(sessions)
}
