//! Replacement coordinator: scoped delete, bulk insert, summary
//!
//! Delete and insert share one transaction, so a failed insert leaves the
//! session's previous data in place. Replacements of the same session are
//! also serialized through [`SessionLocks`].

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::query_builder::Separated;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use super::CsvEntity;
use crate::db::sessions::find_session;
use crate::models::{ImportSummary, ResultRecord, SessionId, TeamRecord};

/// Rows per INSERT statement; keeps bound parameters well under SQLite's limit
const INSERT_CHUNK_ROWS: usize = 500;

/// Failure while persisting a validated batch; never retried
#[derive(Debug, Error)]
pub enum PersistError {
    /// The target session does not exist; nothing was touched
    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),

    /// Could not look up the session or open a transaction
    #[error("{0}")]
    Store(#[from] contest_common::Error),

    /// Scoped delete failed; no insert was attempted
    #[error("{0}")]
    Delete(#[source] sqlx::Error),

    /// Insert or commit failed; the transaction was rolled back
    #[error("{0}")]
    Insert(#[source] sqlx::Error),
}

/// Per-session async locks serializing replacements of the same session
#[derive(Debug, Clone, Default)]
pub struct SessionLocks {
    locks: Arc<Mutex<HashMap<SessionId, Arc<Mutex<()>>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `session_id`
    pub async fn acquire(&self, session_id: &SessionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(session_id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// Entity kinds that can be bulk-inserted and scope-deleted
pub trait StoredEntity: CsvEntity + Send + Sync {
    /// Insert column list, in the order [`StoredEntity::push_values`] binds
    const COLUMNS: &'static [&'static str];

    fn push_values(&self, row: Separated<'_, '_, Sqlite, &'static str>);
}

impl StoredEntity for TeamRecord {
    const COLUMNS: &'static [&'static str] = &[
        "session_id",
        "team_name",
        "institution",
        "members",
        "status",
        "display_order",
        "selected_from",
        "awc_venue",
    ];

    fn push_values(&self, mut row: Separated<'_, '_, Sqlite, &'static str>) {
        row.push_bind(self.session_id.as_str().to_string())
            .push_bind(self.team_name.clone())
            .push_bind(self.institution.clone())
            .push_bind(sqlx::types::Json(self.members.clone()))
            .push_bind(self.status.as_str())
            .push_bind(self.display_order)
            .push_bind(self.selected_from.clone())
            .push_bind(self.awc_venue.clone());
    }
}

impl StoredEntity for ResultRecord {
    const COLUMNS: &'static [&'static str] = &[
        "session_id",
        "title",
        "description",
        "rank",
        "team_name",
        "score",
        "total_time",
        "country",
        "institute_name",
    ];

    fn push_values(&self, mut row: Separated<'_, '_, Sqlite, &'static str>) {
        row.push_bind(self.session_id.as_str().to_string())
            .push_bind(self.title.clone())
            .push_bind(self.description.clone())
            .push_bind(self.rank)
            .push_bind(self.team_name.clone())
            .push_bind(self.score)
            .push_bind(self.total_time.clone())
            .push_bind(self.country.clone())
            .push_bind(self.institute_name.clone());
    }
}

/// Delete every row of `E`'s table that belongs to `session_id`
async fn delete_for_session<E: StoredEntity>(
    conn: &mut SqliteConnection,
    session_id: &SessionId,
) -> Result<u64, sqlx::Error> {
    let sql = format!("DELETE FROM {} WHERE session_id = ?", E::KIND.plural());
    let result = sqlx::query(&sql)
        .bind(session_id.as_str())
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Insert all entities with multi-row INSERT statements
async fn insert_all<E: StoredEntity>(
    conn: &mut SqliteConnection,
    entities: &[E],
) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;

    for chunk in entities.chunks(INSERT_CHUNK_ROWS) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) ",
            E::KIND.plural(),
            E::COLUMNS.join(", ")
        ));
        builder.push_values(chunk, |row, entity| entity.push_values(row));

        let result = builder.build().execute(&mut *conn).await?;
        inserted += result.rows_affected();
    }

    Ok(inserted)
}

/// Persist a validated batch for one session
///
/// With `replace_existing`, the session's existing rows of this kind are
/// deleted first; rows of other sessions are never touched.
pub async fn persist_batch<E: StoredEntity>(
    pool: &SqlitePool,
    locks: &SessionLocks,
    session_id: &SessionId,
    entities: &[E],
    replace_existing: bool,
) -> Result<ImportSummary, PersistError> {
    let kind = E::KIND;

    // Sessions are never deleted here, so checking before locking is safe and
    // keeps unknown ids out of the lock table
    let session = find_session(pool, session_id)
        .await?
        .ok_or_else(|| PersistError::UnknownSession(session_id.clone()))?;

    let _guard = locks.acquire(session_id).await;

    let mut tx = pool.begin().await.map_err(contest_common::Error::from)?;

    if replace_existing {
        let deleted = delete_for_session::<E>(&mut *tx, session_id)
            .await
            .map_err(|e| {
                warn!(kind = %kind, session_id = %session_id, error = %e, "Scoped delete failed");
                PersistError::Delete(e)
            })?;
        info!(kind = %kind, session_id = %session_id, deleted, "Cleared existing rows for session");
    }

    let inserted = insert_all(&mut *tx, entities).await.map_err(|e| {
        warn!(kind = %kind, session_id = %session_id, error = %e, "Bulk insert failed, rolling back");
        PersistError::Insert(e)
    })?;

    tx.commit().await.map_err(PersistError::Insert)?;

    info!(
        kind = %kind,
        session_id = %session_id,
        inserted,
        replaced = replace_existing,
        "Batch persisted"
    );

    Ok(ImportSummary {
        inserted_count: inserted as usize,
        replaced: replace_existing,
        session_label: session.label(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{results::list_results, sessions::create_session, teams::list_teams};
    use crate::models::{MemberRecord, TeamStatus};
    use contest_common::db::init_in_memory_database;

    async fn setup() -> (SqlitePool, SessionId, SessionId) {
        let pool = init_in_memory_database().await.unwrap();
        let first = create_session(&pool, "Asia West", "2024", true).await.unwrap();
        let second = create_session(&pool, "Asia West", "2025", false).await.unwrap();
        (pool, first, second)
    }

    fn team(session_id: &SessionId, name: &str) -> TeamRecord {
        TeamRecord {
            session_id: session_id.clone(),
            team_name: name.to_string(),
            institution: Some("Uni".to_string()),
            members: vec![
                MemberRecord::new("Ann", Some("Captain")),
                MemberRecord::new("Bob", None),
            ],
            status: TeamStatus::Qualified,
            display_order: Some(1),
            selected_from: None,
            awc_venue: None,
        }
    }

    fn result(session_id: &SessionId, title: &str, rank: Option<i64>) -> ResultRecord {
        ResultRecord {
            session_id: session_id.clone(),
            title: title.to_string(),
            description: None,
            rank,
            team_name: Some("Alpha".to_string()),
            score: Some(7),
            total_time: Some("812".to_string()),
            country: None,
            institute_name: None,
        }
    }

    #[tokio::test]
    async fn insert_reports_count_and_label() {
        let (pool, session, _) = setup().await;
        let locks = SessionLocks::new();
        let teams = vec![team(&session, "Alpha"), team(&session, "Beta")];

        let summary = persist_batch(&pool, &locks, &session, &teams, false).await.unwrap();

        assert_eq!(summary.inserted_count, 2);
        assert!(!summary.replaced);
        assert_eq!(summary.session_label, "Asia West 2024");

        let stored = list_teams(&pool, Some(&session)).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].team.members, teams[0].members);
        assert_eq!(stored[0].team.status, TeamStatus::Qualified);
    }

    #[tokio::test]
    async fn append_mode_keeps_existing_rows() {
        let (pool, session, _) = setup().await;
        let locks = SessionLocks::new();
        let teams = vec![team(&session, "Alpha")];

        persist_batch(&pool, &locks, &session, &teams, false).await.unwrap();
        persist_batch(&pool, &locks, &session, &teams, false).await.unwrap();

        assert_eq!(list_teams(&pool, Some(&session)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn replace_is_idempotent_and_scoped() {
        let (pool, session, other) = setup().await;
        let locks = SessionLocks::new();
        persist_batch(&pool, &locks, &other, &[team(&other, "Keep")], false)
            .await
            .unwrap();

        let teams = vec![team(&session, "Alpha"), team(&session, "Beta")];
        for _ in 0..2 {
            let summary = persist_batch(&pool, &locks, &session, &teams, true).await.unwrap();
            assert!(summary.replaced);
            assert_eq!(list_teams(&pool, Some(&session)).await.unwrap().len(), 2);
        }

        let untouched = list_teams(&pool, Some(&other)).await.unwrap();
        assert_eq!(untouched.len(), 1);
        assert_eq!(untouched[0].team.team_name, "Keep");
    }

    #[tokio::test]
    async fn unknown_session_is_rejected_before_any_change() {
        let (pool, session, _) = setup().await;
        let locks = SessionLocks::new();
        let missing = SessionId::parse("no-such-session").unwrap();

        let err = persist_batch(&pool, &locks, &missing, &[team(&missing, "A")], true)
            .await
            .unwrap_err();

        assert!(matches!(err, PersistError::UnknownSession(_)));
        assert!(list_teams(&pool, Some(&session)).await.unwrap().is_empty());
        assert!(locks.locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn failed_insert_rolls_back_scoped_delete() {
        let (pool, session, _) = setup().await;
        let locks = SessionLocks::new();
        persist_batch(&pool, &locks, &session, &[result(&session, "Old", Some(1))], false)
            .await
            .unwrap();

        // rank 0 violates the table's CHECK constraint
        let bad = vec![result(&session, "New", Some(2)), result(&session, "Broken", Some(0))];
        let err = persist_batch(&pool, &locks, &session, &bad, true).await.unwrap_err();
        assert!(matches!(err, PersistError::Insert(_)));

        let remaining = list_results(&pool, Some(&session)).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].result.title, "Old");
    }

    #[tokio::test]
    async fn concurrent_replacements_do_not_interleave() {
        let (pool, session, _) = setup().await;
        let locks = SessionLocks::new();
        let teams: Vec<_> = (0..3).map(|i| team(&session, &format!("T{}", i))).collect();

        let (a, b) = tokio::join!(
            persist_batch(&pool, &locks, &session, &teams, true),
            persist_batch(&pool, &locks, &session, &teams, true),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(list_teams(&pool, Some(&session)).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn large_batches_are_chunked() {
        let (pool, session, _) = setup().await;
        let locks = SessionLocks::new();
        let results: Vec<_> = (0..(INSERT_CHUNK_ROWS + 7))
            .map(|i| result(&session, &format!("R{}", i), Some(i as i64 + 1)))
            .collect();

        let summary = persist_batch(&pool, &locks, &session, &results, false).await.unwrap();

        assert_eq!(summary.inserted_count, INSERT_CHUNK_ROWS + 7);
    }
}
