//! Read-only listings of sessions, teams and results

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::db::{results::list_results, sessions::list_sessions, teams::list_teams};
use crate::error::{ApiError, ApiResult};
use crate::models::{Session, SessionId, StoredResult, StoredTeam};
use crate::AppState;

/// Optional `?session_id=` filter
#[derive(Debug, Default, Deserialize)]
pub struct SessionFilter {
    pub session_id: Option<String>,
}

impl SessionFilter {
    /// A present but blank filter is a client error
    fn session_id(&self) -> ApiResult<Option<SessionId>> {
        match self.session_id.as_deref() {
            None => Ok(None),
            Some(raw) => SessionId::parse(raw)
                .map(Some)
                .ok_or_else(|| ApiError::BadRequest("session_id must not be blank".to_string())),
        }
    }
}

/// GET /api/sessions
pub async fn get_sessions(State(state): State<AppState>) -> ApiResult<Json<Vec<Session>>> {
    Ok(Json(list_sessions(&state.db).await?))
}

/// GET /api/teams
pub async fn get_teams(
    State(state): State<AppState>,
    Query(filter): Query<SessionFilter>,
) -> ApiResult<Json<Vec<StoredTeam>>> {
    let session_id = filter.session_id()?;
    Ok(Json(list_teams(&state.db, session_id.as_ref()).await?))
}

/// GET /api/results
pub async fn get_results(
    State(state): State<AppState>,
    Query(filter): Query<SessionFilter>,
) -> ApiResult<Json<Vec<StoredResult>>> {
    let session_id = filter.session_id()?;
    Ok(Json(list_results(&state.db, session_id.as_ref()).await?))
}
