//! Administrator gate for the upload routes
//!
//! The gate runs as middleware ahead of the upload handlers, so an
//! unauthenticated caller is rejected before any multipart body is read.

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, warn};

use crate::db::admins::{find_token_owner, is_admin};
use crate::error::ApiError;
use crate::AppState;

/// Caller that passed the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    pub email: String,
}

/// Why the gate refused a caller
#[derive(Debug, Error)]
pub enum GateError {
    #[error("no valid credentials")]
    Unauthenticated,

    #[error("{0} is not an administrator")]
    NotAdmin(String),

    #[error(transparent)]
    Store(#[from] contest_common::Error),
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Unauthenticated => ApiError::Unauthorized,
            GateError::NotAdmin(_) => ApiError::Forbidden,
            GateError::Store(e) => ApiError::Common(e),
        }
    }
}

/// Decides whether a request comes from an authenticated administrator
#[async_trait]
pub trait AuthorizationGate: Send + Sync {
    async fn authorize(&self, headers: &HeaderMap) -> Result<AdminIdentity, GateError>;
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Gate backed by the `admin_tokens` and `admin_users` tables
#[derive(Debug, Clone)]
pub struct SqliteAdminGate {
    db: SqlitePool,
}

impl SqliteAdminGate {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuthorizationGate for SqliteAdminGate {
    async fn authorize(&self, headers: &HeaderMap) -> Result<AdminIdentity, GateError> {
        let token = bearer_token(headers).ok_or(GateError::Unauthenticated)?;

        let owner = find_token_owner(&self.db, token)
            .await?
            .ok_or(GateError::Unauthenticated)?;

        if !is_admin(&self.db, &owner.email).await? {
            return Err(GateError::NotAdmin(owner.email));
        }

        Ok(AdminIdentity { email: owner.email })
    }
}

/// Admin middleware
///
/// On success the [`AdminIdentity`] is stored in the request extensions.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match state.gate.authorize(request.headers()).await {
        Ok(identity) => {
            debug!(email = %identity.email, path = %request.uri().path(), "Admin authorized");
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(err) => {
            warn!(path = %request.uri().path(), reason = %err, "Admin access denied");
            Err(err.into())
        }
    }
}
