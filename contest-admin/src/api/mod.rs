//! HTTP API handlers for contest-admin

pub mod auth;
pub mod health;
pub mod listing;
pub mod upload;

pub use auth::{require_admin, AdminIdentity, AuthorizationGate, GateError, SqliteAdminGate};
pub use health::health_routes;
pub use listing::{get_results, get_sessions, get_teams};
pub use upload::{upload_results, upload_teams, UploadResponse};
