//! Administrator accounts and bearer tokens
//!
//! Tokens are random 32-byte values handed to the operator once, in hex.
//! Only the SHA-256 digest is stored, so a leaked database does not leak
//! usable credentials.

use chrono::{DateTime, Duration, Utc};
use contest_common::Result;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::{Row, SqlitePool};

/// Role value that grants upload rights
pub const ADMIN_ROLE: &str = "admin";

/// Token owner as resolved from `admin_tokens`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOwner {
    pub email: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// SHA-256 of the presented token, as 64 lower-case hex characters
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Record `email` as an administrator (idempotent)
pub async fn grant_admin(pool: &SqlitePool, email: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO admin_users (email, role) VALUES (?, ?)
         ON CONFLICT(email) DO UPDATE SET role = excluded.role",
    )
    .bind(email)
    .bind(ADMIN_ROLE)
    .execute(pool)
    .await?;

    Ok(())
}

/// Issue a new bearer token for `email`; returns the plain token
///
/// The caller is responsible for showing it to the operator. It cannot be
/// recovered later.
pub async fn issue_token(pool: &SqlitePool, email: &str, ttl: Option<Duration>) -> Result<String> {
    let token = generate_token();
    let expires_at = ttl.map(|ttl| (Utc::now() + ttl).to_rfc3339());

    sqlx::query("INSERT INTO admin_tokens (token_hash, email, expires_at) VALUES (?, ?, ?)")
        .bind(hash_token(&token))
        .bind(email)
        .bind(expires_at)
        .execute(pool)
        .await?;

    tracing::info!(email, "Admin token issued");
    Ok(token)
}

/// Resolve a presented token to its owner, ignoring expired tokens
pub async fn find_token_owner(pool: &SqlitePool, token: &str) -> Result<Option<TokenOwner>> {
    let row = sqlx::query("SELECT email, expires_at FROM admin_tokens WHERE token_hash = ?")
        .bind(hash_token(token))
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let expires_at: Option<String> = row.get("expires_at");
    let expires_at = match expires_at {
        Some(text) => Some(
            DateTime::parse_from_rfc3339(&text)
                .map_err(|e| {
                    contest_common::Error::InvalidInput(format!("token expiry '{}': {}", text, e))
                })?
                .with_timezone(&Utc),
        ),
        None => None,
    };

    if expires_at.is_some_and(|at| at <= Utc::now()) {
        return Ok(None);
    }

    Ok(Some(TokenOwner {
        email: row.get("email"),
        expires_at,
    }))
}

/// Whether `email` holds the admin role
pub async fn is_admin(pool: &SqlitePool, email: &str) -> Result<bool> {
    let role: Option<String> = sqlx::query_scalar("SELECT role FROM admin_users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(role.as_deref() == Some(ADMIN_ROLE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contest_common::db::init_in_memory_database;

    #[test]
    fn token_hash_is_hex_sha256() {
        let hash = hash_token("secret");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
        );
    }

    #[tokio::test]
    async fn issued_token_resolves_to_owner() {
        let pool = init_in_memory_database().await.unwrap();
        grant_admin(&pool, "ops@example.org").await.unwrap();
        let token = issue_token(&pool, "ops@example.org", None).await.unwrap();

        assert_eq!(token.len(), 64);
        let owner = find_token_owner(&pool, &token).await.unwrap().unwrap();
        assert_eq!(owner.email, "ops@example.org");
        assert!(is_admin(&pool, &owner.email).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_and_expired_tokens_resolve_to_none() {
        let pool = init_in_memory_database().await.unwrap();
        let expired = issue_token(&pool, "old@example.org", Some(Duration::seconds(-5)))
            .await
            .unwrap();

        assert!(find_token_owner(&pool, "nope").await.unwrap().is_none());
        assert!(find_token_owner(&pool, &expired).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn token_without_admin_row_is_not_admin() {
        let pool = init_in_memory_database().await.unwrap();
        issue_token(&pool, "viewer@example.org", None).await.unwrap();
        assert!(!is_admin(&pool, "viewer@example.org").await.unwrap());
    }
}
