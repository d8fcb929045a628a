/// Refresh Token Ledger
///
/// Refresh tokens are:
/// - Cryptographically random 64-character alphanumeric strings
/// - Hashed with SHA-256 before storage (never store plaintext)
/// - Single-use: consuming one revokes it in the same statement that reads it
/// - Retained after revocation or expiry so replay attempts stay observable

use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::AppError;

const REFRESH_TOKEN_LENGTH: usize = 64;

/// Generate a new opaque refresh token.
///
/// 64 alphanumeric characters carry well over 256 bits of entropy. The value
/// is returned in plaintext (this is what the client stores); the server
/// keeps only the SHA-256 hash, so the stored form is unlinkable to any
/// identity by inspection.
pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Persist a new refresh token in the non-revoked state. Takes a bare
/// connection so the insert can share a transaction with a consume.
pub async fn save_refresh_token_with(
    conn: &mut PgConnection,
    user_id: Uuid,
    token: &str,
    ttl: Duration,
) -> Result<(), AppError> {
    let token_hash = hash_token(token);
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(token_hash)
    .bind(now + ttl)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(())
}

/// Atomically consume a refresh token.
///
/// A single conditional UPDATE transitions the token out of the usable state
/// and returns its owner. Tokens that do not exist, are already revoked, or
/// have expired all yield `None`; of two concurrent callers presenting the
/// same token, exactly one gets the row.
pub async fn consume_refresh_token(
    conn: &mut PgConnection,
    token: &str,
) -> Result<Option<Uuid>, AppError> {
    let token_hash = hash_token(token);

    let row = sqlx::query_as::<_, (Uuid,)>(
        r#"
        UPDATE refresh_tokens
        SET is_revoked = true, revoked_at = $1
        WHERE token_hash = $2
          AND is_revoked = false
          AND expires_at > $1
        RETURNING user_id
        "#,
    )
    .bind(Utc::now())
    .bind(&token_hash)
    .fetch_optional(conn)
    .await?;

    if row.is_none() {
        tracing::warn!("Refresh token not found, revoked, or expired");
    }

    Ok(row.map(|(user_id,)| user_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_refresh_token() {
        let token = generate_refresh_token();

        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_alphanumeric()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let token1 = generate_refresh_token();
        let token2 = generate_refresh_token();

        assert_ne!(token1, token2);
    }

    #[test]
    fn test_token_hashing() {
        let token = generate_refresh_token();
        let hash1 = hash_token(&token);
        let hash2 = hash_token(&token);

        // Same token should produce same hash
        assert_eq!(hash1, hash2);
        // Hash should not equal plaintext
        assert_ne!(token, hash1);
        // Hash should be 64 chars (SHA-256 hex)
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_tokens_different_hashes() {
        let hash1 = hash_token(&generate_refresh_token());
        let hash2 = hash_token(&generate_refresh_token());

        assert_ne!(hash1, hash2);
    }
}
