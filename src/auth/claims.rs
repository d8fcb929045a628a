/// JWT Claims structure
///
/// Payload of an access token: user identity, role names, and the standard
/// registered claims (RFC 7519).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AuthError};

/// Claims embedded in access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Username at issuance time
    pub username: String,
    /// Role names held by the user at issuance time
    pub roles: Vec<String>,
    /// Unique token identifier, fresh per issuance
    pub jti: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

impl Claims {
    /// Create new claims expiring `ttl` from now.
    pub fn new(
        user_id: Uuid,
        username: String,
        roles: Vec<String>,
        ttl: chrono::Duration,
        issuer: String,
        audience: String,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            username,
            roles,
            jti: Uuid::new_v4().to_string(),
            exp: now + ttl.num_seconds(),
            iat: now,
            iss: issuer,
            aud: audience,
        }
    }

    /// Extract the user ID from the subject claim.
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Auth(AuthError::TokenInvalid))
    }

    /// Check if the token has expired.
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        self.exp < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_claims(roles: Vec<String>) -> Claims {
        Claims::new(
            Uuid::new_v4(),
            "alice".to_string(),
            roles,
            Duration::minutes(120),
            "test".to_string(),
            "test-clients".to_string(),
        )
    }

    #[test]
    fn claims_carry_identity_and_roles() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(
            user_id,
            "alice".to_string(),
            vec!["User".to_string(), "Admin".to_string()],
            Duration::minutes(120),
            "test".to_string(),
            "test-clients".to_string(),
        );

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.roles, vec!["User", "Admin"]);
        assert_eq!(claims.iss, "test");
        assert_eq!(claims.aud, "test-clients");
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, 120 * 60);
    }

    #[test]
    fn jti_is_fresh_per_issuance() {
        let a = sample_claims(vec![]);
        let b = sample_claims(vec![]);

        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn user_id_extraction() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(
            user_id,
            "alice".to_string(),
            vec![],
            Duration::minutes(5),
            "test".to_string(),
            "test-clients".to_string(),
        );

        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn invalid_user_id() {
        let mut claims = sample_claims(vec![]);
        claims.sub = "not-a-uuid".to_string();

        assert!(claims.user_id().is_err());
    }

    #[test]
    fn negative_ttl_is_already_expired() {
        let mut claims = sample_claims(vec![]);
        claims.exp = claims.iat - 1;

        assert!(claims.is_expired());
    }
}
