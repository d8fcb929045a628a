/// Authentication Service
///
/// Coordinates the credential store, the token signer, and the refresh-token
/// ledger for registration, login, and token refresh. Constructed once at
/// startup with its dependencies passed in; holds parsed TTLs so handlers
/// never re-read configuration.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::auth::guard::DEFAULT_ROLE;
use crate::auth::jwt::issue_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::refresh_token::{
    consume_refresh_token, generate_refresh_token, save_refresh_token_with,
};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ConflictError};

pub struct AuthService {
    pool: PgPool,
    jwt: JwtSettings,
}

/// Confirmation returned by registration. No tokens: registering does not
/// open an authenticated session.
pub struct RegisteredUser {
    pub id: Uuid,
    pub username: String,
}

/// Access/refresh pair returned by login and refresh.
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: JwtSettings) -> Self {
        Self { pool, jwt }
    }

    /// Register a new user with the default role.
    ///
    /// Inputs are expected to be validated at the boundary; the password
    /// strength policy is enforced here via hashing. The user row, the
    /// default role, and the assignment land in one transaction.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<RegisteredUser, AppError> {
        let taken = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict(ConflictError::DuplicateUsername));
        }

        let password_hash = hash_password(password)?;
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, display_name, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            "#,
        )
        .bind(user_id)
        .bind(username)
        .bind(email)
        .bind(display_name)
        .bind(&password_hash)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let role_id = ensure_role(&mut tx, DEFAULT_ROLE, Some("Default user role")).await?;

        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, "User registered");

        Ok(RegisteredUser {
            id: user_id,
            username: username.to_string(),
        })
    }

    /// Authenticate a user and issue a fresh token pair.
    ///
    /// Unknown username and wrong password fail identically so responses
    /// never reveal whether a username exists.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AppError> {
        let user = sqlx::query_as::<_, (Uuid, String, String)>(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

        let (user_id, username, password_hash) = user;

        if !verify_password(password, &password_hash)? {
            return Err(AppError::Auth(AuthError::InvalidCredentials));
        }

        let mut conn = self.pool.acquire().await?;
        let roles = load_role_names(&mut conn, user_id).await?;
        let pair = self
            .issue_pair(&mut conn, user_id, &username, roles)
            .await?;

        tracing::info!(user_id = %user_id, "User logged in");

        Ok(pair)
    }

    /// Exchange a refresh token for a new token pair, rotating it.
    ///
    /// The consume (conditional revoke) and the successor insert share one
    /// transaction: either the presented token is revoked and its successor
    /// stored, or neither happens. Roles are re-read here, so grants since
    /// the original login take effect immediately.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let mut tx = self.pool.begin().await?;

        let user_id = consume_refresh_token(&mut tx, refresh_token)
            .await?
            .ok_or(AppError::Auth(AuthError::InvalidRefreshToken))?;

        // Error paths from here drop the transaction, rolling the
        // revocation back.
        let (user_id, username) =
            sqlx::query_as::<_, (Uuid, String)>("SELECT id, username FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(AppError::Auth(AuthError::InvalidRefreshToken))?;

        let roles = load_role_names(&mut tx, user_id).await?;
        let pair = self.issue_pair(&mut tx, user_id, &username, roles).await?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, "Token refreshed");

        Ok(pair)
    }

    async fn issue_pair(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        username: &str,
        roles: Vec<String>,
    ) -> Result<TokenPair, AppError> {
        let access_token = issue_access_token(&user_id, username, roles, &self.jwt)?;
        let refresh_token = generate_refresh_token();

        save_refresh_token_with(conn, user_id, &refresh_token, self.jwt.refresh_token_ttl())
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_at: Utc::now() + self.jwt.access_token_ttl(),
        })
    }
}

/// Current role names of a user, fully materialized.
pub async fn load_role_names(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Vec<String>, AppError> {
    let rows = sqlx::query_as::<_, (String,)>(
        r#"
        SELECT r.name
        FROM roles r
        JOIN user_roles ur ON ur.role_id = r.id
        WHERE ur.user_id = $1
        ORDER BY r.name
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Create the named role if absent and return its id.
pub async fn ensure_role(
    conn: &mut PgConnection,
    name: &str,
    description: Option<&str>,
) -> Result<Uuid, AppError> {
    sqlx::query("INSERT INTO roles (id, name, description) VALUES ($1, $2, $3) ON CONFLICT (name) DO NOTHING")
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .execute(&mut *conn)
        .await?;

    let (role_id,) = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM roles WHERE name = $1")
        .bind(name)
        .fetch_one(conn)
        .await?;

    Ok(role_id)
}
