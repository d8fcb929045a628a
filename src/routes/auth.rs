/// Authentication Routes
///
/// User registration, login, token refresh, and current user information.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{AuthService, Claims, TokenPair};
use crate::error::AppError;
use crate::routes::users::fetch_user_with_roles;
use crate::validators::{is_valid_display_name, is_valid_email, is_valid_username};

/// User registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token refresh request
#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Registration confirmation. Registering does not open a session, so no
/// tokens are returned; the client logs in next.
#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: String,
    pub username: String,
}

/// Authentication response with access and refresh tokens
#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_at: String,
}

impl From<TokenPair> for AuthResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            expires_at: pair.expires_at.to_rfc3339(),
        }
    }
}

/// POST /auth/register
///
/// Register a new user with username, email, password, and an optional
/// display name. The default role is assigned on creation.
///
/// # Errors
/// - 400: Validation errors (invalid username/email/display name, weak password)
/// - 409: Username or email already taken
/// - 500: Internal server error
pub async fn register(
    form: web::Json<RegisterRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let username = is_valid_username(&form.username)?;
    let email = is_valid_email(&form.email)?;
    let display_name = match form.display_name.as_deref() {
        Some(name) => Some(is_valid_display_name(name)?),
        None => None,
    };

    let created = auth
        .register(&username, &email, &form.password, display_name.as_deref())
        .await?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        id: created.id.to_string(),
        username: created.username,
    }))
}

/// POST /auth/login
///
/// Authenticate with username and password; returns an access token and a
/// refresh token.
///
/// # Security Notes
/// - Unknown username and wrong password produce the identical error,
///   preventing username enumeration
///
/// # Errors
/// - 401: Invalid credentials
/// - 500: Internal server error
pub async fn login(
    form: web::Json<LoginRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let pair = auth.login(&form.username, &form.password).await?;

    Ok(HttpResponse::Ok().json(AuthResponse::from(pair)))
}

/// POST /auth/refresh
///
/// Exchange a refresh token for a new access/refresh pair.
///
/// # Token Rotation Security
/// - The presented token is revoked in the same transaction that stores its
///   successor; replaying it afterwards is rejected
/// - Role claims are re-read here, so grants since the original login show
///   up in the new access token
///
/// # Errors
/// - 401: Unknown, revoked, or expired refresh token
/// - 500: Internal server error
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let pair = auth.refresh(&form.refresh_token).await?;

    Ok(HttpResponse::Ok().json(AuthResponse::from(pair)))
}

/// GET /api/me
///
/// Current authenticated user's profile and roles. Claims are injected by
/// the JWT middleware.
///
/// # Errors
/// - 401: Missing or invalid token (handled by middleware)
/// - 404: User no longer exists
pub async fn current_user(
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;
    let user = fetch_user_with_roles(pool.get_ref(), user_id).await?;

    Ok(HttpResponse::Ok().json(user))
}
