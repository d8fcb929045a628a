/// User Management Routes
///
/// Profile reads and updates, account removal, and role grants. Listing,
/// deletion, and grants are administrative; profile update is allowed for
/// the account owner or an administrator.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{ensure_role, load_role_names, require_any, Claims, ADMIN_ROLE};
use crate::error::{AppError, NotFoundError};
use crate::validators::{
    is_valid_display_name, is_valid_email, is_valid_role_name, is_valid_username,
};

/// User profile with roles, fully materialized
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub roles: Vec<String>,
    pub created_at: String,
}

/// Row shape for user listings
#[derive(Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Partial profile update; absent fields keep their value
#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Role grant request
#[derive(Deserialize)]
pub struct AddUserRoleRequest {
    pub role_name: String,
}

#[derive(Serialize)]
struct ConfirmationResponse {
    message: String,
}

/// Load a user's profile and current role names.
pub(crate) async fn fetch_user_with_roles(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<UserResponse, AppError> {
    let user = sqlx::query_as::<_, (Uuid, String, String, Option<String>, DateTime<Utc>)>(
        "SELECT id, username, email, display_name, created_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound(NotFoundError::User))?;

    let mut conn = pool.acquire().await?;
    let roles = load_role_names(&mut conn, user_id).await?;

    Ok(UserResponse {
        id: user.0.to_string(),
        username: user.1,
        email: user.2,
        display_name: user.3,
        roles,
        created_at: user.4.to_rfc3339(),
    })
}

/// GET /api/users
///
/// List all users. Administrative.
pub async fn list_users(
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    require_any(&claims, &[ADMIN_ROLE])?;

    let rows = sqlx::query_as::<_, (Uuid, String, String, Option<String>)>(
        "SELECT id, username, email, display_name FROM users ORDER BY username",
    )
    .fetch_all(pool.get_ref())
    .await?;

    let users: Vec<UserSummary> = rows
        .into_iter()
        .map(|(id, username, email, display_name)| UserSummary {
            id: id.to_string(),
            username,
            email,
            display_name,
        })
        .collect();

    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/users/{id}
///
/// A user's profile and roles. Any valid token.
///
/// # Errors
/// - 404: Unknown user
pub async fn get_user(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user = fetch_user_with_roles(pool.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(user))
}

/// PUT /api/users/{id}
///
/// Update a user's profile. Allowed for the account owner or an
/// administrator.
///
/// # Errors
/// - 400: Validation errors
/// - 403: Caller is neither the target user nor an administrator
/// - 404: Unknown user
/// - 409: New username or email already taken
pub async fn update_user(
    path: web::Path<Uuid>,
    form: web::Json<UpdateUserRequest>,
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let target_id = path.into_inner();
    if claims.user_id()? != target_id {
        require_any(&claims, &[ADMIN_ROLE])?;
    }

    let username = match form.username.as_deref() {
        Some(value) => Some(is_valid_username(value)?),
        None => None,
    };
    let email = match form.email.as_deref() {
        Some(value) => Some(is_valid_email(value)?),
        None => None,
    };
    let display_name = match form.display_name.as_deref() {
        Some(value) => Some(is_valid_display_name(value)?),
        None => None,
    };

    let updated = sqlx::query_as::<_, (Uuid,)>(
        r#"
        UPDATE users
        SET username = COALESCE($2, username),
            email = COALESCE($3, email),
            display_name = COALESCE($4, display_name),
            updated_at = $5
        WHERE id = $1
        RETURNING id
        "#,
    )
    .bind(target_id)
    .bind(username)
    .bind(email)
    .bind(display_name)
    .bind(Utc::now())
    .fetch_optional(pool.get_ref())
    .await?;

    if updated.is_none() {
        return Err(AppError::NotFound(NotFoundError::User));
    }

    tracing::info!(user_id = %target_id, "User updated");

    Ok(HttpResponse::Ok().json(ConfirmationResponse {
        message: "User updated".to_string(),
    }))
}

/// DELETE /api/users/{id}
///
/// Remove an account. Administrative.
///
/// # Errors
/// - 403: Caller is not an administrator
/// - 404: Unknown user
pub async fn delete_user(
    path: web::Path<Uuid>,
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    require_any(&claims, &[ADMIN_ROLE])?;

    let target_id = path.into_inner();
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(target_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(NotFoundError::User));
    }

    tracing::info!(user_id = %target_id, "User deleted");

    Ok(HttpResponse::Ok().json(ConfirmationResponse {
        message: "User deleted".to_string(),
    }))
}

/// POST /api/users/{id}/roles
///
/// Grant a role to a user, creating the role if it does not exist yet.
/// Administrative. The grant shows up in the user's access token at their
/// next login or refresh.
///
/// # Errors
/// - 400: Invalid role name
/// - 403: Caller is not an administrator
/// - 404: Unknown user
pub async fn add_user_role(
    path: web::Path<Uuid>,
    form: web::Json<AddUserRoleRequest>,
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    require_any(&claims, &[ADMIN_ROLE])?;

    let role_name = is_valid_role_name(&form.role_name)?;
    let target_id = path.into_inner();

    let user = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM users WHERE id = $1")
        .bind(target_id)
        .fetch_optional(pool.get_ref())
        .await?;
    if user.is_none() {
        return Err(AppError::NotFound(NotFoundError::User));
    }

    let mut conn = pool.acquire().await?;
    let role_id = ensure_role(&mut conn, &role_name, None).await?;

    sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
        .bind(target_id)
        .bind(role_id)
        .execute(pool.get_ref())
        .await?;

    tracing::info!(user_id = %target_id, role = %role_name, "Role granted");

    Ok(HttpResponse::Ok().json(ConfirmationResponse {
        message: "Role added".to_string(),
    }))
}
