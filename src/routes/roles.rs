/// Role Management Routes
///
/// Listing, creation, and deletion of roles. All administrative.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{require_any, Claims, ADMIN_ROLE};
use crate::error::{AppError, ConflictError, NotFoundError, ValidationError};
use crate::validators::is_valid_role_name;

/// Role definition returned to callers
#[derive(Serialize)]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// Role creation request
#[derive(Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Serialize)]
struct ConfirmationResponse {
    message: String,
}

/// GET /api/roles
///
/// List all roles. Administrative.
pub async fn list_roles(
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    require_any(&claims, &[ADMIN_ROLE])?;

    let rows = sqlx::query_as::<_, (Uuid, String, Option<String>)>(
        "SELECT id, name, description FROM roles ORDER BY name",
    )
    .fetch_all(pool.get_ref())
    .await?;

    let roles: Vec<RoleResponse> = rows
        .into_iter()
        .map(|(id, name, description)| RoleResponse {
            id: id.to_string(),
            name,
            description,
        })
        .collect();

    Ok(HttpResponse::Ok().json(roles))
}

/// POST /api/roles
///
/// Create a new role. Administrative.
///
/// # Errors
/// - 400: Invalid role name
/// - 403: Caller is not an administrator
/// - 409: Role already exists
pub async fn create_role(
    form: web::Json<CreateRoleRequest>,
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    require_any(&claims, &[ADMIN_ROLE])?;

    let name = is_valid_role_name(&form.name)?;

    let existing = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM roles WHERE name = $1")
        .bind(&name)
        .fetch_optional(pool.get_ref())
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(ConflictError::RoleExists));
    }

    // The unique index backstops a concurrent create with the same name.
    sqlx::query("INSERT INTO roles (id, name, description) VALUES ($1, $2, $3)")
        .bind(Uuid::new_v4())
        .bind(&name)
        .bind(form.description.as_deref())
        .execute(pool.get_ref())
        .await?;

    tracing::info!(role = %name, "Role created");

    Ok(HttpResponse::Created().json(ConfirmationResponse {
        message: "Role created".to_string(),
    }))
}

/// DELETE /api/roles/{id}
///
/// Delete a role. Administrative. The built-in Admin role is protected so
/// it always keeps at least one member.
///
/// # Errors
/// - 400: Attempt to delete the Admin role
/// - 403: Caller is not an administrator
/// - 404: Unknown role
pub async fn delete_role(
    path: web::Path<Uuid>,
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    require_any(&claims, &[ADMIN_ROLE])?;

    let role_id = path.into_inner();
    let role = sqlx::query_as::<_, (String,)>("SELECT name FROM roles WHERE id = $1")
        .bind(role_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or(AppError::NotFound(NotFoundError::Role))?;

    if role.0 == ADMIN_ROLE {
        return Err(AppError::Validation(ValidationError::InvalidFormat(
            format!("the built-in {} role cannot be deleted", ADMIN_ROLE),
        )));
    }

    sqlx::query("DELETE FROM roles WHERE id = $1")
        .bind(role_id)
        .execute(pool.get_ref())
        .await?;

    tracing::info!(role = %role.0, "Role deleted");

    Ok(HttpResponse::Ok().json(ConfirmationResponse {
        message: "Role deleted".to_string(),
    }))
}
