/// Startup seeding
///
/// Guarantees the administrative role exists and has at least one member:
/// ensure the Admin role, ensure the administrator account, ensure the
/// membership. Idempotent; runs on every startup.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{ensure_role, hash_password, ADMIN_ROLE};
use crate::configuration::SeedSettings;
use crate::error::AppError;

pub async fn seed_admin(pool: &PgPool, settings: &SeedSettings) -> Result<(), AppError> {
    let mut conn = pool.acquire().await?;

    let role_id = ensure_role(&mut conn, ADMIN_ROLE, Some("Administrator role")).await?;

    let existing = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM users WHERE username = $1")
        .bind(&settings.admin_username)
        .fetch_optional(&mut *conn)
        .await?;

    let user_id = match existing {
        Some((id,)) => id,
        None => {
            let password_hash = hash_password(&settings.admin_password)?;
            let id = Uuid::new_v4();
            let now = chrono::Utc::now();

            sqlx::query(
                r#"
                INSERT INTO users (id, username, email, display_name, password_hash, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $6)
                "#,
            )
            .bind(id)
            .bind(&settings.admin_username)
            .bind(&settings.admin_email)
            .bind("Administrator")
            .bind(&password_hash)
            .bind(now)
            .execute(&mut *conn)
            .await?;

            tracing::info!(user_id = %id, "Seeded administrator account");
            id
        }
    };

    sqlx::query(
        "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(role_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
