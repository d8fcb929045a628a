/// Authorization Guard
///
/// Role decisions over the claims of an already-verified access token.

use crate::auth::claims::Claims;
use crate::error::AppError;

/// Administrative role; seeded at startup and never deletable.
pub const ADMIN_ROLE: &str = "Admin";
/// Unprivileged role assigned to every new registration.
pub const DEFAULT_ROLE: &str = "User";

/// Allow iff no specific role is required, or the token carries at least one
/// of the required roles (OR semantics).
pub fn authorize(token_roles: &[String], required_roles: &[&str]) -> bool {
    required_roles.is_empty()
        || token_roles
            .iter()
            .any(|role| required_roles.contains(&role.as_str()))
}

/// Handler-level guard mapping a deny to `Forbidden`.
pub fn require_any(claims: &Claims, required_roles: &[&str]) -> Result<(), AppError> {
    if authorize(&claims.roles, required_roles) {
        Ok(())
    } else {
        tracing::warn!(
            user_id = %claims.sub,
            required = ?required_roles,
            "Authorization denied"
        );
        Err(AppError::Forbidden)
    }
}
