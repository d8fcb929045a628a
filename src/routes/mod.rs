mod auth;
mod health_check;
mod roles;
mod users;

pub use auth::{current_user, login, refresh, register};
pub use health_check::health_check;
pub use roles::{create_role, delete_role, list_roles};
pub use users::{add_user_role, delete_user, get_user, list_users, update_user};
