use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;

use crate::auth::AuthService;
use crate::configuration::JwtSettings;
use crate::middleware::{JwtMiddleware, RequestLogger};
use crate::routes::{
    add_user_role, create_role, current_user, delete_role, delete_user, get_user, health_check,
    list_roles, list_users, login, refresh, register, update_user,
};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let auth_service = web::Data::new(AuthService::new(connection.clone(), jwt_config.clone()));
    let connection = web::Data::new(connection);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)

            // Shared state
            .app_data(connection.clone())
            .app_data(auth_service.clone())

            // Public routes (no authentication required)
            .route("/health_check", web::get().to(health_check))
            .route("/auth/register", web::post().to(register))
            .route("/auth/login", web::post().to(login))
            .route("/auth/refresh", web::post().to(refresh))

            // Protected routes (require a valid access token; role checks
            // happen in the handlers)
            .service(
                web::scope("/api")
                    .wrap(JwtMiddleware::new(jwt_config.clone()))
                    .route("/me", web::get().to(current_user))
                    .route("/users", web::get().to(list_users))
                    .route("/users/{id}", web::get().to(get_user))
                    .route("/users/{id}", web::put().to(update_user))
                    .route("/users/{id}", web::delete().to(delete_user))
                    .route("/users/{id}/roles", web::post().to(add_user_role))
                    .route("/roles", web::get().to(list_roles))
                    .route("/roles", web::post().to(create_role))
                    .route("/roles/{id}", web::delete().to(delete_role)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
