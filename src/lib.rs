pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod state;

#[cfg(test)]
mod test_utils;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::Settings;
pub use db::{create_pool, DbPool};
pub use state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migrations", applied.len());
    Ok(())
}

/// Registers the order and dashboard routes. Handlers expect an
/// `AppState` in the app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(errors::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(errors::path_error_handler))
        .service(
        web::scope("/orders")
            .route("", web::post().to(handlers::orders::create_order))
            .route("", web::get().to(handlers::orders::list_all_orders))
            .route("/mine", web::get().to(handlers::orders::list_my_orders))
            .route("/sales", web::get().to(handlers::orders::list_vendor_orders))
            .route("/{id}", web::get().to(handlers::orders::get_order))
            .route("/{id}/pay", web::put().to(handlers::orders::confirm_payment))
            .route("/{id}/deliver", web::put().to(handlers::orders::mark_delivered)),
    )
    .route("/dashboard", web::get().to(handlers::dashboard::dashboard));
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let state = web::Data::new(state);
    let openapi = handlers::ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
