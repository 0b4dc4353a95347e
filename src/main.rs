use std::io;
use std::sync::Arc;

use agrohub_orders::infrastructure::{DieselOrderRepository, DieselUserRepository};
use agrohub_orders::{build_server, create_pool, run_migrations, AppState, Settings};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::from_env().map_err(io::Error::other)?;

    let pool = create_pool(&settings.database_url).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    let state = AppState::new(
        Arc::new(DieselOrderRepository::new(pool.clone())),
        Arc::new(DieselUserRepository::new(pool)),
        settings.payment_success_statuses.clone(),
    );

    log::info!("Starting server at http://{}:{}", settings.host, settings.port);

    build_server(state, &settings.host, settings.port)?.await
}
