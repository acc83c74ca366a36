use actix_web::{App, HttpServer, middleware, web};
use anyhow::{Context, Result};
use tracing::info;

use fbref_stats::api::{self, AppState};
use fbref_stats::config::AppConfig;
use fbref_stats::logging::init_logging;
use fbref_stats::store;

#[actix_web::main]
async fn main() -> Result<()> {
    init_logging()?;
    let config = AppConfig::load()?;
    let conn = store::open_db(&config.database)?;
    let state = web::Data::new(AppState::new(conn));

    let addr = config.bind_addr();
    let cors_origin = config.cors_origin.clone();
    info!("starting FBref stats API at http://{addr} (cors origin {cors_origin})");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(api::cors(&cors_origin))
            .wrap(middleware::Logger::default())
            .configure(api::configure)
    })
    .bind(&addr)
    .with_context(|| format!("bind {addr}"))?
    .run()
    .await
    .context("server stopped with an error")
}
