use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use notes_server::config::CorsConfig;
use notes_server::db::DbOperations;
use notes_server::logging::{self, RequestTracing};
use notes_server::{AppError, AppState, Settings};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

fn cors(config: &CorsConfig) -> Cors {
    if !config.enabled {
        return Cors::default();
    }

    let cors = if config.allow_any_origin {
        Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .expose_any_header()
    } else {
        Cors::default()
            .allowed_origin("http://localhost:8080")
            .allowed_origin("http://127.0.0.1:8080")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec!["Authorization", "Content-Type", "X-Request-ID"])
            .expose_headers(vec!["X-Request-ID"])
    };

    cors.max_age(config.max_age as usize)
}

#[actix_web::main]
async fn main() -> notes_server::Result<()> {
    dotenv().ok();

    let config = Settings::new()?;
    logging::init(&config.log);
    info!("Configuration loaded for {} environment", config.environment);

    let db = DbOperations::new_with_options(
        &config.database.url,
        config.database.max_connections,
        Duration::from_secs(config.database.acquire_timeout_secs),
    )
    .await?;
    db.migrate().await?;
    info!("Database ready");

    let db = Arc::new(db);
    let state = web::Data::new(AppState::with_store(&config, db.clone()));

    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;
    info!("Starting server at {}:{}", config.server.host, config.server.port);

    let cors_config = config.cors.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(cors(&cors_config))
            .wrap(RequestTracing)
            .configure(|cfg| notes_server::configure(cfg, &state))
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))?;

    info!("Server stopped, closing database pool");
    db.close().await;
    Ok(())
}
