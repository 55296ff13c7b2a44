//! Server mode
//!
//! Configures and starts the HTTP server serving the visitor endpoints
//! and health probes.

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::warn;

use crate::api::middleware::RequestTrace;
use crate::api::services::{AppStartTime, health_routes, visitor_routes};
use crate::runtime::lifetime;

/// Build CORS middleware
///
/// Empty origin list keeps the browser's same-origin policy; `"*"` allows any origin.
pub fn build_cors_middleware(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default();

    if allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors.allowed_methods(vec!["GET", "HEAD", "POST"])
        .allowed_header(actix_web::http::header::CONTENT_TYPE)
        .max_age(3600)
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let startup = lifetime::startup::prepare_server_startup()
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {}", e))?;

    let storage = startup.storage.clone();
    let counter = startup.counter.clone();
    let tracker = startup.tracker.clone();

    let config = crate::config::get_config();
    let cpu_count = config.server.cpu_count.clamp(1, 32);
    let allowed_origins = config.server.cors_allowed_origins.clone();
    warn!("Using {} CPU cores for the server", cpu_count);

    if allowed_origins.is_empty() {
        warn!("CORS: no allowed origins configured, only same-origin requests are accepted");
    }

    let db_for_shutdown = storage.get_db().clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestTrace)
            .wrap(build_cors_middleware(&allowed_origins))
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(counter.clone()))
            .app_data(web::Data::new(tracker.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .service(visitor_routes())
            .service(health_routes())
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(db_for_shutdown) => {
            warn!("Graceful shutdown completed");
        }
    }

    Ok(())
}
