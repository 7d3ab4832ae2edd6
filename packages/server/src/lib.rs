#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the LA infrastructure map.
//!
//! Serves airport, port and warehouse layers as `GeoJSON`, infrastructure
//! statistics, nearest-feature queries, a TomTom route proxy, the chat
//! bridge to the configured LLM provider, and the supply-chain simulation
//! dataset for playback.

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use mirror_ai::{AiError, providers::LlmProvider};
use mirror_database::{db, run_migrations};
use mirror_routing::RouteClient;
use switchy_database::Database;

pub use config::ServerConfig;
pub use error::{ApiError, ErrorKind};

/// Shared application state.
pub struct AppState {
    /// `PostgreSQL` connection.
    pub db: Arc<dyn Database>,
    /// Chat provider; `None` when no API key is configured.
    pub ai_provider: Option<Arc<dyn LlmProvider>>,
}

/// Registers every route and the JSON/path error handlers.
///
/// Handlers expect `web::Data<AppState>` and `web::Data<RouteClient>` to be
/// registered on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handlers::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(handlers::path_error_handler))
        .route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health))
                .route("/airports", web::get().to(handlers::airports))
                .route("/ports", web::get().to(handlers::ports))
                .route("/warehouses", web::get().to(handlers::warehouses))
                .route("/stats", web::get().to(handlers::stats))
                .route("/chat", web::post().to(handlers::chat))
                .route("/route", web::post().to(handlers::route))
                .route("/find-nearest", web::post().to(handlers::find_nearest))
                .route("/facilities", web::get().to(handlers::facilities))
                .route(
                    "/facilities/geojson",
                    web::get().to(handlers::facilities_geojson),
                )
                .route("/infrastructure", web::get().to(handlers::infrastructure))
                .route(
                    "/infrastructure/connections",
                    web::get().to(handlers::connections),
                )
                .route(
                    "/infrastructure/connections/geojson",
                    web::get().to(handlers::connections_geojson),
                )
                .route("/simulations", web::get().to(handlers::simulations))
                .route("/simulations/{id}", web::get().to(handlers::simulation))
                .route(
                    "/simulations/{id}/timeline",
                    web::get().to(handlers::timeline),
                ),
        );
}

/// Creates the chat provider, or `None` when its credential is missing.
///
/// # Errors
///
/// Returns [`AiError`] if the provider is misconfigured in any other way.
pub fn optional_provider(
    config: &mirror_ai::providers::ProviderConfig,
) -> Result<Option<Arc<dyn LlmProvider>>, AiError> {
    match mirror_ai::providers::create_provider(config) {
        Ok(provider) => Ok(Some(Arc::from(provider))),
        Err(AiError::NotConfigured { message }) => {
            log::warn!("Chat disabled: {message}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Starts the API server.
///
/// Connects to `PostgreSQL`, runs migrations, builds the chat provider and
/// routing client from `config`, and serves until shut down. The caller
/// provides the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an error if the database connection or migrations fail, the
/// provider or routing client cannot be built, or the HTTP server fails to
/// bind.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Connecting to database...");
    let db_conn = db::connect(&config.database_url, config.statement_timeout).await?;

    log::info!("Running migrations...");
    run_migrations(db_conn.as_ref()).await?;

    let ai_provider = optional_provider(&config.ai)?;

    let route_client = RouteClient::new(config.tomtom_api_key.clone(), &config.routing_base_url)?;
    if !route_client.is_configured() {
        log::warn!("Routing disabled: TOMTOM_API_KEY is not set");
    }

    let state = web::Data::new(AppState {
        db: Arc::from(db_conn),
        ai_provider,
    });
    let route_client = web::Data::new(route_client);

    let ServerConfig {
        bind_addr, port, ..
    } = config;

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(route_client.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}
