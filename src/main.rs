//! careshift server entry point.
//!
//! Starts the Axum HTTP server exposing the coverage function endpoints.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderName;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use careshift::api;
use careshift::app_state::AppState;
use careshift::config::AppConfig;
use careshift::persistence::postgres::PgStore;
use careshift::persistence::{CoverageStore, Directory};
use careshift::transport::{LoggedTransport, MessageTransport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting careshift");

    // Connect to PostgreSQL and run migrations
    let store = Arc::new(PgStore::connect(&config).await?);

    // The Postgres store doubles as the schedule directory; the
    // transport stub acknowledges sends until a real channel is wired.
    let app_state = AppState::new(
        Arc::clone(&store) as Arc<dyn CoverageStore>,
        store as Arc<dyn Directory>,
        Arc::new(LoggedTransport) as Arc<dyn MessageTransport>,
        &config,
    );

    // Browser clients send the hosted-platform auth headers; everything
    // else about CORS stays open.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        app.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
