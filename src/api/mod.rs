//! HTTP API layer: function endpoints, DTOs, and router composition.
//!
//! The surface mirrors a function-invocation gateway: two POST
//! endpoints under `/functions` plus a health check.

pub mod dto;
pub mod handlers;

use axum::Router;
use axum::routing::{get, post};
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for the coverage coordinator.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "careshift",
        description = "Shift coverage coordination over a WhatsApp-style messaging channel."
    ),
    paths(
        handlers::shift_coverage_handler,
        handlers::send_nudge_handler,
        handlers::health_handler,
    ),
    components(schemas(
        dto::CoverageAction,
        dto::SuccessResponse,
        dto::NudgeRequest,
        dto::NudgeShiftDetails,
        dto::NudgeResponse,
        handlers::HealthResponse,
        crate::error::ErrorResponse,
    ))
)]
pub struct ApiDoc;

/// Builds the complete API router with all endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .route(
            "/functions/shift-coverage",
            post(handlers::shift_coverage_handler),
        )
        .route(
            "/functions/send-nudge-whatsapp",
            post(handlers::send_nudge_handler),
        )
        .route("/health", get(handlers::health_handler))
}
