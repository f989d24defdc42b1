//! Function endpoint handlers.
//!
//! Both POST endpoints parse their body from raw JSON so that a
//! malformed or unknown payload maps to the contract's
//! `400 {"error": ...}` envelope rather than the framework default.
//! Stale-state and unresolvable inbound messages still answer
//! `{"success": true}` — the messaging channel has no way to deliver an
//! error to the sender anyway.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::{ClaimId, RequestId};
use crate::error::{CoordinatorError, ErrorResponse};
use crate::service::{NudgeKind, SchedulePeriod};

use super::dto::{CoverageAction, NudgeRequest, NudgeResponse, SuccessResponse};

fn parse_body<T: serde::de::DeserializeOwned>(
    body: serde_json::Value,
) -> Result<T, CoordinatorError> {
    serde_json::from_value(body).map_err(|e| CoordinatorError::InvalidRequest(e.to_string()))
}

/// `POST /functions/shift-coverage` — dispatch one coverage action.
///
/// # Errors
///
/// Returns [`CoordinatorError::InvalidRequest`] for an unknown action
/// or malformed body, a not-found error for unknown entity ids, and a
/// 500 on store failures.
#[utoipa::path(
    post,
    path = "/functions/shift-coverage",
    tag = "Coverage",
    summary = "Dispatch a shift-coverage workflow action",
    description = "Single endpoint multiplexed by the `action` field: family \
        notifications, open-shift broadcast, inbound reply routing, and the \
        reminder/expiry sweeps.",
    request_body = CoverageAction,
    responses(
        (status = 200, description = "Action dispatched", body = SuccessResponse),
        (status = 400, description = "Unknown action or malformed body", body = ErrorResponse),
        (status = 404, description = "Referenced entity not found", body = ErrorResponse),
        (status = 500, description = "Unhandled failure", body = ErrorResponse),
    )
)]
pub async fn shift_coverage_handler(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<SuccessResponse>, CoordinatorError> {
    let action: CoverageAction = parse_body(body)?;

    match action {
        CoverageAction::NotifyFamilyRequest { request_id } => {
            let _ = state
                .coverage
                .notify_family_request(RequestId::from_uuid(request_id))
                .await?;
        }
        CoverageAction::BroadcastAvailableShift { request_id } => {
            let _ = state
                .coverage
                .broadcast_open_shift(RequestId::from_uuid(request_id))
                .await?;
        }
        CoverageAction::NotifyFamilyClaim { claim_id } => {
            let _ = state
                .coverage
                .notify_family_claim(ClaimId::from_uuid(claim_id))
                .await?;
        }
        CoverageAction::ProcessWhatsappMessage {
            phone_number,
            message_content,
        } => {
            let _ = state
                .inbound
                .process_inbound(&phone_number, &message_content)
                .await?;
        }
        CoverageAction::SendReminders => {
            // The expiry sweep shares the reminder cron trigger.
            let _ = state.sweeps.run_expiry_sweep().await?;
            let _ = state.sweeps.run_reminder_sweep().await?;
        }
        CoverageAction::ExpireStaleRequests => {
            let _ = state.sweeps.run_expiry_sweep().await?;
        }
    }

    Ok(Json(SuccessResponse::ok()))
}

fn nudge_kind(request: &NudgeRequest) -> Result<NudgeKind, CoordinatorError> {
    match request.message_type.as_str() {
        "schedule_update" => {
            let care_plan_id = request.care_plan_id.ok_or_else(|| {
                CoordinatorError::InvalidRequest(
                    "care_plan_id is required for schedule updates".to_string(),
                )
            })?;
            let period = request
                .schedule_period
                .as_deref()
                .and_then(SchedulePeriod::parse)
                .ok_or_else(|| {
                    CoordinatorError::InvalidRequest(
                        "schedule_period must be weekly, biweekly, or monthly".to_string(),
                    )
                })?;
            Ok(NudgeKind::ScheduleUpdate {
                care_plan_id,
                period,
            })
        }
        "emergency_coverage" => {
            let care_plan_id = request.care_plan_id.ok_or_else(|| {
                CoordinatorError::InvalidRequest(
                    "care_plan_id is required for emergency broadcasts".to_string(),
                )
            })?;
            let shift_summary = request
                .shift_details
                .as_ref()
                .map(super::dto::NudgeShiftDetails::summary)
                .ok_or_else(|| {
                    CoordinatorError::InvalidRequest(
                        "shift_details is required for emergency broadcasts".to_string(),
                    )
                })?;
            Ok(NudgeKind::EmergencyCoverage {
                care_plan_id,
                shift_summary,
            })
        }
        // Any other type is a generic per-user nudge.
        _ => Ok(NudgeKind::Generic {
            custom_message: request.custom_message.clone(),
        }),
    }
}

/// `POST /functions/send-nudge-whatsapp` — send a nudge batch.
///
/// # Errors
///
/// Returns [`CoordinatorError::InvalidRequest`] for a malformed body or
/// missing per-kind fields, and a 500 on store failures.
#[utoipa::path(
    post,
    path = "/functions/send-nudge-whatsapp",
    tag = "Nudges",
    summary = "Send nudge messages",
    description = "Supports generic user nudges, schedule-update broadcasts \
        to a care team, and urgent shift-coverage broadcasts.",
    request_body = NudgeRequest,
    responses(
        (status = 200, description = "Batch processed", body = NudgeResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 500, description = "Unhandled failure", body = ErrorResponse),
    )
)]
pub async fn send_nudge_handler(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<NudgeResponse>, CoordinatorError> {
    let request: NudgeRequest = parse_body(body)?;
    let kind = nudge_kind(&request)?;

    let summary = state.nudges.send_nudges(&request.target_users, kind).await?;

    Ok(Json(NudgeResponse {
        success: true,
        sent: summary.sent,
        failed: summary.failed,
        skipped: summary.skipped,
    }))
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"` when the service answers.
    pub status: String,
    /// Current server time, RFC 3339.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
