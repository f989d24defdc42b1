//! Request/response bodies for the function endpoints.
//!
//! The shift-coverage endpoint multiplexes on an `action` field; the
//! closed [`CoverageAction`] enum replaces the stringly-typed switch so
//! dispatch is exhaustive at compile time and an unknown action is a
//! deserialization failure (HTTP 400).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::templates;

/// Body of `POST /functions/shift-coverage`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CoverageAction {
    /// Send (or re-send) the family approval request notification.
    NotifyFamilyRequest {
        /// Coverage request to notify about.
        request_id: Uuid,
    },
    /// Broadcast an approved open shift to the eligible care team.
    BroadcastAvailableShift {
        /// Approved coverage request to broadcast.
        request_id: Uuid,
    },
    /// Notify the family of a pending claim.
    NotifyFamilyClaim {
        /// Claim to notify about.
        claim_id: Uuid,
    },
    /// Route one inbound reply from the messaging channel.
    ProcessWhatsappMessage {
        /// Sender phone number.
        phone_number: String,
        /// Raw message text.
        message_content: String,
    },
    /// Run the reminder sweep (and the expiry sweep, which shares the
    /// cron trigger).
    SendReminders,
    /// Run only the approval-window expiry sweep.
    ExpireStaleRequests,
}

/// Success envelope returned by the function endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    /// Always `true` when the action was dispatched.
    pub success: bool,
}

impl SuccessResponse {
    /// The canonical success body.
    #[must_use]
    pub const fn ok() -> Self {
        Self { success: true }
    }
}

/// Body of `POST /functions/send-nudge-whatsapp`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NudgeRequest {
    /// Users to nudge (generic nudges only; team broadcasts derive
    /// their recipients from `care_plan_id`).
    #[serde(default)]
    pub target_users: Vec<Uuid>,
    /// `"nudge"`, `"schedule_update"`, or `"emergency_coverage"`.
    pub message_type: String,
    /// Body override for generic nudges.
    #[serde(default)]
    pub custom_message: Option<String>,
    /// Care plan for team broadcasts.
    #[serde(default)]
    pub care_plan_id: Option<Uuid>,
    /// Shift context for emergency broadcasts.
    #[serde(default)]
    pub shift_details: Option<NudgeShiftDetails>,
    /// `"weekly"`, `"biweekly"`, or `"monthly"` for schedule updates.
    #[serde(default)]
    pub schedule_period: Option<String>,
}

/// Shift context embedded in an emergency coverage nudge.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NudgeShiftDetails {
    /// Shift title.
    pub title: String,
    /// Scheduled start, when known.
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    /// Scheduled end, when known.
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// Location, when known.
    #[serde(default)]
    pub location: Option<String>,
}

impl NudgeShiftDetails {
    /// Renders the one-line shift summary used in the urgent broadcast.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut summary = self.title.clone();
        if let (Some(starts_at), Some(ends_at)) = (self.starts_at, self.ends_at) {
            summary.push_str(&format!(" ({})", templates::time_window(starts_at, ends_at)));
        }
        if let Some(location) = self.location.as_deref() {
            summary.push_str(&format!(" at {location}"));
        }
        summary
    }
}

/// Response of the nudge endpoint with per-batch counters.
#[derive(Debug, Serialize, ToSchema)]
pub struct NudgeResponse {
    /// Always `true` when the batch was processed.
    pub success: bool,
    /// Messages the transport acknowledged.
    pub sent: usize,
    /// Messages the transport rejected.
    pub failed: usize,
    /// Recipients skipped (unknown user or no phone number).
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_deserializes_from_tag() {
        let json = r#"{"action": "process_whatsapp_message",
                       "phone_number": "+15550001111",
                       "message_content": "APPROVE"}"#;
        let action: Result<CoverageAction, _> = serde_json::from_str(json);
        assert!(matches!(
            action,
            Ok(CoverageAction::ProcessWhatsappMessage { .. })
        ));
    }

    #[test]
    fn unit_actions_need_no_fields() {
        let action: Result<CoverageAction, _> =
            serde_json::from_str(r#"{"action": "send_reminders"}"#);
        assert!(matches!(action, Ok(CoverageAction::SendReminders)));
    }

    #[test]
    fn unknown_action_is_a_deserialization_error() {
        let action: Result<CoverageAction, _> =
            serde_json::from_str(r#"{"action": "frobnicate"}"#);
        assert!(action.is_err());
    }

    #[test]
    fn shift_summary_includes_what_is_known() {
        let details = NudgeShiftDetails {
            title: "Night shift".to_string(),
            starts_at: None,
            ends_at: None,
            location: Some("12 Elm St".to_string()),
        };
        assert_eq!(details.summary(), "Night shift at 12 Elm St");
    }
}
