//! Workflow entities and collaborator read contracts.
//!
//! The four owned entities ([`CoverageRequest`], [`CoverageClaim`],
//! [`NotificationRecord`], [`MessageLogEntry`]) are mutated only through
//! the guarded store operations; UI consumers read derived views and
//! never touch status fields directly. The directory contracts
//! ([`ShiftDetail`], [`TeamMember`], [`Contact`]) describe rows owned by
//! external collaborators (scheduling, profiles) that this service only
//! reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids::{ClaimId, RequestId};
use super::status::{ClaimStatus, DeliveryStatus, MessageDirection, NotificationType, RequestStatus};

/// A caregiver's request to be relieved of a shift, pending family
/// approval.
///
/// At most one request per shift may be open at a time. "Open" means
/// `PendingFamilyApproval`, or `Approved` without a confirmed claim.
/// Requests are never deleted, only status-transitioned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageRequest {
    /// Request identifier.
    pub id: RequestId,
    /// The shift the caregiver wants covered.
    pub shift_id: Uuid,
    /// Caregiver asking to be relieved.
    pub requesting_caregiver_id: Uuid,
    /// Short reason for the request (e.g. "medical appointment").
    pub reason: String,
    /// Optional free-text message passed through to the family.
    pub message: Option<String>,
    /// Current lifecycle status.
    pub status: RequestStatus,
    /// When the caregiver submitted the request.
    pub requested_at: DateTime<Utc>,
    /// When the family replied, if they have.
    pub family_response_at: Option<DateTime<Utc>>,
    /// Family member who replied, if any.
    pub family_response_by: Option<Uuid>,
}

/// Another caregiver's offer to take over an approved open shift.
///
/// Exists only under an `Approved` request; once confirmed, the parent
/// request is implicitly terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageClaim {
    /// Claim identifier.
    pub id: ClaimId,
    /// Parent coverage request.
    pub request_id: RequestId,
    /// Team member offering to take the shift.
    pub claiming_caregiver_id: Uuid,
    /// Current lifecycle status.
    pub status: ClaimStatus,
    /// When the claim was created.
    pub claimed_at: DateTime<Utc>,
    /// When the family confirmed or declined, if they have.
    pub family_confirmed_at: Option<DateTime<Utc>>,
    /// Family member who confirmed or declined, if any.
    pub family_confirmed_by: Option<Uuid>,
}

/// One row in the append-only outbound-notification ledger.
///
/// Written once per send attempt and never updated; doubles as the
/// idempotency check for reminders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Ledger row identifier.
    pub id: Uuid,
    /// Related coverage request, when the notification belongs to the
    /// request/claim workflow. `None` for shift reminders.
    pub request_id: Option<RequestId>,
    /// Shift the notification is about.
    pub shift_id: Uuid,
    /// Which template was sent.
    pub notification_type: NotificationType,
    /// Recipient user.
    pub recipient_id: Uuid,
    /// Phone number the message was sent to.
    pub recipient_phone: String,
    /// Rendered message body.
    pub content: String,
    /// Transport outcome for this attempt.
    pub delivery_status: DeliveryStatus,
    /// When the send was attempted.
    pub sent_at: DateTime<Utc>,
}

/// One row in the append-only message log.
///
/// Every inbound message is logged before parsing, whether or not it
/// resolves to a known user or a recognized keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageLogEntry {
    /// Log row identifier.
    pub id: Uuid,
    /// Phone number on the other end of the channel.
    pub phone_number: String,
    /// Resolved user, when the phone number maps to a known profile.
    pub user_id: Option<Uuid>,
    /// Message direction.
    pub direction: MessageDirection,
    /// Free-form classifier (`"coverage_reply"`, `"nudge"`, ...).
    pub message_type: String,
    /// Raw message body.
    pub content: String,
    /// Whether an inbound message was dispatched to the workflow.
    pub processed: bool,
    /// When the message was dispatched, if it was.
    pub processed_at: Option<DateTime<Utc>>,
}

/// Read contract for a scheduled shift, joined with its care plan and
/// family owner. Owned by the scheduling collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftDetail {
    /// Shift identifier.
    pub shift_id: Uuid,
    /// Care plan the shift belongs to.
    pub care_plan_id: Uuid,
    /// Shift title shown in notifications.
    pub title: String,
    /// Scheduled start.
    pub starts_at: DateTime<Utc>,
    /// Scheduled end.
    pub ends_at: DateTime<Utc>,
    /// Optional location string.
    pub location: Option<String>,
    /// Caregiver currently assigned to the shift.
    pub assigned_caregiver_id: Uuid,
    /// Family member who owns approval decisions for this care plan.
    pub family_owner_id: Uuid,
    /// Care plan title shown in notifications.
    pub care_plan_title: String,
}

/// Read contract for an active care-team member of a care plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    /// Member's user id.
    pub user_id: Uuid,
    /// Display name used in notification text.
    pub display_name: String,
    /// Phone number, when known. Members without one are skipped by
    /// broadcasts.
    pub phone: Option<String>,
}

/// Read contract for a user's messaging identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    /// User id.
    pub user_id: Uuid,
    /// Display name.
    pub display_name: String,
    /// Phone number, when known.
    pub phone: Option<String>,
}

impl CoverageRequest {
    /// Creates a new request in `PendingFamilyApproval`.
    #[must_use]
    pub fn new(
        shift_id: Uuid,
        requesting_caregiver_id: Uuid,
        reason: String,
        message: Option<String>,
    ) -> Self {
        Self {
            id: RequestId::new(),
            shift_id,
            requesting_caregiver_id,
            reason,
            message,
            status: RequestStatus::PendingFamilyApproval,
            requested_at: Utc::now(),
            family_response_at: None,
            family_response_by: None,
        }
    }
}

impl CoverageClaim {
    /// Creates a new claim in `PendingFamilyConfirmation`.
    #[must_use]
    pub fn new(request_id: RequestId, claiming_caregiver_id: Uuid) -> Self {
        Self {
            id: ClaimId::new(),
            request_id,
            claiming_caregiver_id,
            status: ClaimStatus::PendingFamilyConfirmation,
            claimed_at: Utc::now(),
            family_confirmed_at: None,
            family_confirmed_by: None,
        }
    }
}
