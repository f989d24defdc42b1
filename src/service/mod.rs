//! Service layer: the coverage state machine, the inbound reply router,
//! the reminder/expiry sweeps, and the nudge broadcaster.
//!
//! Every unit here runs as a short-lived, stateless invocation; the
//! only correctness mechanism across concurrent invocations is the
//! store's conditional transitions, surfaced to callers as
//! [`TransitionOutcome`].

pub mod coverage;
pub mod nudge;
pub mod router;
pub mod sweeps;

pub use coverage::CoverageService;
pub use nudge::{NudgeKind, NudgeService, NudgeSummary, SchedulePeriod};
pub use router::{InboundRouter, RouteOutcome};
pub use sweeps::SweepService;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    DeliveryStatus, MessageDirection, MessageLogEntry, NotificationRecord, NotificationType,
    RequestId,
};
use crate::error::CoordinatorError;
use crate::persistence::CoverageStore;
use crate::transport::MessageTransport;

/// Result of a guarded state-machine operation.
///
/// `Stale` means the entity was not in the expected source state —
/// a duplicate or late reply. Stale operations mutate nothing, send
/// nothing, and are logged rather than surfaced: the inbound channel
/// has no acknowledgment path back to the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The transition was applied and its side effects ran.
    Applied,
    /// The entity was missing or not in the expected source state.
    Stale,
}

impl TransitionOutcome {
    /// Returns `true` for [`TransitionOutcome::Applied`].
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// One outbound workflow notification to send and record.
#[derive(Debug)]
pub(crate) struct Outbound<'a> {
    pub request_id: Option<RequestId>,
    pub shift_id: Uuid,
    pub notification_type: NotificationType,
    pub recipient_id: Uuid,
    pub phone: &'a str,
    pub body: String,
    pub template: &'a str,
}

/// Sends one notification, appends a ledger row for the attempt, and
/// mirrors the send into the message log.
///
/// Transport failure is recorded, not propagated: broadcasts must
/// attempt every recipient independently.
pub(crate) async fn send_and_record(
    store: &dyn CoverageStore,
    transport: &dyn MessageTransport,
    out: Outbound<'_>,
) -> Result<DeliveryStatus, CoordinatorError> {
    let receipt = transport.send(out.phone, &out.body, out.template).await;
    let delivery_status = if receipt.delivered {
        DeliveryStatus::Sent
    } else {
        tracing::warn!(
            phone = out.phone,
            template = out.template,
            error = receipt.error.as_deref().unwrap_or("unknown"),
            "transport failed for recipient"
        );
        DeliveryStatus::Failed
    };

    store
        .record_notification(&NotificationRecord {
            id: Uuid::new_v4(),
            request_id: out.request_id,
            shift_id: out.shift_id,
            notification_type: out.notification_type,
            recipient_id: out.recipient_id,
            recipient_phone: out.phone.to_string(),
            content: out.body.clone(),
            delivery_status,
            sent_at: Utc::now(),
        })
        .await?;

    store
        .log_message(&MessageLogEntry {
            id: Uuid::new_v4(),
            phone_number: out.phone.to_string(),
            user_id: Some(out.recipient_id),
            direction: MessageDirection::Outgoing,
            message_type: out.template.to_string(),
            content: out.body,
            processed: false,
            processed_at: None,
        })
        .await?;

    Ok(delivery_status)
}
