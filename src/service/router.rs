//! Inbound message router.
//!
//! Receives raw (phone number, text) pairs from the messaging channel,
//! logs them unconditionally, resolves the sender, parses the reply
//! keyword, and dispatches to the state machine scoped to the sender's
//! role. Everything that cannot be dispatched is logged and dropped —
//! the channel has no way to answer back synchronously.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{InboundReply, MessageDirection, MessageLogEntry, ReplyKeyword};
use crate::error::CoordinatorError;
use crate::persistence::{CoverageStore, Directory};

use super::coverage::CoverageService;
use super::TransitionOutcome;

/// Message-log classifier for raw inbound traffic.
const INBOUND_MESSAGE_TYPE: &str = "whatsapp_inbound";

/// What happened to one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A workflow transition was applied.
    Dispatched,
    /// A keyword matched a pending item but the transition guard
    /// refused it (duplicate or late reply).
    StaleReply,
    /// The phone number does not resolve to a known user.
    UnknownSender,
    /// The text is not a recognized workflow reply.
    Unrecognized,
    /// The keyword was recognized but no pending item matches the
    /// sender's role (and token, when given).
    NoPendingMatch,
}

/// Routes inbound replies into the coverage state machine.
#[derive(Debug, Clone)]
pub struct InboundRouter {
    service: CoverageService,
    store: Arc<dyn CoverageStore>,
    directory: Arc<dyn Directory>,
}

impl InboundRouter {
    /// Creates a new router.
    #[must_use]
    pub fn new(
        service: CoverageService,
        store: Arc<dyn CoverageStore>,
        directory: Arc<dyn Directory>,
    ) -> Self {
        Self {
            service,
            store,
            directory,
        }
    }

    /// Logs and routes one inbound message.
    ///
    /// The message is appended to the message log before any parsing,
    /// whether or not the sender resolves or the text is a recognized
    /// reply.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    pub async fn process_inbound(
        &self,
        phone_number: &str,
        text: &str,
    ) -> Result<RouteOutcome, CoordinatorError> {
        let sender = self.directory.user_by_phone(phone_number).await?;

        let entry = MessageLogEntry {
            id: Uuid::new_v4(),
            phone_number: phone_number.to_string(),
            user_id: sender.as_ref().map(|c| c.user_id),
            direction: MessageDirection::Incoming,
            message_type: INBOUND_MESSAGE_TYPE.to_string(),
            content: text.to_string(),
            processed: false,
            processed_at: None,
        };
        self.store.log_message(&entry).await?;

        let Some(sender) = sender else {
            tracing::warn!(phone_number, "inbound message from unknown phone number dropped");
            return Ok(RouteOutcome::UnknownSender);
        };

        let Some(reply) = InboundReply::parse(text) else {
            tracing::debug!(user = %sender.user_id, "inbound message is not a workflow reply");
            return Ok(RouteOutcome::Unrecognized);
        };

        let token = reply.token.as_deref();
        let outcome = match reply.keyword {
            ReplyKeyword::Approve | ReplyKeyword::Deny => {
                let Some(request) = self
                    .store
                    .latest_pending_approval_for_owner(sender.user_id, token)
                    .await?
                else {
                    tracing::info!(user = %sender.user_id, "no pending request matches approval reply");
                    return Ok(RouteOutcome::NoPendingMatch);
                };
                self.service
                    .record_family_approval(
                        request.id,
                        reply.keyword == ReplyKeyword::Approve,
                        sender.user_id,
                    )
                    .await?
            }
            ReplyKeyword::Claim => {
                let Some(request) = self
                    .store
                    .latest_claimable_request_for_member(sender.user_id, token)
                    .await?
                else {
                    tracing::info!(user = %sender.user_id, "no claimable request matches claim reply");
                    return Ok(RouteOutcome::NoPendingMatch);
                };
                self.service.record_claim(request.id, sender.user_id).await?
            }
            ReplyKeyword::Confirm | ReplyKeyword::Decline => {
                let Some(claim) = self
                    .store
                    .latest_pending_claim_for_owner(sender.user_id, token)
                    .await?
                else {
                    tracing::info!(user = %sender.user_id, "no pending claim matches confirmation reply");
                    return Ok(RouteOutcome::NoPendingMatch);
                };
                self.service
                    .record_family_confirmation(
                        claim.id,
                        reply.keyword == ReplyKeyword::Confirm,
                        sender.user_id,
                    )
                    .await?
            }
        };

        match outcome {
            TransitionOutcome::Applied => {
                self.store.mark_message_processed(entry.id, Utc::now()).await?;
                Ok(RouteOutcome::Dispatched)
            }
            TransitionOutcome::Stale => Ok(RouteOutcome::StaleReply),
        }
    }
}
