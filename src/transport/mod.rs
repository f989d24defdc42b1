//! Message transport seam.
//!
//! [`MessageTransport`] is the contract for delivering a templated text
//! message to a phone number. The production WhatsApp Business
//! integration is stubbed by [`LoggedTransport`], which logs the send
//! and acknowledges it; tests substitute a recording fake.
//!
//! The contract never returns `Err`: provider failure is data, not an
//! exception, so a broadcast can attempt all recipients independently
//! and log per-recipient outcomes.

use async_trait::async_trait;
use uuid::Uuid;

/// Outcome of a single send attempt.
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    /// Whether the provider acknowledged the message.
    pub delivered: bool,
    /// Provider-assigned message id, when delivered.
    pub message_id: Option<String>,
    /// Provider error description, when not delivered.
    pub error: Option<String>,
}

impl DeliveryReceipt {
    /// A successful receipt with the given provider message id.
    #[must_use]
    pub fn delivered(message_id: String) -> Self {
        Self {
            delivered: true,
            message_id: Some(message_id),
            error: None,
        }
    }

    /// A failed receipt with the given provider error.
    #[must_use]
    pub fn failed(error: String) -> Self {
        Self {
            delivered: false,
            message_id: None,
            error: Some(error),
        }
    }
}

/// Sends templated text messages to phone numbers.
#[async_trait]
pub trait MessageTransport: Send + Sync + std::fmt::Debug {
    /// Sends `body` to `phone_number` under the named template.
    ///
    /// Must not fail: provider errors come back as a receipt with
    /// `delivered == false`.
    async fn send(&self, phone_number: &str, body: &str, template: &str) -> DeliveryReceipt;
}

/// Stub transport that logs every send and acknowledges it.
///
/// Stands in for the WhatsApp Business API call until the real
/// integration is wired up.
#[derive(Debug, Default, Clone)]
pub struct LoggedTransport;

#[async_trait]
impl MessageTransport for LoggedTransport {
    async fn send(&self, phone_number: &str, body: &str, template: &str) -> DeliveryReceipt {
        tracing::info!(
            phone_number,
            template,
            body_len = body.len(),
            "outbound message (stub transport)"
        );
        DeliveryReceipt::delivered(format!("stub-{}", Uuid::new_v4()))
    }
}
