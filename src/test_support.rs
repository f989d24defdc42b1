//! Shared test doubles for service-layer tests.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::transport::{DeliveryReceipt, MessageTransport};

/// One message captured by the recording transport.
#[derive(Debug, Clone)]
pub(crate) struct SentMessage {
    pub phone: String,
    pub template: String,
    pub body: String,
    pub delivered: bool,
}

/// Transport fake that records every send and can be scripted to fail
/// for specific phone numbers.
#[derive(Debug, Default)]
pub(crate) struct RecordingTransport {
    fail_numbers: Mutex<HashSet<String>>,
    sent: Mutex<Vec<SentMessage>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent send to `phone` fail.
    pub async fn fail_for(&self, phone: &str) {
        self.fail_numbers.lock().await.insert(phone.to_string());
    }

    /// All recorded sends, in order.
    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Phone numbers of successfully delivered sends.
    pub async fn delivered_to(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.delivered)
            .map(|m| m.phone.clone())
            .collect()
    }
}

#[async_trait]
impl MessageTransport for RecordingTransport {
    async fn send(&self, phone_number: &str, body: &str, template: &str) -> DeliveryReceipt {
        let fail = self.fail_numbers.lock().await.contains(phone_number);
        self.sent.lock().await.push(SentMessage {
            phone: phone_number.to_string(),
            template: template.to_string(),
            body: body.to_string(),
            delivered: !fail,
        });
        if fail {
            DeliveryReceipt::failed("provider rejected message".to_string())
        } else {
            DeliveryReceipt::delivered(format!("test-{}", Uuid::new_v4()))
        }
    }
}
