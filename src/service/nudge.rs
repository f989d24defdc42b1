//! Nudge broadcaster: generic user nudges, schedule-update broadcasts,
//! and emergency coverage broadcasts.
//!
//! Nudges are outbound messages unrelated to the coverage workflow, so
//! they write no notification-ledger rows. Every send is logged to the
//! message log, with an additional "assistant nudge" entry per
//! recipient so the in-app assistant history mirrors what went out.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Contact, MessageDirection, MessageLogEntry, templates};
use crate::error::CoordinatorError;
use crate::persistence::{CoverageStore, Directory};
use crate::transport::MessageTransport;

/// Message-log classifier for the per-recipient assistant entry.
const ASSISTANT_NUDGE_TYPE: &str = "assistant_nudge";

/// Cadence of a schedule-update broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulePeriod {
    /// Weekly schedule.
    Weekly,
    /// Every two weeks.
    Biweekly,
    /// Monthly schedule.
    Monthly,
}

impl SchedulePeriod {
    /// Returns the wire/string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }

    /// Parses the wire form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "weekly" => Some(Self::Weekly),
            "biweekly" => Some(Self::Biweekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

/// Which family of nudge to send.
#[derive(Debug, Clone)]
pub enum NudgeKind {
    /// One-off nudge to the targeted users, with an optional custom
    /// body.
    Generic {
        /// Body override; falls back to a canned check-in text.
        custom_message: Option<String>,
    },
    /// Schedule-change broadcast to the active care team of a plan.
    ScheduleUpdate {
        /// Care plan whose team is notified.
        care_plan_id: Uuid,
        /// Cadence named in the message body.
        period: SchedulePeriod,
    },
    /// Urgent shift-coverage broadcast to the active care team.
    EmergencyCoverage {
        /// Care plan whose team is notified.
        care_plan_id: Uuid,
        /// Pre-rendered summary of the uncovered shift.
        shift_summary: String,
    },
}

impl NudgeKind {
    /// Message-log classifier for this kind.
    #[must_use]
    pub const fn message_type(&self) -> &'static str {
        match self {
            Self::Generic { .. } => "nudge",
            Self::ScheduleUpdate { .. } => "schedule_update",
            Self::EmergencyCoverage { .. } => "emergency_coverage",
        }
    }
}

/// Outcome counters for one nudge invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NudgeSummary {
    /// Messages the transport acknowledged.
    pub sent: usize,
    /// Messages the transport rejected.
    pub failed: usize,
    /// Recipients skipped (unknown user or no phone number).
    pub skipped: usize,
}

/// Sends nudge messages outside the coverage workflow.
#[derive(Debug, Clone)]
pub struct NudgeService {
    store: Arc<dyn CoverageStore>,
    directory: Arc<dyn Directory>,
    transport: Arc<dyn MessageTransport>,
}

impl NudgeService {
    /// Creates a new nudge service.
    #[must_use]
    pub fn new(
        store: Arc<dyn CoverageStore>,
        directory: Arc<dyn Directory>,
        transport: Arc<dyn MessageTransport>,
    ) -> Self {
        Self {
            store,
            directory,
            transport,
        }
    }

    /// Sends one nudge family to its recipients.
    ///
    /// Generic nudges go to `target_users`; schedule and emergency
    /// broadcasts go to the active care team of their plan. Each
    /// recipient is attempted independently.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    pub async fn send_nudges(
        &self,
        target_users: &[Uuid],
        kind: NudgeKind,
    ) -> Result<NudgeSummary, CoordinatorError> {
        let recipients = self.resolve_recipients(target_users, &kind).await?;

        let mut summary = NudgeSummary {
            skipped: recipients.skipped,
            ..NudgeSummary::default()
        };
        for contact in recipients.contacts {
            let Some(phone) = contact.phone.as_deref() else {
                tracing::debug!(user = %contact.user_id, "nudge recipient has no phone");
                summary.skipped += 1;
                continue;
            };
            let body = self.render_body(&kind, &contact).await?;
            let receipt = self.transport.send(phone, &body, kind.message_type()).await;
            if receipt.delivered {
                summary.sent += 1;
            } else {
                tracing::warn!(
                    user = %contact.user_id,
                    error = receipt.error.as_deref().unwrap_or("unknown"),
                    "nudge send failed"
                );
                summary.failed += 1;
            }

            for message_type in [kind.message_type(), ASSISTANT_NUDGE_TYPE] {
                self.store
                    .log_message(&MessageLogEntry {
                        id: Uuid::new_v4(),
                        phone_number: phone.to_string(),
                        user_id: Some(contact.user_id),
                        direction: MessageDirection::Outgoing,
                        message_type: message_type.to_string(),
                        content: body.clone(),
                        processed: false,
                        processed_at: None,
                    })
                    .await?;
            }
        }

        tracing::info!(
            kind = kind.message_type(),
            sent = summary.sent,
            failed = summary.failed,
            skipped = summary.skipped,
            "nudge batch finished"
        );
        Ok(summary)
    }

    async fn resolve_recipients(
        &self,
        target_users: &[Uuid],
        kind: &NudgeKind,
    ) -> Result<Recipients, CoordinatorError> {
        match kind {
            NudgeKind::Generic { .. } => {
                let mut contacts = Vec::with_capacity(target_users.len());
                let mut skipped = 0;
                for user_id in target_users {
                    match self.directory.contact(*user_id).await? {
                        Some(contact) => contacts.push(contact),
                        None => {
                            tracing::debug!(user = %user_id, "nudge target is not a known user");
                            skipped += 1;
                        }
                    }
                }
                Ok(Recipients { contacts, skipped })
            }
            NudgeKind::ScheduleUpdate { care_plan_id, .. }
            | NudgeKind::EmergencyCoverage { care_plan_id, .. } => {
                let contacts = self
                    .directory
                    .active_team_members(*care_plan_id)
                    .await?
                    .into_iter()
                    .map(|m| Contact {
                        user_id: m.user_id,
                        display_name: m.display_name,
                        phone: m.phone,
                    })
                    .collect();
                Ok(Recipients {
                    contacts,
                    skipped: 0,
                })
            }
        }
    }

    async fn render_body(
        &self,
        kind: &NudgeKind,
        contact: &Contact,
    ) -> Result<String, CoordinatorError> {
        Ok(match kind {
            NudgeKind::Generic { custom_message } => custom_message
                .clone()
                .unwrap_or_else(|| templates::nudge_default(&contact.display_name)),
            NudgeKind::ScheduleUpdate {
                care_plan_id,
                period,
            } => {
                let title = self.plan_title(*care_plan_id).await?;
                templates::schedule_update(&title, period.as_str())
            }
            NudgeKind::EmergencyCoverage {
                care_plan_id,
                shift_summary,
            } => {
                let title = self.plan_title(*care_plan_id).await?;
                templates::emergency_coverage(&title, shift_summary)
            }
        })
    }

    async fn plan_title(&self, care_plan_id: Uuid) -> Result<String, CoordinatorError> {
        Ok(self
            .directory
            .care_plan_title(care_plan_id)
            .await?
            .unwrap_or_else(|| "your care plan".to_string()))
    }
}

struct Recipients {
    contacts: Vec<Contact>,
    skipped: usize,
}
