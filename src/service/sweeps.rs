//! Periodic sweeps: shift reminders and approval-window expiry.
//!
//! Both sweeps are externally triggered (cron or explicit invocation)
//! and safe to run repeatedly. The reminder sweep is idempotent through
//! a ledger existence check — a best-effort guard, not a race-safe
//! lock. The expiry sweep is a single conditional update and needs no
//! guard at all.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::{NotificationType, templates};
use crate::error::CoordinatorError;
use crate::persistence::{CoverageStore, Directory};
use crate::transport::MessageTransport;

use super::{Outbound, send_and_record};

/// Outcome counters for one reminder sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderSweepSummary {
    /// Reminders sent (and recorded) this run.
    pub sent: usize,
    /// Shifts skipped because a reminder was already recorded.
    pub already_reminded: usize,
    /// Shifts skipped because the caregiver has no phone number.
    pub no_phone: usize,
}

/// Runs the reminder and expiry sweeps.
#[derive(Debug, Clone)]
pub struct SweepService {
    store: Arc<dyn CoverageStore>,
    directory: Arc<dyn Directory>,
    transport: Arc<dyn MessageTransport>,
    reminder_lookahead: Duration,
    approval_window: Duration,
}

impl SweepService {
    /// Creates a new sweep service.
    #[must_use]
    pub fn new(
        store: Arc<dyn CoverageStore>,
        directory: Arc<dyn Directory>,
        transport: Arc<dyn MessageTransport>,
        reminder_lookahead_days: i64,
        approval_window_hours: i64,
    ) -> Self {
        Self {
            store,
            directory,
            transport,
            reminder_lookahead: Duration::days(reminder_lookahead_days),
            approval_window: Duration::hours(approval_window_hours),
        }
    }

    /// Sends a one-time reminder to the assigned caregiver of every
    /// shift starting within the lookahead window.
    ///
    /// Idempotent: a `reminder_2_days` ledger row per (shift, caregiver)
    /// suppresses repeat sends on later runs.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    pub async fn run_reminder_sweep(&self) -> Result<ReminderSweepSummary, CoordinatorError> {
        let now = Utc::now();
        let shifts = self
            .directory
            .upcoming_assigned_shifts(now, now + self.reminder_lookahead)
            .await?;

        let mut summary = ReminderSweepSummary::default();
        for shift in shifts {
            let caregiver_id = shift.assigned_caregiver_id;
            if self
                .store
                .reminder_exists(shift.shift_id, caregiver_id)
                .await?
            {
                summary.already_reminded += 1;
                continue;
            }
            let phone = self
                .directory
                .contact(caregiver_id)
                .await?
                .and_then(|c| c.phone);
            let Some(phone) = phone else {
                tracing::debug!(caregiver = %caregiver_id, shift = %shift.shift_id, "no phone for reminder");
                summary.no_phone += 1;
                continue;
            };

            let body = templates::reminder_2_days(&shift);
            send_and_record(
                self.store.as_ref(),
                self.transport.as_ref(),
                Outbound {
                    request_id: None,
                    shift_id: shift.shift_id,
                    notification_type: NotificationType::Reminder2Days,
                    recipient_id: caregiver_id,
                    phone: &phone,
                    body,
                    template: templates::TPL_REMINDER_2_DAYS,
                },
            )
            .await?;
            summary.sent += 1;
        }

        tracing::info!(
            sent = summary.sent,
            already_reminded = summary.already_reminded,
            no_phone = summary.no_phone,
            "reminder sweep finished"
        );
        Ok(summary)
    }

    /// Expires every pending request older than the approval window
    /// (the "expires in 24 hours" promise in the approval message).
    ///
    /// Returns the number of requests expired.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    pub async fn run_expiry_sweep(&self) -> Result<u64, CoordinatorError> {
        let cutoff = Utc::now() - self.approval_window;
        let expired = self.store.expire_pending_requests(cutoff).await?;
        if expired > 0 {
            tracing::info!(expired, "expired unanswered coverage requests");
        }
        Ok(expired)
    }
}
