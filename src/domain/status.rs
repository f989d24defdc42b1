//! Lifecycle status enums for the coverage workflow.
//!
//! Statuses are persisted as lowercase snake-case strings; every enum
//! exposes `as_str` / `parse` so the Postgres store can round-trip rows
//! without a custom sqlx type mapping.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a [`super::CoverageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Waiting for the family to reply APPROVE or DENY.
    PendingFamilyApproval,
    /// Family approved; the open shift is broadcast and claimable.
    Approved,
    /// Family denied the request (terminal).
    Denied,
    /// The 24-hour approval window elapsed without a reply (terminal).
    Expired,
}

impl RequestStatus {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingFamilyApproval => "pending_family_approval",
            Self::Approved => "approved",
            Self::Denied => "denied",
            Self::Expired => "expired",
        }
    }

    /// Parses the stored string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_family_approval" => Some(Self::PendingFamilyApproval),
            "approved" => Some(Self::Approved),
            "denied" => Some(Self::Denied),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

/// Lifecycle status of a [`super::CoverageClaim`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Waiting for the family to reply CONFIRM or DECLINE.
    PendingFamilyConfirmation,
    /// Family confirmed; the shift is reassigned to the claimant (terminal).
    Confirmed,
    /// Family declined; the parent request reopens for new claims (terminal).
    Declined,
}

impl ClaimStatus {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingFamilyConfirmation => "pending_family_confirmation",
            Self::Confirmed => "confirmed",
            Self::Declined => "declined",
        }
    }

    /// Parses the stored string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_family_confirmation" => Some(Self::PendingFamilyConfirmation),
            "confirmed" => Some(Self::Confirmed),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }
}

/// Kind of an outbound workflow notification, recorded in the
/// notification ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// Initial approval request sent to the family.
    TimeOffRequest,
    /// Open-shift broadcast sent to eligible team members.
    CoverageAvailable,
    /// Claim notice sent to the family for confirmation.
    CoverageClaimed,
    /// One-time reminder for a shift starting within two days.
    Reminder2Days,
}

impl NotificationType {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TimeOffRequest => "time_off_request",
            Self::CoverageAvailable => "coverage_available",
            Self::CoverageClaimed => "coverage_claimed",
            Self::Reminder2Days => "reminder_2_days",
        }
    }

    /// Parses the stored string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "time_off_request" => Some(Self::TimeOffRequest),
            "coverage_available" => Some(Self::CoverageAvailable),
            "coverage_claimed" => Some(Self::CoverageClaimed),
            "reminder_2_days" => Some(Self::Reminder2Days),
            _ => None,
        }
    }
}

/// Direction of a message-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageDirection {
    /// Received from a phone number over the messaging channel.
    Incoming,
    /// Sent by this service.
    Outgoing,
}

impl MessageDirection {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
        }
    }

    /// Parses the stored string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "incoming" => Some(Self::Incoming),
            "outgoing" => Some(Self::Outgoing),
            _ => None,
        }
    }
}

/// Outcome of a transport send attempt, as recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// The transport acknowledged the send.
    Sent,
    /// The transport reported a failure for this recipient.
    Failed,
}

impl DeliveryStatus {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }

    /// Parses the stored string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sent" => Some(Self::Sent),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
