//! Persistence layer: guarded workflow store and collaborator directory.
//!
//! [`CoverageStore`] owns the four workflow tables (requests, claims,
//! notification ledger, message log). Every state transition is a single
//! atomic conditional write — "transition iff the current status
//! matches" — because concurrent serverless invocations are the only
//! concurrency model and the transport gives no ordering guarantees.
//! A transition returning `false` means the entity was not in the
//! expected source state; callers treat that as a stale reply, not an
//! error.
//!
//! [`Directory`] is the read contract over collaborator-owned data
//! (shifts, care teams, user profiles) plus the one write-side
//! collaborator call, shift reassignment on a confirmed claim.
//!
//! Two implementations: [`memory::MemoryStore`] (tests, local runs) and
//! [`postgres::PgStore`] (production).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    ClaimId, ClaimStatus, Contact, CoverageClaim, CoverageRequest, MessageLogEntry,
    NotificationRecord, RequestId, RequestStatus, ShiftDetail, TeamMember,
};
use crate::error::CoordinatorError;

/// Guarded store for the coverage workflow entities.
///
/// No other component may write status fields; all mutation goes through
/// these conditional operations.
#[async_trait]
pub trait CoverageStore: Send + Sync + std::fmt::Debug {
    /// Inserts a new request iff its shift has no open request.
    ///
    /// "Open" means `PendingFamilyApproval`, or `Approved` without a
    /// confirmed claim. Returns `false` (without inserting) when an open
    /// request already exists. The check-and-insert is atomic.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn create_request_if_shift_open(
        &self,
        request: &CoverageRequest,
    ) -> Result<bool, CoordinatorError>;

    /// Loads a request by id.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn request(&self, id: RequestId) -> Result<Option<CoverageRequest>, CoordinatorError>;

    /// Transitions a request `from -> to` iff its current status is
    /// `from`, recording the family responder when given.
    ///
    /// Returns `true` when the row was transitioned, `false` when the
    /// request was missing or not in the source state (stale reply).
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn transition_request(
        &self,
        id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
        responded_by: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> Result<bool, CoordinatorError>;

    /// Marks every `PendingFamilyApproval` request submitted before
    /// `cutoff` as `Expired`, returning how many were expired.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn expire_pending_requests(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, CoordinatorError>;

    /// Inserts a claim iff its parent request is `Approved` and carries
    /// no pending or confirmed claim. First writer wins; the
    /// check-and-insert is atomic so two concurrent claims cannot both
    /// succeed.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn insert_claim_if_open(
        &self,
        claim: &CoverageClaim,
    ) -> Result<bool, CoordinatorError>;

    /// Loads a claim by id.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn claim(&self, id: ClaimId) -> Result<Option<CoverageClaim>, CoordinatorError>;

    /// Whether the request carries a live (pending or confirmed) claim.
    ///
    /// The same condition that blocks [`Self::insert_claim_if_open`];
    /// exposed so callers can refuse other side-effecting operations on
    /// a request that is already spoken for.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn request_has_blocking_claim(
        &self,
        request_id: RequestId,
    ) -> Result<bool, CoordinatorError>;

    /// Transitions a claim `from -> to` iff its current status is
    /// `from`, recording the family responder when given.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn transition_claim(
        &self,
        id: ClaimId,
        from: ClaimStatus,
        to: ClaimStatus,
        responded_by: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> Result<bool, CoordinatorError>;

    /// Most recent `PendingFamilyApproval` request whose shift is owned
    /// by `family_owner_id`, optionally narrowed to a reference token.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn latest_pending_approval_for_owner(
        &self,
        family_owner_id: Uuid,
        token: Option<&str>,
    ) -> Result<Option<CoverageRequest>, CoordinatorError>;

    /// Most recent claimable request for a care-team member: `Approved`,
    /// no pending/confirmed claim, on a care plan where the member is
    /// active, and not the member's own request. Optionally narrowed to
    /// a reference token.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn latest_claimable_request_for_member(
        &self,
        member_id: Uuid,
        token: Option<&str>,
    ) -> Result<Option<CoverageRequest>, CoordinatorError>;

    /// Most recent `PendingFamilyConfirmation` claim whose shift is
    /// owned by `family_owner_id`, optionally narrowed to a reference
    /// token.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn latest_pending_claim_for_owner(
        &self,
        family_owner_id: Uuid,
        token: Option<&str>,
    ) -> Result<Option<CoverageClaim>, CoordinatorError>;

    /// Appends a row to the notification ledger.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn record_notification(
        &self,
        record: &NotificationRecord,
    ) -> Result<(), CoordinatorError>;

    /// Whether a `Reminder2Days` ledger row exists for this
    /// (shift, recipient) pair. Best-effort idempotency guard for the
    /// reminder sweep.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn reminder_exists(
        &self,
        shift_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<bool, CoordinatorError>;

    /// Appends a row to the message log.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn log_message(&self, entry: &MessageLogEntry) -> Result<(), CoordinatorError>;

    /// Marks a logged inbound message as processed.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn mark_message_processed(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, CoordinatorError>;
}

/// Read contract over collaborator-owned scheduling and profile data,
/// plus the shift-reassignment collaborator call.
#[async_trait]
pub trait Directory: Send + Sync + std::fmt::Debug {
    /// Loads a shift with its care-plan and family-owner context.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn shift(&self, shift_id: Uuid) -> Result<Option<ShiftDetail>, CoordinatorError>;

    /// Title of a care plan, for broadcast message bodies.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn care_plan_title(&self, care_plan_id: Uuid) -> Result<Option<String>, CoordinatorError>;

    /// Active care-team members of a care plan.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn active_team_members(
        &self,
        care_plan_id: Uuid,
    ) -> Result<Vec<TeamMember>, CoordinatorError>;

    /// Messaging identity for a user.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn contact(&self, user_id: Uuid) -> Result<Option<Contact>, CoordinatorError>;

    /// Resolves a phone number to a known user, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn user_by_phone(&self, phone: &str) -> Result<Option<Contact>, CoordinatorError>;

    /// Assigned shifts starting in `[from, until)`, for the reminder
    /// sweep.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    async fn upcoming_assigned_shifts(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<ShiftDetail>, CoordinatorError>;

    /// Reassigns a shift to a new caregiver. Invoked as a side effect of
    /// a confirmed claim; the shift row itself is collaborator-owned.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure, or
    /// [`CoordinatorError::ShiftNotFound`] when the shift is gone.
    async fn reassign_shift(
        &self,
        shift_id: Uuid,
        new_caregiver_id: Uuid,
    ) -> Result<(), CoordinatorError>;
}
