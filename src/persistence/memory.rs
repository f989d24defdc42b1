//! In-memory store for tests and local development.
//!
//! All workflow and directory data lives in maps behind a single
//! [`tokio::sync::RwLock`]; every guarded operation runs under one write
//! lock, which gives the same atomicity the Postgres store gets from
//! single conditional statements.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    ClaimId, ClaimStatus, Contact, CoverageClaim, CoverageRequest, MessageLogEntry,
    NotificationRecord, RequestId, RequestStatus, ShiftDetail, TeamMember,
};
use crate::error::CoordinatorError;

use super::{CoverageStore, Directory};

#[derive(Debug, Default)]
struct Inner {
    requests: HashMap<RequestId, CoverageRequest>,
    claims: HashMap<ClaimId, CoverageClaim>,
    notifications: Vec<NotificationRecord>,
    messages: Vec<MessageLogEntry>,
    shifts: HashMap<Uuid, ShiftDetail>,
    plans: HashMap<Uuid, String>,
    teams: HashMap<Uuid, Vec<TeamMember>>,
    contacts: HashMap<Uuid, Contact>,
}

impl Inner {
    /// A claim in `PendingFamilyConfirmation` or `Confirmed` blocks
    /// further claims on its request.
    fn request_has_blocking_claim(&self, request_id: RequestId) -> bool {
        self.claims.values().any(|c| {
            c.request_id == request_id
                && matches!(
                    c.status,
                    ClaimStatus::PendingFamilyConfirmation | ClaimStatus::Confirmed
                )
        })
    }

    fn request_has_confirmed_claim(&self, request_id: RequestId) -> bool {
        self.claims
            .values()
            .any(|c| c.request_id == request_id && c.status == ClaimStatus::Confirmed)
    }

    /// Open means pending, or approved without a confirmed claim.
    fn request_is_open(&self, request: &CoverageRequest) -> bool {
        match request.status {
            RequestStatus::PendingFamilyApproval => true,
            RequestStatus::Approved => !self.request_has_confirmed_claim(request.id),
            RequestStatus::Denied | RequestStatus::Expired => false,
        }
    }

    fn family_owner_of(&self, shift_id: Uuid) -> Option<Uuid> {
        self.shifts.get(&shift_id).map(|s| s.family_owner_id)
    }
}

/// In-memory implementation of [`CoverageStore`] and [`Directory`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a shift, registering its care plan's title as well.
    pub async fn seed_shift(&self, shift: ShiftDetail) {
        let mut inner = self.inner.write().await;
        inner
            .plans
            .insert(shift.care_plan_id, shift.care_plan_title.clone());
        inner.shifts.insert(shift.shift_id, shift);
    }

    /// Seeds a care plan title without any shifts.
    pub async fn seed_care_plan(&self, care_plan_id: Uuid, title: &str) {
        let mut inner = self.inner.write().await;
        inner.plans.insert(care_plan_id, title.to_string());
    }

    /// Seeds an active care-team member and their contact entry.
    pub async fn seed_team_member(&self, care_plan_id: Uuid, member: TeamMember) {
        let mut inner = self.inner.write().await;
        inner.contacts.insert(
            member.user_id,
            Contact {
                user_id: member.user_id,
                display_name: member.display_name.clone(),
                phone: member.phone.clone(),
            },
        );
        inner.teams.entry(care_plan_id).or_default().push(member);
    }

    /// Seeds a standalone contact (e.g. a family owner).
    pub async fn seed_contact(&self, contact: Contact) {
        let mut inner = self.inner.write().await;
        inner.contacts.insert(contact.user_id, contact);
    }

    /// Snapshot of the notification ledger, oldest first.
    pub async fn notifications(&self) -> Vec<NotificationRecord> {
        self.inner.read().await.notifications.clone()
    }

    /// Snapshot of the message log, oldest first.
    pub async fn messages(&self) -> Vec<MessageLogEntry> {
        self.inner.read().await.messages.clone()
    }
}

#[async_trait]
impl CoverageStore for MemoryStore {
    async fn create_request_if_shift_open(
        &self,
        request: &CoverageRequest,
    ) -> Result<bool, CoordinatorError> {
        let mut inner = self.inner.write().await;
        let has_open = inner
            .requests
            .values()
            .filter(|r| r.shift_id == request.shift_id)
            .any(|r| inner.request_is_open(r));
        if has_open {
            return Ok(false);
        }
        inner.requests.insert(request.id, request.clone());
        Ok(true)
    }

    async fn request(&self, id: RequestId) -> Result<Option<CoverageRequest>, CoordinatorError> {
        Ok(self.inner.read().await.requests.get(&id).cloned())
    }

    async fn transition_request(
        &self,
        id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
        responded_by: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> Result<bool, CoordinatorError> {
        let mut inner = self.inner.write().await;
        let Some(request) = inner.requests.get_mut(&id) else {
            return Ok(false);
        };
        if request.status != from {
            return Ok(false);
        }
        request.status = to;
        if responded_by.is_some() {
            request.family_response_by = responded_by;
            request.family_response_at = Some(at);
        }
        Ok(true)
    }

    async fn expire_pending_requests(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, CoordinatorError> {
        let mut inner = self.inner.write().await;
        let mut expired = 0;
        for request in inner.requests.values_mut() {
            if request.status == RequestStatus::PendingFamilyApproval
                && request.requested_at < cutoff
            {
                request.status = RequestStatus::Expired;
                expired += 1;
            }
        }
        Ok(expired)
    }

    async fn insert_claim_if_open(
        &self,
        claim: &CoverageClaim,
    ) -> Result<bool, CoordinatorError> {
        let mut inner = self.inner.write().await;
        let approved = inner
            .requests
            .get(&claim.request_id)
            .is_some_and(|r| r.status == RequestStatus::Approved);
        if !approved || inner.request_has_blocking_claim(claim.request_id) {
            return Ok(false);
        }
        inner.claims.insert(claim.id, claim.clone());
        Ok(true)
    }

    async fn claim(&self, id: ClaimId) -> Result<Option<CoverageClaim>, CoordinatorError> {
        Ok(self.inner.read().await.claims.get(&id).cloned())
    }

    async fn request_has_blocking_claim(
        &self,
        request_id: RequestId,
    ) -> Result<bool, CoordinatorError> {
        Ok(self
            .inner
            .read()
            .await
            .request_has_blocking_claim(request_id))
    }

    async fn transition_claim(
        &self,
        id: ClaimId,
        from: ClaimStatus,
        to: ClaimStatus,
        responded_by: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> Result<bool, CoordinatorError> {
        let mut inner = self.inner.write().await;
        let Some(claim) = inner.claims.get_mut(&id) else {
            return Ok(false);
        };
        if claim.status != from {
            return Ok(false);
        }
        claim.status = to;
        if responded_by.is_some() {
            claim.family_confirmed_by = responded_by;
            claim.family_confirmed_at = Some(at);
        }
        Ok(true)
    }

    async fn latest_pending_approval_for_owner(
        &self,
        family_owner_id: Uuid,
        token: Option<&str>,
    ) -> Result<Option<CoverageRequest>, CoordinatorError> {
        let inner = self.inner.read().await;
        Ok(inner
            .requests
            .values()
            .filter(|r| r.status == RequestStatus::PendingFamilyApproval)
            .filter(|r| inner.family_owner_of(r.shift_id) == Some(family_owner_id))
            .filter(|r| token.is_none_or(|t| r.id.matches_token(t)))
            .max_by_key(|r| r.requested_at)
            .cloned())
    }

    async fn latest_claimable_request_for_member(
        &self,
        member_id: Uuid,
        token: Option<&str>,
    ) -> Result<Option<CoverageRequest>, CoordinatorError> {
        let inner = self.inner.read().await;
        Ok(inner
            .requests
            .values()
            .filter(|r| r.status == RequestStatus::Approved)
            .filter(|r| r.requesting_caregiver_id != member_id)
            .filter(|r| !inner.request_has_blocking_claim(r.id))
            .filter(|r| {
                inner
                    .shifts
                    .get(&r.shift_id)
                    .and_then(|s| inner.teams.get(&s.care_plan_id))
                    .is_some_and(|team| team.iter().any(|m| m.user_id == member_id))
            })
            .filter(|r| token.is_none_or(|t| r.id.matches_token(t)))
            .max_by_key(|r| r.requested_at)
            .cloned())
    }

    async fn latest_pending_claim_for_owner(
        &self,
        family_owner_id: Uuid,
        token: Option<&str>,
    ) -> Result<Option<CoverageClaim>, CoordinatorError> {
        let inner = self.inner.read().await;
        Ok(inner
            .claims
            .values()
            .filter(|c| c.status == ClaimStatus::PendingFamilyConfirmation)
            .filter(|c| {
                inner
                    .requests
                    .get(&c.request_id)
                    .and_then(|r| inner.family_owner_of(r.shift_id))
                    == Some(family_owner_id)
            })
            .filter(|c| token.is_none_or(|t| c.id.matches_token(t)))
            .max_by_key(|c| c.claimed_at)
            .cloned())
    }

    async fn record_notification(
        &self,
        record: &NotificationRecord,
    ) -> Result<(), CoordinatorError> {
        self.inner.write().await.notifications.push(record.clone());
        Ok(())
    }

    async fn reminder_exists(
        &self,
        shift_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<bool, CoordinatorError> {
        use crate::domain::NotificationType;
        Ok(self.inner.read().await.notifications.iter().any(|n| {
            n.notification_type == NotificationType::Reminder2Days
                && n.shift_id == shift_id
                && n.recipient_id == recipient_id
        }))
    }

    async fn log_message(&self, entry: &MessageLogEntry) -> Result<(), CoordinatorError> {
        self.inner.write().await.messages.push(entry.clone());
        Ok(())
    }

    async fn mark_message_processed(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, CoordinatorError> {
        let mut inner = self.inner.write().await;
        let Some(entry) = inner.messages.iter_mut().find(|m| m.id == id) else {
            return Ok(false);
        };
        entry.processed = true;
        entry.processed_at = Some(at);
        Ok(true)
    }
}

#[async_trait]
impl Directory for MemoryStore {
    async fn shift(&self, shift_id: Uuid) -> Result<Option<ShiftDetail>, CoordinatorError> {
        Ok(self.inner.read().await.shifts.get(&shift_id).cloned())
    }

    async fn care_plan_title(
        &self,
        care_plan_id: Uuid,
    ) -> Result<Option<String>, CoordinatorError> {
        Ok(self.inner.read().await.plans.get(&care_plan_id).cloned())
    }

    async fn active_team_members(
        &self,
        care_plan_id: Uuid,
    ) -> Result<Vec<TeamMember>, CoordinatorError> {
        Ok(self
            .inner
            .read()
            .await
            .teams
            .get(&care_plan_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn contact(&self, user_id: Uuid) -> Result<Option<Contact>, CoordinatorError> {
        Ok(self.inner.read().await.contacts.get(&user_id).cloned())
    }

    async fn user_by_phone(&self, phone: &str) -> Result<Option<Contact>, CoordinatorError> {
        Ok(self
            .inner
            .read()
            .await
            .contacts
            .values()
            .find(|c| c.phone.as_deref() == Some(phone))
            .cloned())
    }

    async fn upcoming_assigned_shifts(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<ShiftDetail>, CoordinatorError> {
        let inner = self.inner.read().await;
        let mut shifts: Vec<ShiftDetail> = inner
            .shifts
            .values()
            .filter(|s| s.starts_at >= from && s.starts_at < until)
            .cloned()
            .collect();
        shifts.sort_by_key(|s| s.starts_at);
        Ok(shifts)
    }

    async fn reassign_shift(
        &self,
        shift_id: Uuid,
        new_caregiver_id: Uuid,
    ) -> Result<(), CoordinatorError> {
        let mut inner = self.inner.write().await;
        let Some(shift) = inner.shifts.get_mut(&shift_id) else {
            return Err(CoordinatorError::ShiftNotFound(shift_id));
        };
        shift.assigned_caregiver_id = new_caregiver_id;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_shift(family_owner_id: Uuid, caregiver_id: Uuid) -> ShiftDetail {
        ShiftDetail {
            shift_id: Uuid::new_v4(),
            care_plan_id: Uuid::new_v4(),
            title: "Evening care".to_string(),
            starts_at: Utc::now() + chrono::Duration::days(3),
            ends_at: Utc::now() + chrono::Duration::days(3) + chrono::Duration::hours(4),
            location: None,
            assigned_caregiver_id: caregiver_id,
            family_owner_id,
            care_plan_title: "Plan".to_string(),
        }
    }

    #[tokio::test]
    async fn second_open_request_for_same_shift_is_rejected() {
        let store = MemoryStore::new();
        let shift = make_shift(Uuid::new_v4(), Uuid::new_v4());
        store.seed_shift(shift.clone()).await;

        let first = CoverageRequest::new(
            shift.shift_id,
            shift.assigned_caregiver_id,
            "sick".to_string(),
            None,
        );
        let second = CoverageRequest::new(
            shift.shift_id,
            shift.assigned_caregiver_id,
            "sick again".to_string(),
            None,
        );

        assert_eq!(store.create_request_if_shift_open(&first).await.ok(), Some(true));
        assert_eq!(store.create_request_if_shift_open(&second).await.ok(), Some(false));
    }

    #[tokio::test]
    async fn denied_request_frees_the_shift() {
        let store = MemoryStore::new();
        let shift = make_shift(Uuid::new_v4(), Uuid::new_v4());
        store.seed_shift(shift.clone()).await;

        let first = CoverageRequest::new(
            shift.shift_id,
            shift.assigned_caregiver_id,
            "sick".to_string(),
            None,
        );
        let _ = store.create_request_if_shift_open(&first).await;
        let transitioned = store
            .transition_request(
                first.id,
                RequestStatus::PendingFamilyApproval,
                RequestStatus::Denied,
                Some(shift.family_owner_id),
                Utc::now(),
            )
            .await;
        assert_eq!(transitioned.ok(), Some(true));

        let retry = CoverageRequest::new(
            shift.shift_id,
            shift.assigned_caregiver_id,
            "retry".to_string(),
            None,
        );
        assert_eq!(store.create_request_if_shift_open(&retry).await.ok(), Some(true));
    }

    #[tokio::test]
    async fn transition_from_wrong_state_is_refused() {
        let store = MemoryStore::new();
        let shift = make_shift(Uuid::new_v4(), Uuid::new_v4());
        store.seed_shift(shift.clone()).await;
        let request = CoverageRequest::new(
            shift.shift_id,
            shift.assigned_caregiver_id,
            "sick".to_string(),
            None,
        );
        let _ = store.create_request_if_shift_open(&request).await;

        // Approved -> Denied requires the request to already be approved.
        let refused = store
            .transition_request(
                request.id,
                RequestStatus::Approved,
                RequestStatus::Denied,
                None,
                Utc::now(),
            )
            .await;
        assert_eq!(refused.ok(), Some(false));

        let Ok(Some(stored)) = store.request(request.id).await else {
            panic!("request missing");
        };
        assert_eq!(stored.status, RequestStatus::PendingFamilyApproval);
    }

    #[tokio::test]
    async fn only_one_claim_wins() {
        let store = MemoryStore::new();
        let shift = make_shift(Uuid::new_v4(), Uuid::new_v4());
        store.seed_shift(shift.clone()).await;
        let request = CoverageRequest::new(
            shift.shift_id,
            shift.assigned_caregiver_id,
            "sick".to_string(),
            None,
        );
        let _ = store.create_request_if_shift_open(&request).await;
        let _ = store
            .transition_request(
                request.id,
                RequestStatus::PendingFamilyApproval,
                RequestStatus::Approved,
                Some(shift.family_owner_id),
                Utc::now(),
            )
            .await;

        let first = CoverageClaim::new(request.id, Uuid::new_v4());
        let second = CoverageClaim::new(request.id, Uuid::new_v4());
        assert_eq!(store.insert_claim_if_open(&first).await.ok(), Some(true));
        assert_eq!(store.insert_claim_if_open(&second).await.ok(), Some(false));
    }

    #[tokio::test]
    async fn declined_claim_reopens_request_for_claims() {
        let store = MemoryStore::new();
        let shift = make_shift(Uuid::new_v4(), Uuid::new_v4());
        store.seed_shift(shift.clone()).await;
        let request = CoverageRequest::new(
            shift.shift_id,
            shift.assigned_caregiver_id,
            "sick".to_string(),
            None,
        );
        let _ = store.create_request_if_shift_open(&request).await;
        let _ = store
            .transition_request(
                request.id,
                RequestStatus::PendingFamilyApproval,
                RequestStatus::Approved,
                None,
                Utc::now(),
            )
            .await;

        let first = CoverageClaim::new(request.id, Uuid::new_v4());
        let _ = store.insert_claim_if_open(&first).await;
        let _ = store
            .transition_claim(
                first.id,
                ClaimStatus::PendingFamilyConfirmation,
                ClaimStatus::Declined,
                Some(shift.family_owner_id),
                Utc::now(),
            )
            .await;

        let second = CoverageClaim::new(request.id, Uuid::new_v4());
        assert_eq!(store.insert_claim_if_open(&second).await.ok(), Some(true));
    }

    #[tokio::test]
    async fn confirmed_claim_blocks_new_requests_for_shift() {
        let store = MemoryStore::new();
        let shift = make_shift(Uuid::new_v4(), Uuid::new_v4());
        store.seed_shift(shift.clone()).await;
        let request = CoverageRequest::new(
            shift.shift_id,
            shift.assigned_caregiver_id,
            "sick".to_string(),
            None,
        );
        let _ = store.create_request_if_shift_open(&request).await;
        let _ = store
            .transition_request(
                request.id,
                RequestStatus::PendingFamilyApproval,
                RequestStatus::Approved,
                None,
                Utc::now(),
            )
            .await;
        let claim = CoverageClaim::new(request.id, Uuid::new_v4());
        let _ = store.insert_claim_if_open(&claim).await;
        let _ = store
            .transition_claim(
                claim.id,
                ClaimStatus::PendingFamilyConfirmation,
                ClaimStatus::Confirmed,
                Some(shift.family_owner_id),
                Utc::now(),
            )
            .await;

        // The request row still reads `approved`, but the confirmed claim
        // makes it terminal: a fresh request for the shift is allowed.
        let fresh = CoverageRequest::new(
            shift.shift_id,
            shift.assigned_caregiver_id,
            "new week".to_string(),
            None,
        );
        assert_eq!(store.create_request_if_shift_open(&fresh).await.ok(), Some(true));

        // And no further claim can land on the finished request.
        let late = CoverageClaim::new(request.id, Uuid::new_v4());
        assert_eq!(store.insert_claim_if_open(&late).await.ok(), Some(false));
    }

    #[tokio::test]
    async fn expiry_sweep_only_touches_old_pending_requests() {
        let store = MemoryStore::new();
        let shift_a = make_shift(Uuid::new_v4(), Uuid::new_v4());
        let shift_b = make_shift(Uuid::new_v4(), Uuid::new_v4());
        store.seed_shift(shift_a.clone()).await;
        store.seed_shift(shift_b.clone()).await;

        let mut old = CoverageRequest::new(
            shift_a.shift_id,
            shift_a.assigned_caregiver_id,
            "sick".to_string(),
            None,
        );
        old.requested_at = Utc::now() - chrono::Duration::hours(30);
        let fresh = CoverageRequest::new(
            shift_b.shift_id,
            shift_b.assigned_caregiver_id,
            "sick".to_string(),
            None,
        );
        let _ = store.create_request_if_shift_open(&old).await;
        let _ = store.create_request_if_shift_open(&fresh).await;

        let cutoff = Utc::now() - chrono::Duration::hours(24);
        assert_eq!(store.expire_pending_requests(cutoff).await.ok(), Some(1));

        let Ok(Some(expired)) = store.request(old.id).await else {
            panic!("request missing");
        };
        assert_eq!(expired.status, RequestStatus::Expired);
        let Ok(Some(kept)) = store.request(fresh.id).await else {
            panic!("request missing");
        };
        assert_eq!(kept.status, RequestStatus::PendingFamilyApproval);
    }

    #[tokio::test]
    async fn latest_pending_approval_prefers_most_recent_and_honors_token() {
        let store = MemoryStore::new();
        let family = Uuid::new_v4();
        let shift_a = make_shift(family, Uuid::new_v4());
        let shift_b = make_shift(family, Uuid::new_v4());
        store.seed_shift(shift_a.clone()).await;
        store.seed_shift(shift_b.clone()).await;

        let mut older = CoverageRequest::new(
            shift_a.shift_id,
            shift_a.assigned_caregiver_id,
            "a".to_string(),
            None,
        );
        older.requested_at = Utc::now() - chrono::Duration::hours(2);
        let newer = CoverageRequest::new(
            shift_b.shift_id,
            shift_b.assigned_caregiver_id,
            "b".to_string(),
            None,
        );
        let _ = store.create_request_if_shift_open(&older).await;
        let _ = store.create_request_if_shift_open(&newer).await;

        let Ok(Some(found)) = store.latest_pending_approval_for_owner(family, None).await else {
            panic!("no pending request");
        };
        assert_eq!(found.id, newer.id);

        let token = older.id.ref_token();
        let Ok(Some(by_token)) = store
            .latest_pending_approval_for_owner(family, Some(&token))
            .await
        else {
            panic!("token lookup failed");
        };
        assert_eq!(by_token.id, older.id);
    }
}
