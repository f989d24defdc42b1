//! The shift-coverage state machine.
//!
//! Orchestrates the request → approve/deny → broadcast → claim →
//! confirm/decline lifecycle. Every mutation follows the pattern:
//! conditional store transition → side-effect notifications → tracing.
//! A failed guard is a stale reply ([`TransitionOutcome::Stale`]), never
//! an error.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    ClaimId, ClaimStatus, CoverageClaim, CoverageRequest, NotificationType, RequestId,
    RequestStatus, ShiftDetail, templates,
};
use crate::error::CoordinatorError;
use crate::persistence::{CoverageStore, Directory};
use crate::transport::MessageTransport;

use super::{Outbound, TransitionOutcome, send_and_record};

/// Orchestration layer for the coverage workflow.
///
/// Stateless coordinator: owns references to the guarded store, the
/// collaborator directory, and the message transport.
#[derive(Debug, Clone)]
pub struct CoverageService {
    store: Arc<dyn CoverageStore>,
    directory: Arc<dyn Directory>,
    transport: Arc<dyn MessageTransport>,
}

impl CoverageService {
    /// Creates a new `CoverageService`.
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

    async fn load_shift(&self, shift_id: Uuid) -> Result<ShiftDetail, CoordinatorError> {
        self.directory
            .shift(shift_id)
            .await?
            .ok_or(CoordinatorError::ShiftNotFound(shift_id))
    }

    async fn display_name(&self, user_id: Uuid) -> Result<String, CoordinatorError> {
        Ok(self
            .directory
            .contact(user_id)
            .await?
            .map_or_else(|| "A team member".to_string(), |c| c.display_name))
    }

    /// Sends one notification to the shift's family owner, recording
    /// the attempt. Owners without a phone number are skipped with a
    /// warning.
    async fn notify_family(
        &self,
        shift: &ShiftDetail,
        request_id: RequestId,
        notification_type: NotificationType,
        body: String,
        template: &str,
    ) -> Result<(), CoordinatorError> {
        let Some(owner) = self.directory.contact(shift.family_owner_id).await? else {
            tracing::warn!(family_owner = %shift.family_owner_id, "family owner has no profile");
            return Ok(());
        };
        let Some(phone) = owner.phone.as_deref() else {
            tracing::warn!(family_owner = %owner.user_id, "family owner has no phone number");
            return Ok(());
        };
        send_and_record(
            self.store.as_ref(),
            self.transport.as_ref(),
            Outbound {
                request_id: Some(request_id),
                shift_id: shift.shift_id,
                notification_type,
                recipient_id: owner.user_id,
                phone,
                body,
                template,
            },
        )
        .await?;
        Ok(())
    }

    /// Creates a coverage request for a shift and notifies the family.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::ShiftNotFound`] for an unknown shift
    /// and [`CoordinatorError::Conflict`] when the shift already has an
    /// open request.
    pub async fn submit_coverage_request(
        &self,
        shift_id: Uuid,
        requesting_caregiver_id: Uuid,
        reason: String,
        message: Option<String>,
    ) -> Result<RequestId, CoordinatorError> {
        let shift = self.load_shift(shift_id).await?;
        let request = CoverageRequest::new(shift_id, requesting_caregiver_id, reason, message);

        if !self.store.create_request_if_shift_open(&request).await? {
            return Err(CoordinatorError::Conflict(format!(
                "shift {shift_id} already has an open coverage request"
            )));
        }

        tracing::info!(request_id = %request.id, %shift_id, "coverage request submitted");

        let requester_name = self.display_name(requesting_caregiver_id).await?;
        let body = templates::time_off_request(
            &shift,
            &requester_name,
            &request.reason,
            request.message.as_deref(),
            &request.id.ref_token(),
        );
        self.notify_family(
            &shift,
            request.id,
            NotificationType::TimeOffRequest,
            body,
            templates::TPL_TIME_OFF_REQUEST,
        )
        .await?;

        Ok(request.id)
    }

    /// Re-sends the approval-request notification for an existing
    /// pending request (the UI creates the row and then asks this
    /// service to notify).
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::RequestNotFound`] for an unknown id.
    pub async fn notify_family_request(
        &self,
        request_id: RequestId,
    ) -> Result<TransitionOutcome, CoordinatorError> {
        let request = self
            .store
            .request(request_id)
            .await?
            .ok_or(CoordinatorError::RequestNotFound(request_id))?;
        if request.status != RequestStatus::PendingFamilyApproval {
            tracing::info!(%request_id, status = request.status.as_str(), "notify skipped, request not pending");
            return Ok(TransitionOutcome::Stale);
        }

        let shift = self.load_shift(request.shift_id).await?;
        let requester_name = self.display_name(request.requesting_caregiver_id).await?;
        let body = templates::time_off_request(
            &shift,
            &requester_name,
            &request.reason,
            request.message.as_deref(),
            &request_id.ref_token(),
        );
        self.notify_family(
            &shift,
            request_id,
            NotificationType::TimeOffRequest,
            body,
            templates::TPL_TIME_OFF_REQUEST,
        )
        .await?;
        Ok(TransitionOutcome::Applied)
    }

    /// Records the family's APPROVE/DENY reply.
    ///
    /// Valid only while the request is `PendingFamilyApproval`; anything
    /// else is a stale reply and mutates nothing. Approval immediately
    /// broadcasts the open shift.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    pub async fn record_family_approval(
        &self,
        request_id: RequestId,
        approved: bool,
        responding_user_id: Uuid,
    ) -> Result<TransitionOutcome, CoordinatorError> {
        let to = if approved {
            RequestStatus::Approved
        } else {
            RequestStatus::Denied
        };
        let transitioned = self
            .store
            .transition_request(
                request_id,
                RequestStatus::PendingFamilyApproval,
                to,
                Some(responding_user_id),
                Utc::now(),
            )
            .await?;
        if !transitioned {
            tracing::info!(%request_id, "stale family approval reply ignored");
            return Ok(TransitionOutcome::Stale);
        }

        tracing::info!(%request_id, approved, responder = %responding_user_id, "family responded");

        if approved {
            self.broadcast_open_shift(request_id).await?;
        }
        Ok(TransitionOutcome::Applied)
    }

    /// Broadcasts an approved open shift to every active care-team
    /// member except the original requester.
    ///
    /// Valid only while the request is `Approved` with no pending or
    /// confirmed claim; anything else is a logged no-op returning 0.
    /// Each recipient is attempted independently; per-recipient
    /// transport failures are recorded and do not abort the rest. Zero
    /// eligible recipients is also a logged no-op. Returns the number
    /// of recipients attempted.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::RequestNotFound`] for an unknown id,
    /// or [`CoordinatorError::Store`] on storage failure.
    pub async fn broadcast_open_shift(
        &self,
        request_id: RequestId,
    ) -> Result<usize, CoordinatorError> {
        let request = self
            .store
            .request(request_id)
            .await?
            .ok_or(CoordinatorError::RequestNotFound(request_id))?;
        if request.status != RequestStatus::Approved {
            tracing::info!(%request_id, status = request.status.as_str(), "broadcast skipped, request not approved");
            return Ok(0);
        }
        // An approved request with a live claim is no longer open.
        if self.store.request_has_blocking_claim(request_id).await? {
            tracing::info!(%request_id, "broadcast skipped, request already has a live claim");
            return Ok(0);
        }

        let shift = self.load_shift(request.shift_id).await?;
        let requester_name = self.display_name(request.requesting_caregiver_id).await?;
        let body = templates::coverage_available(&shift, &requester_name, &request_id.ref_token());

        let members = self.directory.active_team_members(shift.care_plan_id).await?;
        let mut attempted = 0;
        for member in members {
            if member.user_id == request.requesting_caregiver_id {
                continue;
            }
            let Some(phone) = member.phone.as_deref() else {
                tracing::debug!(member = %member.user_id, "skipping member without phone");
                continue;
            };
            attempted += 1;
            send_and_record(
                self.store.as_ref(),
                self.transport.as_ref(),
                Outbound {
                    request_id: Some(request_id),
                    shift_id: shift.shift_id,
                    notification_type: NotificationType::CoverageAvailable,
                    recipient_id: member.user_id,
                    phone,
                    body: body.clone(),
                    template: templates::TPL_COVERAGE_AVAILABLE,
                },
            )
            .await?;
        }

        if attempted == 0 {
            tracing::info!(%request_id, "no eligible recipients for open-shift broadcast");
        } else {
            tracing::info!(%request_id, attempted, "open shift broadcast");
        }
        Ok(attempted)
    }

    /// Records a team member's CLAIM reply.
    ///
    /// First writer wins: the store performs the check-and-insert
    /// atomically, so a second concurrent claim is a stale no-op and
    /// the family is notified exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure.
    pub async fn record_claim(
        &self,
        request_id: RequestId,
        claiming_caregiver_id: Uuid,
    ) -> Result<TransitionOutcome, CoordinatorError> {
        let claim = CoverageClaim::new(request_id, claiming_caregiver_id);
        if !self.store.insert_claim_if_open(&claim).await? {
            tracing::info!(%request_id, claimant = %claiming_caregiver_id, "claim lost the race or request not open");
            return Ok(TransitionOutcome::Stale);
        }

        tracing::info!(claim_id = %claim.id, %request_id, claimant = %claiming_caregiver_id, "shift claimed");
        self.send_claim_notice(&claim).await?;
        Ok(TransitionOutcome::Applied)
    }

    /// Re-sends the claim-confirmation notice for an existing pending
    /// claim.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::ClaimNotFound`] for an unknown id.
    pub async fn notify_family_claim(
        &self,
        claim_id: ClaimId,
    ) -> Result<TransitionOutcome, CoordinatorError> {
        let claim = self
            .store
            .claim(claim_id)
            .await?
            .ok_or(CoordinatorError::ClaimNotFound(claim_id))?;
        if claim.status != ClaimStatus::PendingFamilyConfirmation {
            tracing::info!(%claim_id, status = claim.status.as_str(), "notify skipped, claim not pending");
            return Ok(TransitionOutcome::Stale);
        }
        self.send_claim_notice(&claim).await?;
        Ok(TransitionOutcome::Applied)
    }

    async fn send_claim_notice(&self, claim: &CoverageClaim) -> Result<(), CoordinatorError> {
        let request = self
            .store
            .request(claim.request_id)
            .await?
            .ok_or(CoordinatorError::RequestNotFound(claim.request_id))?;
        let shift = self.load_shift(request.shift_id).await?;
        let claimant_name = self.display_name(claim.claiming_caregiver_id).await?;
        let body = templates::coverage_claimed(&shift, &claimant_name, &claim.id.ref_token());
        self.notify_family(
            &shift,
            claim.request_id,
            NotificationType::CoverageClaimed,
            body,
            templates::TPL_COVERAGE_CLAIMED,
        )
        .await
    }

    /// Records the family's CONFIRM/DECLINE reply on a pending claim.
    ///
    /// Confirmation reassigns the shift to the claimant (collaborator
    /// call). Decline leaves the parent request `Approved` and open for
    /// new claims.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] on storage failure, or an
    /// error from the shift-reassignment collaborator call. Store
    /// writes are not rolled back on a failed reassignment.
    pub async fn record_family_confirmation(
        &self,
        claim_id: ClaimId,
        confirmed: bool,
        responding_user_id: Uuid,
    ) -> Result<TransitionOutcome, CoordinatorError> {
        let to = if confirmed {
            ClaimStatus::Confirmed
        } else {
            ClaimStatus::Declined
        };
        let transitioned = self
            .store
            .transition_claim(
                claim_id,
                ClaimStatus::PendingFamilyConfirmation,
                to,
                Some(responding_user_id),
                Utc::now(),
            )
            .await?;
        if !transitioned {
            tracing::info!(%claim_id, "stale family confirmation reply ignored");
            return Ok(TransitionOutcome::Stale);
        }

        tracing::info!(%claim_id, confirmed, responder = %responding_user_id, "family settled claim");

        if confirmed {
            let claim = self
                .store
                .claim(claim_id)
                .await?
                .ok_or(CoordinatorError::ClaimNotFound(claim_id))?;
            let request = self
                .store
                .request(claim.request_id)
                .await?
                .ok_or(CoordinatorError::RequestNotFound(claim.request_id))?;
            self.directory
                .reassign_shift(request.shift_id, claim.claiming_caregiver_id)
                .await?;
            tracing::info!(
                shift_id = %request.shift_id,
                new_caregiver = %claim.claiming_caregiver_id,
                "shift reassigned to claimant"
            );
        }
        Ok(TransitionOutcome::Applied)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Contact, TeamMember};
    use crate::persistence::memory::MemoryStore;
    use crate::test_support::RecordingTransport;

    struct Fixture {
        store: Arc<MemoryStore>,
        transport: Arc<RecordingTransport>,
        service: CoverageService,
        shift: ShiftDetail,
        family: Uuid,
        requester: Uuid,
        member_b: Uuid,
        member_c: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(RecordingTransport::new());

        let family = Uuid::new_v4();
        let requester = Uuid::new_v4();
        let member_b = Uuid::new_v4();
        let member_c = Uuid::new_v4();
        let care_plan_id = Uuid::new_v4();

        let shift = ShiftDetail {
            shift_id: Uuid::new_v4(),
            care_plan_id,
            title: "Morning care".to_string(),
            starts_at: Utc::now() + chrono::Duration::days(5),
            ends_at: Utc::now() + chrono::Duration::days(5) + chrono::Duration::hours(8),
            location: Some("12 Elm St".to_string()),
            assigned_caregiver_id: requester,
            family_owner_id: family,
            care_plan_title: "Plan for Rosa".to_string(),
        };
        store.seed_shift(shift.clone()).await;
        store
            .seed_contact(Contact {
                user_id: family,
                display_name: "Fatima".to_string(),
                phone: Some("+15550000001".to_string()),
            })
            .await;
        for (user_id, name, phone) in [
            (requester, "Ana", "+15550000002"),
            (member_b, "Bruno", "+15550000003"),
            (member_c, "Carla", "+15550000004"),
        ] {
            store
                .seed_team_member(
                    care_plan_id,
                    TeamMember {
                        user_id,
                        display_name: name.to_string(),
                        phone: Some(phone.to_string()),
                    },
                )
                .await;
        }

        let service = CoverageService::new(
            Arc::clone(&store) as Arc<dyn CoverageStore>,
            Arc::clone(&store) as Arc<dyn Directory>,
            Arc::clone(&transport) as Arc<dyn MessageTransport>,
        );

        Fixture {
            store,
            transport,
            service,
            shift,
            family,
            requester,
            member_b,
            member_c,
        }
    }

    async fn submit(fx: &Fixture) -> RequestId {
        let Ok(id) = fx
            .service
            .submit_coverage_request(
                fx.shift.shift_id,
                fx.requester,
                "medical appointment".to_string(),
                None,
            )
            .await
        else {
            panic!("submit failed");
        };
        id
    }

    async fn submit_and_approve(fx: &Fixture) -> RequestId {
        let id = submit(fx).await;
        let Ok(outcome) = fx.service.record_family_approval(id, true, fx.family).await else {
            panic!("approval failed");
        };
        assert!(outcome.is_applied());
        id
    }

    #[tokio::test]
    async fn submit_notifies_family_once() {
        let fx = fixture().await;
        let id = submit(&fx).await;

        let Ok(Some(request)) = fx.store.request(id).await else {
            panic!("request missing");
        };
        assert_eq!(request.status, RequestStatus::PendingFamilyApproval);

        let ledger = fx.store.notifications().await;
        assert_eq!(ledger.len(), 1);
        let Some(first) = ledger.first() else {
            panic!("empty ledger");
        };
        assert_eq!(first.notification_type, NotificationType::TimeOffRequest);
        assert_eq!(first.recipient_id, fx.family);
        assert!(first.content.contains("expires in 24 hours"));
    }

    #[tokio::test]
    async fn second_submit_for_same_shift_conflicts() {
        let fx = fixture().await;
        let _ = submit(&fx).await;
        let second = fx
            .service
            .submit_coverage_request(fx.shift.shift_id, fx.requester, "again".to_string(), None)
            .await;
        assert!(matches!(second, Err(CoordinatorError::Conflict(_))));
    }

    #[tokio::test]
    async fn approval_broadcasts_to_team_minus_requester() {
        let fx = fixture().await;
        let _ = submit_and_approve(&fx).await;

        let ledger = fx.store.notifications().await;
        let broadcast: Vec<_> = ledger
            .iter()
            .filter(|n| n.notification_type == NotificationType::CoverageAvailable)
            .collect();
        assert_eq!(broadcast.len(), 2);
        let recipients: Vec<Uuid> = broadcast.iter().map(|n| n.recipient_id).collect();
        assert!(recipients.contains(&fx.member_b));
        assert!(recipients.contains(&fx.member_c));
        assert!(!recipients.contains(&fx.requester));
        assert!(!recipients.contains(&fx.family));
    }

    #[tokio::test]
    async fn denial_is_terminal_and_silent() {
        let fx = fixture().await;
        let id = submit(&fx).await;
        let Ok(outcome) = fx.service.record_family_approval(id, false, fx.family).await else {
            panic!("denial failed");
        };
        assert!(outcome.is_applied());

        let Ok(Some(request)) = fx.store.request(id).await else {
            panic!("request missing");
        };
        assert_eq!(request.status, RequestStatus::Denied);
        assert_eq!(request.family_response_by, Some(fx.family));

        // Only the initial time-off notification, no broadcast.
        assert_eq!(fx.store.notifications().await.len(), 1);
    }

    #[tokio::test]
    async fn stale_approval_mutates_nothing_and_sends_nothing() {
        let fx = fixture().await;
        let id = submit_and_approve(&fx).await;
        let before = fx.store.notifications().await.len();

        // Duplicate reply arrives after approval.
        let Ok(outcome) = fx.service.record_family_approval(id, false, fx.family).await else {
            panic!("call failed");
        };
        assert_eq!(outcome, TransitionOutcome::Stale);

        let Ok(Some(request)) = fx.store.request(id).await else {
            panic!("request missing");
        };
        assert_eq!(request.status, RequestStatus::Approved);
        assert_eq!(fx.store.notifications().await.len(), before);
    }

    #[tokio::test]
    async fn concurrent_claims_have_one_winner() {
        let fx = fixture().await;
        let id = submit_and_approve(&fx).await;

        let (b, c) = tokio::join!(
            fx.service.record_claim(id, fx.member_b),
            fx.service.record_claim(id, fx.member_c),
        );
        let (Ok(b), Ok(c)) = (b, c) else {
            panic!("claim call failed");
        };
        assert_ne!(b.is_applied(), c.is_applied(), "exactly one claim must win");

        // Exactly one family notification about the claim.
        let claimed: Vec<_> = fx
            .store
            .notifications()
            .await
            .into_iter()
            .filter(|n| n.notification_type == NotificationType::CoverageClaimed)
            .collect();
        assert_eq!(claimed.len(), 1);
    }

    #[tokio::test]
    async fn broadcast_survives_per_recipient_transport_failure() {
        let fx = fixture().await;
        fx.transport.fail_for("+15550000003").await;

        let _ = submit_and_approve(&fx).await;

        let ledger = fx.store.notifications().await;
        let broadcast: Vec<_> = ledger
            .iter()
            .filter(|n| n.notification_type == NotificationType::CoverageAvailable)
            .collect();
        // Both recipients attempted, both recorded; one failed.
        assert_eq!(broadcast.len(), 2);
        let failed = broadcast
            .iter()
            .filter(|n| n.delivery_status == crate::domain::DeliveryStatus::Failed)
            .count();
        assert_eq!(failed, 1);
        let delivered = fx.transport.delivered_to().await;
        assert!(delivered.contains(&"+15550000004".to_string()));
    }

    #[tokio::test]
    async fn broadcast_is_refused_while_a_claim_is_pending() {
        let fx = fixture().await;
        let id = submit_and_approve(&fx).await;
        let _ = fx.service.record_claim(id, fx.member_b).await;
        let before = fx.store.notifications().await.len();

        let Ok(attempted) = fx.service.broadcast_open_shift(id).await else {
            panic!("broadcast failed");
        };
        assert_eq!(attempted, 0);
        assert_eq!(fx.store.notifications().await.len(), before);
    }

    #[tokio::test]
    async fn broadcast_is_refused_after_a_confirmed_claim() {
        let fx = fixture().await;
        let id = submit_and_approve(&fx).await;
        let _ = fx.service.record_claim(id, fx.member_b).await;
        let Ok(Some(claim)) = fx.store.latest_pending_claim_for_owner(fx.family, None).await
        else {
            panic!("no pending claim");
        };
        let _ = fx
            .service
            .record_family_confirmation(claim.id, true, fx.family)
            .await;
        let before = fx.store.notifications().await.len();

        // The request row still reads `approved`, but the shift is
        // handed over; a late broadcast action must send nothing.
        let Ok(attempted) = fx.service.broadcast_open_shift(id).await else {
            panic!("broadcast failed");
        };
        assert_eq!(attempted, 0);
        assert_eq!(fx.store.notifications().await.len(), before);
    }

    #[tokio::test]
    async fn declined_claim_reopens_for_other_caregivers() {
        let fx = fixture().await;
        let id = submit_and_approve(&fx).await;

        let Ok(outcome) = fx.service.record_claim(id, fx.member_b).await else {
            panic!("claim failed");
        };
        assert!(outcome.is_applied());
        let Ok(Some(claim)) = fx.store.latest_pending_claim_for_owner(fx.family, None).await
        else {
            panic!("no pending claim");
        };

        let Ok(outcome) = fx
            .service
            .record_family_confirmation(claim.id, false, fx.family)
            .await
        else {
            panic!("decline failed");
        };
        assert!(outcome.is_applied());

        let Ok(Some(request)) = fx.store.request(id).await else {
            panic!("request missing");
        };
        assert_eq!(request.status, RequestStatus::Approved);

        // A different caregiver can still claim.
        let Ok(outcome) = fx.service.record_claim(id, fx.member_c).await else {
            panic!("second claim failed");
        };
        assert!(outcome.is_applied());
    }

    #[tokio::test]
    async fn confirmed_claim_reassigns_the_shift() {
        let fx = fixture().await;
        let id = submit_and_approve(&fx).await;
        let _ = fx.service.record_claim(id, fx.member_b).await;
        let Ok(Some(claim)) = fx.store.latest_pending_claim_for_owner(fx.family, None).await
        else {
            panic!("no pending claim");
        };

        let Ok(outcome) = fx
            .service
            .record_family_confirmation(claim.id, true, fx.family)
            .await
        else {
            panic!("confirm failed");
        };
        assert!(outcome.is_applied());

        let Ok(Some(shift)) = fx.store.shift(fx.shift.shift_id).await else {
            panic!("shift missing");
        };
        assert_eq!(shift.assigned_caregiver_id, fx.member_b);

        let Ok(Some(stored)) = fx.store.claim(claim.id).await else {
            panic!("claim missing");
        };
        assert_eq!(stored.status, ClaimStatus::Confirmed);
        assert_eq!(stored.family_confirmed_by, Some(fx.family));
    }

    #[tokio::test]
    async fn stale_confirmation_is_ignored() {
        let fx = fixture().await;
        let id = submit_and_approve(&fx).await;
        let _ = fx.service.record_claim(id, fx.member_b).await;
        let Ok(Some(claim)) = fx.store.latest_pending_claim_for_owner(fx.family, None).await
        else {
            panic!("no pending claim");
        };
        let _ = fx
            .service
            .record_family_confirmation(claim.id, true, fx.family)
            .await;

        // Late DECLINE after confirmation.
        let Ok(outcome) = fx
            .service
            .record_family_confirmation(claim.id, false, fx.family)
            .await
        else {
            panic!("call failed");
        };
        assert_eq!(outcome, TransitionOutcome::Stale);

        let Ok(Some(stored)) = fx.store.claim(claim.id).await else {
            panic!("claim missing");
        };
        assert_eq!(stored.status, ClaimStatus::Confirmed);
    }
}
