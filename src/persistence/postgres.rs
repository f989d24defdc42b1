//! PostgreSQL implementation of the persistence layer.
//!
//! Every transition guard is a single conditional statement
//! (`UPDATE .. WHERE status = ..`, `INSERT .. SELECT .. WHERE NOT
//! EXISTS ..`); there is no application-level check-then-write. The
//! `NOT EXISTS` checks alone are not race-safe under READ COMMITTED —
//! two overlapping statements each snapshot before the other commits —
//! so the one-open-request and one-live-claim invariants are enforced
//! by partial unique indexes, and a unique violation on insert is
//! treated as the guard refusing (`Ok(false)`), not as an error.
//!
//! The directory queries join collaborator-owned tables (`shifts`,
//! `care_plans`, `care_team_members`, `profiles`) that live in the same
//! hosted database.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::domain::{
    ClaimId, ClaimStatus, Contact, CoverageClaim, CoverageRequest, MessageLogEntry,
    NotificationRecord, RequestId, RequestStatus, ShiftDetail, TeamMember,
};
use crate::error::CoordinatorError;

use super::{CoverageStore, Directory};

type RequestRow = (
    Uuid,
    Uuid,
    Uuid,
    String,
    Option<String>,
    String,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
    Option<Uuid>,
);

type ClaimRow = (
    Uuid,
    Uuid,
    Uuid,
    String,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
    Option<Uuid>,
);

type ShiftRow = (
    Uuid,
    Uuid,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
    Option<String>,
    Uuid,
    Uuid,
    String,
);

const REQUEST_COLUMNS: &str = "r.id, r.shift_id, r.requesting_caregiver_id, r.reason, \
     r.message, r.status, r.requested_at, r.family_response_at, r.family_response_by";

const SHIFT_COLUMNS: &str = "s.id, s.care_plan_id, s.title, s.starts_at, s.ends_at, \
     s.location, s.assigned_caregiver_id, p.family_owner_id, p.title";

/// A claim in these statuses blocks further claims on its request.
const BLOCKING_CLAIM: &str = "SELECT 1 FROM coverage_claims c \
     WHERE c.request_id = r.id AND c.status IN ('pending_family_confirmation', 'confirmed')";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a store from an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database configured in `config` and runs pending
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Store`] when the connection or a
    /// migration fails.
    pub async fn connect(config: &AppConfig) -> Result<Self, CoordinatorError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database_connect_timeout_secs,
            ))
            .connect(&config.database_url)
            .await
            .map_err(store_err)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| CoordinatorError::Store(e.to_string()))?;

        Ok(Self { pool })
    }
}

fn store_err(e: sqlx::Error) -> CoordinatorError {
    CoordinatorError::Store(e.to_string())
}

/// A unique violation on a guarded insert means a concurrent writer won
/// the race after our statement snapshot passed the `NOT EXISTS` check.
fn guarded_insert_outcome(
    result: Result<sqlx::postgres::PgQueryResult, sqlx::Error>,
) -> Result<bool, CoordinatorError> {
    match result {
        Ok(done) => Ok(done.rows_affected() > 0),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Ok(false),
        Err(e) => Err(store_err(e)),
    }
}

fn parse_request_status(s: &str) -> Result<RequestStatus, CoordinatorError> {
    RequestStatus::parse(s)
        .ok_or_else(|| CoordinatorError::Store(format!("unknown request status: {s}")))
}

fn parse_claim_status(s: &str) -> Result<ClaimStatus, CoordinatorError> {
    ClaimStatus::parse(s).ok_or_else(|| CoordinatorError::Store(format!("unknown claim status: {s}")))
}

fn request_from_row(row: RequestRow) -> Result<CoverageRequest, CoordinatorError> {
    let (
        id,
        shift_id,
        requesting_caregiver_id,
        reason,
        message,
        status,
        requested_at,
        family_response_at,
        family_response_by,
    ) = row;
    Ok(CoverageRequest {
        id: RequestId::from_uuid(id),
        shift_id,
        requesting_caregiver_id,
        reason,
        message,
        status: parse_request_status(&status)?,
        requested_at,
        family_response_at,
        family_response_by,
    })
}

fn claim_from_row(row: ClaimRow) -> Result<CoverageClaim, CoordinatorError> {
    let (id, request_id, claiming_caregiver_id, status, claimed_at, family_confirmed_at, family_confirmed_by) =
        row;
    Ok(CoverageClaim {
        id: ClaimId::from_uuid(id),
        request_id: RequestId::from_uuid(request_id),
        claiming_caregiver_id,
        status: parse_claim_status(&status)?,
        claimed_at,
        family_confirmed_at,
        family_confirmed_by,
    })
}

fn shift_from_row(row: ShiftRow) -> ShiftDetail {
    let (
        shift_id,
        care_plan_id,
        title,
        starts_at,
        ends_at,
        location,
        assigned_caregiver_id,
        family_owner_id,
        care_plan_title,
    ) = row;
    ShiftDetail {
        shift_id,
        care_plan_id,
        title,
        starts_at,
        ends_at,
        location,
        assigned_caregiver_id,
        family_owner_id,
        care_plan_title,
    }
}

#[async_trait]
impl CoverageStore for PgStore {
    async fn create_request_if_shift_open(
        &self,
        request: &CoverageRequest,
    ) -> Result<bool, CoordinatorError> {
        let result = sqlx::query(
            "INSERT INTO coverage_requests \
                 (id, shift_id, requesting_caregiver_id, reason, message, status, requested_at) \
             SELECT $1, $2, $3, $4, $5, $6, $7 \
             WHERE NOT EXISTS ( \
                 SELECT 1 FROM coverage_requests r \
                 WHERE r.shift_id = $2 \
                   AND (r.status = 'pending_family_approval' \
                        OR (r.status = 'approved' AND NOT EXISTS ( \
                            SELECT 1 FROM coverage_claims c \
                            WHERE c.request_id = r.id AND c.status = 'confirmed'))))",
        )
        .bind(request.id.as_uuid())
        .bind(request.shift_id)
        .bind(request.requesting_caregiver_id)
        .bind(&request.reason)
        .bind(&request.message)
        .bind(request.status.as_str())
        .bind(request.requested_at)
        .execute(&self.pool)
        .await;

        guarded_insert_outcome(result)
    }

    async fn request(&self, id: RequestId) -> Result<Option<CoverageRequest>, CoordinatorError> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM coverage_requests r WHERE r.id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.map(request_from_row).transpose()
    }

    async fn transition_request(
        &self,
        id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
        responded_by: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> Result<bool, CoordinatorError> {
        let result = sqlx::query(
            "UPDATE coverage_requests \
             SET status = $3, \
                 family_response_by = COALESCE($4, family_response_by), \
                 family_response_at = CASE WHEN $4 IS NULL THEN family_response_at ELSE $5 END \
             WHERE id = $1 AND status = $2",
        )
        .bind(id.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(responded_by)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn expire_pending_requests(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, CoordinatorError> {
        let result = sqlx::query(
            "UPDATE coverage_requests SET status = 'expired' \
             WHERE status = 'pending_family_approval' AND requested_at < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(result.rows_affected())
    }

    async fn insert_claim_if_open(
        &self,
        claim: &CoverageClaim,
    ) -> Result<bool, CoordinatorError> {
        let result = sqlx::query(
            "INSERT INTO coverage_claims \
                 (id, request_id, claiming_caregiver_id, status, claimed_at) \
             SELECT $1, $2, $3, $4, $5 \
             WHERE EXISTS ( \
                 SELECT 1 FROM coverage_requests r \
                 WHERE r.id = $2 AND r.status = 'approved') \
               AND NOT EXISTS ( \
                 SELECT 1 FROM coverage_claims c \
                 WHERE c.request_id = $2 \
                   AND c.status IN ('pending_family_confirmation', 'confirmed'))",
        )
        .bind(claim.id.as_uuid())
        .bind(claim.request_id.as_uuid())
        .bind(claim.claiming_caregiver_id)
        .bind(claim.status.as_str())
        .bind(claim.claimed_at)
        .execute(&self.pool)
        .await;

        guarded_insert_outcome(result)
    }

    async fn claim(&self, id: ClaimId) -> Result<Option<CoverageClaim>, CoordinatorError> {
        let row = sqlx::query_as::<_, ClaimRow>(
            "SELECT id, request_id, claiming_caregiver_id, status, claimed_at, \
                    family_confirmed_at, family_confirmed_by \
             FROM coverage_claims WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.map(claim_from_row).transpose()
    }

    async fn request_has_blocking_claim(
        &self,
        request_id: RequestId,
    ) -> Result<bool, CoordinatorError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                 SELECT 1 FROM coverage_claims \
                 WHERE request_id = $1 \
                   AND status IN ('pending_family_confirmation', 'confirmed'))",
        )
        .bind(request_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(exists)
    }

    async fn transition_claim(
        &self,
        id: ClaimId,
        from: ClaimStatus,
        to: ClaimStatus,
        responded_by: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> Result<bool, CoordinatorError> {
        let result = sqlx::query(
            "UPDATE coverage_claims \
             SET status = $3, \
                 family_confirmed_by = COALESCE($4, family_confirmed_by), \
                 family_confirmed_at = CASE WHEN $4 IS NULL THEN family_confirmed_at ELSE $5 END \
             WHERE id = $1 AND status = $2",
        )
        .bind(id.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(responded_by)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn latest_pending_approval_for_owner(
        &self,
        family_owner_id: Uuid,
        token: Option<&str>,
    ) -> Result<Option<CoverageRequest>, CoordinatorError> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM coverage_requests r \
             JOIN shifts s ON s.id = r.shift_id \
             JOIN care_plans p ON p.id = s.care_plan_id \
             WHERE r.status = 'pending_family_approval' \
               AND p.family_owner_id = $1 \
               AND ($2::text IS NULL OR left(replace(r.id::text, '-', ''), 8) = $2) \
             ORDER BY r.requested_at DESC LIMIT 1"
        ))
        .bind(family_owner_id)
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.map(request_from_row).transpose()
    }

    async fn latest_claimable_request_for_member(
        &self,
        member_id: Uuid,
        token: Option<&str>,
    ) -> Result<Option<CoverageRequest>, CoordinatorError> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM coverage_requests r \
             JOIN shifts s ON s.id = r.shift_id \
             JOIN care_team_members m \
               ON m.care_plan_id = s.care_plan_id AND m.user_id = $1 AND m.active \
             WHERE r.status = 'approved' \
               AND r.requesting_caregiver_id <> $1 \
               AND NOT EXISTS ({BLOCKING_CLAIM}) \
               AND ($2::text IS NULL OR left(replace(r.id::text, '-', ''), 8) = $2) \
             ORDER BY r.requested_at DESC LIMIT 1"
        ))
        .bind(member_id)
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.map(request_from_row).transpose()
    }

    async fn latest_pending_claim_for_owner(
        &self,
        family_owner_id: Uuid,
        token: Option<&str>,
    ) -> Result<Option<CoverageClaim>, CoordinatorError> {
        let row = sqlx::query_as::<_, ClaimRow>(
            "SELECT c.id, c.request_id, c.claiming_caregiver_id, c.status, c.claimed_at, \
                    c.family_confirmed_at, c.family_confirmed_by \
             FROM coverage_claims c \
             JOIN coverage_requests r ON r.id = c.request_id \
             JOIN shifts s ON s.id = r.shift_id \
             JOIN care_plans p ON p.id = s.care_plan_id \
             WHERE c.status = 'pending_family_confirmation' \
               AND p.family_owner_id = $1 \
               AND ($2::text IS NULL OR left(replace(c.id::text, '-', ''), 8) = $2) \
             ORDER BY c.claimed_at DESC LIMIT 1",
        )
        .bind(family_owner_id)
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.map(claim_from_row).transpose()
    }

    async fn record_notification(
        &self,
        record: &NotificationRecord,
    ) -> Result<(), CoordinatorError> {
        sqlx::query(
            "INSERT INTO notification_records \
                 (id, request_id, shift_id, notification_type, recipient_id, \
                  recipient_phone, content, delivery_status, sent_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(record.id)
        .bind(record.request_id.map(|r| *r.as_uuid()))
        .bind(record.shift_id)
        .bind(record.notification_type.as_str())
        .bind(record.recipient_id)
        .bind(&record.recipient_phone)
        .bind(&record.content)
        .bind(record.delivery_status.as_str())
        .bind(record.sent_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn reminder_exists(
        &self,
        shift_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<bool, CoordinatorError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                 SELECT 1 FROM notification_records \
                 WHERE notification_type = 'reminder_2_days' \
                   AND shift_id = $1 AND recipient_id = $2)",
        )
        .bind(shift_id)
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(exists)
    }

    async fn log_message(&self, entry: &MessageLogEntry) -> Result<(), CoordinatorError> {
        sqlx::query(
            "INSERT INTO whatsapp_message_log \
                 (id, phone_number, user_id, direction, message_type, content, \
                  processed, processed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(entry.id)
        .bind(&entry.phone_number)
        .bind(entry.user_id)
        .bind(entry.direction.as_str())
        .bind(&entry.message_type)
        .bind(&entry.content)
        .bind(entry.processed)
        .bind(entry.processed_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn mark_message_processed(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, CoordinatorError> {
        let result = sqlx::query(
            "UPDATE whatsapp_message_log SET processed = TRUE, processed_at = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Directory for PgStore {
    async fn shift(&self, shift_id: Uuid) -> Result<Option<ShiftDetail>, CoordinatorError> {
        let row = sqlx::query_as::<_, ShiftRow>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts s \
             JOIN care_plans p ON p.id = s.care_plan_id \
             WHERE s.id = $1"
        ))
        .bind(shift_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.map(shift_from_row))
    }

    async fn care_plan_title(
        &self,
        care_plan_id: Uuid,
    ) -> Result<Option<String>, CoordinatorError> {
        sqlx::query_scalar::<_, String>("SELECT title FROM care_plans WHERE id = $1")
            .bind(care_plan_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)
    }

    async fn active_team_members(
        &self,
        care_plan_id: Uuid,
    ) -> Result<Vec<TeamMember>, CoordinatorError> {
        let rows = sqlx::query_as::<_, (Uuid, String, Option<String>)>(
            "SELECT u.id, u.display_name, u.phone \
             FROM care_team_members m \
             JOIN profiles u ON u.id = m.user_id \
             WHERE m.care_plan_id = $1 AND m.active \
             ORDER BY u.display_name",
        )
        .bind(care_plan_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows
            .into_iter()
            .map(|(user_id, display_name, phone)| TeamMember {
                user_id,
                display_name,
                phone,
            })
            .collect())
    }

    async fn contact(&self, user_id: Uuid) -> Result<Option<Contact>, CoordinatorError> {
        let row = sqlx::query_as::<_, (Uuid, String, Option<String>)>(
            "SELECT id, display_name, phone FROM profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.map(|(user_id, display_name, phone)| Contact {
            user_id,
            display_name,
            phone,
        }))
    }

    async fn user_by_phone(&self, phone: &str) -> Result<Option<Contact>, CoordinatorError> {
        let row = sqlx::query_as::<_, (Uuid, String, Option<String>)>(
            "SELECT id, display_name, phone FROM profiles WHERE phone = $1",
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.map(|(user_id, display_name, phone)| Contact {
            user_id,
            display_name,
            phone,
        }))
    }

    async fn upcoming_assigned_shifts(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<ShiftDetail>, CoordinatorError> {
        let rows = sqlx::query_as::<_, ShiftRow>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts s \
             JOIN care_plans p ON p.id = s.care_plan_id \
             WHERE s.starts_at >= $1 AND s.starts_at < $2 \
             ORDER BY s.starts_at"
        ))
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows.into_iter().map(shift_from_row).collect())
    }

    async fn reassign_shift(
        &self,
        shift_id: Uuid,
        new_caregiver_id: Uuid,
    ) -> Result<(), CoordinatorError> {
        let result = sqlx::query("UPDATE shifts SET assigned_caregiver_id = $2 WHERE id = $1")
            .bind(shift_id)
            .bind(new_caregiver_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Err(CoordinatorError::ShiftNotFound(shift_id));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    async fn connect() -> PgStore {
        let Ok(config) = AppConfig::from_env() else {
            panic!("config load failed");
        };
        let Ok(store) = PgStore::connect(&config).await else {
            panic!("database unavailable");
        };
        store
    }

    async fn seed_profile(store: &PgStore, user_id: Uuid) {
        let inserted = sqlx::query("INSERT INTO profiles (id, display_name) VALUES ($1, $2)")
            .bind(user_id)
            .bind("seeded user")
            .execute(&store.pool)
            .await;
        assert!(inserted.is_ok(), "profile seed failed");
    }

    /// Seeds a family owner, caregiver, care plan, and shift; returns
    /// (shift_id, caregiver_id, family_owner_id).
    async fn seed_shift(store: &PgStore) -> (Uuid, Uuid, Uuid) {
        let family = Uuid::new_v4();
        let caregiver = Uuid::new_v4();
        let plan = Uuid::new_v4();
        let shift = Uuid::new_v4();
        seed_profile(store, family).await;
        seed_profile(store, caregiver).await;

        let plan_row = sqlx::query(
            "INSERT INTO care_plans (id, title, family_owner_id) VALUES ($1, $2, $3)",
        )
        .bind(plan)
        .bind("Seeded plan")
        .bind(family)
        .execute(&store.pool)
        .await;
        assert!(plan_row.is_ok(), "care plan seed failed");

        let shift_row = sqlx::query(
            "INSERT INTO shifts \
                 (id, care_plan_id, title, starts_at, ends_at, assigned_caregiver_id) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(shift)
        .bind(plan)
        .bind("Seeded shift")
        .bind(Utc::now() + chrono::Duration::days(3))
        .bind(Utc::now() + chrono::Duration::days(3) + chrono::Duration::hours(8))
        .bind(caregiver)
        .execute(&store.pool)
        .await;
        assert!(shift_row.is_ok(), "shift seed failed");

        (shift, caregiver, family)
    }

    async fn seed_approved_request(store: &PgStore) -> CoverageRequest {
        let (shift, caregiver, family) = seed_shift(store).await;
        let request = CoverageRequest::new(shift, caregiver, "sick".to_string(), None);
        assert_eq!(
            store.create_request_if_shift_open(&request).await.ok(),
            Some(true)
        );
        let approved = store
            .transition_request(
                request.id,
                RequestStatus::PendingFamilyApproval,
                RequestStatus::Approved,
                Some(family),
                Utc::now(),
            )
            .await;
        assert_eq!(approved.ok(), Some(true));
        request
    }

    #[tokio::test]
    #[ignore = "needs a live PostgreSQL at DATABASE_URL"]
    async fn concurrent_claims_insert_exactly_one_live_row() {
        let store = connect().await;
        let request = seed_approved_request(&store).await;

        let claimant_a = Uuid::new_v4();
        let claimant_b = Uuid::new_v4();
        seed_profile(&store, claimant_a).await;
        seed_profile(&store, claimant_b).await;

        // Overlapping statements on separate pool connections; the
        // partial unique index decides the race, not the NOT EXISTS.
        let a = CoverageClaim::new(request.id, claimant_a);
        let b = CoverageClaim::new(request.id, claimant_b);
        let (won_a, won_b) = tokio::join!(
            store.insert_claim_if_open(&a),
            store.insert_claim_if_open(&b),
        );
        let (Ok(won_a), Ok(won_b)) = (won_a, won_b) else {
            panic!("claim insert failed");
        };
        assert_ne!(won_a, won_b, "exactly one claim must win");
        assert_eq!(
            store.request_has_blocking_claim(request.id).await.ok(),
            Some(true)
        );
    }

    #[tokio::test]
    #[ignore = "needs a live PostgreSQL at DATABASE_URL"]
    async fn concurrent_requests_insert_exactly_one_pending_row() {
        let store = connect().await;
        let (shift, caregiver, _) = seed_shift(&store).await;

        let first = CoverageRequest::new(shift, caregiver, "sick".to_string(), None);
        let second = CoverageRequest::new(shift, caregiver, "sick too".to_string(), None);
        let (won_first, won_second) = tokio::join!(
            store.create_request_if_shift_open(&first),
            store.create_request_if_shift_open(&second),
        );
        let (Ok(won_first), Ok(won_second)) = (won_first, won_second) else {
            panic!("request insert failed");
        };
        assert_ne!(won_first, won_second, "exactly one request must win");
    }
}
