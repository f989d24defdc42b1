//! Outbound message templates.
//!
//! All workflow text lives here so the wording stays consistent across
//! the state machine, the sweeps, and the nudge surface. Templates are
//! bilingual-ready: bodies are assembled from these single-purpose
//! functions so a locale table can replace the literals without touching
//! the callers. Approval and claim messages embed the short reference
//! token so a reply can quote it back for unambiguous correlation.

use chrono::{DateTime, Utc};

use super::records::ShiftDetail;

/// Template name for the initial family approval request.
pub const TPL_TIME_OFF_REQUEST: &str = "time_off_request";
/// Template name for the open-shift broadcast.
pub const TPL_COVERAGE_AVAILABLE: &str = "coverage_available";
/// Template name for the claim-confirmation notice.
pub const TPL_COVERAGE_CLAIMED: &str = "coverage_claimed";
/// Template name for the two-day shift reminder.
pub const TPL_REMINDER_2_DAYS: &str = "reminder_2_days";

/// Formats a shift's time window for message bodies.
#[must_use]
pub fn time_window(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> String {
    format!(
        "{} – {}",
        starts_at.format("%a %d %b, %H:%M"),
        ends_at.format("%H:%M")
    )
}

/// Initial approval request sent to the family owner.
#[must_use]
pub fn time_off_request(
    shift: &ShiftDetail,
    requester_name: &str,
    reason: &str,
    message: Option<&str>,
    token: &str,
) -> String {
    let mut body = format!(
        "🔔 Time-off request\n\
         {requester_name} is asking to be relieved of \"{}\" ({}).\n\
         Reason: {reason}",
        shift.title,
        time_window(shift.starts_at, shift.ends_at),
    );
    if let Some(note) = message {
        body.push_str(&format!("\nNote: {note}"));
    }
    body.push_str(&format!(
        "\n\nReply APPROVE {token} or DENY {token}.\nThis request expires in 24 hours."
    ));
    body
}

/// Open-shift broadcast sent to each eligible care-team member.
#[must_use]
pub fn coverage_available(shift: &ShiftDetail, requester_name: &str, token: &str) -> String {
    let location = shift.location.as_deref().unwrap_or("location TBD");
    format!(
        "📅 Shift available\n\
         \"{}\" ({}) for {} is open — {requester_name} needs cover.\n\
         Where: {location}\n\n\
         Reply CLAIM {token} to take this shift.",
        shift.title,
        time_window(shift.starts_at, shift.ends_at),
        shift.care_plan_title,
    )
}

/// Claim notice sent to the family owner for confirmation.
#[must_use]
pub fn coverage_claimed(shift: &ShiftDetail, claimant_name: &str, token: &str) -> String {
    format!(
        "🤝 Shift claimed\n\
         {claimant_name} offered to cover \"{}\" ({}).\n\n\
         Reply CONFIRM {token} to hand over the shift, or DECLINE {token} to keep it open.",
        shift.title,
        time_window(shift.starts_at, shift.ends_at),
    )
}

/// One-time reminder for a shift starting within the lookahead window.
#[must_use]
pub fn reminder_2_days(shift: &ShiftDetail) -> String {
    let location = shift.location.as_deref().unwrap_or("location TBD");
    format!(
        "⏰ Upcoming shift\n\
         \"{}\" ({}) for {} starts soon.\n\
         Where: {location}",
        shift.title,
        time_window(shift.starts_at, shift.ends_at),
        shift.care_plan_title,
    )
}

/// Default body for a generic nudge without a custom message.
#[must_use]
pub fn nudge_default(recipient_name: &str) -> String {
    format!(
        "👋 Hi {recipient_name}, just checking in from your care team. \
         Open the app to see what's new."
    )
}

/// Schedule-update broadcast to a care team.
#[must_use]
pub fn schedule_update(care_plan_title: &str, period: &str) -> String {
    format!(
        "🗓️ Schedule update\n\
         The {period} schedule for {care_plan_title} has been updated. \
         Please review your upcoming shifts in the app."
    )
}

/// Emergency coverage broadcast with urgent formatting.
#[must_use]
pub fn emergency_coverage(care_plan_title: &str, shift_summary: &str) -> String {
    format!(
        "🚨 URGENT: coverage needed\n\
         {care_plan_title} needs immediate cover:\n{shift_summary}\n\n\
         Reply CLAIM if you can take it, or contact the family directly."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn make_shift() -> ShiftDetail {
        let starts_at = Utc
            .with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
            .single()
            .unwrap_or_default();
        let ends_at = Utc
            .with_ymd_and_hms(2026, 3, 14, 17, 0, 0)
            .single()
            .unwrap_or_default();
        ShiftDetail {
            shift_id: Uuid::new_v4(),
            care_plan_id: Uuid::new_v4(),
            title: "Morning care".to_string(),
            starts_at,
            ends_at,
            location: Some("12 Elm St".to_string()),
            assigned_caregiver_id: Uuid::new_v4(),
            family_owner_id: Uuid::new_v4(),
            care_plan_title: "Plan for Rosa".to_string(),
        }
    }

    #[test]
    fn time_off_request_embeds_token_and_expiry() {
        let shift = make_shift();
        let body = time_off_request(&shift, "Ana", "appointment", Some("back by 6"), "1a2b3c4d");
        assert!(body.contains("APPROVE 1a2b3c4d"));
        assert!(body.contains("DENY 1a2b3c4d"));
        assert!(body.contains("expires in 24 hours"));
        assert!(body.contains("back by 6"));
        assert!(body.contains("Morning care"));
    }

    #[test]
    fn coverage_available_names_plan_and_requester() {
        let shift = make_shift();
        let body = coverage_available(&shift, "Ana", "1a2b3c4d");
        assert!(body.contains("CLAIM 1a2b3c4d"));
        assert!(body.contains("Plan for Rosa"));
        assert!(body.contains("Ana"));
        assert!(body.contains("12 Elm St"));
    }

    #[test]
    fn coverage_claimed_offers_both_replies() {
        let shift = make_shift();
        let body = coverage_claimed(&shift, "Bruno", "deadbeef");
        assert!(body.contains("CONFIRM deadbeef"));
        assert!(body.contains("DECLINE deadbeef"));
        assert!(body.contains("Bruno"));
    }

    #[test]
    fn missing_location_falls_back() {
        let mut shift = make_shift();
        shift.location = None;
        let body = reminder_2_days(&shift);
        assert!(body.contains("location TBD"));
    }
}
