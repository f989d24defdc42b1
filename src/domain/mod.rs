//! Domain layer: identifiers, lifecycle statuses, workflow entities,
//! inbound reply parsing, and outbound message templates.
//!
//! Everything in this module is plain data and pure functions; all I/O
//! lives behind the persistence and transport seams.

pub mod ids;
pub mod records;
pub mod reply;
pub mod status;
pub mod templates;

pub use ids::{ClaimId, RequestId};
pub use records::{
    Contact, CoverageClaim, CoverageRequest, MessageLogEntry, NotificationRecord, ShiftDetail,
    TeamMember,
};
pub use reply::{InboundReply, ReplyKeyword};
pub use status::{ClaimStatus, DeliveryStatus, MessageDirection, NotificationType, RequestStatus};
