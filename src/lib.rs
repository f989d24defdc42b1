//! # careshift
//!
//! Shift-coverage coordination service for in-home care teams.
//!
//! When a caregiver cannot work a scheduled shift, this service walks
//! the replacement through a two-stage, message-driven workflow: the
//! family approves the time-off request, the open shift is broadcast to
//! the rest of the care team, a teammate claims it, and the family
//! confirms the claim. Every transition is driven either by an HTTP
//! function call or by an inbound keyword reply on the messaging
//! channel.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP functions, inbound WhatsApp webhooks)
//!     │
//!     ├── Function Handlers (api/)
//!     │
//!     ├── CoverageService  (service/) — the state machine
//!     ├── InboundRouter    (service/) — keyword reply routing
//!     ├── SweepService     (service/) — reminders + expiry
//!     ├── NudgeService     (service/) — proactive broadcasts
//!     │
//!     ├── MessageTransport (transport/) — outbound channel seam
//!     │
//!     └── CoverageStore + Directory (persistence/)
//!             └── PostgreSQL (or in-memory for tests)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;
