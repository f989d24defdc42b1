//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::persistence::{CoverageStore, Directory};
use crate::service::{CoverageService, InboundRouter, NudgeService, SweepService};
use crate::transport::MessageTransport;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The coverage state machine.
    pub coverage: Arc<CoverageService>,
    /// Inbound reply router.
    pub inbound: Arc<InboundRouter>,
    /// Reminder and expiry sweeps.
    pub sweeps: Arc<SweepService>,
    /// Nudge broadcaster.
    pub nudges: Arc<NudgeService>,
}

impl AppState {
    /// Wires the full service graph over the given store, directory,
    /// and transport.
    #[must_use]
    pub fn new(
        store: Arc<dyn CoverageStore>,
        directory: Arc<dyn Directory>,
        transport: Arc<dyn MessageTransport>,
        config: &AppConfig,
    ) -> Self {
        let coverage = CoverageService::new(
            Arc::clone(&store),
            Arc::clone(&directory),
            Arc::clone(&transport),
        );
        let inbound = Arc::new(InboundRouter::new(
            coverage.clone(),
            Arc::clone(&store),
            Arc::clone(&directory),
        ));
        let sweeps = Arc::new(SweepService::new(
            Arc::clone(&store),
            Arc::clone(&directory),
            Arc::clone(&transport),
            config.reminder_lookahead_days,
            config.approval_window_hours,
        ));
        let nudges = Arc::new(NudgeService::new(store, directory, transport));

        Self {
            coverage: Arc::new(coverage),
            inbound,
            sweeps,
            nudges,
        }
    }
}
