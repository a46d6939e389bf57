//! Dashboard service.
//!
//! The [`DashboardService`] is the event loop that owns one fix delivery
//! stream:
//! - Receives [`FixEvent`]s from a channel, in arrival order
//! - Routes each one through the shared [`Dashboard`] under its lock
//! - Runs the signal-loss watchdog while delivery is live
//!
//! # Lifecycle
//!
//! ```text
//! first event ──► watchdog started
//! channel closed (all producers dropped) ─┐
//! shutdown token cancelled ───────────────┴─► watchdog stopped (awaited) ──► run() returns
//! ```
//!
//! Stopping the watchdog together with delivery means no stale forced
//! update can follow a producer teardown. When delivery resumes, start a
//! new service over the same [`SharedDashboard`]; session state carries
//! over untouched.
//!
//! # Example
//!
//! ```ignore
//! let (service, events) = DashboardService::new(dashboard.clone(), settings);
//! let shutdown = CancellationToken::new();
//!
//! tokio::spawn(Box::new(source).run(events, shutdown.clone()));
//! let summary = service.run(shutdown).await;
//! ```
//!
//! [`Dashboard`]: crate::dashboard::Dashboard

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::WatchdogSettings;
use crate::dashboard::SharedDashboard;
use crate::fix::FixEvent;
use crate::source::DEFAULT_EVENT_CHANNEL_CAPACITY;
use crate::watchdog::{SignalWatchdog, WatchdogHandle};

/// Counts from one delivery stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceSummary {
    /// Fixes routed to the dashboard.
    pub fixes: u64,
    /// Provider errors surfaced.
    pub provider_errors: u64,
}

/// Event loop for one fix delivery stream.
pub struct DashboardService {
    dashboard: SharedDashboard,
    watchdog: WatchdogSettings,
    events_rx: mpsc::Receiver<FixEvent>,
}

impl DashboardService {
    /// Create a service with its delivery channel.
    ///
    /// Returns the service and a sender for the fix source.
    pub fn new(
        dashboard: SharedDashboard,
        watchdog: WatchdogSettings,
    ) -> (Self, mpsc::Sender<FixEvent>) {
        Self::with_capacity(dashboard, watchdog, DEFAULT_EVENT_CHANNEL_CAPACITY)
    }

    /// Create a service with a specific channel capacity.
    pub fn with_capacity(
        dashboard: SharedDashboard,
        watchdog: WatchdogSettings,
        capacity: usize,
    ) -> (Self, mpsc::Sender<FixEvent>) {
        let (events_tx, events_rx) = mpsc::channel(capacity);
        let service = Self {
            dashboard,
            watchdog,
            events_rx,
        };
        (service, events_tx)
    }

    /// The dashboard this service feeds.
    pub fn dashboard(&self) -> SharedDashboard {
        SharedDashboard::clone(&self.dashboard)
    }

    /// Process events until the channel closes or shutdown is signalled.
    pub async fn run(self, shutdown: CancellationToken) -> ServiceSummary {
        info!("Dashboard service starting");

        let Self {
            dashboard,
            watchdog: watchdog_settings,
            mut events_rx,
        } = self;

        let mut watchdog: Option<WatchdogHandle> = None;
        let mut summary = ServiceSummary::default();

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Dashboard service shutting down");
                    break;
                }

                event = events_rx.recv() => {
                    let Some(event) = event else {
                        info!("Fix delivery ended");
                        break;
                    };

                    if watchdog.is_none() {
                        watchdog = Some(SignalWatchdog::spawn(
                            SharedDashboard::clone(&dashboard),
                            watchdog_settings,
                        ));
                    }

                    match &event {
                        FixEvent::Fix(_) => summary.fixes += 1,
                        FixEvent::ProviderError(_) => summary.provider_errors += 1,
                    }
                    debug!(event = ?event, "Routing fix event");
                    dashboard.lock().handle_event(event);
                }
            }
        }

        if let Some(handle) = watchdog {
            handle.stop().await;
        }

        info!(
            fixes = summary.fixes,
            provider_errors = summary.provider_errors,
            "Dashboard service stopped"
        );
        summary
    }
}
