//! Dashboard engine.
//!
//! Wires the signal filter, the statistics tracker and the statistics
//! consumer together, and keeps the bookkeeping the watchdog needs.
//!
//! # Architecture
//!
//! ```text
//! FixEvent ──► Dashboard ───────────────────────────────► StatisticsSink
//!              │  Fix:   SignalFilter::prepare                 ▲
//!              │         └─► SessionTracker::update ───────────┤
//!              │  Error: status message only ──────────────────┤
//!              │                                               │
//! Watchdog ───►│  check_signal_loss: synthetic zero-speed fix ─┘
//! ```
//!
//! # Thread Safety
//!
//! `Dashboard` itself is single-owner. Share it as [`SharedDashboard`]
//! (`Arc<parking_lot::Mutex<Dashboard>>`) when fix delivery and watchdog
//! ticks run on different tasks; every mutation then happens under the lock.

mod sink;
mod state;

pub use sink::{NullSink, StatisticsSink, WatchSink};
pub use state::DashboardState;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::filter::{FilterVerdict, SignalFilter};
use crate::fix::{FixEvent, GpsFix, ProviderError};
use crate::session::{SessionStatistics, SessionTracker};
use crate::time::TimeSource;

/// Dashboard shared between the fix delivery loop and the watchdog.
pub type SharedDashboard = Arc<Mutex<Dashboard>>;

/// Session engine plus presentation state.
pub struct Dashboard {
    filter: SignalFilter,
    tracker: SessionTracker,
    time: Arc<dyn TimeSource>,
    sink: Arc<dyn StatisticsSink>,
    signal_timeout_ms: u64,
    state: DashboardState,
    /// Arrival time of the last real fix (accepted or sanitized).
    last_fix_at: Option<u64>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("tracker", &self.tracker)
            .field("state", &self.state)
            .field("last_fix_at", &self.last_fix_at)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    /// Create a dashboard with no active session.
    pub fn new(
        config: SessionConfig,
        time: Arc<dyn TimeSource>,
        sink: Arc<dyn StatisticsSink>,
    ) -> Self {
        Self {
            filter: SignalFilter::new(config),
            tracker: SessionTracker::new(config, Arc::clone(&time)),
            time,
            sink,
            signal_timeout_ms: config.signal_timeout_ms,
            state: DashboardState::default(),
            last_fix_at: None,
        }
    }

    /// Wrap in the lock used to share with the watchdog.
    pub fn into_shared(self) -> SharedDashboard {
        Arc::new(Mutex::new(self))
    }

    /// Start a new session, clearing the readout.
    pub fn start_session(&mut self) {
        self.tracker.start_session();
        self.clear();
    }

    /// End the session. Peak tracking stays blocked until `start_session()`.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.clear();
    }

    /// Route one event from the fix source.
    ///
    /// Returns the new statistics for fixes, `None` for provider errors.
    pub fn handle_event(&mut self, event: FixEvent) -> Option<SessionStatistics> {
        match event {
            FixEvent::Fix(fix) => Some(self.handle_fix(&fix)),
            FixEvent::ProviderError(error) => {
                self.report_error(&error);
                None
            }
        }
    }

    /// Filter, track and publish one real fix.
    ///
    /// Rejected fixes are sanitized, not dropped, so satellite statistics
    /// stay current. Any real fix clears a pending status message.
    pub fn handle_fix(&mut self, fix: &GpsFix) -> SessionStatistics {
        let (prepared, verdict) = self.filter.prepare(fix);
        if let FilterVerdict::Rejected(reason) = verdict {
            debug!(
                reason = %reason,
                speed_mps = fix.speed_mps,
                accuracy_m = ?fix.accuracy_m,
                satellites = fix.satellites,
                "Fix speed distrusted, tracking sanitized fix"
            );
        }

        let statistics = self.tracker.update(&prepared);
        self.last_fix_at = Some(self.time.current_time_millis());
        self.state.statistics = statistics;
        self.state.status = None;
        self.sink.publish(&self.state);
        statistics
    }

    /// Show a provider condition without touching tracker state.
    pub fn report_error(&mut self, error: &ProviderError) {
        warn!(error = %error, "Fix source reported a provider error");
        self.state.status = Some(error.to_string());
        self.sink.publish(&self.state);
    }

    /// Force the displayed speed to zero if the signal has gone stale.
    ///
    /// Fires only when a fix has been received, more than
    /// `signal_timeout_ms` has passed since it arrived, and the displayed
    /// speed is nonzero. The synthetic fix carries the last satellite count
    /// and goes through the normal tracker update, so peaks never drop.
    /// It does not count as a received fix.
    pub fn check_signal_loss(&mut self) -> Option<SessionStatistics> {
        let last_fix_at = self.last_fix_at?;
        if !self.state.statistics.is_moving() {
            return None;
        }

        let now = self.time.current_time_millis();
        let silent_ms = now.saturating_sub(last_fix_at);
        if silent_ms <= self.signal_timeout_ms {
            return None;
        }

        let satellites = self.state.statistics.current_satellites;
        info!(
            silent_ms,
            timeout_ms = self.signal_timeout_ms,
            satellites,
            "Signal lost, forcing speed to zero"
        );

        let statistics = self.tracker.update(&GpsFix::stationary(satellites, now));
        self.state.statistics = statistics;
        self.sink.publish(&self.state);
        Some(statistics)
    }

    /// Current presentation state.
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Latest statistics.
    pub fn statistics(&self) -> SessionStatistics {
        self.state.statistics
    }

    /// Arrival time of the last real fix.
    pub fn last_fix_at(&self) -> Option<u64> {
        self.last_fix_at
    }

    /// Whether a session is active.
    pub fn is_session_active(&self) -> bool {
        self.tracker.is_session_active()
    }

    /// Staleness threshold in milliseconds.
    pub fn signal_timeout_ms(&self) -> u64 {
        self.signal_timeout_ms
    }

    fn clear(&mut self) {
        self.state = DashboardState::default();
        self.last_fix_at = None;
        self.sink.publish(&self.state);
    }
}
