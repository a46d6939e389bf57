//! Statistics consumers.
//!
//! The dashboard pushes a [`DashboardState`] to its sink after every
//! update, forced watchdog update and status change. Sinks are called while
//! the dashboard lock is held, so they must not block.

use tokio::sync::watch;

use super::DashboardState;

/// Receives dashboard snapshots for rendering.
pub trait StatisticsSink: Send + Sync {
    /// Publish a new snapshot.
    fn publish(&self, state: &DashboardState);
}

/// Sink that discards every snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl StatisticsSink for NullSink {
    fn publish(&self, _state: &DashboardState) {}
}

/// Sink backed by a `tokio::sync::watch` channel.
///
/// Presentation layers hold a receiver and redraw on change; only the latest
/// snapshot is retained.
///
/// # Example
///
/// ```
/// use speedometer::dashboard::{DashboardState, StatisticsSink, WatchSink};
///
/// let (sink, rx) = WatchSink::channel();
/// sink.publish(&DashboardState::default());
/// assert_eq!(*rx.borrow(), DashboardState::default());
/// ```
#[derive(Debug)]
pub struct WatchSink {
    tx: watch::Sender<DashboardState>,
}

impl WatchSink {
    /// Create a sink and the receiver that observes it.
    pub fn channel() -> (Self, watch::Receiver<DashboardState>) {
        let (tx, rx) = watch::channel(DashboardState::default());
        (Self { tx }, rx)
    }

    /// Another receiver for the same channel.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.tx.subscribe()
    }
}

impl StatisticsSink for WatchSink {
    fn publish(&self, state: &DashboardState) {
        // send_replace keeps working after every receiver is gone
        self.tx.send_replace(state.clone());
    }
}
