//! Signal loss watchdog.
//!
//! A periodic liveness check independent of fix arrival. When the receiver
//! stops reporting (tunnel, indoors, receiver fault) the dashboard would
//! otherwise keep showing the last speed forever. On every tick the watchdog
//! asks the dashboard to run [`Dashboard::check_signal_loss`], which feeds a
//! synthetic zero-speed fix through the normal update path once the last
//! real fix is older than the configured timeout.
//!
//! The watchdog never resets the tracker; it only drives the displayed
//! speed toward zero.
//!
//! # Cancellation
//!
//! [`WatchdogHandle::stop`] cancels the task and waits for it to exit, so no
//! forced update happens after it returns. [`WatchdogHandle::cancel`] only
//! requests cancellation; a tick already past its token check may still land.
//! Each tick re-checks the token after taking the dashboard lock.
//!
//! [`Dashboard::check_signal_loss`]: crate::dashboard::Dashboard::check_signal_loss

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::WatchdogSettings;
use crate::dashboard::SharedDashboard;

/// Spawns the periodic signal-loss check.
pub struct SignalWatchdog;

impl SignalWatchdog {
    /// Start ticking against `dashboard` on the current tokio runtime.
    ///
    /// The first check happens one interval after spawning.
    pub fn spawn(dashboard: SharedDashboard, settings: WatchdogSettings) -> WatchdogHandle {
        let cancellation = CancellationToken::new();
        let task = tokio::spawn(run(dashboard, settings, cancellation.clone()));
        info!(interval_ms = settings.interval.as_millis() as u64, "Signal watchdog started");

        WatchdogHandle {
            cancellation,
            task: Some(task),
        }
    }
}

async fn run(dashboard: SharedDashboard, settings: WatchdogSettings, cancellation: CancellationToken) {
    let mut ticker = interval_at(Instant::now() + settings.interval, settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = cancellation.cancelled() => break,

            _ = ticker.tick() => {
                let mut dashboard = dashboard.lock();
                if cancellation.is_cancelled() {
                    break;
                }
                dashboard.check_signal_loss();
            }
        }
    }

    debug!("Signal watchdog task exited");
}

/// Handle to a running watchdog.
///
/// Dropping the handle cancels the watchdog without waiting for it.
#[derive(Debug)]
pub struct WatchdogHandle {
    cancellation: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl WatchdogHandle {
    /// Request cancellation without waiting.
    ///
    /// A tick that already holds the dashboard lock may still finish and
    /// apply one forced update after this returns. Use [`stop`](Self::stop)
    /// when no update may follow.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Cancel and wait for the task to exit.
    ///
    /// After this returns no forced update can happen.
    pub async fn stop(mut self) {
        self.cancellation.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        info!("Signal watchdog stopped");
    }
}

impl Drop for WatchdogHandle {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}
