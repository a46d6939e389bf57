//! Session statistics tracker.

use std::sync::Arc;

use super::SessionStatistics;
use crate::config::SessionConfig;
use crate::fix::GpsFix;
use crate::time::TimeSource;
use crate::units::meters_per_second_to_kmh;

/// Aggregates fixes into session statistics.
///
/// All state is session-scoped: anchored by [`start_session`](Self::start_session),
/// mutated by [`update`](Self::update) and discarded by [`reset`](Self::reset).
///
/// # No Active Session
///
/// Until `start_session()` is called (and again after `reset()`), peak speed
/// is not tracked. Current values and peak satellites are still reported.
///
/// # Example
///
/// ```
/// use speedometer::config::SessionConfig;
/// use speedometer::fix::GpsFix;
/// use speedometer::session::SessionTracker;
/// use speedometer::time::ManualClock;
/// use std::sync::Arc;
///
/// let clock = Arc::new(ManualClock::new(0));
/// let mut tracker = SessionTracker::new(SessionConfig::default(), clock.clone());
///
/// tracker.start_session();
/// clock.set(6_000);
///
/// let stats = tracker.update(&GpsFix::new(20.0, Some(5.0), 5, 6_000));
/// assert!((stats.max_speed_kmh - 72.0).abs() < 0.01);
/// ```
pub struct SessionTracker {
    config: SessionConfig,
    time: Arc<dyn TimeSource>,
    /// Warm-up anchor; `None` when no session is active.
    session_start: Option<u64>,
    max_speed_kmh: f32,
    max_satellites: u32,
}

impl std::fmt::Debug for SessionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTracker")
            .field("config", &self.config)
            .field("session_start", &self.session_start)
            .field("max_speed_kmh", &self.max_speed_kmh)
            .field("max_satellites", &self.max_satellites)
            .finish_non_exhaustive()
    }
}

impl SessionTracker {
    /// Create a tracker with no active session.
    pub fn new(config: SessionConfig, time: Arc<dyn TimeSource>) -> Self {
        Self {
            config,
            time,
            session_start: None,
            max_speed_kmh: 0.0,
            max_satellites: 0,
        }
    }

    /// The thresholds this tracker was built with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Begin a session now.
    ///
    /// Zeroes both peaks and restarts the warm-up window. Calling it again
    /// simply starts over.
    pub fn start_session(&mut self) {
        let now = self.time.current_time_millis();
        self.session_start = Some(now);
        self.max_speed_kmh = 0.0;
        self.max_satellites = 0;

        tracing::info!(
            started_at_ms = now,
            warmup_ms = self.config.warmup_period_ms,
            min_satellites = self.config.min_satellites_for_tracking,
            "Session started"
        );
    }

    /// Fold one fix into the statistics and return the new snapshot.
    ///
    /// Reads the clock exactly once per call, whether or not the peak-speed
    /// gates end up open.
    pub fn update(&mut self, fix: &GpsFix) -> SessionStatistics {
        let now = self.time.current_time_millis();
        let current_speed_kmh = meters_per_second_to_kmh(fix.speed_mps);

        self.max_satellites = self.max_satellites.max(fix.satellites);

        if self.peak_speed_gate_open(fix, now) {
            self.max_speed_kmh = self.max_speed_kmh.max(current_speed_kmh);
        }

        SessionStatistics {
            current_speed_kmh,
            max_speed_kmh: self.max_speed_kmh,
            current_satellites: fix.satellites,
            max_satellites: self.max_satellites,
        }
    }

    /// Discard the session.
    ///
    /// Peaks return to zero and the warm-up anchor is cleared. A new session
    /// needs an explicit `start_session()`.
    pub fn reset(&mut self) {
        self.session_start = None;
        self.max_speed_kmh = 0.0;
        self.max_satellites = 0;
        tracing::info!("Session reset");
    }

    /// Whether `start_session()` has been called since creation or the last reset.
    pub fn is_session_active(&self) -> bool {
        self.session_start.is_some()
    }

    /// Milliseconds since the session started, or `None` without a session.
    pub fn session_elapsed_ms(&self) -> Option<u64> {
        let start = self.session_start?;
        Some(self.time.current_time_millis().saturating_sub(start))
    }

    /// Whether the warm-up window has passed.
    pub fn is_warmed_up(&self) -> bool {
        self.session_elapsed_ms()
            .is_some_and(|elapsed| elapsed >= self.config.warmup_period_ms)
    }

    /// Peak speed recorded this session.
    pub fn max_speed_kmh(&self) -> f32 {
        self.max_speed_kmh
    }

    /// Peak satellites recorded this session.
    pub fn max_satellites(&self) -> u32 {
        self.max_satellites
    }

    fn peak_speed_gate_open(&self, fix: &GpsFix, now: u64) -> bool {
        let Some(start) = self.session_start else {
            return false;
        };
        let warmed_up = now.saturating_sub(start) >= self.config.warmup_period_ms;
        warmed_up && fix.satellites >= self.config.min_satellites_for_tracking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{ManualClock, ScriptedClock};

    fn config() -> SessionConfig {
        SessionConfig::default()
            .with_warmup_period_ms(5_000)
            .with_min_satellites(3)
    }

    fn scripted(readings: &[u64]) -> SessionTracker {
        SessionTracker::new(config(), Arc::new(ScriptedClock::new(readings.to_vec())))
    }

    fn reading(speed_mps: f32, satellites: u32, timestamp_ms: u64) -> GpsFix {
        GpsFix::new(speed_mps, Some(30.0), satellites, timestamp_ms)
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 0.01,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_start_session_initializes() {
        let mut tracker = scripted(&[1_000, 1_000]);
        tracker.start_session();

        let stats = tracker.update(&reading(10.0, 5, 1_000));

        assert_close(stats.current_speed_kmh, 36.0);
        assert_eq!(stats.current_satellites, 5);
        assert_eq!(stats.max_satellites, 5);
        assert_close(stats.max_speed_kmh, 0.0);
    }

    #[test]
    fn test_max_speed_ignored_during_warmup() {
        let mut tracker = scripted(&[0, 1_000]);
        tracker.start_session();

        let stats = tracker.update(&reading(20.0, 5, 1_000));

        assert_close(stats.current_speed_kmh, 72.0);
        assert_close(stats.max_speed_kmh, 0.0);
    }

    #[test]
    fn test_max_speed_tracked_after_warmup() {
        let mut tracker = scripted(&[0, 6_000]);
        tracker.start_session();

        let stats = tracker.update(&reading(20.0, 5, 6_000));

        assert_close(stats.current_speed_kmh, 72.0);
        assert_close(stats.max_speed_kmh, 72.0);
    }

    #[test]
    fn test_warmup_boundary_is_inclusive() {
        let mut tracker = scripted(&[0, 5_000]);
        tracker.start_session();

        let stats = tracker.update(&reading(10.0, 5, 5_000));
        assert_close(stats.max_speed_kmh, 36.0);
    }

    #[test]
    fn test_max_speed_requires_minimum_satellites() {
        let mut tracker = scripted(&[0, 6_000]);
        tracker.start_session();

        let stats = tracker.update(&reading(20.0, 2, 6_000));

        assert_close(stats.current_speed_kmh, 72.0);
        assert_close(stats.max_speed_kmh, 0.0);
        assert_eq!(stats.max_satellites, 2);
    }

    #[test]
    fn test_clock_read_even_when_satellite_gate_closed() {
        let mut tracker = scripted(&[0, 1_000, 6_000]);
        tracker.start_session();

        // Consumes the 1000 reading despite too few satellites
        let weak = tracker.update(&reading(20.0, 2, 1_000));
        assert_close(weak.max_speed_kmh, 0.0);

        let strong = tracker.update(&reading(20.0, 5, 6_000));
        assert_close(strong.max_speed_kmh, 72.0);
    }

    #[test]
    fn test_clock_read_without_session() {
        let clock = Arc::new(ScriptedClock::new([0, 6_000, 7_000]));
        let mut tracker = SessionTracker::new(config(), clock.clone());

        tracker.update(&reading(20.0, 5, 0));
        assert_eq!(clock.remaining(), 2);

        tracker.start_session();
        assert_eq!(tracker.session_elapsed_ms(), Some(1_000));
    }

    #[test]
    fn test_max_satellites_always_tracked() {
        let mut tracker = scripted(&[0, 1_000, 2_000, 3_000]);
        tracker.start_session();

        let counts: Vec<u32> = [3, 7, 4]
            .iter()
            .map(|&sats| tracker.update(&reading(10.0, sats, 0)).max_satellites)
            .collect();

        assert_eq!(counts, vec![3, 7, 7]);
    }

    #[test]
    fn test_peak_speed_never_decreases() {
        let clock = Arc::new(ManualClock::new(0));
        let mut tracker = SessionTracker::new(config(), clock.clone());
        tracker.start_session();
        clock.set(10_000);

        tracker.update(&reading(30.0, 5, 10_000));
        let stats = tracker.update(&reading(5.0, 5, 11_000));

        assert_close(stats.current_speed_kmh, 18.0);
        assert_close(stats.max_speed_kmh, 108.0);
    }

    #[test]
    fn test_reset_clears_statistics() {
        let mut tracker = scripted(&[0, 6_000]);
        tracker.start_session();
        tracker.update(&reading(20.0, 5, 6_000));

        tracker.reset();
        assert!(!tracker.is_session_active());

        let stats = tracker.update(&reading(5.0, 2, 7_000));
        assert_close(stats.max_speed_kmh, 0.0);
        assert_eq!(stats.max_satellites, 2);
    }

    #[test]
    fn test_reset_blocks_peak_until_new_session() {
        let clock = Arc::new(ManualClock::new(0));
        let mut tracker = SessionTracker::new(config(), clock.clone());
        tracker.start_session();
        tracker.reset();

        clock.set(60_000);
        let stats = tracker.update(&reading(20.0, 8, 60_000));
        assert_close(stats.max_speed_kmh, 0.0);

        // Re-anchoring restarts the warm-up
        tracker.start_session();
        clock.advance(1_000);
        assert_close(tracker.update(&reading(20.0, 8, 61_000)).max_speed_kmh, 0.0);
        clock.advance(5_000);
        assert_close(tracker.update(&reading(20.0, 8, 66_000)).max_speed_kmh, 72.0);
    }

    #[test]
    fn test_no_session_blocks_peak_speed() {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let mut tracker = SessionTracker::new(config(), clock);

        let stats = tracker.update(&reading(25.0, 9, 0));

        assert_close(stats.current_speed_kmh, 90.0);
        assert_close(stats.max_speed_kmh, 0.0);
        assert_eq!(stats.max_satellites, 9);
        assert_eq!(tracker.session_elapsed_ms(), None);
        assert!(!tracker.is_warmed_up());
    }

    #[test]
    fn test_start_session_is_idempotent_restart() {
        let clock = Arc::new(ManualClock::new(0));
        let mut tracker = SessionTracker::new(config(), clock.clone());
        tracker.start_session();
        clock.set(6_000);
        tracker.update(&reading(20.0, 5, 6_000));
        assert_close(tracker.max_speed_kmh(), 72.0);

        tracker.start_session();
        assert_close(tracker.max_speed_kmh(), 0.0);
        assert_eq!(tracker.max_satellites(), 0);
        assert_eq!(tracker.session_elapsed_ms(), Some(0));
        assert!(!tracker.is_warmed_up());
    }

    #[test]
    fn test_current_speed_always_calculated() {
        let mut tracker = scripted(&[0, 1_000]);
        tracker.start_session();

        let stats = tracker.update(&reading(15.0, 3, 1_000));
        assert_close(stats.current_speed_kmh, 54.0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_peaks_monotonic_within_session(
                samples in prop::collection::vec((0.0..80.0_f32, 0u32..20, 0u64..2_000), 1..40)
            ) {
                let clock = Arc::new(ManualClock::new(0));
                let mut tracker = SessionTracker::new(config(), clock.clone());
                tracker.start_session();

                let mut prev = SessionStatistics::default();
                for (speed, sats, step) in samples {
                    clock.advance(step);
                    let stats = tracker.update(&reading(speed, sats, 0));

                    prop_assert!(stats.max_speed_kmh >= prev.max_speed_kmh);
                    prop_assert!(stats.max_satellites >= prev.max_satellites);
                    prop_assert!(stats.max_satellites >= stats.current_satellites);
                    prop_assert!(stats.max_speed_kmh >= 0.0);
                    prev = stats;
                }
            }
        }
    }
}
