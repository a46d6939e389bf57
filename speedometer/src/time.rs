//! Monotonic time sources.
//!
//! The tracker and the watchdog never read the system clock directly. They
//! depend on the [`TimeSource`] trait so the same code runs against a real
//! monotonic clock in production and a deterministic fake in tests.
//!
//! # Thread Safety
//!
//! Implementations must be `Send + Sync`: the clock is shared between the
//! fix delivery loop and the watchdog task through `Arc<dyn TimeSource>`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

/// Supplies elapsed milliseconds since an arbitrary epoch.
///
/// Readings are monotonically non-decreasing for the lifetime of the
/// process and are not tied to wall-clock time, so they never jump on
/// timezone or clock adjustments.
///
/// # Example
///
/// ```
/// use speedometer::time::{ManualClock, TimeSource};
/// use std::sync::Arc;
///
/// let clock = Arc::new(ManualClock::new(1_000));
/// let source: Arc<dyn TimeSource> = clock.clone();
///
/// clock.advance(500);
/// assert_eq!(source.current_time_millis(), 1_500);
/// ```
pub trait TimeSource: Send + Sync {
    /// Current reading in milliseconds.
    fn current_time_millis(&self) -> u64;
}

/// Production clock backed by [`Instant`].
///
/// The epoch is the moment the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose epoch is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn current_time_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Manually driven clock for tests and simulations.
///
/// Uses an atomic so it can be advanced from a test while a background
/// task reads it.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    /// Create a clock reading `start_ms`.
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(start_ms),
        }
    }

    /// Jump to an absolute reading.
    ///
    /// Readings behind the current one are ignored to keep the clock
    /// monotonic.
    pub fn set(&self, now_ms: u64) {
        self.now_ms.fetch_max(now_ms, Ordering::SeqCst);
    }

    /// Move the clock forward by `delta_ms`.
    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn current_time_millis(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Clock that replays a fixed sequence of readings.
///
/// Each call consumes the next value; once the script is exhausted the
/// last value is returned forever. An empty script reads as zero.
#[derive(Debug)]
pub struct ScriptedClock {
    readings: Mutex<ScriptedReadings>,
}

#[derive(Debug)]
struct ScriptedReadings {
    pending: VecDeque<u64>,
    last: u64,
}

impl ScriptedClock {
    /// Create a clock from the readings it should return, in order.
    pub fn new(readings: impl IntoIterator<Item = u64>) -> Self {
        Self {
            readings: Mutex::new(ScriptedReadings {
                pending: readings.into_iter().collect(),
                last: 0,
            }),
        }
    }

    /// Number of scripted readings not yet returned.
    pub fn remaining(&self) -> usize {
        self.readings.lock().pending.len()
    }
}

impl TimeSource for ScriptedClock {
    fn current_time_millis(&self) -> u64 {
        let mut readings = self.readings.lock();
        if let Some(next) = readings.pending.pop_front() {
            readings.last = next;
        }
        readings.last
    }
}
