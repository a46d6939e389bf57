//! Merges receiver callbacks into fixes.
//!
//! Receivers usually report location and satellite status through separate
//! callbacks. A location update carries speed and accuracy; a satellite
//! status update carries per-satellite "used in fix" flags. Neither alone
//! is a complete [`GpsFix`].
//!
//! ```text
//! location(speed, accuracy) ─► fix(speed, accuracy, current count)
//! satellites(used flags)    ─► count updated
//!                              ├─ location seen: fix from last location
//!                              └─ none yet:      zero-speed fix, accuracy unknown
//! ```

use std::sync::Arc;

use crate::fix::GpsFix;
use crate::time::TimeSource;

/// Velocity part of a location update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationUpdate {
    /// Ground speed in meters per second.
    pub speed_mps: f32,
    /// Accuracy radius in meters, if the receiver reported one.
    pub accuracy_m: Option<f32>,
}

/// Builds fixes from location and satellite-status callbacks.
pub struct FixAssembler {
    time: Arc<dyn TimeSource>,
    satellites_in_fix: u32,
    last_location: Option<LocationUpdate>,
}

impl std::fmt::Debug for FixAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixAssembler")
            .field("satellites_in_fix", &self.satellites_in_fix)
            .field("last_location", &self.last_location)
            .finish_non_exhaustive()
    }
}

impl FixAssembler {
    /// Create an assembler that stamps fixes with `time`.
    pub fn new(time: Arc<dyn TimeSource>) -> Self {
        Self {
            time,
            satellites_in_fix: 0,
            last_location: None,
        }
    }

    /// A new location arrived.
    pub fn on_location(&mut self, location: LocationUpdate) -> GpsFix {
        self.last_location = Some(location);
        self.fix_from(location)
    }

    /// A satellite status report arrived as per-satellite flags.
    pub fn on_satellite_status(&mut self, used_in_fix: &[bool]) -> GpsFix {
        let count = used_in_fix.iter().filter(|&&used| used).count() as u32;
        self.on_satellite_count(count)
    }

    /// A satellite status report arrived as a ready count.
    pub fn on_satellite_count(&mut self, count: u32) -> GpsFix {
        self.satellites_in_fix = count;
        match self.last_location {
            Some(location) => self.fix_from(location),
            None => GpsFix::stationary(count, self.time.current_time_millis()),
        }
    }

    /// Satellites used in the current fix.
    pub fn satellites_in_fix(&self) -> u32 {
        self.satellites_in_fix
    }

    fn fix_from(&self, location: LocationUpdate) -> GpsFix {
        GpsFix::new(
            location.speed_mps,
            location.accuracy_m,
            self.satellites_in_fix,
            self.time.current_time_millis(),
        )
    }
}
