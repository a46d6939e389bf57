//! Session statistics.
//!
//! The [`SessionTracker`] aggregates fixes into a [`SessionStatistics`]
//! snapshot: current and peak speed, current and peak satellite count.
//!
//! # Gating
//!
//! ```text
//! max_satellites: updated on every fix
//! max_speed:      updated only when session active
//!                 AND elapsed >= warmup_period_ms
//!                 AND satellites >= min_satellites_for_tracking
//! ```
//!
//! The warm-up gate keeps a cold-lock speed spike out of the peak record;
//! the satellite gate keeps a weak fix from setting a new top speed.

mod statistics;
mod tracker;

pub use statistics::SessionStatistics;
pub use tracker::SessionTracker;
