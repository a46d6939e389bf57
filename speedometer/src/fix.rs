//! Receiver fix model.
//!
//! A [`GpsFix`] is one position/velocity/satellite sample as reported by the
//! receiver. Fixes are immutable values; the only derived form is the
//! sanitized copy produced when the signal filter distrusts the speed.

use thiserror::Error;

/// One sample from the positioning receiver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    /// Ground speed in meters per second (non-negative).
    pub speed_mps: f32,
    /// Horizontal accuracy radius in meters. `None` means unknown, which the
    /// filter treats as acceptable.
    pub accuracy_m: Option<f32>,
    /// Satellites used in the current fix.
    pub satellites: u32,
    /// Monotonic timestamp in milliseconds (not wall clock).
    pub timestamp_ms: u64,
}

impl GpsFix {
    /// Create a fix.
    pub fn new(speed_mps: f32, accuracy_m: Option<f32>, satellites: u32, timestamp_ms: u64) -> Self {
        Self {
            speed_mps,
            accuracy_m,
            satellites,
            timestamp_ms,
        }
    }

    /// Zero-speed fix carrying only a satellite count.
    ///
    /// Used when the receiver reports satellite status before any location,
    /// and by the watchdog when the signal goes stale.
    pub fn stationary(satellites: u32, timestamp_ms: u64) -> Self {
        Self::new(0.0, None, satellites, timestamp_ms)
    }

    /// Copy of this fix with the speed zeroed.
    ///
    /// Accuracy, satellites and timestamp are preserved so satellite
    /// statistics stay current when the speed is untrustworthy.
    pub fn sanitized(&self) -> Self {
        Self {
            speed_mps: 0.0,
            ..*self
        }
    }
}

/// Degraded or unavailable provider conditions.
///
/// These are surfaced to the presentation layer as a status message; they
/// are never modeled as a fix and never touch tracker state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The positioning provider was switched off.
    #[error("GPS Provider is disabled.")]
    ProviderDisabled,

    /// Location access was not granted.
    #[error("Location permission denied.")]
    PermissionDenied,

    /// The source failed while starting updates.
    #[error("Error starting GPS: {0}")]
    StartFailed(String),
}

/// Everything a fix source can deliver.
#[derive(Debug, Clone, PartialEq)]
pub enum FixEvent {
    /// A new receiver sample.
    Fix(GpsFix),
    /// A provider condition to show the user.
    ProviderError(ProviderError),
}

impl From<GpsFix> for FixEvent {
    fn from(fix: GpsFix) -> Self {
        FixEvent::Fix(fix)
    }
}

impl From<ProviderError> for FixEvent {
    fn from(error: ProviderError) -> Self {
        FixEvent::ProviderError(error)
    }
}
