//! Signal quality filter.
//!
//! Decides whether a fix's reported speed can be trusted.
//!
//! # Acceptance Rule
//!
//! ```text
//! Accepted: (accuracy unknown OR accuracy <= max_accuracy_m)
//!           AND speed_kmh >= min_speed_kmh
//! ```
//!
//! Both boundaries are inclusive. A stationary receiver typically reports
//! small nonzero speeds; the speed floor suppresses that jitter. Poor
//! accuracy (urban canyon multipath) distrusts the speed but not the
//! satellite count, so rejected fixes are sanitized rather than dropped:
//! see [`SignalFilter::prepare`].

use crate::config::SessionConfig;
use crate::fix::GpsFix;
use crate::units::meters_per_second_to_kmh;

/// Why a fix's speed was distrusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Accuracy radius exceeds the configured maximum.
    PoorAccuracy,
    /// Speed is below the stationary-drift floor.
    BelowMinimumSpeed,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::PoorAccuracy => write!(f, "poor accuracy"),
            RejectReason::BelowMinimumSpeed => write!(f, "below minimum speed"),
        }
    }
}

/// Outcome of evaluating one fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterVerdict {
    /// Speed is trustworthy.
    Accepted,
    /// Speed is noise; the fix must be sanitized before tracking.
    Rejected(RejectReason),
}

impl FilterVerdict {
    /// Whether the fix passed.
    pub fn is_accepted(&self) -> bool {
        matches!(self, FilterVerdict::Accepted)
    }
}

/// Classifies fixes as trustworthy or noise.
///
/// Pure: depends only on the [`SessionConfig`] it was built with.
#[derive(Debug, Clone, Copy)]
pub struct SignalFilter {
    max_accuracy_m: f32,
    min_speed_kmh: f32,
}

impl SignalFilter {
    /// Create a filter from the session thresholds.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            max_accuracy_m: config.max_accuracy_m,
            min_speed_kmh: config.min_speed_kmh,
        }
    }

    /// Whether the fix's speed can be trusted.
    pub fn is_acceptable(&self, fix: &GpsFix) -> bool {
        self.evaluate(fix).is_accepted()
    }

    /// Classify the fix, reporting the first failed check.
    pub fn evaluate(&self, fix: &GpsFix) -> FilterVerdict {
        if !self.has_acceptable_accuracy(fix) {
            return FilterVerdict::Rejected(RejectReason::PoorAccuracy);
        }
        if !self.has_acceptable_speed(fix) {
            return FilterVerdict::Rejected(RejectReason::BelowMinimumSpeed);
        }
        FilterVerdict::Accepted
    }

    /// Return the fix to feed the tracker along with the verdict.
    ///
    /// Accepted fixes pass through unchanged; rejected fixes come back
    /// sanitized (speed zeroed, satellites preserved).
    pub fn prepare(&self, fix: &GpsFix) -> (GpsFix, FilterVerdict) {
        let verdict = self.evaluate(fix);
        match verdict {
            FilterVerdict::Accepted => (*fix, verdict),
            FilterVerdict::Rejected(_) => (fix.sanitized(), verdict),
        }
    }

    fn has_acceptable_accuracy(&self, fix: &GpsFix) -> bool {
        match fix.accuracy_m {
            None => true,
            Some(accuracy) => accuracy <= self.max_accuracy_m,
        }
    }

    fn has_acceptable_speed(&self, fix: &GpsFix) -> bool {
        meters_per_second_to_kmh(fix.speed_mps) >= self.min_speed_kmh
    }
}
