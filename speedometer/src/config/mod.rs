//! Session configuration.
//!
//! [`SessionConfig`] holds the thresholds consumed by the signal filter,
//! the statistics tracker and the watchdog. It is constructed once per
//! session and handed to each component by value, so it cannot change
//! underneath a running session.
//!
//! [`ConfigFile`] loads the same settings (plus watchdog timing) from an
//! INI file.

mod file;

pub use file::{config_file_path, ConfigFile, WatchdogSettings, CONFIG_FILE_NAME};

use std::path::PathBuf;

use thiserror::Error;

/// Default delay after session start before peak speed is tracked.
pub const DEFAULT_WARMUP_PERIOD_MS: u64 = 5_000;

/// Default minimum satellites for a sample to count toward peak speed.
pub const DEFAULT_MIN_SATELLITES_FOR_TRACKING: u32 = 3;

/// Default accuracy radius above which a fix's speed is distrusted.
pub const DEFAULT_MAX_ACCURACY_M: f32 = 50.0;

/// Default speed below which a fix is treated as stationary drift.
pub const DEFAULT_MIN_SPEED_KMH: f32 = 1.5;

/// Default time without fixes before the watchdog zeroes the speed.
pub const DEFAULT_SIGNAL_TIMEOUT_MS: u64 = 2_000;

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A threshold is out of range.
    #[error("Invalid {field}: {reason}")]
    InvalidThreshold {
        field: &'static str,
        reason: String,
    },

    /// A value in the config file could not be parsed.
    #[error("Invalid value '{value}' for {section}.{key}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },

    /// The config file is not valid INI.
    #[error("Failed to parse config file: {0}")]
    Parse(String),

    /// The config file could not be read or written.
    #[error("Config file I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Thresholds for one tracking session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Delay after session start before peak speed may update.
    pub warmup_period_ms: u64,

    /// Minimum satellites in fix for a sample to set a new peak speed.
    pub min_satellites_for_tracking: u32,

    /// Fixes with a larger accuracy radius have their speed distrusted.
    pub max_accuracy_m: f32,

    /// Fixes slower than this are treated as stationary GPS drift.
    pub min_speed_kmh: f32,

    /// Staleness threshold for the signal-loss watchdog.
    pub signal_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            warmup_period_ms: DEFAULT_WARMUP_PERIOD_MS,
            min_satellites_for_tracking: DEFAULT_MIN_SATELLITES_FOR_TRACKING,
            max_accuracy_m: DEFAULT_MAX_ACCURACY_M,
            min_speed_kmh: DEFAULT_MIN_SPEED_KMH,
            signal_timeout_ms: DEFAULT_SIGNAL_TIMEOUT_MS,
        }
    }
}

impl SessionConfig {
    /// Set the warm-up period.
    pub fn with_warmup_period_ms(mut self, ms: u64) -> Self {
        self.warmup_period_ms = ms;
        self
    }

    /// Set the satellite gate.
    pub fn with_min_satellites(mut self, count: u32) -> Self {
        self.min_satellites_for_tracking = count;
        self
    }

    /// Set the accuracy threshold.
    pub fn with_max_accuracy_m(mut self, meters: f32) -> Self {
        self.max_accuracy_m = meters;
        self
    }

    /// Set the minimum trusted speed.
    pub fn with_min_speed_kmh(mut self, kmh: f32) -> Self {
        self.min_speed_kmh = kmh;
        self
    }

    /// Set the watchdog staleness threshold.
    pub fn with_signal_timeout_ms(mut self, ms: u64) -> Self {
        self.signal_timeout_ms = ms;
        self
    }

    /// Check that every threshold is non-negative.
    ///
    /// Integer thresholds are unsigned; the float thresholds must be finite
    /// and not below zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("max_accuracy_m", self.max_accuracy_m)?;
        check_non_negative("min_speed_kmh", self.min_speed_kmh)?;
        Ok(())
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::InvalidThreshold {
            field,
            reason: format!("must be a finite number, got {}", value),
        });
    }
    if value < 0.0 {
        return Err(ConfigError::InvalidThreshold {
            field,
            reason: format!("must be non-negative, got {}", value),
        });
    }
    Ok(())
}
