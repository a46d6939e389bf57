//! INI configuration file.
//!
//! ```ini
//! [session]
//! warmup_period_ms = 5000
//! min_satellites = 3
//! max_accuracy_m = 50
//! min_speed_kmh = 1.5
//! signal_timeout_ms = 2000
//!
//! [watchdog]
//! interval_ms = 1000
//! ```
//!
//! Missing sections and keys keep their defaults. The loaded settings are
//! validated before they are returned.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::{Ini, Properties};

use super::{ConfigError, SessionConfig};

/// File name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default watchdog polling interval.
const DEFAULT_WATCHDOG_INTERVAL_MS: u64 = 1_000;

const SESSION_SECTION: &str = "session";
const WATCHDOG_SECTION: &str = "watchdog";

/// Watchdog timing read from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogSettings {
    /// Time between staleness checks.
    pub interval: Duration,
}

impl Default for WatchdogSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_WATCHDOG_INTERVAL_MS),
        }
    }
}

/// Settings loaded from `config.ini`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConfigFile {
    /// Session thresholds.
    pub session: SessionConfig,
    /// Watchdog timing.
    pub watchdog: WatchdogSettings,
}

/// Default location of the configuration file.
///
/// `<config dir>/speedometer/config.ini`, or `None` when the platform has
/// no config directory.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("speedometer").join(CONFIG_FILE_NAME))
}

impl ConfigFile {
    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load and validate the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&contents)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate INI text.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        if let Some(section) = ini.section(Some(SESSION_SECTION)) {
            let session = &mut config.session;
            read_key(section, SESSION_SECTION, "warmup_period_ms", &mut session.warmup_period_ms)?;
            read_key(
                section,
                SESSION_SECTION,
                "min_satellites",
                &mut session.min_satellites_for_tracking,
            )?;
            read_key(section, SESSION_SECTION, "max_accuracy_m", &mut session.max_accuracy_m)?;
            read_key(section, SESSION_SECTION, "min_speed_kmh", &mut session.min_speed_kmh)?;
            read_key(section, SESSION_SECTION, "signal_timeout_ms", &mut session.signal_timeout_ms)?;
        }

        if let Some(section) = ini.section(Some(WATCHDOG_SECTION)) {
            let mut interval_ms = config.watchdog.interval.as_millis() as u64;
            read_key(section, WATCHDOG_SECTION, "interval_ms", &mut interval_ms)?;
            if interval_ms == 0 {
                return Err(ConfigError::InvalidThreshold {
                    field: "watchdog.interval_ms",
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.watchdog.interval = Duration::from_millis(interval_ms);
        }

        config.session.validate()?;
        Ok(config)
    }

    /// Render the effective settings as INI text.
    pub fn to_ini_string(&self) -> String {
        let mut ini = Ini::new();
        ini.with_section(Some(SESSION_SECTION))
            .set("warmup_period_ms", self.session.warmup_period_ms.to_string())
            .set(
                "min_satellites",
                self.session.min_satellites_for_tracking.to_string(),
            )
            .set("max_accuracy_m", self.session.max_accuracy_m.to_string())
            .set("min_speed_kmh", self.session.min_speed_kmh.to_string())
            .set("signal_timeout_ms", self.session.signal_timeout_ms.to_string());
        ini.with_section(Some(WATCHDOG_SECTION)).set(
            "interval_ms",
            (self.watchdog.interval.as_millis() as u64).to_string(),
        );

        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = ini.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Overwrite `target` with the parsed value of `key`, if present.
fn read_key<T: FromStr>(
    section: &Properties,
    section_name: &str,
    key: &str,
    target: &mut T,
) -> Result<(), ConfigError> {
    let Some(raw) = section.get(key) else {
        return Ok(());
    };
    *target = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        section: section_name.to_string(),
        key: key.to_string(),
        value: raw.to_string(),
    })?;
    Ok(())
}
