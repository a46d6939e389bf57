//! Replay of recorded receiver traffic.
//!
//! Recordings are JSON lines, one receiver callback per line, each with an
//! offset in milliseconds from the start of the recording:
//!
//! ```text
//! {"at_ms": 0,    "kind": "satellites", "used_in_fix": 4}
//! {"at_ms": 200,  "kind": "location", "speed_mps": 0.3, "accuracy_m": 12.0}
//! {"at_ms": 1200, "kind": "location", "speed_mps": 8.5}
//! {"at_ms": 9000, "kind": "provider_disabled"}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Offsets must not
//! decrease. Records are paced in real time and merged into fixes by a
//! [`FixAssembler`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{FixAssembler, FixSource, LocationUpdate};
use crate::fix::{FixEvent, ProviderError};
use crate::time::TimeSource;

/// Errors reading a recording.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The recording could not be read.
    #[error("Failed to read recording {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line is not a valid record.
    #[error("Invalid record on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A record's offset is earlier than the one before it.
    #[error("Record on line {line} at {at_ms}ms is earlier than previous record at {previous_ms}ms")]
    OutOfOrder {
        line: usize,
        at_ms: u64,
        previous_ms: u64,
    },
}

/// One recorded receiver callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    /// Offset from the start of the recording.
    pub at_ms: u64,
    /// What the receiver reported.
    #[serde(flatten)]
    pub kind: ReplayRecordKind,
}

/// Receiver callback payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplayRecordKind {
    /// Location update.
    Location {
        speed_mps: f32,
        #[serde(default)]
        accuracy_m: Option<f32>,
    },
    /// Satellite status update.
    Satellites { used_in_fix: u32 },
    /// The provider was switched off.
    ProviderDisabled,
    /// Location permission was refused.
    PermissionDenied,
}

/// Plays a recording back as a [`FixSource`].
pub struct ReplaySource {
    name: String,
    records: Vec<ReplayRecord>,
    assembler: FixAssembler,
}

impl std::fmt::Debug for ReplaySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplaySource")
            .field("name", &self.name)
            .field("records", &self.records.len())
            .finish_non_exhaustive()
    }
}

impl ReplaySource {
    /// Load a recording from disk.
    pub fn from_path(path: &Path, time: Arc<dyn TimeSource>) -> Result<Self, ReplayError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path.display().to_string(), &contents, time)
    }

    /// Parse a recording held in memory.
    pub fn parse(
        name: impl Into<String>,
        contents: &str,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self, ReplayError> {
        let records = parse_records(contents)?;
        Ok(Self::new(name, records, time))
    }

    /// Build a source from already-parsed records.
    pub fn new(name: impl Into<String>, records: Vec<ReplayRecord>, time: Arc<dyn TimeSource>) -> Self {
        Self {
            name: name.into(),
            records,
            assembler: FixAssembler::new(time),
        }
    }

    /// Number of records in the recording.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the recording is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Playback length: the offset of the last record.
    ///
    /// Offsets count from the start of playback, so a leading gap before
    /// the first record is included.
    pub fn duration(&self) -> Duration {
        let last = self.records.last().map_or(0, |r| r.at_ms);
        Duration::from_millis(last)
    }

    fn event_for(&mut self, kind: &ReplayRecordKind) -> FixEvent {
        match *kind {
            ReplayRecordKind::Location {
                speed_mps,
                accuracy_m,
            } => FixEvent::Fix(self.assembler.on_location(LocationUpdate {
                speed_mps,
                accuracy_m,
            })),
            ReplayRecordKind::Satellites { used_in_fix } => {
                FixEvent::Fix(self.assembler.on_satellite_count(used_in_fix))
            }
            ReplayRecordKind::ProviderDisabled => {
                FixEvent::ProviderError(ProviderError::ProviderDisabled)
            }
            ReplayRecordKind::PermissionDenied => {
                FixEvent::ProviderError(ProviderError::PermissionDenied)
            }
        }
    }

    async fn play(mut self, events: mpsc::Sender<FixEvent>, shutdown: CancellationToken) {
        info!(source = %self.name, records = self.records.len(), "Replay starting");
        let start = Instant::now();
        let records = std::mem::take(&mut self.records);
        let mut delivered = 0usize;

        for record in &records {
            let due = start + Duration::from_millis(record.at_ms);
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    debug!("Replay cancelled while waiting");
                    break;
                }
                _ = sleep_until(due) => {}
            }

            let event = self.event_for(&record.kind);
            let sent = tokio::select! {
                biased;
                _ = shutdown.cancelled() => false,
                result = events.send(event) => result.is_ok(),
            };
            if !sent {
                debug!("Replay stopped: consumer gone or cancelled");
                break;
            }
            delivered += 1;
        }

        info!(source = %self.name, delivered, "Replay finished");
    }
}

impl FixSource for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(
        self: Box<Self>,
        events: mpsc::Sender<FixEvent>,
        shutdown: CancellationToken,
    ) -> BoxFuture<'static, ()> {
        Box::pin((*self).play(events, shutdown))
    }
}

/// Parse a JSON-lines recording.
pub(crate) fn parse_records(contents: &str) -> Result<Vec<ReplayRecord>, ReplayError> {
    let mut records: Vec<ReplayRecord> = Vec::new();

    for (index, raw) in contents.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let record: ReplayRecord =
            serde_json::from_str(trimmed).map_err(|source| ReplayError::Parse { line, source })?;

        if let Some(previous) = records.last() {
            if record.at_ms < previous.at_ms {
                return Err(ReplayError::OutOfOrder {
                    line,
                    at_ms: record.at_ms,
                    previous_ms: previous.at_ms,
                });
            }
        }
        records.push(record);
    }

    Ok(records)
}
