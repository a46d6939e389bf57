//! Integration tests for the dashboard pipeline.
//!
//! These tests drive the complete flow:
//! - Recorded receiver traffic → ReplaySource → FixAssembler
//! - DashboardService → SignalFilter → SessionTracker
//! - SignalWatchdog forcing zero speed on a stale signal
//! - WatchSink delivering snapshots to the presentation side
//!
//! Run with: `cargo test --test dashboard_integration`

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use speedometer::config::{ConfigFile, SessionConfig, WatchdogSettings};
use speedometer::dashboard::{Dashboard, SharedDashboard, WatchSink};
use speedometer::fix::GpsFix;
use speedometer::service::DashboardService;
use speedometer::source::{FixSource, ReplaySource};
use speedometer::time::{ScriptedClock, TimeSource};

// ============================================================================
// Helpers
// ============================================================================

/// Clock that follows tokio's (pausable) time.
struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl TimeSource for TokioClock {
    fn current_time_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {expected}, got {actual}"
    );
}

/// A short drive: lock, warm-up, cruise, a noisy stop, a sprint, then silence.
const DRIVE: &str = r#"
{"at_ms": 0,     "kind": "satellites", "used_in_fix": 5}
{"at_ms": 1000,  "kind": "location", "speed_mps": 20.0, "accuracy_m": 5.0}
{"at_ms": 6000,  "kind": "location", "speed_mps": 20.0, "accuracy_m": 5.0}
{"at_ms": 6500,  "kind": "location", "speed_mps": 0.2, "accuracy_m": 5.0}
{"at_ms": 7000,  "kind": "location", "speed_mps": 25.0, "accuracy_m": 5.0}
{"at_ms": 7100,  "kind": "location", "speed_mps": 40.0, "accuracy_m": 90.0}
{"at_ms": 12000, "kind": "provider_disabled"}
"#;

// ============================================================================
// Integration Tests
// ============================================================================

/// Replay a drive end to end and check the final readout.
#[tokio::test(start_paused = true)]
async fn test_replayed_drive_end_to_end() {
    let clock: Arc<dyn TimeSource> = Arc::new(TokioClock::new());
    let config = ConfigFile::default();

    let (sink, mut rx) = WatchSink::channel();
    let mut dashboard = Dashboard::new(config.session, Arc::clone(&clock), Arc::new(sink));
    dashboard.start_session();
    let shared: SharedDashboard = dashboard.into_shared();

    let (service, events) = DashboardService::new(Arc::clone(&shared), config.watchdog);
    let shutdown = CancellationToken::new();
    let service_task = tokio::spawn(service.run(shutdown.clone()));

    let source = ReplaySource::parse("drive", DRIVE, Arc::clone(&clock)).unwrap();
    let producer = tokio::spawn(Box::new(source).run(events, shutdown.clone()));

    // Sample the readout while the drive plays
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    let warmup = rx.borrow_and_update().statistics;
    assert_close(warmup.current_speed_kmh, 72.0);
    assert_close(warmup.max_speed_kmh, 0.0);
    assert_eq!(warmup.current_satellites, 5);

    tokio::time::sleep(Duration::from_millis(3_000)).await; // t = 4500
    let stale = rx.borrow_and_update().statistics;
    assert_eq!(stale.current_speed_kmh, 0.0, "watchdog zeroes the gap");
    assert_eq!(stale.max_speed_kmh, 0.0);

    tokio::time::sleep(Duration::from_millis(2_100)).await; // t = 6600
    let stopped = rx.borrow_and_update().statistics;
    assert_eq!(stopped.current_speed_kmh, 0.0, "sub-threshold speed is sanitized");
    assert_close(stopped.max_speed_kmh, 72.0);

    tokio::time::sleep(Duration::from_millis(600)).await; // t = 7200
    let sprint = rx.borrow_and_update().statistics;
    // The 90 m accuracy sample is distrusted, so the 25 m/s one holds the peak
    assert_eq!(sprint.current_speed_kmh, 0.0);
    assert_close(sprint.max_speed_kmh, 90.0);

    producer.await.unwrap();
    let summary = service_task.await.unwrap();

    assert_eq!(summary.fixes, 6);
    assert_eq!(summary.provider_errors, 1);

    let state = shared.lock().state().clone();
    assert_eq!(state.statistics.current_speed_kmh, 0.0);
    assert_close(state.statistics.max_speed_kmh, 90.0);
    assert_eq!(state.statistics.max_satellites, 5);
    assert_eq!(state.status.as_deref(), Some("GPS Provider is disabled."));
}

/// The watchdog zeroes a frozen readout without touching the peak.
#[tokio::test(start_paused = true)]
async fn test_watchdog_zeroes_frozen_readout() {
    let clock: Arc<dyn TimeSource> = Arc::new(TokioClock::new());
    let config = SessionConfig::default().with_warmup_period_ms(0);

    let (sink, rx) = WatchSink::channel();
    let mut dashboard = Dashboard::new(config, Arc::clone(&clock), Arc::new(sink));
    dashboard.start_session();
    let shared = dashboard.into_shared();

    let settings = WatchdogSettings {
        interval: Duration::from_millis(500),
    };
    let (service, events) = DashboardService::new(Arc::clone(&shared), settings);
    let shutdown = CancellationToken::new();
    let service_task = tokio::spawn(service.run(shutdown.clone()));

    events
        .send(GpsFix::new(30.0, Some(3.0), 9, 0).into())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert!(rx.borrow().statistics.is_moving(), "within timeout");

    tokio::time::sleep(Duration::from_millis(1_600)).await;
    let stats = rx.borrow().statistics;
    assert_eq!(stats.current_speed_kmh, 0.0);
    assert_close(stats.max_speed_kmh, 108.0);
    assert_eq!(stats.current_satellites, 9);

    // A fresh fix brings the readout back
    events
        .send(GpsFix::new(10.0, Some(3.0), 9, 0).into())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_close(rx.borrow().statistics.current_speed_kmh, 36.0);

    shutdown.cancel();
    service_task.await.unwrap();
}

/// Scripted time reproduces the documented tracker scenarios through the
/// public dashboard API.
#[test]
fn test_scripted_session_scenarios() {
    let config = SessionConfig::default()
        .with_warmup_period_ms(5_000)
        .with_min_satellites(3);

    // start_session reads 0; every fix reads once in the tracker and once
    // for the last-fix stamp, whether or not the gates are open
    let clock = Arc::new(ScriptedClock::new([0, 6_000, 6_000, 7_000, 7_000]));
    let (sink, _rx) = WatchSink::channel();
    let mut dashboard = Dashboard::new(config, clock, Arc::new(sink));

    dashboard.start_session();
    let first = dashboard.handle_fix(&GpsFix::new(20.0, Some(30.0), 5, 6_000));
    assert_close(first.current_speed_kmh, 72.0);
    assert_close(first.max_speed_kmh, 72.0);

    dashboard.reset();
    let after_reset = dashboard.handle_fix(&GpsFix::new(5.0, Some(30.0), 2, 7_000));
    assert_close(after_reset.max_speed_kmh, 0.0);
    assert_eq!(after_reset.max_satellites, 2);
}
