//! Speedometer - GPS speed and session statistics engine
//!
//! Turns raw receiver fixes into a displayed speed and session statistics:
//! current and peak speed, current and peak satellite count.
//!
//! # Data Flow
//!
//! ```text
//! FixSource ──► SignalFilter ──► SessionTracker ──► SessionStatistics ──► StatisticsSink
//!              (pass / sanitize)  (warm-up and                            (presentation)
//!                                  satellite gates)
//!                                        ▲
//! SignalWatchdog ── stale signal ──► synthetic zero-speed fix
//! ```
//!
//! The [`dashboard`] module wires these together behind a single lock and
//! [`service`] runs the event loop with the watchdog.

pub mod config;
pub mod dashboard;
pub mod filter;
pub mod fix;
pub mod logging;
pub mod service;
pub mod session;
pub mod source;
pub mod time;
pub mod units;
pub mod watchdog;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
