//! Fix sources.
//!
//! A [`FixSource`] pushes [`FixEvent`]s into a channel until it runs out of
//! data or is cancelled. Provider conditions travel on the same channel as
//! [`FixEvent::ProviderError`] so they reach the presentation layer in order
//! with the fixes around them.
//!
//! # Example
//!
//! ```ignore
//! use speedometer::source::{FixSource, ReplaySource};
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(64);
//! let shutdown = CancellationToken::new();
//!
//! let source = ReplaySource::from_path("drive.jsonl", clock)?;
//! tokio::spawn(Box::new(source).run(tx, shutdown.clone()));
//! ```

mod assembler;
mod replay;

pub use assembler::{FixAssembler, LocationUpdate};
pub use replay::{ReplayError, ReplayRecord, ReplayRecordKind, ReplaySource};

use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::fix::FixEvent;

/// Default capacity of the fix delivery channel.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;

/// Produces fixes asynchronously.
///
/// Implementations stop when `shutdown` is cancelled or when every receiver
/// has been dropped, and drop `events` on exit so the consumer sees the
/// channel close.
pub trait FixSource: Send + 'static {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Deliver events until exhausted or cancelled.
    fn run(
        self: Box<Self>,
        events: mpsc::Sender<FixEvent>,
        shutdown: CancellationToken,
    ) -> BoxFuture<'static, ()>;
}
