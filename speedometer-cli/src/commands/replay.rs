//! `replay` command.
//!
//! Plays a recorded drive through the dashboard in real time, printing the
//! readout whenever it changes. Ctrl+C stops playback early.

use std::path::PathBuf;
use std::sync::Arc;

use speedometer::dashboard::{Dashboard, DashboardState, WatchSink};
use speedometer::logging::{init_logging, LoggingOptions};
use speedometer::service::{DashboardService, ServiceSummary};
use speedometer::source::{FixSource, ReplaySource};
use speedometer::time::{MonotonicClock, TimeSource};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::config::load_config;
use crate::error::CliError;

/// Arguments for the replay command.
#[derive(Debug)]
pub struct ReplayArgs {
    pub file: PathBuf,
    pub config: Option<PathBuf>,
    pub verbose: bool,
    pub log_dir: Option<PathBuf>,
}

/// Run the replay command.
pub fn run(args: ReplayArgs) -> Result<(), CliError> {
    let _logging = init_logging(&LoggingOptions {
        verbose: args.verbose,
        log_dir: args.log_dir.clone(),
    })?;

    let config = load_config(args.config.as_deref())?;
    let clock: Arc<dyn TimeSource> = Arc::new(MonotonicClock::new());
    let source = ReplaySource::from_path(&args.file, Arc::clone(&clock))?;

    println!("Speedometer Replay v{}", speedometer::VERSION);
    println!("========================");
    println!();
    println!("Recording: {}", source.name());
    println!(
        "Records:   {} over {:.1}s",
        source.len(),
        source.duration().as_secs_f64()
    );
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, stopping replay...");
        signal_token.cancel();
    })
    .map_err(|e| CliError::Runtime(format!("Failed to set signal handler: {}", e)))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(format!("Failed to start runtime: {}", e)))?;

    let (summary, final_state) = runtime.block_on(async move {
        let (sink, readout) = WatchSink::channel();
        let mut dashboard = Dashboard::new(config.session, clock, Arc::new(sink));
        dashboard.start_session();
        let shared = dashboard.into_shared();

        let (service, events) = DashboardService::new(Arc::clone(&shared), config.watchdog);

        let render_stop = CancellationToken::new();
        let render = tokio::spawn(render_loop(readout, render_stop.clone()));
        let producer = tokio::spawn(Box::new(source).run(events, shutdown.clone()));

        let summary = service.run(shutdown).await;
        if let Err(e) = producer.await {
            tracing::warn!(error = %e, "Replay task failed");
        }
        render_stop.cancel();
        if let Err(e) = render.await {
            tracing::warn!(error = %e, "Render task failed");
        }

        let final_state = shared.lock().state().clone();
        (summary, final_state)
    });

    print_summary(&summary, &final_state);
    Ok(())
}

/// Print every readout change until stopped.
async fn render_loop(mut readout: watch::Receiver<DashboardState>, stop: CancellationToken) {
    loop {
        tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            changed = readout.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = readout.borrow_and_update().clone();
                println!("{}", format_line(&state));
            }
        }
    }
}

/// One-line rendering of the readout, status first when present.
fn format_line(state: &DashboardState) -> String {
    let line = state.readout().join(" | ");
    match &state.status {
        Some(status) => format!("! {} | {}", status, line),
        None => line,
    }
}

fn print_summary(summary: &ServiceSummary, state: &DashboardState) {
    println!();
    println!("Session Summary");
    println!("───────────────");
    println!("  Fixes:           {}", summary.fixes);
    println!("  Provider errors: {}", summary.provider_errors);
    println!();
    print!("{}", state);
    println!();
}
