//! Polling scheduler driving the snapshot source on a fixed interval.
//!
//! The scheduler owns the refresh loop: it asks the source for a fresh
//! snapshot once per period, publishes successes to the store, and hands
//! failures to the logging sink and the UI status channel. At most one
//! fetch is ever in flight; a tick that fires while a fetch is still
//! running is skipped, not queued.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::client::{FetchError, SnapshotSource};
use crate::store::SnapshotStore;
use crate::tui::{UiEvent, send_ui_event};

/// Scheduler lifecycle. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Created, not yet polling
    Idle,
    /// Poll loop active
    Running,
    /// Shut down; cannot be restarted
    Stopped,
}

/// Timing and windowing knobs for the poll loop.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Fixed period between fetch cycles
    pub period: Duration,
    /// Bounded wait for each fetch; must stay below `period` so a hung
    /// request cannot starve subsequent polls
    pub fetch_timeout: Duration,
    /// Maximum records kept per snapshot
    pub display_window: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(5000),
            fetch_timeout: Duration::from_millis(3000),
            display_window: 20,
        }
    }
}

/// Drives a [`SnapshotSource`] on a fixed interval and publishes results.
pub struct PollingScheduler {
    config: PollerConfig,
    source: Arc<dyn SnapshotSource>,
    store: Arc<SnapshotStore>,
    ui_tx: mpsc::Sender<UiEvent>,
    state: SchedulerState,
    stop_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl PollingScheduler {
    /// Create an idle scheduler.
    pub fn new(
        config: PollerConfig,
        source: Arc<dyn SnapshotSource>,
        store: Arc<SnapshotStore>,
        ui_tx: mpsc::Sender<UiEvent>,
    ) -> Self {
        Self {
            config,
            source,
            store,
            ui_tx,
            state: SchedulerState::Idle,
            stop_tx: None,
            task: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Begin polling. The first fetch fires immediately; later fetches at
    /// the configured period. Only valid from `Idle`; anything else is
    /// logged and ignored.
    pub fn start(&mut self) {
        if self.state != SchedulerState::Idle {
            warn!(state = ?self.state, "start() ignored: scheduler is not idle");
            return;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(poll_loop(
            self.config.clone(),
            self.source.clone(),
            self.store.clone(),
            self.ui_tx.clone(),
            stop_rx,
        ));

        self.stop_tx = Some(stop_tx);
        self.task = Some(task);
        self.state = SchedulerState::Running;
    }

    /// Stop polling and cancel any pending cycle.
    ///
    /// A fetch already in flight runs to completion, but its result is
    /// discarded; no update reaches the store after this call.
    pub fn stop(&mut self) {
        match self.state {
            SchedulerState::Running => {
                if let Some(stop_tx) = self.stop_tx.take() {
                    let _ = stop_tx.send(true);
                }
                self.state = SchedulerState::Stopped;
            }
            SchedulerState::Idle => {
                self.state = SchedulerState::Stopped;
            }
            SchedulerState::Stopped => {}
        }
    }

    /// Wait for the poll task to finish after [`stop`](Self::stop).
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

async fn poll_loop(
    config: PollerConfig,
    source: Arc<dyn SnapshotSource>,
    store: Arc<SnapshotStore>,
    ui_tx: mpsc::Sender<UiEvent>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(config.period);
    // A tick that fires mid-fetch is dropped rather than queued.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut consecutive_schema_failures: u32 = 0;
    let mut failed_streak = false;

    loop {
        tokio::select! {
            _ = stop_rx.changed() => break,
            _ = ticker.tick() => {}
        }

        // Awaited inline: at most one fetch in flight at any time.
        let result =
            match tokio::time::timeout(config.fetch_timeout, source.fetch_snapshot()).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Unreachable(format!(
                    "fetch exceeded the {:?} timeout",
                    config.fetch_timeout
                ))),
            };

        if *stop_rx.borrow() {
            // Stopped while the fetch was in flight; discard the result.
            break;
        }

        match result {
            Ok(mut snapshot) => {
                snapshot.truncate_window(config.display_window);
                consecutive_schema_failures = 0;
                if failed_streak {
                    failed_streak = false;
                    send_ui_event(&ui_tx, UiEvent::FetchRecovered);
                }
                if store.replace(snapshot) {
                    debug!("published new metrics snapshot");
                } else {
                    debug!("poll returned an identical snapshot; skipping publish");
                }
            }
            Err(err) => {
                if err.is_schema() {
                    consecutive_schema_failures += 1;
                } else {
                    consecutive_schema_failures = 0;
                }
                failed_streak = true;
                warn!(error = %err, "fetch cycle failed; keeping current snapshot");
                send_ui_event(
                    &ui_tx,
                    UiEvent::FetchFailed {
                        message: err.to_string(),
                        schema_failures: consecutive_schema_failures,
                    },
                );
            }
        }
    }
}
