//! Terminal user interface for the fraud dashboard.
//!
//! The TUI is a pure consumer: it renders whatever the snapshot store
//! last published and never polls on its own. Updates arrive over an
//! event channel fed by the store subscription and the polling
//! scheduler's status reports.
//!
//! # Layout
//!
//! ```text
//! ╔══════════════════════════════════════════════════════════════╗
//! ║  FRAUD DETECTION PIPELINE                 LIVE | updated 4s  ║
//! ╠══════════════╦══════════════╦══════════════╦═════════════════╣
//! ║ TOTAL TXNS   ║ FRAUD        ║ AVG LATENCY  ║ ACCURACY        ║
//! ╠══════════════╩══════════════╩══════════════╩═════════════════╣
//! ║  RECENT TRANSACTIONS (id, amount, merchant, risk, status)    ║
//! ╠══════════════════════════════════════════════════════════════╣
//! ║  RISK SCORE OVER TIME                                        ║
//! ╠══════════════════════════════════════════════════════════════╣
//! ║  [Q] Quit  [R] Redraw          http://localhost:8000         ║
//! ╚══════════════════════════════════════════════════════════════╝
//! ```

mod app;
mod ui;

pub use app::{App, AppState, InputEvent, SCHEMA_WARNING_THRESHOLD};

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing::warn;

use crate::snapshot::MetricsSnapshot;

/// Events sent to the TUI from the polling layer and store subscription.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// A new snapshot was published to the store
    Snapshot(MetricsSnapshot),
    /// A fetch cycle failed; the previous snapshot stays on screen
    FetchFailed {
        /// Human-readable failure description
        message: String,
        /// Consecutive schema failures so far (resets on success)
        schema_failures: u32,
    },
    /// A fetch cycle succeeded after one or more failures
    FetchRecovered,
    /// Force quit
    Quit,
}

/// Get a short name for the event type (for logging).
fn event_name(event: &UiEvent) -> &'static str {
    match event {
        UiEvent::Snapshot(_) => "Snapshot",
        UiEvent::FetchFailed { .. } => "FetchFailed",
        UiEvent::FetchRecovered => "FetchRecovered",
        UiEvent::Quit => "Quit",
    }
}

/// Send a UI event, logging if the channel is full.
///
/// Replaces bare `try_send()` calls that would silently drop events.
pub fn send_ui_event(tx: &mpsc::Sender<UiEvent>, event: UiEvent) {
    if let Err(e) = tx.try_send(event) {
        match e {
            mpsc::error::TrySendError::Full(ev) => {
                warn!("UI event channel full, dropping event: {}", event_name(&ev));
            }
            mpsc::error::TrySendError::Closed(ev) => {
                warn!("UI event channel closed, dropping event: {}", event_name(&ev));
            }
        }
    }
}

/// Configuration for the TUI.
#[derive(Debug, Clone)]
pub struct TuiConfig {
    /// Tick rate for UI redraws between events
    pub tick_rate: Duration,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }
}

/// Run the terminal UI until the user quits (Q key or Esc).
pub async fn run_tui(
    mut app: App,
    mut event_rx: mpsc::Receiver<UiEvent>,
    config: TuiConfig,
) -> anyhow::Result<()> {
    use std::io::Write;

    // Setup terminal with panic handler to ensure cleanup
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        let _ = io::stdout().flush();
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    terminal.clear()?;

    let tick_rate = config.tick_rate;
    let mut last_tick = std::time::Instant::now();

    // Process any pending events before the first draw so the dashboard
    // never flashes its empty state when data is already available.
    while let Ok(event) = event_rx.try_recv() {
        handle_ui_event(&mut app, event);
    }

    loop {
        terminal.draw(|frame| ui::draw(frame, &app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    match InputEvent::from_key(key.code) {
                        InputEvent::Quit => app.quit(),
                        InputEvent::Refresh => terminal.clear()?,
                        InputEvent::Unknown => {}
                    }
                }
            }
        }

        // Check for application events (non-blocking)
        while let Ok(event) = event_rx.try_recv() {
            handle_ui_event(&mut app, event);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = std::time::Instant::now();
        }

        if app.should_quit() {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    let _ = io::stdout().flush();

    Ok(())
}

/// Handle a UI event.
fn handle_ui_event(app: &mut App, event: UiEvent) {
    match event {
        UiEvent::Snapshot(snapshot) => {
            app.apply_snapshot(snapshot);
        }
        UiEvent::FetchFailed {
            message,
            schema_failures,
        } => {
            app.record_failure(message, schema_failures);
        }
        UiEvent::FetchRecovered => {
            app.record_recovery();
        }
        UiEvent::Quit => {
            app.quit();
        }
    }
}
