//! Dashboard application state.
//!
//! `App` holds everything the renderer needs: the last published
//! snapshot, the classifier, and the fetch-health indicators. It owns no
//! polling machinery; state changes arrive via `handle_ui_event`.

use std::time::Instant;

use crossterm::event::KeyCode;

use crate::classifier::RiskClassifier;
use crate::snapshot::MetricsSnapshot;

/// Consecutive schema failures before the persistent warning banner shows.
pub const SCHEMA_WARNING_THRESHOLD: u32 = 3;

/// Application running state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Application is running normally
    Running,
    /// Application is shutting down
    Quitting,
}

/// User input mapped to dashboard actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Quit the dashboard
    Quit,
    /// Force a full terminal redraw
    Refresh,
    /// Any other key
    Unknown,
}

impl InputEvent {
    /// Map a key code to an input event.
    pub fn from_key(code: KeyCode) -> Self {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => InputEvent::Quit,
            KeyCode::Char('r') | KeyCode::Char('R') => InputEvent::Refresh,
            _ => InputEvent::Unknown,
        }
    }
}

/// Main dashboard state, a pure function of the events applied to it.
#[derive(Debug)]
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Last published metrics snapshot
    pub snapshot: MetricsSnapshot,
    /// Classification rule applied to each rendered record
    pub classifier: RiskClassifier,
    /// Metrics endpoint, shown in the footer
    pub endpoint: String,
    /// When the snapshot was last replaced
    pub last_update: Option<Instant>,
    /// Most recent fetch failure, cleared on the next success
    pub error_message: Option<String>,
    /// Persistent warning: the upstream keeps sending malformed payloads
    pub schema_warning: bool,
}

impl App {
    /// Create the initial state: empty snapshot, no errors.
    pub fn new(endpoint: impl Into<String>, classifier: RiskClassifier) -> Self {
        Self {
            state: AppState::Running,
            snapshot: MetricsSnapshot::default(),
            classifier,
            endpoint: endpoint.into(),
            last_update: None,
            error_message: None,
            schema_warning: false,
        }
    }

    /// Replace the rendered snapshot after a store notification.
    pub fn apply_snapshot(&mut self, snapshot: MetricsSnapshot) {
        self.snapshot = snapshot;
        self.last_update = Some(Instant::now());
        self.error_message = None;
        self.schema_warning = false;
    }

    /// Record a failed fetch cycle. The snapshot stays as-is.
    pub fn record_failure(&mut self, message: String, schema_failures: u32) {
        self.error_message = Some(message);
        if schema_failures >= SCHEMA_WARNING_THRESHOLD {
            self.schema_warning = true;
        }
    }

    /// Clear failure indicators after a successful fetch that produced no
    /// store change (an identical snapshot).
    pub fn record_recovery(&mut self) {
        self.error_message = None;
        self.schema_warning = false;
    }

    /// Check if the application should quit.
    pub fn should_quit(&self) -> bool {
        self.state == AppState::Quitting
    }

    /// Request application quit.
    pub fn quit(&mut self) {
        self.state = AppState::Quitting;
    }
}
