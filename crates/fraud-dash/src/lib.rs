//! fraud-dash — live terminal dashboard for a fraud-detection pipeline.
//!
//! Polls a metrics endpoint on a fixed interval, holds the latest
//! snapshot in memory, and renders derived views: summary cards, a
//! recent-transaction table, and a risk time-series chart, with a fixed
//! classification rule applied to each record.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐   fetch    ┌───────────────┐
//! │ PollingScheduler├──────────►│ SnapshotSource │  (MetricsClient
//! │  Idle→Running   │◄──────────┤  /metrics      │   or DemoSource)
//! │     →Stopped    │  snapshot └───────────────┘
//! └───────┬────────┘
//!         │ replace (atomic, equality-suppressed)
//!         ▼
//! ┌────────────────┐  notify   ┌───────────────┐
//! │ SnapshotStore   ├─────────►│ DashboardView  │
//! │ current+previous│          │ cards/table/   │
//! └────────────────┘          │ chart (ratatui)│
//!                              └───────────────┘
//! ```
//!
//! The scheduler is the only writer; the view is a pure function of the
//! state it is handed and never polls on its own. A failed fetch keeps
//! the current snapshot on screen and polling continues on schedule.

pub mod classifier;
pub mod client;
pub mod config;
pub mod demo;
pub mod poller;
pub mod snapshot;
pub mod store;
pub mod tui;

// Re-export key types for convenience
pub use classifier::{RiskClassifier, RiskLevel};
pub use client::{FetchError, MetricsClient, SnapshotSource};
pub use config::{Args, DashboardConfig, FileConfig};
pub use demo::DemoSource;
pub use poller::{PollerConfig, PollingScheduler, SchedulerState};
pub use snapshot::{MetricsSnapshot, SchemaError, TransactionRecord};
pub use store::{SnapshotStore, SubscriptionId};
pub use tui::{
    App, AppState, InputEvent, SCHEMA_WARNING_THRESHOLD, TuiConfig, UiEvent, run_tui,
    send_ui_event,
};
