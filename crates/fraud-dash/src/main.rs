//! fraud-dash binary.
//!
//! Wires the polling scheduler, snapshot store, and terminal UI
//! together. With `--demo` the dashboard runs against a locally
//! synthesized feed; with `-q`/no TTY it runs headless and logs instead
//! of drawing.

use std::io::IsTerminal;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;

use fraud_dash::{
    App, Args, DashboardConfig, DemoSource, MetricsClient, PollerConfig, PollingScheduler,
    RiskClassifier, SnapshotSource, SnapshotStore, TuiConfig, UiEvent, run_tui, send_ui_event,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = DashboardConfig::resolve(&args)?;

    let use_quiet_mode = args.quiet || !std::io::stdout().is_terminal();

    // Only initialize logging outside TUI mode - tracing to stderr ruins
    // the interface.
    if use_quiet_mode {
        tracing_subscriber::fmt::init();
        if !args.quiet {
            eprintln!("INFO: No TTY detected, falling back to quiet mode");
        }
    }

    let source: Arc<dyn SnapshotSource> = if args.demo {
        println!("Starting fraud-dash in demo mode (synthetic feed)...");
        Arc::new(DemoSource::new(config.display_window))
    } else {
        println!("Starting fraud-dash...");
        println!("Metrics endpoint: {}", config.endpoint);
        let client = MetricsClient::new(&config.endpoint, config.fetch_timeout)?;

        // One reachability probe before the first poll; a failure is
        // reported but never fatal - polling retries on schedule anyway.
        match client.check_health().await {
            Ok(()) => println!("Upstream healthy"),
            Err(e) => println!("WARNING: health probe failed: {e}"),
        }
        Arc::new(client)
    };

    let store = Arc::new(SnapshotStore::new());

    // Large capacity to prevent event drops during bursts.
    let (ui_tx, ui_rx) = mpsc::channel::<UiEvent>(256);

    // Forward store changes into the UI channel.
    let forward_tx = ui_tx.clone();
    store.subscribe(move |snapshot| {
        send_ui_event(&forward_tx, UiEvent::Snapshot(snapshot.clone()));
    });

    let mut scheduler = PollingScheduler::new(
        PollerConfig {
            period: config.poll_interval,
            fetch_timeout: config.fetch_timeout,
            display_window: config.display_window,
        },
        source,
        store.clone(),
        ui_tx.clone(),
    );
    scheduler.start();

    if use_quiet_mode {
        println!("Running in quiet mode (no TUI)...");
        println!("Press Ctrl+C to quit");

        // Drain the event channel so the poll task never blocks on a
        // full channel.
        tokio::spawn(async move {
            let mut rx = ui_rx;
            while rx.recv().await.is_some() {}
        });

        tokio::signal::ctrl_c().await?;
        scheduler.stop();
        scheduler.join().await;
    } else {
        let app = App::new(
            config.endpoint.clone(),
            RiskClassifier::new(config.risk_threshold),
        );
        run_tui(app, ui_rx, TuiConfig::default()).await?;

        // When the TUI exits, stop polling; an in-flight fetch completes
        // but its result is discarded.
        scheduler.stop();
    }

    Ok(())
}
