//! CLI arguments and optional YAML configuration.
//!
//! Every knob is available on the command line; a YAML file can supply
//! the same values for deployments. Precedence: CLI flag, then file,
//! then built-in default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use serde::Deserialize;

/// Built-in defaults, used when neither the CLI nor a config file says
/// otherwise.
const DEFAULT_ENDPOINT: &str = "http://localhost:8000";
const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 3000;
const DEFAULT_DISPLAY_WINDOW: usize = 20;
const DEFAULT_RISK_THRESHOLD: f64 = 0.8;

/// Command-line arguments for the dashboard binary.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Terminal dashboard for fraud-detection pipeline metrics", long_about = None)]
pub struct Args {
    /// Metrics endpoint base URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Polling period in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Per-fetch timeout in milliseconds (must be below the poll interval)
    #[arg(long)]
    pub fetch_timeout_ms: Option<u64>,

    /// Maximum number of records rendered and charted
    #[arg(long)]
    pub display_window: Option<usize>,

    /// Risk-score cutoff separating HIGH_RISK from NORMAL (exclusive)
    #[arg(long)]
    pub risk_threshold: Option<f64>,

    /// Optional YAML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Run against a locally synthesized feed instead of an upstream
    #[arg(long)]
    pub demo: bool,

    /// Disable TUI (log mode only)
    #[arg(short, long)]
    pub quiet: bool,
}

/// YAML config file schema. All fields optional; durations accept
/// human-readable values like "5s" or "1500ms".
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Metrics endpoint base URL
    pub endpoint: Option<String>,
    /// Polling period
    #[serde(default, with = "humantime_serde::option")]
    pub poll_interval: Option<Duration>,
    /// Per-fetch timeout
    #[serde(default, with = "humantime_serde::option")]
    pub fetch_timeout: Option<Duration>,
    /// Maximum number of records rendered and charted
    pub display_window: Option<usize>,
    /// Risk-score cutoff
    pub risk_threshold: Option<f64>,
}

impl FileConfig {
    /// Load and parse a YAML config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))
    }
}

/// Fully resolved dashboard configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Metrics endpoint base URL, no trailing slash
    pub endpoint: String,
    /// Fixed period between fetch cycles
    pub poll_interval: Duration,
    /// Bounded wait for each fetch
    pub fetch_timeout: Duration,
    /// Maximum number of records rendered and charted
    pub display_window: usize,
    /// Risk-score cutoff (exclusive)
    pub risk_threshold: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            display_window: DEFAULT_DISPLAY_WINDOW,
            risk_threshold: DEFAULT_RISK_THRESHOLD,
        }
    }
}

impl DashboardConfig {
    /// Resolve CLI arguments against an optional config file and the
    /// built-in defaults, then validate the result.
    pub fn resolve(args: &Args) -> anyhow::Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let config = Self {
            endpoint: args
                .endpoint
                .clone()
                .or(file.endpoint)
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
                .trim_end_matches('/')
                .to_string(),
            poll_interval: args
                .poll_interval_ms
                .map(Duration::from_millis)
                .or(file.poll_interval)
                .unwrap_or(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)),
            fetch_timeout: args
                .fetch_timeout_ms
                .map(Duration::from_millis)
                .or(file.fetch_timeout)
                .unwrap_or(Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS)),
            display_window: args
                .display_window
                .or(file.display_window)
                .unwrap_or(DEFAULT_DISPLAY_WINDOW),
            risk_threshold: args
                .risk_threshold
                .or(file.risk_threshold)
                .unwrap_or(DEFAULT_RISK_THRESHOLD),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.endpoint.is_empty() {
            bail!("endpoint must not be empty");
        }
        if self.poll_interval.is_zero() {
            bail!("poll interval must be positive");
        }
        if self.fetch_timeout >= self.poll_interval {
            bail!(
                "fetch timeout ({:?}) must be below the poll interval ({:?})",
                self.fetch_timeout,
                self.poll_interval
            );
        }
        if self.display_window == 0 {
            bail!("display window must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.risk_threshold) {
            bail!(
                "risk threshold {} outside [0, 1]",
                self.risk_threshold
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_resolve_without_a_file() {
        let config = DashboardConfig::resolve(&Args::default()).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn file_values_are_used_when_flags_are_absent() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "endpoint: http://metrics.internal:9000\npoll_interval: 2s\nfetch_timeout: 500ms\ndisplay_window: 50\nrisk_threshold: 0.9"
        )
        .unwrap();

        let args = Args {
            config: Some(file.path().to_path_buf()),
            ..Args::default()
        };
        let config = DashboardConfig::resolve(&args).unwrap();

        assert_eq!(config.endpoint, "http://metrics.internal:9000");
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.fetch_timeout, Duration::from_millis(500));
        assert_eq!(config.display_window, 50);
        assert_eq!(config.risk_threshold, 0.9);
    }

    #[test]
    fn cli_flags_win_over_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "endpoint: http://metrics.internal:9000\ndisplay_window: 50").unwrap();

        let args = Args {
            endpoint: Some("http://override:1234/".to_string()),
            config: Some(file.path().to_path_buf()),
            ..Args::default()
        };
        let config = DashboardConfig::resolve(&args).unwrap();

        // CLI endpoint wins (and loses its trailing slash); the file still
        // supplies what the CLI left unset.
        assert_eq!(config.endpoint, "http://override:1234");
        assert_eq!(config.display_window, 50);
    }

    #[test]
    fn timeout_must_stay_below_the_period() {
        let args = Args {
            poll_interval_ms: Some(1000),
            fetch_timeout_ms: Some(1000),
            ..Args::default()
        };
        assert!(DashboardConfig::resolve(&args).is_err());
    }

    #[test]
    fn threshold_must_be_a_probability() {
        let args = Args {
            risk_threshold: Some(1.5),
            ..Args::default()
        };
        assert!(DashboardConfig::resolve(&args).is_err());
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "endpont: http://typo.example").unwrap();

        let args = Args {
            config: Some(file.path().to_path_buf()),
            ..Args::default()
        };
        assert!(DashboardConfig::resolve(&args).is_err());
    }
}
