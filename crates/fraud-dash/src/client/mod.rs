//! HTTP client for the upstream metrics endpoint.
//!
//! One fetch per poll cycle, no client-side retry. The client validates
//! the payload before handing it over, so a malformed or
//! invariant-violating response never reaches the store.

use std::time::Duration;

use async_trait::async_trait;

use crate::snapshot::MetricsSnapshot;

/// Errors a fetch cycle can produce.
///
/// Both variants are recovered locally by the scheduler: the current
/// snapshot stays on screen and polling continues on schedule.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// Network failure, timeout, or non-success HTTP status.
    #[error("metrics endpoint unreachable: {0}")]
    Unreachable(String),
    /// Missing/mistyped field or an invariant violation in the payload.
    #[error("invalid metrics payload: {0}")]
    InvalidSchema(String),
}

impl FetchError {
    pub(crate) fn unreachable(cause: impl std::fmt::Display) -> Self {
        Self::Unreachable(cause.to_string())
    }

    pub(crate) fn invalid(cause: impl std::fmt::Display) -> Self {
        Self::InvalidSchema(cause.to_string())
    }

    /// Whether this is a schema failure, tracked for the persistent
    /// warning banner.
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::InvalidSchema(_))
    }
}

/// Anything that can produce a snapshot for the polling scheduler.
///
/// `MetricsClient` is the production source; tests and demo mode supply
/// their own.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Attempt one fetch. Must not touch the store or retry internally.
    async fn fetch_snapshot(&self) -> Result<MetricsSnapshot, FetchError>;
}

/// Client for `GET <base>/metrics`.
pub struct MetricsClient {
    http: reqwest::Client,
    base_url: String,
}

impl MetricsClient {
    /// Build a client with the fetch timeout baked into the HTTP layer.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The configured endpoint base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe `GET <base>/health` once, at startup.
    ///
    /// Reports upstream reachability before the first poll; a failure is
    /// logged by the caller, not fatal.
    pub async fn check_health(&self) -> Result<(), FetchError> {
        let url = format!("{}/health", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(FetchError::unreachable)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Unreachable(format!(
                "{url} returned HTTP {status}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SnapshotSource for MetricsClient {
    async fn fetch_snapshot(&self) -> Result<MetricsSnapshot, FetchError> {
        let url = format!("{}/metrics", self.base_url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(FetchError::unreachable)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Unreachable(format!(
                "{url} returned HTTP {status}"
            )));
        }

        let snapshot: MetricsSnapshot = resp.json().await.map_err(|e| {
            if e.is_decode() {
                FetchError::invalid(e)
            } else {
                FetchError::unreachable(e)
            }
        })?;

        snapshot.validate().map_err(FetchError::invalid)?;

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::get};
    use std::net::SocketAddr;

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub server");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub server");
        });
        addr
    }

    fn valid_body() -> serde_json::Value {
        serde_json::json!({
            "totalTransactions": 10,
            "fraudDetected": 1,
            "avgLatency": 52.3,
            "accuracy": 97.1,
            "recentTransactions": [{
                "transaction_id": "TXN100001",
                "amount": 19.99,
                "merchant": "Starbucks",
                "risk_score": 0.12,
                "timestamp": "2025-11-02T14:30:00Z",
            }],
        })
    }

    #[tokio::test]
    async fn fetch_parses_a_valid_payload() {
        let app = Router::new().route("/metrics", get(|| async { Json(valid_body()) }));
        let addr = serve(app).await;
        let client =
            MetricsClient::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();

        let snapshot = client.fetch_snapshot().await.unwrap();
        assert_eq!(snapshot.total_transactions, 10);
        assert_eq!(snapshot.fraud_detected, 1);
        assert_eq!(snapshot.recent_transactions.len(), 1);
    }

    #[tokio::test]
    async fn non_success_status_is_unreachable() {
        let app = Router::new().route(
            "/metrics",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let addr = serve(app).await;
        let client =
            MetricsClient::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();

        let err = client.fetch_snapshot().await.unwrap_err();
        assert!(matches!(err, FetchError::Unreachable(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn invariant_violation_is_invalid_schema() {
        let app = Router::new().route(
            "/metrics",
            get(|| async {
                Json(serde_json::json!({
                    "totalTransactions": 10,
                    "fraudDetected": 11,
                    "avgLatency": 52.3,
                    "accuracy": 97.1,
                    "recentTransactions": [],
                }))
            }),
        );
        let addr = serve(app).await;
        let client =
            MetricsClient::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();

        let err = client.fetch_snapshot().await.unwrap_err();
        assert!(err.is_schema(), "got {err:?}");
    }

    #[tokio::test]
    async fn missing_field_is_invalid_schema() {
        let app = Router::new().route(
            "/metrics",
            get(|| async {
                Json(serde_json::json!({
                    "totalTransactions": 10,
                    "accuracy": 97.1,
                    "recentTransactions": [],
                }))
            }),
        );
        let addr = serve(app).await;
        let client =
            MetricsClient::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();

        let err = client.fetch_snapshot().await.unwrap_err();
        assert!(err.is_schema(), "got {err:?}");
    }

    #[tokio::test]
    async fn slow_upstream_times_out_as_unreachable() {
        let app = Router::new().route(
            "/metrics",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Json(valid_body())
            }),
        );
        let addr = serve(app).await;
        let client =
            MetricsClient::new(&format!("http://{addr}"), Duration::from_millis(100)).unwrap();

        let err = client.fetch_snapshot().await.unwrap_err();
        assert!(matches!(err, FetchError::Unreachable(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn unreachable_host_is_unreachable() {
        // Nothing listens on this port.
        let client =
            MetricsClient::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();
        let err = client.fetch_snapshot().await.unwrap_err();
        assert!(matches!(err, FetchError::Unreachable(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn health_probe_checks_status_only() {
        let app = Router::new().route(
            "/health",
            get(|| async { Json(serde_json::json!({"status": "healthy"})) }),
        );
        let addr = serve(app).await;
        let client =
            MetricsClient::new(&format!("http://{addr}/"), Duration::from_secs(2)).unwrap();

        // Trailing slash in the base URL is trimmed.
        assert_eq!(client.base_url(), format!("http://{addr}"));
        client.check_health().await.unwrap();
    }
}
