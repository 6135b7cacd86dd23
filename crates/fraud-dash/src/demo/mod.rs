//! Synthetic snapshot source for running the dashboard without an
//! upstream.
//!
//! Generates plausible traffic: mostly everyday purchases with the
//! occasional high-risk pattern (large or micro amounts at suspicious
//! merchants), so every widget has something to show in a demo.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::client::{FetchError, SnapshotSource};
use crate::snapshot::{MetricsSnapshot, TransactionRecord};

const NORMAL_MERCHANTS: &[&str] = &["Amazon", "Walmart", "Starbucks", "Target", "Gas Station"];
const FRAUD_MERCHANTS: &[&str] = &["UNKNOWN_MERCHANT", "FOREIGN_SITE", "CRYPTO_EXCHANGE"];

/// Fraction of generated transactions that follow the fraud pattern.
const FRAUD_RATIO: f64 = 0.15;

struct DemoState {
    total_transactions: u64,
    fraud_detected: u64,
    /// Most-recent-first, bounded to the window
    records: Vec<TransactionRecord>,
}

/// A [`SnapshotSource`] that synthesizes snapshots locally.
pub struct DemoSource {
    window: usize,
    state: Mutex<DemoState>,
}

impl DemoSource {
    /// Create a demo source bounding its record list to `window`.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            state: Mutex::new(DemoState {
                total_transactions: 0,
                fraud_detected: 0,
                records: Vec::new(),
            }),
        }
    }

    fn generate_record(is_fraud: bool) -> TransactionRecord {
        let mut rng = rand::thread_rng();

        let (amount, merchant, risk_score) = if is_fraud {
            // Large amounts or micro-transactions at suspicious merchants
            let amount: f64 = if rng.gen_bool(0.5) {
                rng.gen_range(500.0..5000.0)
            } else {
                rng.gen_range(0.01..1.0)
            };
            let merchant = FRAUD_MERCHANTS.choose(&mut rng).expect("non-empty list");
            (amount, *merchant, rng.gen_range(0.81..0.99))
        } else {
            let amount: f64 = rng.gen_range(5.0..200.0);
            let merchant = NORMAL_MERCHANTS.choose(&mut rng).expect("non-empty list");
            (amount, *merchant, rng.gen_range(0.01..0.65))
        };

        let id = Uuid::new_v4().as_simple().to_string();
        TransactionRecord {
            transaction_id: format!("TXN-{}", &id[..8]),
            amount: (amount * 100.0).round() / 100.0,
            merchant: merchant.to_string(),
            risk_score,
            timestamp: Utc::now(),
        }
    }
}

#[async_trait]
impl SnapshotSource for DemoSource {
    async fn fetch_snapshot(&self) -> Result<MetricsSnapshot, FetchError> {
        let (snapshot, simulated_latency) = {
            let mut rng = rand::thread_rng();
            let new_count = rng.gen_range(1..=3);
            let avg_latency = rng.gen_range(35.0..120.0);
            let accuracy = rng.gen_range(94.0..99.5);
            let simulated_latency = Duration::from_millis(rng.gen_range(10..40));

            let mut state = self.state.lock().expect("demo state lock");
            for _ in 0..new_count {
                let is_fraud = rng.gen_bool(FRAUD_RATIO);
                state.total_transactions += 1;
                if is_fraud {
                    state.fraud_detected += 1;
                }
                state.records.insert(0, Self::generate_record(is_fraud));
            }
            state.records.truncate(self.window);

            let snapshot = MetricsSnapshot {
                total_transactions: state.total_transactions,
                fraud_detected: state.fraud_detected,
                avg_latency,
                accuracy,
                recent_transactions: state.records.clone(),
            };
            (snapshot, simulated_latency)
        };

        tokio::time::sleep(simulated_latency).await;
        Ok(snapshot)
    }
}
