//! Snapshot data model for the fraud-detection metrics feed.
//!
//! These types mirror the JSON the metrics endpoint serves: summary
//! counters in camelCase, transaction records in snake_case. A snapshot
//! is one complete, internally consistent view of the pipeline; it is
//! replaced wholesale on every successful poll and never merged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary metrics plus the bounded recent-transaction list.
///
/// The store starts from `MetricsSnapshot::default()` (all-zero metrics,
/// empty record list) until the first successful poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Total transactions scored by the pipeline
    pub total_transactions: u64,
    /// Transactions flagged as fraud, never more than `total_transactions`
    pub fraud_detected: u64,
    /// Average scoring latency in milliseconds
    pub avg_latency: f64,
    /// Model accuracy as a percentage in [0, 100]
    pub accuracy: f64,
    /// Recent transactions, most-recent-first
    pub recent_transactions: Vec<TransactionRecord>,
}

/// One observed transaction, immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Opaque unique id, used only as a stable render key
    pub transaction_id: String,
    /// Transaction amount in dollars
    pub amount: f64,
    /// Merchant display name
    pub merchant: String,
    /// Estimated fraud likelihood in [0.0, 1.0], supplied by the pipeline
    pub risk_score: f64,
    /// Observation time, the chart's ordering key
    pub timestamp: DateTime<Utc>,
}

/// A payload that parsed as JSON but violates the snapshot schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// The fraud counter exceeds the total counter
    #[error("fraudDetected ({fraud}) exceeds totalTransactions ({total})")]
    FraudExceedsTotal {
        /// Reported fraud count
        fraud: u64,
        /// Reported total count
        total: u64,
    },
    /// Accuracy outside the valid percentage range
    #[error("accuracy {0} outside [0, 100]")]
    AccuracyOutOfRange(f64),
    /// Negative average latency
    #[error("avgLatency {0} is negative")]
    NegativeLatency(f64),
    /// A record's risk score outside the unit interval
    #[error("record {id}: risk_score {score} outside [0, 1]")]
    RiskScoreOutOfRange {
        /// Offending transaction id
        id: String,
        /// Reported score
        score: f64,
    },
    /// A record with a negative amount
    #[error("record {id}: amount {amount} is negative")]
    NegativeAmount {
        /// Offending transaction id
        id: String,
        /// Reported amount
        amount: f64,
    },
}

impl MetricsSnapshot {
    /// Check the invariants a snapshot must satisfy before it may reach
    /// the store. The range comparisons are written so that NaN fails.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.fraud_detected > self.total_transactions {
            return Err(SchemaError::FraudExceedsTotal {
                fraud: self.fraud_detected,
                total: self.total_transactions,
            });
        }
        if !(0.0..=100.0).contains(&self.accuracy) {
            return Err(SchemaError::AccuracyOutOfRange(self.accuracy));
        }
        if !(0.0..).contains(&self.avg_latency) {
            return Err(SchemaError::NegativeLatency(self.avg_latency));
        }
        for record in &self.recent_transactions {
            if !(0.0..=1.0).contains(&record.risk_score) {
                return Err(SchemaError::RiskScoreOutOfRange {
                    id: record.transaction_id.clone(),
                    score: record.risk_score,
                });
            }
            if !(0.0..).contains(&record.amount) {
                return Err(SchemaError::NegativeAmount {
                    id: record.transaction_id.clone(),
                    amount: record.amount,
                });
            }
        }
        Ok(())
    }

    /// Bound the record list to the configured display window.
    ///
    /// Records arrive most-recent-first, so truncation keeps the newest.
    pub fn truncate_window(&mut self, window: usize) {
        self.recent_transactions.truncate(window);
    }

    /// Records in chronological ascending order for the time-series chart.
    ///
    /// The sort is stable: records sharing a timestamp keep the upstream's
    /// relative order.
    pub fn records_chronological(&self) -> Vec<&TransactionRecord> {
        let mut records: Vec<&TransactionRecord> = self.recent_transactions.iter().collect();
        records.sort_by_key(|r| r.timestamp);
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: &str, risk_score: f64, secs: i64) -> TransactionRecord {
        TransactionRecord {
            transaction_id: id.to_string(),
            amount: 42.50,
            merchant: "Acme Mart".to_string(),
            risk_score,
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    #[test]
    fn default_snapshot_is_empty_and_valid() {
        let snapshot = MetricsSnapshot::default();
        assert_eq!(snapshot.total_transactions, 0);
        assert_eq!(snapshot.fraud_detected, 0);
        assert!(snapshot.recent_transactions.is_empty());
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn fraud_exceeding_total_is_rejected() {
        let snapshot = MetricsSnapshot {
            total_transactions: 10,
            fraud_detected: 11,
            avg_latency: 50.0,
            accuracy: 95.0,
            recent_transactions: vec![],
        };
        assert_eq!(
            snapshot.validate(),
            Err(SchemaError::FraudExceedsTotal {
                fraud: 11,
                total: 10
            })
        );
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        let mut snapshot = MetricsSnapshot {
            total_transactions: 10,
            fraud_detected: 1,
            avg_latency: 50.0,
            accuracy: 101.0,
            recent_transactions: vec![],
        };
        assert!(matches!(
            snapshot.validate(),
            Err(SchemaError::AccuracyOutOfRange(_))
        ));

        snapshot.accuracy = f64::NAN;
        assert!(matches!(
            snapshot.validate(),
            Err(SchemaError::AccuracyOutOfRange(_))
        ));

        snapshot.accuracy = 95.0;
        snapshot.avg_latency = -1.0;
        assert!(matches!(
            snapshot.validate(),
            Err(SchemaError::NegativeLatency(_))
        ));

        snapshot.avg_latency = 50.0;
        snapshot.recent_transactions = vec![record("TXN1", 1.2, 0)];
        assert!(matches!(
            snapshot.validate(),
            Err(SchemaError::RiskScoreOutOfRange { .. })
        ));
    }

    #[test]
    fn wire_field_names_match_the_endpoint_schema() {
        let body = serde_json::json!({
            "totalTransactions": 12,
            "fraudDetected": 2,
            "avgLatency": 87.5,
            "accuracy": 96.2,
            "recentTransactions": [{
                "transaction_id": "TXN100001",
                "amount": 129.99,
                "merchant": "Gas Station",
                "risk_score": 0.31,
                "timestamp": "2025-11-02T14:30:00Z",
            }],
        });
        let snapshot: MetricsSnapshot = serde_json::from_value(body).unwrap();
        assert_eq!(snapshot.total_transactions, 12);
        assert_eq!(snapshot.fraud_detected, 2);
        assert_eq!(snapshot.recent_transactions.len(), 1);
        assert_eq!(snapshot.recent_transactions[0].transaction_id, "TXN100001");
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn missing_required_field_fails_to_parse() {
        let body = serde_json::json!({
            "totalTransactions": 12,
            "avgLatency": 87.5,
            "accuracy": 96.2,
            "recentTransactions": [],
        });
        assert!(serde_json::from_value::<MetricsSnapshot>(body).is_err());
    }

    #[test]
    fn truncate_window_keeps_the_newest_records() {
        let mut snapshot = MetricsSnapshot {
            total_transactions: 3,
            fraud_detected: 0,
            avg_latency: 10.0,
            accuracy: 99.0,
            recent_transactions: vec![
                record("TXN3", 0.1, 30),
                record("TXN2", 0.2, 20),
                record("TXN1", 0.3, 10),
            ],
        };
        snapshot.truncate_window(2);
        let ids: Vec<&str> = snapshot
            .recent_transactions
            .iter()
            .map(|r| r.transaction_id.as_str())
            .collect();
        assert_eq!(ids, vec!["TXN3", "TXN2"]);
    }

    #[test]
    fn chronological_order_is_ascending_and_stable() {
        let snapshot = MetricsSnapshot {
            total_transactions: 3,
            fraud_detected: 0,
            avg_latency: 10.0,
            accuracy: 99.0,
            recent_transactions: vec![
                record("TXN3", 0.1, 30),
                record("TXN2a", 0.2, 20),
                record("TXN2b", 0.2, 20),
                record("TXN1", 0.3, 10),
            ],
        };
        let ids: Vec<&str> = snapshot
            .records_chronological()
            .iter()
            .map(|r| r.transaction_id.as_str())
            .collect();
        assert_eq!(ids, vec!["TXN1", "TXN2a", "TXN2b", "TXN3"]);
    }
}
