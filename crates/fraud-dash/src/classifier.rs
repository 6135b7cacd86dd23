//! Risk classification rule applied to each rendered transaction.

use ratatui::style::Color;

/// Display category for a transaction's risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    /// Score above the threshold
    HighRisk,
    /// Score at or below the threshold
    Normal,
}

impl RiskLevel {
    /// Status label shown in the transaction table.
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::HighRisk => "HIGH_RISK",
            RiskLevel::Normal => "NORMAL",
        }
    }

    /// Severity color for the status cell.
    pub fn color(self) -> Color {
        match self {
            RiskLevel::HighRisk => Color::Red,
            RiskLevel::Normal => Color::Green,
        }
    }
}

/// Threshold rule separating HIGH_RISK from NORMAL.
///
/// The comparison is strictly greater-than: a score exactly at the
/// threshold classifies as NORMAL. Downstream alerting is tuned to this
/// boundary, so the rule must hold exactly.
#[derive(Debug, Clone, Copy)]
pub struct RiskClassifier {
    threshold: f64,
}

impl RiskClassifier {
    /// Create a classifier with the given cutoff.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// The configured cutoff.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Classify a risk score. Stateless; safe to call concurrently.
    pub fn classify(&self, risk_score: f64) -> RiskLevel {
        if risk_score > self.threshold {
            RiskLevel::HighRisk
        } else {
            RiskLevel::Normal
        }
    }
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::new(0.8)
    }
}
