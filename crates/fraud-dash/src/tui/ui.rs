//! Widget layout and rendering for the dashboard.
//!
//! Renders the four summary cards, the recent-transaction table, and the
//! risk time-series chart from whatever snapshot the app currently
//! holds. Formatting here is presentation-only; stored values are never
//! altered.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
};

use crate::classifier::RiskClassifier;
use crate::snapshot::TransactionRecord;
use crate::tui::app::App;

/// Draw the entire dashboard.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Length(5),  // Summary cards
            Constraint::Min(8),     // Transaction table
            Constraint::Length(12), // Risk chart
            Constraint::Length(3),  // Footer
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_summary_cards(frame, app, chunks[1]);
    draw_transaction_table(frame, app, chunks[2]);
    draw_risk_chart(frame, app, chunks[3]);
    draw_footer(frame, app, chunks[4]);
}

/// Header: title, feed status, time since the last update.
fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let (status_text, status_color) = if app.schema_warning {
        ("SCHEMA MISMATCH", Color::Magenta)
    } else if app.error_message.is_some() {
        ("DEGRADED", Color::Yellow)
    } else {
        ("LIVE", Color::Green)
    };

    let updated = match app.last_update {
        Some(at) => format!("updated {}", format_ago(at.elapsed().as_secs())),
        None => "waiting for first poll".to_string(),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " FRAUD DETECTION PIPELINE ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            status_text,
            Style::default()
                .fg(status_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" | {updated}"), Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(status_color)),
    );
    frame.render_widget(header, area);
}

/// Four summary cards with verbatim metric values.
///
/// Fraud and accuracy are visually distinguished by color only; the
/// computation is identical for all four.
fn draw_summary_cards(frame: &mut Frame, app: &App, area: Rect) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let snapshot = &app.snapshot;
    draw_card(
        frame,
        cards[0],
        " TOTAL TRANSACTIONS ",
        snapshot.total_transactions.to_string(),
        Color::White,
    );
    draw_card(
        frame,
        cards[1],
        " FRAUD DETECTED ",
        snapshot.fraud_detected.to_string(),
        Color::Red,
    );
    draw_card(
        frame,
        cards[2],
        " AVG LATENCY ",
        format_latency(snapshot.avg_latency),
        Color::White,
    );
    draw_card(
        frame,
        cards[3],
        " ACCURACY ",
        format_accuracy(snapshot.accuracy),
        Color::Green,
    );
}

fn draw_card(frame: &mut Frame, area: Rect, title: &str, value: String, color: Color) {
    let card = Paragraph::new(Line::from(Span::styled(
        value,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)),
    );
    frame.render_widget(card, area);
}

/// Recent transactions, most-recent-first, with the classified status.
fn draw_transaction_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        "Transaction ID",
        "Amount",
        "Merchant",
        "Risk Score",
        "Status",
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let max_rows = area.height.saturating_sub(3) as usize;
    let rows: Vec<Row> = app
        .snapshot
        .recent_transactions
        .iter()
        .take(max_rows)
        .map(|record| {
            let (status, status_color) = classified_status(&app.classifier, record.risk_score);
            Row::new(vec![
                Cell::from(record.transaction_id.clone())
                    .style(Style::default().fg(Color::Cyan)),
                Cell::from(format_amount(record.amount)),
                Cell::from(record.merchant.clone()),
                Cell::from(format!("{:.2}", record.risk_score)),
                Cell::from(status).style(
                    Style::default()
                        .fg(status_color)
                        .add_modifier(Modifier::BOLD),
                ),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(12),
            Constraint::Min(14),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(format!(
                " RECENT TRANSACTIONS ({}) ",
                app.snapshot.recent_transactions.len()
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)),
    );
    frame.render_widget(table, area);
}

/// Risk score over time, chronological ascending, with the threshold line.
fn draw_risk_chart(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" RISK SCORE OVER TIME ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    let records = app.snapshot.records_chronological();
    let points = chart_points(&records);

    if points.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  no transactions yet",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let x_max = points.last().map(|(x, _)| *x).unwrap_or(0.0).max(1.0);
    let threshold = app.classifier.threshold();
    let threshold_line = [(0.0, threshold), (x_max, threshold)];

    let datasets = vec![
        Dataset::default()
            .name(format!("threshold {threshold:.2}"))
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::DarkGray))
            .data(&threshold_line),
        Dataset::default()
            .name("risk score")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&points),
    ];

    let first_label = records
        .first()
        .map(|r| r.timestamp.format("%H:%M:%S").to_string())
        .unwrap_or_default();
    let last_label = records
        .last()
        .map(|r| r.timestamp.format("%H:%M:%S").to_string())
        .unwrap_or_default();

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, x_max])
                .labels(vec![first_label, last_label]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, 1.0])
                .labels(vec!["0.0".to_string(), "0.5".to_string(), "1.0".to_string()]),
        );
    frame.render_widget(chart, area);
}

/// Footer: key hints, endpoint, and the current error if any.
fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            " [Q] Quit  [R] Redraw ",
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.endpoint.clone(), Style::default().fg(Color::Cyan)),
    ];
    if let Some(ref message) = app.error_message {
        spans.push(Span::styled(
            format!("  ✗ {message}"),
            Style::default().fg(Color::Yellow),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(footer, area);
}

/// Status label and severity color for a record's risk score.
fn classified_status(classifier: &RiskClassifier, risk_score: f64) -> (&'static str, Color) {
    let level = classifier.classify(risk_score);
    (level.label(), level.color())
}

/// Chart points as (seconds since the earliest record, risk score).
fn chart_points(records: &[&TransactionRecord]) -> Vec<(f64, f64)> {
    let Some(first) = records.first() else {
        return Vec::new();
    };
    let t0 = first.timestamp;
    records
        .iter()
        .map(|r| {
            let offset_secs = (r.timestamp - t0).num_milliseconds() as f64 / 1000.0;
            (offset_secs, r.risk_score)
        })
        .collect()
}

/// Format an amount with the currency prefix.
fn format_amount(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Format latency with the milliseconds suffix.
fn format_latency(latency: f64) -> String {
    format!("{latency:.1}ms")
}

/// Format accuracy with the percent suffix.
fn format_accuracy(accuracy: f64) -> String {
    format!("{accuracy:.1}%")
}

/// Format seconds ago to human-readable string.
fn format_ago(secs: u64) -> String {
    if secs == 0 {
        "just now".to_string()
    } else if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

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
    fn status_rendering_matches_the_threshold() {
        let classifier = RiskClassifier::default();
        assert_eq!(
            classified_status(&classifier, 0.95),
            ("HIGH_RISK", Color::Red)
        );
        assert_eq!(classified_status(&classifier, 0.3), ("NORMAL", Color::Green));
    }

    #[test]
    fn formatting_is_presentation_only() {
        assert_eq!(format_amount(129.99), "$129.99");
        assert_eq!(format_amount(5.0), "$5.00");
        assert_eq!(format_latency(52.34), "52.3ms");
        assert_eq!(format_accuracy(96.25), "96.2%");
    }

    #[test]
    fn chart_points_are_offsets_from_the_earliest_record() {
        let records = vec![
            record("TXN1", 0.2, 100),
            record("TXN2", 0.9, 103),
            record("TXN3", 0.5, 110),
        ];
        let refs: Vec<&TransactionRecord> = records.iter().collect();
        let points = chart_points(&refs);
        assert_eq!(points, vec![(0.0, 0.2), (3.0, 0.9), (10.0, 0.5)]);
    }

    #[test]
    fn chart_points_empty_for_no_records() {
        assert!(chart_points(&[]).is_empty());
    }

    #[test]
    fn format_ago_buckets() {
        assert_eq!(format_ago(0), "just now");
        assert_eq!(format_ago(42), "42s ago");
        assert_eq!(format_ago(125), "2m ago");
        assert_eq!(format_ago(7300), "2h ago");
    }
}
