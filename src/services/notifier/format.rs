//! Human-readable alert rendering (Telegram Markdown)

use crate::models::alert::Alert;
use crate::models::signal::SignalDirection;

pub fn render_alert(alert: &Alert) -> String {
    let (marker, label) = match alert.direction {
        SignalDirection::Long => ("🟢", "LONG"),
        SignalDirection::Short => ("🔴", "SHORT"),
        SignalDirection::None => ("⚪", "NONE"),
    };

    let mut lines = vec![
        format!("{} *{}* {}", marker, label, escape_markdown(&alert.instrument)),
        format!("Entry: `{}`", format_price(alert.entry_price)),
        format!("Take profit: `{}`", format_price(alert.take_profit)),
        format!("Stop loss: `{}`", format_price(alert.stop_loss)),
        format!("Leverage: {}x (R:R {:.2})", alert.leverage, alert.reward_risk()),
        format!("Rule: {}", escape_markdown(&alert.rule.to_string())),
    ];
    if !alert.rationale.is_empty() {
        lines.push(format!("Rationale: {}", escape_markdown(&alert.rationale)));
    }
    lines.push(format!("Issued: {}", alert.issued_at.format("%Y-%m-%d %H:%M:%S UTC")));
    lines.join("\n")
}

/// Decimal places scale with magnitude so small-cap prices keep precision.
pub fn format_price(price: f64) -> String {
    let magnitude = price.abs();
    if magnitude >= 1000.0 {
        format!("{:.2}", price)
    } else if magnitude >= 1.0 {
        format!("{:.4}", price)
    } else {
        format!("{:.6}", price)
    }
}

/// Escape the characters legacy Telegram Markdown treats as markup.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
