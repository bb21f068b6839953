//! Free-text oracle reply → typed verdict

use serde_json::{Map, Value};

use crate::models::signal::SignalDirection;
use crate::models::verdict::{AdvisoryVerdict, Verdict};

const VERDICT_KEYS: [&str; 4] = ["verdict", "decision", "action", "signal"];
const BUY_WORDS: [&str; 3] = ["buy", "long", "bullish"];
const SELL_WORDS: [&str; 3] = ["sell", "short", "bearish"];
const WAIT_WORDS: [&str; 4] = ["wait", "hold", "neutral", "skip"];
/// Free text carrying any of these is too ambiguous to read a stance from.
const NEGATORS: [&str; 9] = [
    "no", "not", "dont", "never", "avoid", "cannot", "cant", "wont", "shouldnt",
];
/// Used when the reply carries no usable confidence.
const DEFAULT_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stance {
    Buy,
    Sell,
    Wait,
    Confirm,
    Reject,
}

/// Parse a reply for a candidate in `direction`. `None` when nothing usable
/// was found; callers treat that as abstain.
pub fn parse_verdict(text: &str, direction: SignalDirection) -> Option<AdvisoryVerdict> {
    if let Some(object) = extract_json_object(text) {
        if let Some(raw) = field(&object, &VERDICT_KEYS).and_then(Value::as_str) {
            let stance = stance_of(raw)?;
            let confidence = field(&object, &["confidence"])
                .and_then(confidence_of)
                .unwrap_or(DEFAULT_CONFIDENCE);
            let reason = field(&object, &["reason", "rationale", "explanation"])
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim()
                .to_string();
            return Some(AdvisoryVerdict::new(verdict_for(stance, direction), confidence, reason));
        }
    }

    keyword_stance(text).map(|stance| {
        AdvisoryVerdict::new(
            verdict_for(stance, direction),
            DEFAULT_CONFIDENCE,
            summarize(text),
        )
    })
}

/// First balanced `{...}` in `text` that parses as a JSON object.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let bytes = text.as_bytes();
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = balanced_end(bytes, start) {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&text[start..=end]) {
                return Some(map);
            }
        }
        search_from = start + 1;
    }
    None
}

/// Index of the brace closing the one at `start`, skipping string contents.
fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, &byte) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

fn field<'a>(object: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| {
        object
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

fn stance_of(raw: &str) -> Option<Stance> {
    let word = raw
        .trim()
        .split(|c: char| !c.is_ascii_alphabetic())
        .find(|w| !w.is_empty())?
        .to_ascii_lowercase();

    match word.as_str() {
        "confirm" | "confirmed" | "approve" | "yes" => Some(Stance::Confirm),
        "reject" | "rejected" | "no" | "avoid" => Some(Stance::Reject),
        w if BUY_WORDS.contains(&w) => Some(Stance::Buy),
        w if SELL_WORDS.contains(&w) => Some(Stance::Sell),
        w if WAIT_WORDS.contains(&w) => Some(Stance::Wait),
        _ => None,
    }
}

/// Accepts `0.7`, `70`, `"70%"` or `"0.7"`. Values above 1 are percentages.
fn confidence_of(value: &Value) -> Option<f64> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() || raw < 0.0 {
        return None;
    }
    let normalized = if raw > 1.0 { raw / 100.0 } else { raw };
    Some(normalized.clamp(0.0, 1.0))
}

fn keyword_stance(text: &str) -> Option<Stance> {
    let lowered = text.to_ascii_lowercase().replace(['\'', '\u{2019}'], "");
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let mentions = |set: &[&str]| words.iter().any(|w| set.contains(w));

    if mentions(&NEGATORS) {
        return None;
    }

    match (mentions(&BUY_WORDS), mentions(&SELL_WORDS), mentions(&WAIT_WORDS)) {
        (true, false, false) => Some(Stance::Buy),
        (false, true, false) => Some(Stance::Sell),
        (false, false, true) => Some(Stance::Wait),
        _ => None,
    }
}

fn verdict_for(stance: Stance, direction: SignalDirection) -> Verdict {
    match (stance, direction) {
        (_, SignalDirection::None) => Verdict::Abstain,
        (Stance::Confirm, _) => Verdict::Confirm,
        (Stance::Reject | Stance::Wait, _) => Verdict::Reject,
        (Stance::Buy, SignalDirection::Long) | (Stance::Sell, SignalDirection::Short) => {
            Verdict::Confirm
        }
        (Stance::Buy, SignalDirection::Short) | (Stance::Sell, SignalDirection::Long) => {
            Verdict::Reject
        }
    }
}

fn summarize(text: &str) -> String {
    const MAX_CHARS: usize = 200;
    let trimmed = text.trim();
    match trimmed.char_indices().nth(MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
