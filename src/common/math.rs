//! Numeric helpers shared by the indicator implementations.
//!
//! Every moving average here is exponential: `k = 2 / (period + 1)`, seeded with the
//! simple mean of the first `period` values.

/// Floor applied to denominators that may legitimately reach zero.
pub const EPSILON: f64 = 1e-9;

/// Smoothing constant for an exponential average of `period` values.
pub fn smoothing_constant(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Simple mean of the trailing `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Advance an exponential average by one value.
pub fn ema_from_previous(value: f64, previous: f64, period: usize) -> f64 {
    let k = smoothing_constant(period);
    value * k + previous * (1.0 - k)
}

/// Full EMA series. The first element corresponds to `values[period - 1]`.
pub fn ema_series(values: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || values.len() < period {
        return None;
    }

    let seed = values[..period].iter().sum::<f64>() / period as f64;
    let mut series = Vec::with_capacity(values.len() - period + 1);
    series.push(seed);

    let mut previous = seed;
    for &value in &values[period..] {
        previous = ema_from_previous(value, previous, period);
        series.push(previous);
    }

    Some(series)
}

/// Latest EMA value over the whole input.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).and_then(|series| series.last().copied())
}

/// Population standard deviation of the trailing `period` values around `center`.
pub fn standard_deviation_around(values: &[f64], period: usize, center: f64) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    let variance = window.iter().map(|v| (v - center).powi(2)).sum::<f64>() / period as f64;
    Some(variance.sqrt())
}

/// True range of a bar given the previous close.
pub fn true_range(high: f64, low: f64, previous_close: f64) -> f64 {
    let range = high - low;
    let gap_up = (high - previous_close).abs();
    let gap_down = (low - previous_close).abs();
    range.max(gap_up).max(gap_down)
}

/// Divide, flooring the denominator at [`EPSILON`].
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    numerator / denominator.max(EPSILON)
}
