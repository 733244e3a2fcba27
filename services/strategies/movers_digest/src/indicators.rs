//! Technical indicators over closing prices
//!
//! Pure functions over an ordered slice, oldest value first. Both return
//! `None` when the input is too short for the requested period.

/// Exponential moving average of the whole series
///
/// Seeded with the simple mean of the first `period` values, then smoothed
/// with `k = 2 / (period + 1)` over the rest.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }

    let seed = values[..period].iter().sum::<f64>() / period as f64;
    let k = 2.0 / (period as f64 + 1.0);

    let value = values[period..]
        .iter()
        .fold(seed, |prev, v| v * k + prev * (1.0 - k));

    value.is_finite().then_some(value)
}

/// Wilder's relative strength index of the whole series
///
/// Needs `period + 1` values. An average loss of exactly zero yields `100.0`.
pub fn rsi(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period + 1 {
        return None;
    }

    let deltas: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let (seed, rest) = deltas.split_at(period);

    let p = period as f64;
    let mut avg_gain = seed.iter().map(|d| d.max(0.0)).sum::<f64>() / p;
    let mut avg_loss = seed.iter().map(|d| (-d).max(0.0)).sum::<f64>() / p;

    for delta in rest {
        avg_gain = (avg_gain * (p - 1.0) + delta.max(0.0)) / p;
        avg_loss = (avg_loss * (p - 1.0) + (-delta).max(0.0)) / p;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let value = 100.0 - 100.0 / (1.0 + avg_gain / avg_loss);
    value.is_finite().then_some(value)
}
