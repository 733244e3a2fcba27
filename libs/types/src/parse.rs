//! Lenient numeric parsing for exchange payloads
//!
//! Binance transmits prices, volumes and rates as JSON strings
//! (`"lastPrice": "64123.10"`), occasionally as bare numbers. Both forms are
//! accepted; anything else, including `NaN`/`inf` spellings, yields `None`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse a JSON value holding a decimal string or number into a finite `f64`
pub fn parse_lenient_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    parsed.is_finite().then_some(parsed)
}

/// Serde adapter for `Option<f64>` fields that arrive as strings or numbers
///
/// Use together with `#[serde(default)]` so absent fields become `None`.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_lenient_f64(&value))
}
