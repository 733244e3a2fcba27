//! Digest text formatting

use adapter_service::truncate_message;
use chrono::{DateTime, FixedOffset};
use movers_types::{Bucket, Direction, Horizon, ReasonMap};

use crate::enricher::EnrichedRecord;

pub const TITLE: &str = "📊 Binance USDT-M Futures Movers";

const RULE_CHAR: char = '—';
const RULE_WIDTH: usize = 28;
const SHORT_SECTION: &str = "⏱ 12H (last 12 hours)";
const LONG_SECTION: &str = "🗓 1D (last 24 hours)";
const UP_MARK: &str = "🟢";
const DOWN_MARK: &str = "🔴";
const MISSING: &str = "NA";

/// Signed percentage with two decimals, `NA` when absent
pub fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:+.2}%", v),
        None => MISSING.to_string(),
    }
}

/// Compact number with B/M/K suffix and two decimals, `NA` when absent
pub fn fmt_num(value: Option<f64>) -> String {
    let Some(v) = value else {
        return MISSING.to_string();
    };
    let magnitude = v.abs();
    if magnitude >= 1e9 {
        format!("{:.2}B", v / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else if magnitude >= 1e3 {
        format!("{:.2}K", v / 1e3)
    } else {
        format!("{:.2}", v)
    }
}

/// Price; sub-unit prices keep four significant digits instead of `0.00`
pub fn fmt_price(value: Option<f64>) -> String {
    match value {
        Some(v) if v != 0.0 && v.abs() < 1.0 => {
            let decimals = ((-v.abs().log10()).ceil() as usize + 3).min(10);
            format!("{:.*}", decimals, v)
        }
        other => fmt_num(other),
    }
}

fn fmt_fixed(value: Option<f64>, decimals: usize, signed: bool, suffix: &str) -> String {
    match value {
        Some(v) if signed => format!("{:+.*}{}", decimals, v, suffix),
        Some(v) => format!("{:.*}{}", decimals, v, suffix),
        None => MISSING.to_string(),
    }
}

fn horizon_label(horizon: Horizon) -> &'static str {
    match horizon {
        Horizon::Short => "12H",
        Horizon::Long => "24H",
    }
}

fn format_entry(record: &EnrichedRecord, reasons: &ReasonMap) -> String {
    let mark = match record.bucket.direction() {
        Direction::Up => UP_MARK,
        Direction::Down => DOWN_MARK,
    };

    let (primary, secondary) = match record.bucket.horizon() {
        Horizon::Short => ((Horizon::Short, record.ret_short), (Horizon::Long, record.ret_long)),
        Horizon::Long => ((Horizon::Long, record.ret_long), (Horizon::Short, record.ret_short)),
    };

    let empty = Vec::new();
    let listed = reasons.get(&record.symbol).unwrap_or(&empty);
    let reason = |i: usize| listed.get(i).map(String::as_str).unwrap_or("");

    format!(
        "{mark} {symbol}  {p_label} {p_ret} | {s_label} {s_ret}\n   \
         Price {price} | RSI {rsi} | Funding {funding}\n   \
         OI {oi} ({oi_chg}) | Vol {vol}\n   \
         - {r1}\n   \
         - {r2}",
        symbol = record.symbol,
        p_label = horizon_label(primary.0),
        p_ret = fmt_pct(primary.1),
        s_label = horizon_label(secondary.0),
        s_ret = fmt_pct(secondary.1),
        price = fmt_price(record.price),
        rsi = fmt_fixed(record.rsi, 1, false, ""),
        funding = fmt_fixed(record.funding_rate, 5, true, ""),
        oi = fmt_num(record.open_interest),
        oi_chg = fmt_fixed(record.oi_change_pct, 1, true, "%"),
        vol = fmt_fixed(record.vol_ratio, 2, false, "x"),
        r1 = reason(0),
        r2 = reason(1),
    )
}

/// Render the digest and cut it to `limit` characters
///
/// Entries are grouped into the 12H and 1D sections and appear in bucket
/// order whatever order `records` is in. `now` carries the display offset.
pub fn format_report(
    now: &DateTime<FixedOffset>,
    records: &[EnrichedRecord],
    reasons: &ReasonMap,
    limit: usize,
) -> String {
    let rule: String = std::iter::repeat(RULE_CHAR).take(RULE_WIDTH).collect();

    let mut sorted: Vec<&EnrichedRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.bucket.order());

    let mut lines = vec![format!(
        "{}\n(UTC{} {})\n",
        TITLE,
        now.format("%:z"),
        now.format("%Y-%m-%d %H:%M")
    )];

    for (horizon, title) in [(Horizon::Short, SHORT_SECTION), (Horizon::Long, LONG_SECTION)] {
        lines.push(rule.clone());
        lines.push(title.to_string());
        lines.extend(
            sorted
                .iter()
                .filter(|r| r.bucket.horizon() == horizon)
                .map(|r| format_entry(r, reasons)),
        );
    }

    truncate_message(&lines.join("\n"), limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adapter_service::TRUNCATION_MARKER;
    use chrono::TimeZone;

    fn record(bucket: Bucket, symbol: &str) -> EnrichedRecord {
        EnrichedRecord {
            bucket,
            symbol: symbol.to_string(),
            ret_short: Some(5.123),
            ret_long: Some(-2.5),
            vol_ratio: Some(3.1),
            price: Some(64250.5),
            quote_volume: Some(1.2e9),
            pct_change_24h: Some(-2.4),
            ema_long: Some(63000.0),
            rsi: Some(71.26),
            open_interest: Some(1_500_000.0),
            oi_change_pct: Some(3.24),
            funding_rate: Some(0.0001),
            mark_price: Some(64251.0),
        }
    }

    fn kst(h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, h, m, 5)
            .unwrap()
    }

    #[test]
    fn test_number_formats() {
        assert_eq!(fmt_pct(Some(5.0)), "+5.00%");
        assert_eq!(fmt_pct(Some(-0.004)), "-0.00%");
        assert_eq!(fmt_pct(None), "NA");

        assert_eq!(fmt_num(Some(1_234_567_890.0)), "1.23B");
        assert_eq!(fmt_num(Some(2_500_000.0)), "2.50M");
        assert_eq!(fmt_num(Some(64_250.5)), "64.25K");
        assert_eq!(fmt_num(Some(12.346)), "12.35");
        assert_eq!(fmt_num(None), "NA");

        assert_eq!(fmt_price(Some(0.0001234)), "0.0001234");
        assert_eq!(fmt_price(Some(0.5)), "0.5000");
        assert_eq!(fmt_price(Some(3.5)), "3.50");
    }

    #[test]
    fn test_report_layout() {
        let records = vec![
            record(Bucket::LongUp, "SOLUSDT"),
            record(Bucket::ShortUp, "BTCUSDT"),
            record(Bucket::ShortDown, "ETHUSDT"),
        ];
        let mut reasons = ReasonMap::new();
        reasons.insert("BTCUSDT".into(), vec!["Volume surge".into(), "OI rising".into()]);

        let text = format_report(&kst(10, 0), &records, &reasons, 4096);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], TITLE);
        assert_eq!(lines[1], "(UTC+09:00 2024-03-01 10:00)");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "—".repeat(28));
        assert_eq!(lines[4], SHORT_SECTION);
        assert_eq!(lines[5], "🟢 BTCUSDT  12H +5.12% | 24H -2.50%");
        assert_eq!(lines[6], "   Price 64.25K | RSI 71.3 | Funding +0.00010");
        assert_eq!(lines[7], "   OI 1.50M (+3.2%) | Vol 3.10x");
        assert_eq!(lines[8], "   - Volume surge");
        assert_eq!(lines[9], "   - OI rising");
        assert!(lines[10].starts_with("🔴 ETHUSDT  12H"));

        let long_section = lines.iter().position(|l| *l == LONG_SECTION).unwrap();
        assert!(long_section > 10);
        assert_eq!(lines[long_section + 1], "🟢 SOLUSDT  24H -2.50% | 12H +5.12%");
    }

    #[test]
    fn test_missing_values_render_na() {
        let mut r = record(Bucket::LongDown, "XRPUSDT");
        r.rsi = None;
        r.funding_rate = None;
        r.open_interest = None;
        r.oi_change_pct = None;
        r.vol_ratio = None;

        let text = format_report(&kst(0, 0), &[r], &ReasonMap::new(), 4096);
        assert!(text.contains("RSI NA | Funding NA"));
        assert!(text.contains("OI NA (NA) | Vol NA"));
    }

    #[test]
    fn test_report_is_truncated_to_limit() {
        let records: Vec<EnrichedRecord> = Bucket::ALL.iter().map(|b| record(*b, "BTCUSDT")).collect();
        let mut reasons = ReasonMap::new();
        reasons.insert("BTCUSDT".into(), vec!["r".repeat(2000), "s".repeat(2000)]);

        let text = format_report(&kst(10, 0), &records, &reasons, 4096);
        assert!(text.chars().count() <= 4096);
        assert!(text.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_entries_follow_bucket_order() {
        let records = vec![
            record(Bucket::LongDown, "DUSDT"),
            record(Bucket::ShortDown, "BUSDT"),
            record(Bucket::LongUp, "CUSDT"),
            record(Bucket::ShortUp, "AUSDT"),
        ];
        let text = format_report(&kst(10, 0), &records, &ReasonMap::new(), 4096);

        let order: Vec<&str> = text
            .lines()
            .filter_map(|l| l.split_whitespace().nth(1))
            .filter(|s| s.ends_with("USDT"))
            .collect();
        assert_eq!(order, vec!["AUSDT", "BUSDT", "CUSDT", "DUSDT"]);
    }
}
