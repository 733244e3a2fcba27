//! Four ranked views of the universe, one per bucket
//!
//! | View         | Axis        | Order      | Bucket       |
//! |--------------|-------------|------------|--------------|
//! | `short_desc` | `ret_short` | descending | `SHORT_UP`   |
//! | `short_asc`  | `ret_short` | ascending  | `SHORT_DOWN` |
//! | `long_desc`  | `ret_long`  | descending | `LONG_UP`    |
//! | `long_asc`   | `ret_long`  | ascending  | `LONG_DOWN`  |
//!
//! Records with a `None` on a view's axis are left out of that view. Sorting
//! is stable, so equal values keep their input order in both directions.

use movers_types::{Bucket, Direction, Horizon};
use std::cmp::Ordering;

use crate::features::FeatureRecord;

/// Universe sorted along every bucket's axis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedViews {
    pub short_desc: Vec<FeatureRecord>,
    pub short_asc: Vec<FeatureRecord>,
    pub long_desc: Vec<FeatureRecord>,
    pub long_asc: Vec<FeatureRecord>,
}

impl RankedViews {
    /// View whose head is the given bucket's extremum
    pub fn view(&self, bucket: Bucket) -> &[FeatureRecord] {
        match bucket {
            Bucket::ShortUp => &self.short_desc,
            Bucket::ShortDown => &self.short_asc,
            Bucket::LongUp => &self.long_desc,
            Bucket::LongDown => &self.long_asc,
        }
    }

    /// Best-ranked record for the bucket, `None` if its view is empty
    pub fn extremum(&self, bucket: Bucket) -> Option<&FeatureRecord> {
        self.view(bucket).first()
    }

    /// Views in the fixed order replacement candidates are scanned
    pub fn scan_order(&self) -> [&[FeatureRecord]; 4] {
        Bucket::ALL.map(|bucket| self.view(bucket))
    }

    pub fn is_empty(&self) -> bool {
        self.scan_order().iter().all(|view| view.is_empty())
    }
}

/// Rank the universe along both return axes in both directions
pub fn rank(records: &[FeatureRecord]) -> RankedViews {
    RankedViews {
        short_desc: ranked(records, Bucket::ShortUp),
        short_asc: ranked(records, Bucket::ShortDown),
        long_desc: ranked(records, Bucket::LongUp),
        long_asc: ranked(records, Bucket::LongDown),
    }
}

fn axis_value(record: &FeatureRecord, horizon: Horizon) -> Option<f64> {
    match horizon {
        Horizon::Short => record.ret_short,
        Horizon::Long => record.ret_long,
    }
}

fn ranked(records: &[FeatureRecord], bucket: Bucket) -> Vec<FeatureRecord> {
    let horizon = bucket.horizon();
    let mut view: Vec<(f64, &FeatureRecord)> = records
        .iter()
        .filter_map(|r| axis_value(r, horizon).filter(|v| v.is_finite()).map(|v| (v, r)))
        .collect();

    // `sort_by` is stable: ties stay in input order
    match bucket.direction() {
        Direction::Up => view.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal)),
        Direction::Down => view.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal)),
    }

    view.into_iter().map(|(_, r)| r.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(symbol: &str, ret_short: Option<f64>, ret_long: Option<f64>) -> FeatureRecord {
        FeatureRecord {
            symbol: symbol.to_string(),
            ret_short,
            ret_long,
            vol_ratio: None,
            price: None,
        }
    }

    fn symbols(view: &[FeatureRecord]) -> Vec<&str> {
        view.iter().map(|r| r.symbol.as_str()).collect()
    }

    #[test]
    fn test_ties_keep_input_order_both_directions() {
        let records = vec![
            record("A", Some(10.0), Some(10.0)),
            record("B", Some(-5.0), Some(-5.0)),
            record("C", Some(-5.0), Some(-5.0)),
        ];
        let views = rank(&records);

        assert_eq!(symbols(&views.short_desc), vec!["A", "B", "C"]);
        assert_eq!(symbols(&views.short_asc), vec!["B", "C", "A"]);
        assert_eq!(views.extremum(Bucket::ShortDown).unwrap().symbol, "B");
    }

    #[test]
    fn test_nulls_excluded_per_axis() {
        let records = vec![
            record("A", None, Some(3.0)),
            record("B", Some(1.0), None),
            record("C", Some(2.0), Some(-1.0)),
        ];
        let views = rank(&records);

        assert_eq!(symbols(&views.short_desc), vec!["C", "B"]);
        assert_eq!(symbols(&views.long_asc), vec!["C", "A"]);
        assert_eq!(views.extremum(Bucket::LongUp).unwrap().symbol, "A");
    }

    #[test]
    fn test_empty_axis_has_no_extremum() {
        let views = rank(&[record("A", Some(1.0), None)]);
        assert!(views.extremum(Bucket::LongUp).is_none());
        assert!(views.extremum(Bucket::LongDown).is_none());
        assert!(!views.is_empty());

        assert!(rank(&[]).is_empty());
    }
}
