//! Bucket selection with cross-bucket de-duplication
//!
//! The four extrema may name the same instrument more than once. Picks are
//! processed in bucket order; a pick whose symbol is already taken is
//! replaced by the first unused candidate found by scanning the ranked views
//! in the fixed order `short_desc`, `short_asc`, `long_desc`, `long_asc`, each
//! from its best-ranked end. The replacement keeps the bucket label of the
//! pick it replaces. Only when every view is exhausted is the duplicate kept.

use movers_types::Bucket;
use std::collections::HashSet;
use tracing::debug;

use crate::features::FeatureRecord;
use crate::ranker::RankedViews;

/// A feature record assigned to a report bucket
#[derive(Debug, Clone, PartialEq)]
pub struct Pick {
    pub bucket: Bucket,
    pub record: FeatureRecord,
    /// Record came from the replacement scan, not the bucket's own extremum
    pub replaced: bool,
}

impl Pick {
    pub fn symbol(&self) -> &str {
        &self.record.symbol
    }
}

/// Each bucket's extremum, in bucket order
pub fn extremal_picks(views: &RankedViews) -> [(Bucket, Option<&FeatureRecord>); 4] {
    Bucket::ALL.map(|bucket| (bucket, views.extremum(bucket)))
}

/// De-duplicate the extremal picks against the ranked views
///
/// Picks are handled in bucket order regardless of input order. A bucket
/// with no extremum is filled from the replacement scan, or omitted if that
/// finds nothing.
pub fn select(picks: &[(Bucket, Option<&FeatureRecord>)], views: &RankedViews) -> Vec<Pick> {
    let mut ordered: Vec<(Bucket, Option<&FeatureRecord>)> = picks.to_vec();
    ordered.sort_by_key(|(bucket, _)| bucket.order());

    let mut used: HashSet<&str> = HashSet::new();
    let mut out = Vec::with_capacity(ordered.len());

    for (bucket, candidate) in ordered {
        if let Some(record) = candidate.filter(|r| !used.contains(r.symbol.as_str())) {
            used.insert(&record.symbol);
            out.push(Pick {
                bucket,
                record: record.clone(),
                replaced: false,
            });
            continue;
        }

        if let Some(replacement) = first_unused(views, &used) {
            debug!(
                %bucket,
                duplicate = candidate.map(|r| r.symbol.as_str()),
                replacement = %replacement.symbol,
                "Replaced bucket pick"
            );
            used.insert(&replacement.symbol);
            out.push(Pick {
                bucket,
                record: replacement.clone(),
                replaced: true,
            });
            continue;
        }

        match candidate {
            Some(record) => {
                debug!(%bucket, symbol = %record.symbol, "No unused candidate left, keeping duplicate");
                out.push(Pick {
                    bucket,
                    record: record.clone(),
                    replaced: false,
                });
            }
            None => debug!(%bucket, "No candidate for bucket, omitting it"),
        }
    }

    out
}

/// Extremal picks de-duplicated in one step
pub fn select_movers(views: &RankedViews) -> Vec<Pick> {
    select(&extremal_picks(views), views)
}

fn first_unused<'a>(views: &'a RankedViews, used: &HashSet<&str>) -> Option<&'a FeatureRecord> {
    views
        .scan_order()
        .into_iter()
        .flat_map(|view| view.iter())
        .find(|record| !used.contains(record.symbol.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranker::rank;
    use proptest::prelude::*;

    fn record(symbol: &str, ret_short: Option<f64>, ret_long: Option<f64>) -> FeatureRecord {
        FeatureRecord {
            symbol: symbol.to_string(),
            ret_short,
            ret_long,
            vol_ratio: None,
            price: None,
        }
    }

    fn summary(picks: &[Pick]) -> Vec<(Bucket, &str)> {
        picks.iter().map(|p| (p.bucket, p.symbol())).collect()
    }

    #[test]
    fn test_three_instrument_fixture() {
        // ret_short = ret_long = [10, -5, -5] for A, B, C
        let records = vec![
            record("A", Some(10.0), Some(10.0)),
            record("B", Some(-5.0), Some(-5.0)),
            record("C", Some(-5.0), Some(-5.0)),
        ];
        let picks = select_movers(&rank(&records));

        assert_eq!(
            summary(&picks),
            vec![
                (Bucket::ShortUp, "A"),
                (Bucket::ShortDown, "B"),
                // A is taken; short_desc scan yields C first
                (Bucket::LongUp, "C"),
                // Every candidate is used, so the duplicate stays
                (Bucket::LongDown, "B"),
            ]
        );
        assert!(picks[2].replaced);
        assert!(!picks[3].replaced);
    }

    #[test]
    fn test_replacement_keeps_bucket_label() {
        let records = vec![
            record("A", Some(9.0), Some(9.0)),
            record("B", Some(-9.0), Some(-9.0)),
            record("C", Some(5.0), Some(1.0)),
            record("D", Some(-1.0), Some(-2.0)),
        ];
        let picks = select_movers(&rank(&records));

        assert_eq!(
            summary(&picks),
            vec![
                (Bucket::ShortUp, "A"),
                (Bucket::ShortDown, "B"),
                (Bucket::LongUp, "C"),
                (Bucket::LongDown, "D"),
            ]
        );
    }

    #[test]
    fn test_missing_extremum_is_filled_from_other_views() {
        // Nobody has a long return; long buckets come from the short views
        let records = vec![
            record("A", Some(3.0), None),
            record("B", Some(2.0), None),
            record("C", Some(1.0), None),
            record("D", Some(0.0), None),
        ];
        let picks = select_movers(&rank(&records));

        assert_eq!(
            summary(&picks),
            vec![
                (Bucket::ShortUp, "A"),
                (Bucket::ShortDown, "D"),
                (Bucket::LongUp, "B"),
                (Bucket::LongDown, "C"),
            ]
        );
    }

    #[test]
    fn test_empty_universe_selects_nothing() {
        assert!(select_movers(&rank(&[])).is_empty());
    }

    #[test]
    fn test_picks_processed_in_bucket_order() {
        let records = vec![record("A", Some(1.0), Some(1.0)), record("B", Some(0.0), Some(0.0))];
        let views = rank(&records);
        let mut picks = extremal_picks(&views).to_vec();
        picks.reverse();

        assert_eq!(select(&picks, &views), select_movers(&views));
    }

    fn universe() -> impl Strategy<Value = Vec<FeatureRecord>> {
        // Small integer returns force plenty of ties
        prop::collection::vec((-5i32..5, -5i32..5), 4..40).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (s, l))| record(&format!("S{i}USDT"), Some(s as f64), Some(l as f64)))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_four_distinct_symbols_one_per_bucket(records in universe()) {
            let picks = select_movers(&rank(&records));

            let buckets: Vec<Bucket> = picks.iter().map(|p| p.bucket).collect();
            prop_assert_eq!(buckets, Bucket::ALL.to_vec());

            let distinct: HashSet<&str> = picks.iter().map(|p| p.symbol()).collect();
            prop_assert_eq!(distinct.len(), 4);
        }

        #[test]
        fn prop_selection_is_deterministic(records in universe()) {
            let first = select_movers(&rank(&records));
            let second = select_movers(&rank(&records.clone()));
            prop_assert_eq!(first, second);
        }
    }
}
