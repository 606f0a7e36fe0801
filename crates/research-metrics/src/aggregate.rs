//! Per-year grouping and ratio computation.
//!
//! Series handed to charts are contiguous: every year in the window is present,
//! zero-filled when upstream had no works for it.

use std::collections::BTreeMap;

use crate::config::api;
use crate::models::{CitingWork, GroupByBucket, YearCount, YearlyRatio};

/// Percentage of `numerator` in `denominator`, rounded to one decimal.
///
/// Returns `None` for a zero denominator. The result never exceeds 100.
#[must_use]
pub fn percentage(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    let share = numerator.min(denominator) as f64 / denominator as f64;
    Some((share * 1000.0).round() / 10.0)
}

/// Years from `current_year - lookback - 1` through `current_year`, ascending.
///
/// `lookback` is clamped to `0..=MAX_LOOKBACK_YEARS`. Empty if the start year
/// would underflow.
#[must_use]
pub fn lookback_window(current_year: i32, lookback: i32) -> Vec<i32> {
    let lookback = lookback.clamp(0, api::MAX_LOOKBACK_YEARS);
    match current_year.checked_sub(lookback + 1) {
        Some(start) => (start..=current_year).collect(),
        None => Vec::new(),
    }
}

/// Group citing works by (year, trial flag). Works without a year are skipped.
#[must_use]
pub fn count_by_year(works: &[CitingWork]) -> Vec<YearCount> {
    let mut groups: BTreeMap<(i32, bool), u64> = BTreeMap::new();
    for work in works {
        if let Some(year) = work.year {
            *groups.entry((year, work.is_trial)).or_default() += 1;
        }
    }

    groups
        .into_iter()
        .map(|((year, flagged), count)| YearCount { year, flagged, count })
        .collect()
}

/// Earliest and latest publication year among the works.
#[must_use]
pub fn year_range(works: &[CitingWork]) -> Option<(i32, i32)> {
    let mut years = works.iter().filter_map(|w| w.year);
    let first = years.next()?;
    Some(years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
}

/// Turn `group_by=publication_year` buckets into a year-keyed map.
///
/// Buckets whose key is not a year (e.g. `unknown`) are dropped.
#[must_use]
pub fn counts_from_buckets(buckets: &[GroupByBucket]) -> BTreeMap<i32, u64> {
    let mut counts = BTreeMap::new();
    for bucket in buckets {
        match bucket.key.trim().parse::<i32>() {
            Ok(year) => *counts.entry(year).or_default() += bucket.count,
            Err(_) => tracing::warn!(key = %bucket.key, "Ignoring non-year group key"),
        }
    }
    counts
}

/// Flagged share per year: `flagged / (flagged + unflagged)`.
///
/// Every year in `years` appears in the output; missing counts are zero.
#[must_use]
pub fn share_series(
    years: &[i32],
    flagged: &BTreeMap<i32, u64>,
    unflagged: &BTreeMap<i32, u64>,
) -> Vec<YearlyRatio> {
    years
        .iter()
        .map(|&year| {
            let numerator = flagged.get(&year).copied().unwrap_or(0);
            let denominator = numerator + unflagged.get(&year).copied().unwrap_or(0);
            YearlyRatio { year, numerator, denominator, percentage: percentage(numerator, denominator) }
        })
        .collect()
}

/// Share of citing works that are clinical trials, for every year between the
/// first and last citing year.
#[must_use]
pub fn trial_share_by_year(works: &[CitingWork]) -> Vec<YearlyRatio> {
    let Some((first, last)) = year_range(works) else {
        return Vec::new();
    };

    let mut trials = BTreeMap::new();
    let mut others = BTreeMap::new();
    for count in count_by_year(works) {
        let target = if count.flagged { &mut trials } else { &mut others };
        target.insert(count.year, count.count);
    }

    let years: Vec<i32> = (first..=last).collect();
    share_series(&years, &trials, &others)
}

/// Table filter: optional trials-only flag and inclusive year bounds.
///
/// Works without a year are dropped as soon as either bound is set.
#[must_use]
pub fn filter_citing(
    works: &[CitingWork],
    trials_only: bool,
    year_from: Option<i32>,
    year_to: Option<i32>,
) -> Vec<CitingWork> {
    works
        .iter()
        .filter(|w| !trials_only || w.is_trial)
        .filter(|w| match (year_from, year_to, w.year) {
            (None, None, _) => true,
            (_, _, None) => false,
            (from, to, Some(y)) => from.is_none_or(|f| y >= f) && to.is_none_or(|t| y <= t),
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citing(year: Option<i32>, is_trial: bool) -> CitingWork {
        CitingWork { title: None, year, doi: None, pmid: None, is_trial }
    }

    #[test]
    fn test_percentage_zero_denominator() {
        assert_eq!(percentage(0, 0), None);
        assert_eq!(percentage(5, 0), None);
    }

    #[test]
    fn test_percentage_rounds_one_decimal() {
        assert_eq!(percentage(1, 3), Some(33.3));
        assert_eq!(percentage(2, 3), Some(66.7));
        assert_eq!(percentage(3, 3), Some(100.0));
        assert_eq!(percentage(0, 7), Some(0.0));
    }

    #[test]
    fn test_lookback_window() {
        assert_eq!(lookback_window(2024, 2), vec![2021, 2022, 2023, 2024]);
        assert_eq!(lookback_window(2024, 10).len(), 12);
    }

    #[test]
    fn test_lookback_window_bounded() {
        let years = lookback_window(2026, i32::MAX);
        assert_eq!(years.len(), api::MAX_LOOKBACK_YEARS as usize + 2);
        assert_eq!(years.last(), Some(&2026));
        assert!(lookback_window(i32::MIN, 5).is_empty());
    }

    #[test]
    fn test_count_by_year_groups_and_skips_missing_year() {
        let works = vec![
            citing(Some(2020), true),
            citing(Some(2020), false),
            citing(Some(2020), false),
            citing(Some(2021), true),
            citing(None, true),
        ];
        let counts = count_by_year(&works);
        assert_eq!(
            counts,
            vec![
                YearCount { year: 2020, flagged: false, count: 2 },
                YearCount { year: 2020, flagged: true, count: 1 },
                YearCount { year: 2021, flagged: true, count: 1 },
            ]
        );
    }

    #[test]
    fn test_share_series_zero_fills() {
        let flagged = BTreeMap::from([(2020, 3)]);
        let unflagged = BTreeMap::from([(2020, 1), (2022, 4)]);
        let series = share_series(&[2020, 2021, 2022], &flagged, &unflagged);

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].percentage, Some(75.0));
        assert_eq!(series[1].denominator, 0);
        assert_eq!(series[1].percentage, None);
        assert_eq!(series[2].percentage, Some(0.0));
    }

    #[test]
    fn test_counts_from_buckets_skips_unknown() {
        let buckets = vec![
            GroupByBucket { key: "2020".into(), key_display_name: None, count: 10 },
            GroupByBucket { key: "unknown".into(), key_display_name: None, count: 3 },
        ];
        assert_eq!(counts_from_buckets(&buckets), BTreeMap::from([(2020, 10)]));
    }

    #[test]
    fn test_trial_share_is_contiguous() {
        let works = vec![citing(Some(2018), true), citing(Some(2021), false)];
        let series = trial_share_by_year(&works);
        let years: Vec<i32> = series.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2018, 2019, 2020, 2021]);
        assert_eq!(series[0].percentage, Some(100.0));
        assert_eq!(series[1].percentage, None);
    }

    #[test]
    fn test_filter_citing() {
        let works = vec![citing(Some(2019), true), citing(Some(2021), false), citing(None, true)];
        assert_eq!(filter_citing(&works, true, None, None).len(), 2);
        assert_eq!(filter_citing(&works, false, Some(2020), None).len(), 1);
        assert_eq!(filter_citing(&works, true, Some(2018), Some(2020)).len(), 1);
    }

    #[test]
    fn test_year_range_empty() {
        assert_eq!(year_range(&[]), None);
        assert_eq!(year_range(&[citing(None, false)]), None);
    }
}
