//! Population percentile ranks
//!
//! Ranks are 1-based over the whole column, ties share the average of the ranks
//! they span, and entries without a value are tied with each other at the top
//! or bottom of the ascending order. The percentile is `rank / N`, where `N`
//! includes the entries without a value.

use crate::config::{Direction, MissingPlacement};

/// Ascending percentile rank of every value, in input order
pub fn percentile_ranks(values: &[Option<f64>], missing: MissingPlacement) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let mut present: Vec<(usize, f64)> =
        values.iter().enumerate().filter_map(|(i, v)| v.map(|v| (i, v))).collect();
    present.sort_by(|a, b| a.1.total_cmp(&b.1));

    let absent = n - present.len();
    let (offset, missing_rank) = match missing {
        MissingPlacement::Top => (absent, (1 + absent) as f64 / 2.0),
        MissingPlacement::Bottom => (0, (present.len() + 1 + n) as f64 / 2.0),
    };

    let mut ranks = vec![missing_rank; n];

    let mut start = 0;
    while start < present.len() {
        let mut end = start + 1;
        while end < present.len() && present[end].1 == present[start].1 {
            end += 1;
        }
        // positions start..end hold ranks start+1..=end
        let rank = offset as f64 + (start + 1 + end) as f64 / 2.0;
        for &(index, _) in &present[start..end] {
            ranks[index] = rank;
        }
        start = end;
    }

    ranks.into_iter().map(|rank| rank / n as f64).collect()
}

/// Percentile oriented so that values closer to 1.0 are better
pub fn oriented_percentiles(
    values: &[Option<f64>],
    direction: Direction,
    missing: MissingPlacement,
) -> Vec<f64> {
    let ranks = percentile_ranks(values, missing);
    match direction {
        Direction::HigherIsBetter => ranks,
        Direction::LowerIsBetter => ranks.into_iter().map(|p| 1.0 - p).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    fn assert_ranks(expected: &[f64], actual: &[f64]) {
        assert_eq!(expected.len(), actual.len());
        for (e, a) in expected.iter().zip(actual) {
            assert_float_absolute_eq!(*e, *a, 1e-12);
        }
    }

    #[test]
    fn test_distinct_values() {
        let ranks = percentile_ranks(&[Some(30.0), Some(10.0), Some(20.0), Some(40.0)], MissingPlacement::Bottom);
        assert_ranks(&[0.75, 0.25, 0.5, 1.0], &ranks);
    }

    #[test]
    fn test_ties_share_average_rank() {
        let ranks = percentile_ranks(&[Some(1.0), Some(2.0), Some(2.0), Some(3.0)], MissingPlacement::Bottom);
        assert_ranks(&[0.25, 0.625, 0.625, 1.0], &ranks);
    }

    #[test]
    fn test_missing_at_bottom() {
        let ranks = percentile_ranks(&[Some(5.0), None, Some(1.0), None], MissingPlacement::Bottom);
        // present ranks 2, 1; missing tied over ranks 3 and 4
        assert_ranks(&[0.5, 0.875, 0.25, 0.875], &ranks);
    }

    #[test]
    fn test_missing_at_top() {
        let ranks = percentile_ranks(&[Some(5.0), None, Some(1.0), None], MissingPlacement::Top);
        // missing tied over ranks 1 and 2; present ranks 4, 3
        assert_ranks(&[1.0, 0.375, 0.75, 0.375], &ranks);
    }

    #[test]
    fn test_all_missing() {
        let ranks = percentile_ranks(&[None, None, None], MissingPlacement::Top);
        assert_ranks(&[2.0 / 3.0; 3], &ranks);
    }

    #[test]
    fn test_empty_column() {
        assert!(percentile_ranks(&[], MissingPlacement::Bottom).is_empty());
    }

    #[test]
    fn test_lower_is_better_inverts() {
        let values = [Some(3.0), Some(1.0), Some(2.0)];
        let oriented = oriented_percentiles(&values, Direction::LowerIsBetter, MissingPlacement::Bottom);
        assert_ranks(&[0.0, 2.0 / 3.0, 1.0 / 3.0], &oriented);
    }

    #[test]
    fn test_missing_rank_is_worst_after_inversion() {
        // A missing rank placed at the bottom of the ascending order becomes the worst.
        let values = [Some(3.0), None, Some(1.0)];
        let oriented = oriented_percentiles(&values, Direction::LowerIsBetter, MissingPlacement::Bottom);
        assert!(oriented[1] < oriented[0]);
        assert!(oriented[0] < oriented[2]);
    }

    #[test]
    fn test_missing_points_are_worst_at_top() {
        let values = [Some(1800.0), None, Some(2400.0)];
        let oriented = oriented_percentiles(&values, Direction::HigherIsBetter, MissingPlacement::Top);
        assert!(oriented[1] < oriented[0]);
        assert_f64_near!(oriented[2], 1.0);
    }

    #[test]
    fn test_percentiles_stay_in_unit_interval() {
        let values: Vec<Option<f64>> =
            (0..50).map(|i| if i % 7 == 0 { None } else { Some((i % 5) as f64) }).collect();
        for missing in [MissingPlacement::Top, MissingPlacement::Bottom] {
            for direction in [Direction::HigherIsBetter, Direction::LowerIsBetter] {
                for p in oriented_percentiles(&values, direction, missing) {
                    assert!((0.0..=1.0).contains(&p), "{p} out of range");
                }
            }
        }
    }
}
