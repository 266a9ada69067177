use crate::config::DEFAULT_ONE_SEASON_PENALTY;
use crate::error::{OddsError, Result};
use crate::models::{FeatureVector, SeasonRecord};
use std::f64::consts::SQRT_2;

/// Reduces an entry's past seasons into a [`FeatureVector`]
#[derive(Debug, Clone)]
pub struct SeasonSummarizer {
    one_season_penalty: f64,
}

impl Default for SeasonSummarizer {
    fn default() -> Self {
        Self::new(DEFAULT_ONE_SEASON_PENALTY)
    }
}

impl SeasonSummarizer {
    /// Create a summarizer with the given single-season penalty
    pub fn new(one_season_penalty: f64) -> Self {
        Self { one_season_penalty }
    }

    /// Summarize a list of past seasons; input order does not matter
    pub fn summarize(&self, past: &[SeasonRecord]) -> Result<FeatureVector> {
        match past {
            [] => Ok(FeatureVector::default()),
            [season] => Ok(self.summarize_single(season)),
            _ => summarize_many(past),
        }
    }

    /// A single season is penalized: rank scaled up, points scaled down
    fn summarize_single(&self, season: &SeasonRecord) -> FeatureVector {
        let rank = season.rank * self.one_season_penalty;
        let points = season.total_points / self.one_season_penalty;

        FeatureVector {
            maximum_rank: Some(rank),
            maximum_total_points: Some(points),
            best_two_seasons_rank: Some(rank),
            best_two_seasons_points: Some(points),
            minimum_rank: Some(rank),
            minimum_total_points: Some(points),
            number_of_past_seasons: 1,
            moving_total_point_variance: None,
            moving_total_point_average: Some(points),
            moving_rank_variance: None,
            moving_rank_average: Some(rank),
        }
    }
}

fn summarize_many(past: &[SeasonRecord]) -> Result<FeatureVector> {
    let mut keyed = past
        .iter()
        .map(|season| season_year(&season.season_name).map(|year| (year, season)))
        .collect::<Result<Vec<_>>>()?;
    keyed.sort_by_key(|(year, _)| *year);

    let ranks: Vec<f64> = keyed.iter().map(|(_, season)| season.rank).collect();
    let points: Vec<f64> = keyed.iter().map(|(_, season)| season.total_points).collect();

    Ok(FeatureVector {
        maximum_rank: Some(maximum(&ranks)),
        maximum_total_points: Some(maximum(&points)),
        best_two_seasons_rank: Some(best_two_mean(&ranks, true)),
        best_two_seasons_points: Some(best_two_mean(&points, false)),
        minimum_rank: Some(minimum(&ranks)),
        minimum_total_points: Some(minimum(&points)),
        number_of_past_seasons: keyed.len() as u32,
        moving_total_point_variance: Some(moving_std(&points)),
        moving_total_point_average: Some(moving_mean(&points)),
        moving_rank_variance: Some(moving_std(&ranks)),
        moving_rank_average: Some(moving_mean(&ranks)),
    })
}

/// Year suffix of a season name, e.g. "2023/24" -> 24
pub fn season_year(season_name: &str) -> Result<u32> {
    let bytes = season_name.as_bytes();
    match bytes {
        [.., tens, units] if tens.is_ascii_digit() && units.is_ascii_digit() => {
            Ok(u32::from(tens - b'0') * 10 + u32::from(units - b'0'))
        }
        _ => Err(OddsError::InvalidSeasonName(season_name.to_string())),
    }
}

fn maximum(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn minimum(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean of the two best values
fn best_two_mean(values: &[f64], lower_is_better: bool) -> f64 {
    let mut sorted = values.to_vec();
    if lower_is_better {
        sorted.sort_by(f64::total_cmp);
    } else {
        sorted.sort_by(|a, b| b.total_cmp(a));
    }
    mean(&sorted[..sorted.len().min(2)])
}

/// Mean of the size-2 simple moving average
fn moving_mean(values: &[f64]) -> f64 {
    let windows: Vec<f64> = values.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
    mean(&windows)
}

/// Mean of the size-2 moving sample standard deviation
fn moving_std(values: &[f64]) -> f64 {
    let windows: Vec<f64> = values.windows(2).map(|w| (w[0] - w[1]).abs() / SQRT_2).collect();
    mean(&windows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    fn season(name: &str, rank: f64, total_points: f64) -> SeasonRecord {
        SeasonRecord { season_name: name.to_string(), total_points, rank }
    }

    #[test]
    fn test_zero_seasons_are_all_missing() {
        let features = SeasonSummarizer::default().summarize(&[]).unwrap();
        assert_eq!(features, FeatureVector::default());
        assert_eq!(features.number_of_past_seasons, 0);
        assert!(features.maximum_rank.is_none());
        assert!(features.moving_rank_average.is_none());
    }

    #[test]
    fn test_single_season_is_penalized() {
        let features =
            SeasonSummarizer::default().summarize(&[season("2022/23", 10.0, 1000.0)]).unwrap();

        for rank in [
            features.maximum_rank,
            features.best_two_seasons_rank,
            features.minimum_rank,
            features.moving_rank_average,
        ] {
            assert_f64_near!(rank.unwrap(), 12.5);
        }
        for points in [
            features.maximum_total_points,
            features.best_two_seasons_points,
            features.minimum_total_points,
            features.moving_total_point_average,
        ] {
            assert_f64_near!(points.unwrap(), 800.0);
        }
        assert!(features.moving_rank_variance.is_none());
        assert!(features.moving_total_point_variance.is_none());
        assert_eq!(features.number_of_past_seasons, 1);
    }

    #[test]
    fn test_single_season_uses_configured_penalty() {
        let features =
            SeasonSummarizer::new(2.0).summarize(&[season("2022/23", 10.0, 1000.0)]).unwrap();
        assert_f64_near!(features.minimum_rank.unwrap(), 20.0);
        assert_f64_near!(features.maximum_total_points.unwrap(), 500.0);
    }

    #[test]
    fn test_two_seasons_form_a_single_window() {
        let features = SeasonSummarizer::default()
            .summarize(&[season("2021-22", 5.0, 900.0), season("2022-23", 15.0, 1100.0)])
            .unwrap();

        assert_f64_near!(features.maximum_rank.unwrap(), 15.0);
        assert_f64_near!(features.minimum_rank.unwrap(), 5.0);
        assert_f64_near!(features.best_two_seasons_rank.unwrap(), 10.0);
        assert_f64_near!(features.moving_rank_average.unwrap(), 10.0);
        assert_float_absolute_eq!(features.moving_rank_variance.unwrap(), 7.0711, 1e-4);

        assert_f64_near!(features.maximum_total_points.unwrap(), 1100.0);
        assert_f64_near!(features.minimum_total_points.unwrap(), 900.0);
        assert_f64_near!(features.best_two_seasons_points.unwrap(), 1000.0);
        assert_f64_near!(features.moving_total_point_average.unwrap(), 1000.0);
        assert_float_absolute_eq!(features.moving_total_point_variance.unwrap(), 141.4214, 1e-4);
        assert_eq!(features.number_of_past_seasons, 2);
    }

    #[test]
    fn test_many_seasons_are_sorted_by_year_before_windowing() {
        // Stored newest first; windows must run over 19, 20, 21, 22.
        let past = [
            season("2021/22", 40.0, 2000.0),
            season("2020/21", 10.0, 2400.0),
            season("2019/20", 100.0, 1800.0),
            season("2018/19", 20.0, 2200.0),
        ];
        let features = SeasonSummarizer::default().summarize(&past).unwrap();

        // Ranks in year order: 20, 100, 10, 40
        assert_f64_near!(features.maximum_rank.unwrap(), 100.0);
        assert_f64_near!(features.minimum_rank.unwrap(), 10.0);
        assert_f64_near!(features.best_two_seasons_rank.unwrap(), 15.0);
        // window means 60, 55, 25
        assert_f64_near!(features.moving_rank_average.unwrap(), 140.0 / 3.0);
        // window stds 80, 90, 30 (over sqrt 2)
        assert_float_absolute_eq!(
            features.moving_rank_variance.unwrap(),
            200.0 / 3.0 / SQRT_2,
            1e-9
        );

        // Points in year order: 2200, 1800, 2400, 2000
        assert_f64_near!(features.best_two_seasons_points.unwrap(), 2300.0);
        // window means 2000, 2100, 2200
        assert_f64_near!(features.moving_total_point_average.unwrap(), 2100.0);
        assert_eq!(features.number_of_past_seasons, 4);
    }

    #[test]
    fn test_order_of_input_does_not_matter() {
        let a = [season("2019/20", 3.0, 10.0), season("2020/21", 9.0, 40.0), season("2021/22", 1.0, 20.0)];
        let b = [a[2].clone(), a[0].clone(), a[1].clone()];
        let summarizer = SeasonSummarizer::default();
        assert_eq!(summarizer.summarize(&a).unwrap(), summarizer.summarize(&b).unwrap());
    }

    #[test]
    fn test_season_year_parsing() {
        assert_eq!(season_year("2023-24").unwrap(), 24);
        assert_eq!(season_year("2009/10").unwrap(), 10);
        assert_eq!(season_year("07").unwrap(), 7);
        assert!(matches!(season_year("2023/2x"), Err(OddsError::InvalidSeasonName(_))));
        assert!(matches!(season_year("9"), Err(OddsError::InvalidSeasonName(_))));
    }

    #[test]
    fn test_invalid_season_name_fails_summary() {
        let past = [season("2021/22", 5.0, 900.0), season("latest", 15.0, 1100.0)];
        assert!(SeasonSummarizer::default().summarize(&past).is_err());
    }

    #[test]
    fn test_single_season_does_not_parse_name() {
        let features = SeasonSummarizer::default().summarize(&[season("latest", 4.0, 100.0)]).unwrap();
        assert_f64_near!(features.maximum_rank.unwrap(), 5.0);
    }
}
