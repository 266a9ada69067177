use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::{
    calculator::OddsCalculator,
    config::ScoringProfile,
    error::{OddsError, Result},
    models::{OddsRow, PercentileVector, PlayerHistory, PlayerMetrics, PlayerProfile},
    percentile::oriented_percentiles,
    summarizer::SeasonSummarizer,
};

/// Metrics and odds over one population snapshot
///
/// Every call recomputes from the slices it is given; the engine keeps no
/// state between runs.
pub struct OddsEngine {
    summarizer: SeasonSummarizer,
    calculator: OddsCalculator,
}

impl OddsEngine {
    /// Create an engine for a validated scoring profile
    pub fn new(profile: ScoringProfile) -> Result<Self> {
        profile.validate()?;

        Ok(Self {
            summarizer: SeasonSummarizer::new(profile.one_season_penalty),
            calculator: OddsCalculator::new(profile),
        })
    }

    pub fn profile(&self) -> &ScoringProfile {
        self.calculator.profile()
    }

    /// Join profiles to histories, summarize each entry and rank the population
    ///
    /// Profiles without a history are dropped. When a profile appears more than
    /// once the first one is used; when a history appears more than once the
    /// last one is used.
    pub fn calculate_metrics(
        &self,
        histories: &[PlayerHistory],
        profiles: &[PlayerProfile],
    ) -> Result<Vec<PlayerMetrics>> {
        info!(
            "Calculating metrics for {} profiles and {} histories",
            profiles.len(),
            histories.len()
        );

        let mut by_entry: HashMap<i64, &PlayerHistory> = HashMap::with_capacity(histories.len());
        for history in histories {
            if by_entry.insert(history.entry_id, history).is_some() {
                warn!("Duplicate history for entry {}, keeping the latest", history.entry_id);
            }
        }

        let mut seen = HashSet::with_capacity(profiles.len());
        let mut metrics = Vec::with_capacity(profiles.len());
        let mut without_history = 0usize;

        for profile in profiles {
            if !seen.insert(profile.entry_id) {
                warn!("Duplicate profile for entry {}, keeping the first", profile.entry_id);
                continue;
            }
            let Some(history) = by_entry.get(&profile.entry_id) else {
                without_history += 1;
                continue;
            };

            let features = self.summarizer.summarize(&history.past)?;
            debug!(
                "Entry {}: {} past seasons",
                profile.entry_id, features.number_of_past_seasons
            );
            metrics.push(PlayerMetrics {
                profile: profile.clone(),
                features,
                percentiles: PercentileVector::default(),
            });
        }

        if without_history > 0 {
            info!("Dropped {} profiles without a history", without_history);
        }

        self.rank_population(&mut metrics);

        info!("Calculated metrics for {} entries", metrics.len());
        Ok(metrics)
    }

    /// Fill in every percentile column over the whole population
    fn rank_population(&self, metrics: &mut [PlayerMetrics]) {
        for rule in &self.profile().features {
            let column: Vec<Option<f64>> =
                metrics.iter().map(|m| m.features.get(rule.feature)).collect();
            let ranked = oriented_percentiles(&column, rule.direction, rule.missing);

            for (entry, percentile) in metrics.iter_mut().zip(ranked) {
                entry.percentiles.set(rule.feature, percentile);
            }
        }
    }

    /// Convert a ranked population into odds, favorites first
    pub fn calculate_odds(&self, metrics: &[PlayerMetrics]) -> Result<Vec<OddsRow>> {
        let min = self.profile().min_population;
        if metrics.len() < min {
            return Err(OddsError::PopulationTooSmall { size: metrics.len(), min });
        }

        let mut distances = Vec::with_capacity(metrics.len());
        for entry in metrics {
            let distance = self.calculator.weighted_manhattan_distance(&entry.percentiles);
            if !distance.is_finite() {
                return Err(OddsError::NonFinite {
                    entry_id: entry.profile.entry_id,
                    quantity: "weighted_manhattan_distance",
                    value: distance,
                });
            }
            distances.push(distance);
        }

        let probabilities = self.calculator.probabilities(&distances);

        let mut rows = Vec::with_capacity(metrics.len());
        for ((entry, distance), probability) in metrics.iter().zip(distances).zip(probabilities) {
            let entry_id = entry.profile.entry_id;
            rows.push(OddsRow {
                entry_id,
                player_first_name: entry.profile.player_first_name.clone(),
                player_last_name: entry.profile.player_last_name.clone(),
                weighted_manhattan_distance: distance,
                probability_of_winning: probability,
                odds: self.calculator.odds(entry_id, probability)?,
            });
        }

        rows.sort_by(|a, b| a.odds.total_cmp(&b.odds));

        if let Some(favorite) = rows.first() {
            info!(
                "🏆 Favorite is entry {} at odds {:.4} (p = {:.6})",
                favorite.entry_id, favorite.odds, favorite.probability_of_winning
            );
        }
        Ok(rows)
    }

    /// Metrics followed by odds
    pub fn run(
        &self,
        histories: &[PlayerHistory],
        profiles: &[PlayerProfile],
    ) -> Result<Vec<OddsRow>> {
        let metrics = self.calculate_metrics(histories, profiles)?;
        self.calculate_odds(&metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Feature, SeasonRecord};
    use assert_float_eq::*;

    fn season(name: &str, rank: f64, total_points: f64) -> SeasonRecord {
        SeasonRecord { season_name: name.to_string(), total_points, rank }
    }

    fn profile(entry_id: i64, first: &str) -> PlayerProfile {
        PlayerProfile {
            entry_id,
            player_first_name: Some(first.to_string()),
            ..Default::default()
        }
    }

    fn population() -> (Vec<PlayerHistory>, Vec<PlayerProfile>) {
        let histories = vec![
            PlayerHistory {
                entry_id: 1,
                past: vec![
                    season("2020/21", 5000.0, 2300.0),
                    season("2021/22", 3000.0, 2400.0),
                    season("2022/23", 1000.0, 2500.0),
                ],
            },
            PlayerHistory {
                entry_id: 2,
                past: vec![season("2021/22", 900000.0, 1700.0), season("2022/23", 800000.0, 1800.0)],
            },
            PlayerHistory { entry_id: 3, past: vec![season("2022/23", 400000.0, 1950.0)] },
            PlayerHistory { entry_id: 4, past: vec![] },
        ];
        let profiles = vec![profile(1, "Ada"), profile(2, "Ben"), profile(3, "Cy"), profile(4, "Di")];
        (histories, profiles)
    }

    fn engine() -> OddsEngine {
        OddsEngine::new(ScoringProfile::default()).unwrap()
    }

    #[test]
    fn test_percentiles_in_unit_interval() {
        let (histories, profiles) = population();
        let metrics = engine().calculate_metrics(&histories, &profiles).unwrap();
        assert_eq!(metrics.len(), 4);
        for entry in &metrics {
            for p in entry.percentiles.values() {
                assert!((0.0..=1.0).contains(p));
            }
        }
    }

    #[test]
    fn test_best_raw_value_has_top_percentile() {
        let (histories, profiles) = population();
        let metrics = engine().calculate_metrics(&histories, &profiles).unwrap();

        for feature in Feature::ALL {
            let top = metrics
                .iter()
                .map(|m| m.percentiles.get(feature))
                .fold(f64::NEG_INFINITY, f64::max);
            // Entry 1 is best at everything it has a value for
            if metrics[0].features.get(feature).is_some() {
                assert_f64_near!(metrics[0].percentiles.get(feature), top);
            }
        }
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (histories, profiles) = population();
        let rows = engine().run(&histories, &profiles).unwrap();
        let total: f64 = rows.iter().map(|r| r.probability_of_winning).sum();
        assert_float_absolute_eq!(total, 1.0, 1e-9);
    }

    #[test]
    fn test_rows_sorted_by_odds_and_distance() {
        let (histories, profiles) = population();
        let rows = engine().run(&histories, &profiles).unwrap();

        assert!(rows.windows(2).all(|w| w[0].odds <= w[1].odds));
        assert!(rows
            .windows(2)
            .all(|w| w[0].weighted_manhattan_distance <= w[1].weighted_manhattan_distance));
        assert_eq!(rows[0].entry_id, 1);
        assert_eq!(rows[0].player_first_name.as_deref(), Some("Ada"));
        assert_eq!(rows.last().unwrap().entry_id, 4);
    }

    #[test]
    fn test_runs_are_idempotent() {
        let (histories, profiles) = population();
        let engine = engine();
        let first = engine.run(&histories, &profiles).unwrap();
        let second = engine.run(&histories, &profiles).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_population_of_one_is_error() {
        let (histories, profiles) = population();
        let err = engine().run(&histories[..1], &profiles[..1]).unwrap_err();
        assert!(matches!(err, OddsError::PopulationTooSmall { size: 1, min: 2 }));
    }

    #[test]
    fn test_empty_population_is_error() {
        assert!(matches!(engine().run(&[], &[]), Err(OddsError::PopulationTooSmall { size: 0, .. })));
    }

    #[test]
    fn test_profiles_without_history_are_dropped() {
        let (histories, mut profiles) = population();
        profiles.push(profile(99, "Nobody"));
        let metrics = engine().calculate_metrics(&histories, &profiles).unwrap();
        assert!(metrics.iter().all(|m| m.profile.entry_id != 99));
        assert_eq!(metrics.len(), 4);
    }

    #[test]
    fn test_duplicate_profiles_keep_first() {
        let (histories, mut profiles) = population();
        profiles.push(profile(2, "Impostor"));
        let metrics = engine().calculate_metrics(&histories, &profiles).unwrap();
        assert_eq!(metrics.len(), 4);
        let ben = metrics.iter().find(|m| m.profile.entry_id == 2).unwrap();
        assert_eq!(ben.profile.player_first_name.as_deref(), Some("Ben"));
    }

    #[test]
    fn test_duplicate_histories_keep_last() {
        let (mut histories, profiles) = population();
        histories.push(PlayerHistory { entry_id: 4, past: vec![season("2022/23", 10.0, 3000.0)] });
        let metrics = engine().calculate_metrics(&histories, &profiles).unwrap();
        let di = metrics.iter().find(|m| m.profile.entry_id == 4).unwrap();
        assert_eq!(di.features.number_of_past_seasons, 1);
    }

    #[test]
    fn test_invalid_profile_is_rejected() {
        let mut profile = ScoringProfile::default();
        profile.features.pop();
        assert!(matches!(OddsEngine::new(profile), Err(OddsError::Config(_))));
    }

    #[test]
    fn test_higher_min_population() {
        let (histories, profiles) = population();
        let profile = ScoringProfile { min_population: 5, ..Default::default() };
        let err = OddsEngine::new(profile).unwrap().run(&histories, &profiles).unwrap_err();
        assert!(matches!(err, OddsError::PopulationTooSmall { size: 4, min: 5 }));
    }
}
