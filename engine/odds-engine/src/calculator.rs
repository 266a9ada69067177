use crate::config::ScoringProfile;
use crate::error::{OddsError, Result};
use crate::models::{Feature, PercentileVector};

/// Distance, probability and odds calculator for a scoring profile
#[derive(Debug, Clone)]
pub struct OddsCalculator {
    profile: ScoringProfile,
}

impl OddsCalculator {
    /// Create a new calculator
    pub fn new(profile: ScoringProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ScoringProfile {
        &self.profile
    }

    /// Weighted Manhattan distance from the ideal percentile vector
    ///
    /// Σ weight * |percentile - ideal| over every feature rule.
    pub fn weighted_manhattan_distance(&self, percentiles: &PercentileVector) -> f64 {
        self.profile
            .features
            .iter()
            .map(|rule| rule.weight * (percentiles.get(rule.feature) - rule.ideal).abs())
            .sum()
    }

    /// Softmax over negative distances
    ///
    /// Shifted by the smallest distance so the favorite's term is exp(0) and
    /// large distances underflow towards zero instead of the whole sum.
    pub fn probabilities(&self, distances: &[f64]) -> Vec<f64> {
        let min = distances.iter().copied().fold(f64::INFINITY, f64::min);
        let weights: Vec<f64> = distances.iter().map(|d| (-(d - min)).exp()).collect();
        let total: f64 = weights.iter().sum();
        weights.into_iter().map(|w| w / total).collect()
    }

    /// Odds against an entry: (1 - p) / p
    pub fn odds(&self, entry_id: i64, probability: f64) -> Result<f64> {
        if !(probability > 0.0 && probability < 1.0) {
            return Err(OddsError::DegenerateProbability { entry_id, probability });
        }

        let odds = (1.0 - probability) / probability;
        if !odds.is_finite() {
            return Err(OddsError::NonFinite { entry_id, quantity: "odds", value: odds });
        }
        Ok(odds)
    }

    /// Largest possible distance under this profile
    pub fn max_distance(&self) -> f64 {
        let worst = PercentileVector::new([0.0; Feature::COUNT]);
        self.weighted_manhattan_distance(&worst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    fn calculator() -> OddsCalculator {
        OddsCalculator::new(ScoringProfile::default())
    }

    #[test]
    fn test_ideal_entry_has_zero_distance() {
        let ideal = PercentileVector::new([1.0; Feature::COUNT]);
        assert_f64_near!(calculator().weighted_manhattan_distance(&ideal), 0.0);
    }

    #[test]
    fn test_worst_entry_distance_is_total_weight() {
        let calc = calculator();
        assert_float_absolute_eq!(calc.max_distance(), 22.55, 1e-12);
    }

    #[test]
    fn test_distance_uses_feature_weights() {
        let mut percentiles = PercentileVector::new([1.0; Feature::COUNT]);
        percentiles.set(Feature::BestTwoSeasonsPoints, 0.5);
        percentiles.set(Feature::MaximumRank, 0.0);
        // 5 * 0.5 + 0.05 * 1.0
        assert_float_absolute_eq!(calculator().weighted_manhattan_distance(&percentiles), 2.55, 1e-12);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let probs = calculator().probabilities(&[0.0, 1.0, 2.5, 10.0]);
        assert_float_absolute_eq!(probs.iter().sum::<f64>(), 1.0, 1e-12);
        assert!(probs.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_probabilities_are_shift_invariant() {
        let calc = calculator();
        let a = calc.probabilities(&[1.0, 2.0, 3.0]);
        let b = calc.probabilities(&[1001.0, 1002.0, 1003.0]);
        for (x, y) in a.iter().zip(&b) {
            assert_float_absolute_eq!(*x, *y, 1e-12);
        }
    }

    #[test]
    fn test_two_equal_entries_have_even_odds() {
        let calc = calculator();
        let probs = calc.probabilities(&[3.0, 3.0]);
        assert_f64_near!(probs[0], 0.5);
        assert_f64_near!(calc.odds(1, probs[0]).unwrap(), 1.0);
    }

    #[test]
    fn test_odds_formula() {
        assert_f64_near!(calculator().odds(1, 0.25).unwrap(), 3.0);
        assert_f64_near!(calculator().odds(1, 0.8).unwrap(), 0.25);
    }

    #[test]
    fn test_degenerate_probability_is_error() {
        let calc = calculator();
        assert!(matches!(calc.odds(9, 1.0), Err(OddsError::DegenerateProbability { entry_id: 9, .. })));
        assert!(matches!(calc.odds(9, 0.0), Err(OddsError::DegenerateProbability { .. })));
        assert!(matches!(calc.odds(9, f64::NAN), Err(OddsError::DegenerateProbability { .. })));
    }
}
