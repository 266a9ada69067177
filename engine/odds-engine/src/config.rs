use crate::error::{OddsError, Result};
use crate::models::Feature;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Rank multiplier (and points divisor) applied to entries with a single past season
pub const DEFAULT_ONE_SEASON_PENALTY: f64 = 1.25;

/// Smallest population for which odds are defined
pub const DEFAULT_MIN_POPULATION: usize = 2;

/// Which raw values count as better for a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Percentile kept as ranked
    HigherIsBetter,
    /// Percentile stored as `1 - percentile`
    LowerIsBetter,
}

/// Where entries without a value land in the ascending ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPlacement {
    Top,
    Bottom,
}

/// Ranking and scoring rule for one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureRule {
    pub feature: Feature,
    pub direction: Direction,
    pub missing: MissingPlacement,
    pub weight: f64,
    #[serde(default = "default_ideal")]
    pub ideal: f64,
}

fn default_ideal() -> f64 {
    1.0
}

impl FeatureRule {
    fn new(feature: Feature, direction: Direction, missing: MissingPlacement, weight: f64) -> Self {
        Self { feature, direction, missing, weight, ideal: default_ideal() }
    }
}

/// Scoring profile for the odds engine
///
/// The weights and the one-season penalty are empirically tuned product
/// parameters. Profiles are immutable once handed to an engine, so several can
/// be evaluated side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringProfile {
    /// Rank multiplier / points divisor for single-season entries
    pub one_season_penalty: f64,

    /// Minimum population size for odds
    pub min_population: usize,

    /// One rule per feature
    pub features: Vec<FeatureRule>,
}

impl Default for ScoringProfile {
    fn default() -> Self {
        use Direction::*;
        use MissingPlacement::*;

        Self {
            one_season_penalty: DEFAULT_ONE_SEASON_PENALTY,
            min_population: DEFAULT_MIN_POPULATION,
            features: vec![
                FeatureRule::new(Feature::MaximumRank, LowerIsBetter, Bottom, 0.05),
                FeatureRule::new(Feature::MaximumTotalPoints, HigherIsBetter, Top, 5.0),
                FeatureRule::new(Feature::BestTwoSeasonsRank, LowerIsBetter, Bottom, 5.0),
                FeatureRule::new(Feature::BestTwoSeasonsPoints, HigherIsBetter, Top, 5.0),
                FeatureRule::new(Feature::MinimumRank, LowerIsBetter, Bottom, 2.0),
                FeatureRule::new(Feature::MinimumTotalPoints, HigherIsBetter, Top, 0.25),
                FeatureRule::new(Feature::NumberOfPastSeasons, HigherIsBetter, Bottom, 0.25),
                FeatureRule::new(Feature::MovingTotalPointVariance, LowerIsBetter, Bottom, 0.5),
                FeatureRule::new(Feature::MovingTotalPointAverage, HigherIsBetter, Top, 2.0),
                FeatureRule::new(Feature::MovingRankVariance, LowerIsBetter, Bottom, 0.5),
                FeatureRule::new(Feature::MovingRankAverage, LowerIsBetter, Bottom, 2.0),
            ],
        }
    }
}

impl ScoringProfile {
    /// Parse a profile from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let profile: ScoringProfile =
            toml::from_str(content).map_err(|e| OddsError::config(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load a profile from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Rule for a feature
    pub fn rule(&self, feature: Feature) -> Result<&FeatureRule> {
        self.features
            .iter()
            .find(|rule| rule.feature == feature)
            .ok_or_else(|| OddsError::config(format!("no scoring rule for feature {feature}")))
    }

    /// Validate the profile
    ///
    /// Every feature must have exactly one rule; a skipped feature would silently
    /// change the distance.
    pub fn validate(&self) -> Result<()> {
        if !(self.one_season_penalty.is_finite() && self.one_season_penalty > 0.0) {
            return Err(OddsError::config(format!(
                "one_season_penalty must be a positive number, got {}",
                self.one_season_penalty
            )));
        }

        if self.min_population < 2 {
            return Err(OddsError::config(format!(
                "min_population must be at least 2, got {}",
                self.min_population
            )));
        }

        let mut seen = HashSet::new();
        for rule in &self.features {
            if !seen.insert(rule.feature) {
                return Err(OddsError::config(format!(
                    "duplicate scoring rule for feature {}",
                    rule.feature
                )));
            }
            if !(rule.weight.is_finite() && rule.weight >= 0.0) {
                return Err(OddsError::config(format!(
                    "weight for feature {} must be a non-negative number, got {}",
                    rule.feature, rule.weight
                )));
            }
            if !rule.ideal.is_finite() {
                return Err(OddsError::config(format!(
                    "ideal value for feature {} must be finite",
                    rule.feature
                )));
            }
        }

        for feature in Feature::ALL {
            if !seen.contains(&feature) {
                return Err(OddsError::config(format!("no scoring rule for feature {feature}")));
            }
        }

        Ok(())
    }

    /// Sum of all feature weights; the largest distance an entry can have
    pub fn total_weight(&self) -> f64 {
        self.features.iter().map(|rule| rule.weight).sum()
    }
}
