use serde::{Deserialize, Serialize};
use std::fmt;

/// One completed season for an entry, as returned by the history endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRecord {
    /// Season label, e.g. "2022/23"; the last two characters are the year
    pub season_name: String,

    /// Total points scored in the season
    pub total_points: f64,

    /// Overall rank at the end of the season (lower is better)
    pub rank: f64,
}

/// Past seasons of one entry
///
/// Any other fields of the history payload (`current`, `chips`) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerHistory {
    pub entry_id: i64,

    #[serde(default)]
    pub past: Vec<SeasonRecord>,
}

/// League entry as extracted from standings pages
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub entry_id: i64,

    #[serde(default)]
    pub entry_name: Option<String>,

    #[serde(default)]
    pub joined_time: Option<String>,

    #[serde(default)]
    pub player_first_name: Option<String>,

    #[serde(default)]
    pub player_last_name: Option<String>,
}

/// The eleven season-history features, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    MaximumRank,
    MaximumTotalPoints,
    BestTwoSeasonsRank,
    BestTwoSeasonsPoints,
    MinimumRank,
    MinimumTotalPoints,
    NumberOfPastSeasons,
    MovingTotalPointVariance,
    MovingTotalPointAverage,
    MovingRankVariance,
    MovingRankAverage,
}

impl Feature {
    /// Number of features
    pub const COUNT: usize = 11;

    /// All features in column order
    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::MaximumRank,
        Feature::MaximumTotalPoints,
        Feature::BestTwoSeasonsRank,
        Feature::BestTwoSeasonsPoints,
        Feature::MinimumRank,
        Feature::MinimumTotalPoints,
        Feature::NumberOfPastSeasons,
        Feature::MovingTotalPointVariance,
        Feature::MovingTotalPointAverage,
        Feature::MovingRankVariance,
        Feature::MovingRankAverage,
    ];

    /// Position of the feature in column order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name of the raw feature
    pub fn name(self) -> &'static str {
        match self {
            Feature::MaximumRank => "maximum_rank",
            Feature::MaximumTotalPoints => "maximum_total_points",
            Feature::BestTwoSeasonsRank => "best_two_seasons_rank",
            Feature::BestTwoSeasonsPoints => "best_two_seasons_points",
            Feature::MinimumRank => "minimum_rank",
            Feature::MinimumTotalPoints => "minimum_total_points",
            Feature::NumberOfPastSeasons => "number_of_past_seasons",
            Feature::MovingTotalPointVariance => "moving_total_point_variance",
            Feature::MovingTotalPointAverage => "moving_total_point_average",
            Feature::MovingRankVariance => "moving_rank_variance",
            Feature::MovingRankAverage => "moving_rank_average",
        }
    }

    /// Column name of the feature's percentile rank
    pub fn percentile_column(self) -> String {
        format!("percentile_{}", self.name())
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Summary statistics of an entry's past seasons
///
/// Every field except `number_of_past_seasons` is `None` for an entry without
/// history; the variances are also `None` for a single season.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    pub maximum_rank: Option<f64>,
    pub maximum_total_points: Option<f64>,
    pub best_two_seasons_rank: Option<f64>,
    pub best_two_seasons_points: Option<f64>,
    pub minimum_rank: Option<f64>,
    pub minimum_total_points: Option<f64>,
    pub number_of_past_seasons: u32,
    pub moving_total_point_variance: Option<f64>,
    pub moving_total_point_average: Option<f64>,
    pub moving_rank_variance: Option<f64>,
    pub moving_rank_average: Option<f64>,
}

impl FeatureVector {
    /// Value of a single feature
    pub fn get(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::MaximumRank => self.maximum_rank,
            Feature::MaximumTotalPoints => self.maximum_total_points,
            Feature::BestTwoSeasonsRank => self.best_two_seasons_rank,
            Feature::BestTwoSeasonsPoints => self.best_two_seasons_points,
            Feature::MinimumRank => self.minimum_rank,
            Feature::MinimumTotalPoints => self.minimum_total_points,
            Feature::NumberOfPastSeasons => Some(self.number_of_past_seasons as f64),
            Feature::MovingTotalPointVariance => self.moving_total_point_variance,
            Feature::MovingTotalPointAverage => self.moving_total_point_average,
            Feature::MovingRankVariance => self.moving_rank_variance,
            Feature::MovingRankAverage => self.moving_rank_average,
        }
    }
}

/// Population percentile of every feature, oriented so that 1.0 is best
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PercentileVector([f64; Feature::COUNT]);

impl PercentileVector {
    pub fn new(values: [f64; Feature::COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        self.0[feature.index()] = value;
    }

    pub fn values(&self) -> &[f64; Feature::COUNT] {
        &self.0
    }
}

/// An entry with its features and population percentiles
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMetrics {
    pub profile: PlayerProfile,
    pub features: FeatureVector,
    pub percentiles: PercentileVector,
}

/// Final per-entry row of the odds table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsRow {
    pub entry_id: i64,
    pub player_first_name: Option<String>,
    pub player_last_name: Option<String>,
    pub weighted_manhattan_distance: f64,
    pub probability_of_winning: f64,
    pub odds: f64,
}
