//! Reading and writing the engine's tables
//!
//! Histories and profiles come in as JSON lines; metrics and odds go out as CSV.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OddsError, Result};
use crate::models::{Feature, FeatureVector, OddsRow, PercentileVector, PlayerMetrics, PlayerProfile};

/// Read a JSON-lines file; blank lines are skipped
pub fn read_jsonl<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);

    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line)
            .map_err(|source| OddsError::Json { line: index + 1, source })?;
        records.push(record);
    }

    debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// One flat row of `player_histories_and_metrics.csv`
#[derive(Debug, Serialize, Deserialize)]
struct MetricsRow {
    entry_id: i64,
    entry_name: Option<String>,
    joined_time: Option<String>,
    player_first_name: Option<String>,
    player_last_name: Option<String>,

    maximum_rank: Option<f64>,
    maximum_total_points: Option<f64>,
    best_two_seasons_rank: Option<f64>,
    best_two_seasons_points: Option<f64>,
    minimum_rank: Option<f64>,
    minimum_total_points: Option<f64>,
    number_of_past_seasons: u32,
    moving_total_point_variance: Option<f64>,
    moving_total_point_average: Option<f64>,
    moving_rank_variance: Option<f64>,
    moving_rank_average: Option<f64>,

    percentile_maximum_rank: f64,
    percentile_maximum_total_points: f64,
    percentile_best_two_seasons_rank: f64,
    percentile_best_two_seasons_points: f64,
    percentile_minimum_rank: f64,
    percentile_minimum_total_points: f64,
    percentile_number_of_past_seasons: f64,
    percentile_moving_total_point_variance: f64,
    percentile_moving_total_point_average: f64,
    percentile_moving_rank_variance: f64,
    percentile_moving_rank_average: f64,
}

impl From<&PlayerMetrics> for MetricsRow {
    fn from(metrics: &PlayerMetrics) -> Self {
        let PlayerMetrics { profile, features: f, percentiles: p } = metrics;
        Self {
            entry_id: profile.entry_id,
            entry_name: profile.entry_name.clone(),
            joined_time: profile.joined_time.clone(),
            player_first_name: profile.player_first_name.clone(),
            player_last_name: profile.player_last_name.clone(),

            maximum_rank: f.maximum_rank,
            maximum_total_points: f.maximum_total_points,
            best_two_seasons_rank: f.best_two_seasons_rank,
            best_two_seasons_points: f.best_two_seasons_points,
            minimum_rank: f.minimum_rank,
            minimum_total_points: f.minimum_total_points,
            number_of_past_seasons: f.number_of_past_seasons,
            moving_total_point_variance: f.moving_total_point_variance,
            moving_total_point_average: f.moving_total_point_average,
            moving_rank_variance: f.moving_rank_variance,
            moving_rank_average: f.moving_rank_average,

            percentile_maximum_rank: p.get(Feature::MaximumRank),
            percentile_maximum_total_points: p.get(Feature::MaximumTotalPoints),
            percentile_best_two_seasons_rank: p.get(Feature::BestTwoSeasonsRank),
            percentile_best_two_seasons_points: p.get(Feature::BestTwoSeasonsPoints),
            percentile_minimum_rank: p.get(Feature::MinimumRank),
            percentile_minimum_total_points: p.get(Feature::MinimumTotalPoints),
            percentile_number_of_past_seasons: p.get(Feature::NumberOfPastSeasons),
            percentile_moving_total_point_variance: p.get(Feature::MovingTotalPointVariance),
            percentile_moving_total_point_average: p.get(Feature::MovingTotalPointAverage),
            percentile_moving_rank_variance: p.get(Feature::MovingRankVariance),
            percentile_moving_rank_average: p.get(Feature::MovingRankAverage),
        }
    }
}

impl From<MetricsRow> for PlayerMetrics {
    fn from(row: MetricsRow) -> Self {
        Self {
            profile: PlayerProfile {
                entry_id: row.entry_id,
                entry_name: row.entry_name,
                joined_time: row.joined_time,
                player_first_name: row.player_first_name,
                player_last_name: row.player_last_name,
            },
            features: FeatureVector {
                maximum_rank: row.maximum_rank,
                maximum_total_points: row.maximum_total_points,
                best_two_seasons_rank: row.best_two_seasons_rank,
                best_two_seasons_points: row.best_two_seasons_points,
                minimum_rank: row.minimum_rank,
                minimum_total_points: row.minimum_total_points,
                number_of_past_seasons: row.number_of_past_seasons,
                moving_total_point_variance: row.moving_total_point_variance,
                moving_total_point_average: row.moving_total_point_average,
                moving_rank_variance: row.moving_rank_variance,
                moving_rank_average: row.moving_rank_average,
            },
            // Same order as Feature::ALL
            percentiles: PercentileVector::new([
                row.percentile_maximum_rank,
                row.percentile_maximum_total_points,
                row.percentile_best_two_seasons_rank,
                row.percentile_best_two_seasons_points,
                row.percentile_minimum_rank,
                row.percentile_minimum_total_points,
                row.percentile_number_of_past_seasons,
                row.percentile_moving_total_point_variance,
                row.percentile_moving_total_point_average,
                row.percentile_moving_rank_variance,
                row.percentile_moving_rank_average,
            ]),
        }
    }
}

/// Write `player_histories_and_metrics.csv`, replacing any previous file
pub fn write_metrics(path: impl AsRef<Path>, metrics: &[PlayerMetrics]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for entry in metrics {
        writer.serialize(MetricsRow::from(entry))?;
    }
    writer.flush()?;
    debug!("Wrote {} metrics rows to {}", metrics.len(), path.as_ref().display());
    Ok(())
}

/// Read `player_histories_and_metrics.csv`
pub fn read_metrics(path: impl AsRef<Path>) -> Result<Vec<PlayerMetrics>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut metrics = Vec::new();
    for row in reader.deserialize::<MetricsRow>() {
        metrics.push(row?.into());
    }
    Ok(metrics)
}

/// Write `player_odds.csv`, replacing any previous file
pub fn write_odds(path: impl AsRef<Path>, rows: &[OddsRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    debug!("Wrote {} odds rows to {}", rows.len(), path.as_ref().display());
    Ok(())
}

/// Read `player_odds.csv`
pub fn read_odds(path: impl AsRef<Path>) -> Result<Vec<OddsRow>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    reader.deserialize::<OddsRow>().map(|row| row.map_err(OddsError::from)).collect()
}
