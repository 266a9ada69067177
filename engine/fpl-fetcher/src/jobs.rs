//! One job per data file: fetch or read, then write under the data directory

use crate::extract::extract_players;
use crate::fetcher::{FplFetcher, JsonSource};
use crate::models::{LeagueKind, LeaguePage};
use crate::storage::{self, DataDir, JsonlWriter};
use anyhow::{Context, Result};
use odds_engine::table::{read_jsonl, read_metrics, write_metrics, write_odds};
use odds_engine::{OddsEngine, PlayerHistory, PlayerProfile};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use tracing::{debug, error, info, warn};

/// Outcome of a job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobReport {
    /// Records written
    pub written: usize,

    /// Entries that could not be fetched
    pub failed: usize,
}

impl fmt::Display for JobReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} written, {} failed", self.written, self.failed)
    }
}

fn request_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Fetch a league, append its pages and merge it into the league table
///
/// Head-to-head leagues also get their standings appended to `standings_h2h.csv`.
pub async fn league<S: JsonSource>(
    fetcher: &FplFetcher<S>,
    data: &DataDir,
    league_id: i64,
    kind: LeagueKind,
) -> Result<JobReport> {
    info!("🔄 Fetching {} league {}", kind, league_id);
    data.ensure()?;

    let pages = fetcher.fetch_league_pages(league_id, kind).await?;
    let written = storage::append_pages(data.league_pages(kind), &pages)?;
    info!("Appended {} pages to {}", written, data.league_pages(kind).display());

    storage::merge_leagues(data.league_pages(kind), data.league_table(kind), kind)?;

    if kind == LeagueKind::H2h {
        let typed = pages
            .iter()
            .map(LeaguePage::from_value)
            .collect::<serde_json::Result<Vec<_>>>()
            .context("Unexpected standings page")?;
        storage::append_standings(data.file(storage::H2H_STANDINGS), &typed, &request_timestamp())?;
    }

    Ok(JobReport { written, failed: 0 })
}

/// Fetch a head-to-head league's matches and append the unseen ones
pub async fn h2h_matches<S: JsonSource>(
    fetcher: &FplFetcher<S>,
    data: &DataDir,
    league_id: i64,
) -> Result<JobReport> {
    info!("🔄 Fetching H2H matches for league {}", league_id);
    data.ensure()?;

    let pages = fetcher.fetch_h2h_matches(league_id).await?;
    let written =
        storage::append_matches(data.file(storage::H2H_MATCHES), &pages, &request_timestamp())?;
    Ok(JobReport { written, failed: 0 })
}

/// Rewrite `players.jsonl` from every classic league page on disk
pub fn players(data: &DataDir) -> Result<JobReport> {
    let input = data.league_pages(LeagueKind::Classic);
    let output = data.file(storage::PLAYERS);
    info!("Extracting players from {}", input.display());

    let pages: Vec<LeaguePage> =
        read_jsonl(&input).with_context(|| format!("Failed to read {}", input.display()))?;

    let mut seen = HashSet::new();
    let mut writer = JsonlWriter::create(&output)?;
    for page in &pages {
        for player in extract_players(page) {
            if seen.insert(player.entry_id) {
                debug!("Writing player {}", player.entry_id);
                writer.write(&player)?;
            }
        }
    }
    let written = writer.finish()?;

    info!("✅ Wrote {} players to {}", written, output.display());
    Ok(JobReport { written, failed: 0 })
}

fn read_players(data: &DataDir) -> Result<Vec<PlayerProfile>> {
    let path = data.file(storage::PLAYERS);
    read_jsonl(&path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Fetch one document per player and append it to `output`
///
/// A failed fetch is logged and skipped.
async fn per_player<T, F, Fut>(data: &DataDir, output: &str, what: &str, fetch: F) -> Result<JobReport>
where
    T: Serialize,
    F: Fn(i64) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let players = read_players(data)?;
    info!("Fetching {} for {} players", what, players.len());

    let mut writer = JsonlWriter::append(data.file(output))?;
    let mut report = JobReport::default();

    for player in &players {
        match fetch(player.entry_id).await {
            Ok(document) => {
                writer.write(&document)?;
                debug!("Written {} for entry {}", what, player.entry_id);
            }
            Err(e) => {
                warn!("Failed to fetch {} for entry {}: {:#}", what, player.entry_id, e);
                report.failed += 1;
            }
        }
    }
    report.written = writer.finish()?;

    if report.failed > 0 {
        error!("{} players could not be fetched", report.failed);
    }
    info!("✅ {}: {}", what, report);
    Ok(report)
}

/// Append every player's season history to `player_history.jsonl`
pub async fn player_history<S: JsonSource>(fetcher: &FplFetcher<S>, data: &DataDir) -> Result<JobReport> {
    per_player(data, storage::PLAYER_HISTORY, "history", move |entry_id| fetcher.fetch_entry_history(entry_id)).await
}

/// Append every player's transfers to `transfer_history.jsonl`
pub async fn transfer_history<S: JsonSource>(fetcher: &FplFetcher<S>, data: &DataDir) -> Result<JobReport> {
    per_player(data, storage::TRANSFER_HISTORY, "transfers", move |entry_id| fetcher.fetch_transfers(entry_id)).await
}

/// Append every player's picks for a gameweek to `picks_history.jsonl`
pub async fn picks_history<S: JsonSource>(
    fetcher: &FplFetcher<S>,
    data: &DataDir,
    gameweek: u32,
) -> Result<JobReport> {
    per_player(data, storage::PICKS_HISTORY, "picks", move |entry_id| fetcher.fetch_picks(gameweek, entry_id)).await
}

/// Compute features and percentiles into `player_histories_and_metrics.csv`
pub fn features(engine: &OddsEngine, data: &DataDir) -> Result<JobReport> {
    let profiles = read_players(data)?;
    let history_path = data.file(storage::PLAYER_HISTORY);
    let histories: Vec<PlayerHistory> = read_jsonl(&history_path)
        .with_context(|| format!("Failed to read {}", history_path.display()))?;

    let metrics = engine.calculate_metrics(&histories, &profiles)?;

    let output = data.file(storage::METRICS);
    write_metrics(&output, &metrics).with_context(|| format!("Failed to write {}", output.display()))?;

    info!("✅ Wrote metrics for {} entries to {}", metrics.len(), output.display());
    Ok(JobReport { written: metrics.len(), failed: 0 })
}

/// Compute odds from `player_histories_and_metrics.csv` into `player_odds.csv`
pub fn odds(engine: &OddsEngine, data: &DataDir) -> Result<JobReport> {
    let input = data.file(storage::METRICS);
    let metrics = read_metrics(&input).with_context(|| format!("Failed to read {}", input.display()))?;

    let rows = engine.calculate_odds(&metrics)?;

    let output = data.file(storage::ODDS);
    write_odds(&output, &rows).with_context(|| format!("Failed to write {}", output.display()))?;

    info!("✅ Wrote odds for {} entries to {}", rows.len(), output.display());
    Ok(JobReport { written: rows.len(), failed: 0 })
}
