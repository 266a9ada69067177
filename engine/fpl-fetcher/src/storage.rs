//! JSON-lines and CSV files under the data directory

use crate::models::{cell, JsonObject, LeagueKind, LeaguePage, MATCH_FIELDS, MATCH_KEY_FIELDS, STANDINGS_FIELDS};
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use odds_engine::table::read_jsonl;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CLASSIC_LEAGUE_PAGES: &str = "classic_league.jsonl";
pub const CLASSIC_LEAGUES: &str = "leagues.csv";
pub const H2H_LEAGUE_PAGES: &str = "h2h_leagues.jsonl";
pub const H2H_LEAGUES: &str = "h2h_leagues.csv";
pub const H2H_STANDINGS: &str = "standings_h2h.csv";
pub const H2H_MATCHES: &str = "matches_h2h.csv";
pub const PLAYERS: &str = "players.jsonl";
pub const PLAYER_HISTORY: &str = "player_history.jsonl";
pub const TRANSFER_HISTORY: &str = "transfer_history.jsonl";
pub const PICKS_HISTORY: &str = "picks_history.jsonl";
pub const METRICS: &str = "player_histories_and_metrics.csv";
pub const ODDS: &str = "player_odds.csv";

/// Directory holding every file the jobs read and write
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory if it does not exist yet
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create data directory {}", self.root.display()))
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Raw standings pages of a league kind
    pub fn league_pages(&self, kind: LeagueKind) -> PathBuf {
        match kind {
            LeagueKind::Classic => self.file(CLASSIC_LEAGUE_PAGES),
            LeagueKind::H2h => self.file(H2H_LEAGUE_PAGES),
        }
    }

    /// League summary table of a league kind
    pub fn league_table(&self, kind: LeagueKind) -> PathBuf {
        match kind {
            LeagueKind::Classic => self.file(CLASSIC_LEAGUES),
            LeagueKind::H2h => self.file(H2H_LEAGUES),
        }
    }
}

/// Line-by-line writer for a JSON-lines file
pub struct JsonlWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    written: usize,
}

impl JsonlWriter {
    /// Open a file for appending, creating it if needed
    pub fn append(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path.as_ref());
        Self::from_file(path.as_ref(), file)
    }

    /// Create or truncate a file
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file(path.as_ref(), File::create(path.as_ref()))
    }

    fn from_file(path: &Path, file: std::io::Result<File>) -> Result<Self> {
        let file = file.with_context(|| format!("Failed to open {}", path.display()))?;
        Ok(Self { writer: BufWriter::new(file), path: path.to_path_buf(), written: 0 })
    }

    /// Write one record as a single line
    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)
            .with_context(|| format!("Failed to serialize record for {}", self.path.display()))?;
        self.writer
            .write_all(b"\n")
            .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        self.written += 1;
        Ok(())
    }

    /// Flush and return the number of lines written
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush().with_context(|| format!("Failed to flush {}", self.path.display()))?;
        debug!("Wrote {} lines to {}", self.written, self.path.display());
        Ok(self.written)
    }
}

/// Append raw pages to a JSON-lines file
pub fn append_pages(path: impl AsRef<Path>, pages: &[Value]) -> Result<usize> {
    let mut writer = JsonlWriter::append(path)?;
    for page in pages {
        writer.write(page)?;
    }
    writer.finish()
}

#[derive(Deserialize)]
struct LeagueLine {
    league: JsonObject,
}

struct LeagueRow {
    created: DateTime<FixedOffset>,
    cells: Vec<String>,
}

fn parse_created(created: &str, league_id: i64) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(created)
        .with_context(|| format!("League {league_id} has an invalid created timestamp '{created}'"))
}

/// Merge every league in a pages file into the league summary table
///
/// A league already in the table is replaced only by a row with a newer
/// `created` timestamp. Rows are written in ascending id order. Returns the
/// number of leagues in the table.
pub fn merge_leagues(pages: impl AsRef<Path>, table: impl AsRef<Path>, kind: LeagueKind) -> Result<usize> {
    let table = table.as_ref();
    let fields = kind.league_fields();
    let mut leagues = read_league_table(table, fields)?;
    if !leagues.is_empty() {
        info!("Read {} existing leagues from {}", leagues.len(), table.display());
    }

    let lines: Vec<LeagueLine> = read_jsonl(pages.as_ref())
        .with_context(|| format!("Failed to read {}", pages.as_ref().display()))?;

    for LeagueLine { league } in lines {
        let id = league.get("id").and_then(Value::as_i64).context("League without an id")?;
        let created = league.get("created").and_then(Value::as_str).unwrap_or_default();
        let row = LeagueRow {
            created: parse_created(created, id)?,
            cells: fields.iter().map(|field| cell(league.get(*field))).collect(),
        };

        let newer = leagues.get(&id).map_or(true, |existing| row.created > existing.created);
        if newer {
            if leagues.insert(id, row).is_some() {
                info!("Updated league {} with latest data", id);
            } else {
                info!("Adding league {}", id);
            }
        }
    }

    let mut writer = csv::Writer::from_path(table)
        .with_context(|| format!("Failed to create {}", table.display()))?;
    writer.write_record(fields)?;
    for row in leagues.values() {
        writer.write_record(&row.cells)?;
    }
    writer.flush()?;

    info!("Wrote {} leagues to {}", leagues.len(), table.display());
    Ok(leagues.len())
}

fn read_league_table(table: &Path, fields: &[&str]) -> Result<BTreeMap<i64, LeagueRow>> {
    let mut leagues = BTreeMap::new();
    if !table.exists() {
        return Ok(leagues);
    }

    let mut reader = csv::Reader::from_path(table)
        .with_context(|| format!("Failed to open {}", table.display()))?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let id_column = column("id").context("League table has no id column")?;
    let created_column = column("created").context("League table has no created column")?;
    let columns: Vec<Option<usize>> = fields.iter().map(|field| column(*field)).collect();

    for record in reader.records() {
        let record = record?;
        let id: i64 = record
            .get(id_column)
            .unwrap_or_default()
            .parse()
            .with_context(|| format!("Invalid league id in {}", table.display()))?;
        let created = parse_created(record.get(created_column).unwrap_or_default(), id)?;
        let cells = columns
            .iter()
            .map(|c| c.and_then(|i| record.get(i)).unwrap_or_default().to_string())
            .collect();
        leagues.insert(id, LeagueRow { created, cells });
    }

    Ok(leagues)
}

fn open_csv_for_append(path: &Path, header: &[&str]) -> Result<csv::Writer<File>> {
    let is_new = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut writer = csv::Writer::from_writer(file);
    if is_new {
        writer.write_record(header)?;
    }
    Ok(writer)
}

/// Append every standings row of the given pages, stamped with the request time
pub fn append_standings(path: impl AsRef<Path>, pages: &[LeaguePage], timestamp: &str) -> Result<usize> {
    let path = path.as_ref();
    let mut writer = open_csv_for_append(path, STANDINGS_FIELDS)?;
    let mut written = 0;

    for page in pages {
        let league_id = page.league.get("id").cloned().unwrap_or(Value::Null);
        for result in &page.standings.results {
            let row = STANDINGS_FIELDS.iter().map(|field| match *field {
                "timestamp_requested" => timestamp.to_string(),
                "league_id" => cell(Some(&league_id)),
                _ => cell(result.get(*field)),
            });
            writer.write_record(row)?;
            written += 1;
        }
    }

    writer.flush()?;
    info!("Wrote {} standings rows to {}", written, path.display());
    Ok(written)
}

fn read_match_keys(path: &Path) -> Result<HashSet<[String; 4]>> {
    let mut keys = HashSet::new();
    if !path.exists() {
        return Ok(keys);
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let headers = reader.headers()?.clone();
    let columns: Vec<Option<usize>> = MATCH_KEY_FIELDS
        .iter()
        .map(|field| headers.iter().position(|h| h == *field))
        .collect();

    for record in reader.records() {
        let record = record?;
        let key: [String; 4] = std::array::from_fn(|i| {
            columns[i].and_then(|c| record.get(c)).unwrap_or_default().to_string()
        });
        keys.insert(key);
    }

    Ok(keys)
}

/// Append matches not already in the file
///
/// A match is identified by league, event and both entries.
pub fn append_matches(path: impl AsRef<Path>, pages: &[Value], timestamp: &str) -> Result<usize> {
    let path = path.as_ref();
    let mut seen = read_match_keys(path)?;
    let mut writer = open_csv_for_append(path, MATCH_FIELDS)?;
    let mut written = 0;

    let matches = pages
        .iter()
        .filter_map(|page| page.get("results").and_then(Value::as_array))
        .flatten()
        .filter_map(Value::as_object);

    for fixture in matches {
        let key = MATCH_KEY_FIELDS.map(|field| cell(fixture.get(field)));
        if !seen.insert(key) {
            continue;
        }

        let row = MATCH_FIELDS.iter().map(|field| match *field {
            "timestamp_requested" => timestamp.to_string(),
            _ => cell(fixture.get(*field)),
        });
        writer.write_record(row)?;
        written += 1;
    }

    writer.flush()?;
    info!("Wrote {} new matches to {}", written, path.display());
    Ok(written)
}
