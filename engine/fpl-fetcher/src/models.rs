use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A JSON object as returned by the API
pub type JsonObject = Map<String, Value>;

/// Classic or head-to-head league
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeagueKind {
    Classic,
    H2h,
}

impl LeagueKind {
    /// Path segment of the standings endpoint
    pub fn path(self) -> &'static str {
        match self {
            LeagueKind::Classic => "leagues-classic",
            LeagueKind::H2h => "leagues-h2h",
        }
    }

    /// Columns of the league summary CSV
    pub fn league_fields(self) -> &'static [&'static str] {
        match self {
            LeagueKind::Classic => &LEAGUE_FIELDS[..LEAGUE_FIELDS.len() - 1],
            LeagueKind::H2h => LEAGUE_FIELDS,
        }
    }
}

impl fmt::Display for LeagueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// League columns; head-to-head leagues add `ko_rounds`
const LEAGUE_FIELDS: &[&str] = &[
    "id",
    "name",
    "created",
    "closed",
    "max_entries",
    "league_type",
    "scoring",
    "admin_entry",
    "start_event",
    "code_privacy",
    "has_cup",
    "cup_league",
    "rank",
    "ko_rounds",
];

/// Columns of `standings_h2h.csv`
pub const STANDINGS_FIELDS: &[&str] = &[
    "id",
    "division",
    "entry",
    "player_name",
    "rank",
    "last_rank",
    "rank_sort",
    "total",
    "entry_name",
    "matches_played",
    "matches_won",
    "matches_drawn",
    "matches_lost",
    "points_for",
    "timestamp_requested",
    "league_id",
];

/// Columns of `matches_h2h.csv`
pub const MATCH_FIELDS: &[&str] = &[
    "id",
    "entry_1_entry",
    "entry_1_name",
    "entry_1_player_name",
    "entry_1_points",
    "entry_1_win",
    "entry_1_draw",
    "entry_1_loss",
    "entry_1_total",
    "entry_2_entry",
    "entry_2_name",
    "entry_2_player_name",
    "entry_2_points",
    "entry_2_win",
    "entry_2_draw",
    "entry_2_loss",
    "entry_2_total",
    "is_knockout",
    "league",
    "winner",
    "seed_value",
    "event",
    "tiebreak",
    "is_bye",
    "knockout_name",
    "timestamp_requested",
];

/// Columns that identify an H2H match
pub const MATCH_KEY_FIELDS: [&str; 4] = ["league", "event", "entry_1_entry", "entry_2_entry"];

/// One page of a paginated list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paged<T> {
    #[serde(default)]
    pub has_next: bool,

    #[serde(default)]
    pub page: u32,

    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Entry that joined the league since the last standings update
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewEntry {
    pub entry: i64,

    #[serde(default)]
    pub entry_name: Option<String>,

    #[serde(default)]
    pub joined_time: Option<String>,

    #[serde(default)]
    pub player_first_name: Option<String>,

    #[serde(default)]
    pub player_last_name: Option<String>,
}

/// Typed view of one standings response
///
/// The raw response is what gets persisted; this view is only used to follow
/// pagination and to pull entries out.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeaguePage {
    pub league: JsonObject,

    #[serde(default)]
    pub new_entries: Paged<NewEntry>,

    #[serde(default)]
    pub standings: Paged<JsonObject>,
}

impl LeaguePage {
    /// Parse the typed view of a raw page
    pub fn from_value(value: &Value) -> serde_json::Result<Self> {
        Self::deserialize(value)
    }

    /// League id of the page
    pub fn league_id(&self) -> Option<i64> {
        self.league.get("id").and_then(Value::as_i64)
    }
}

/// A player's transfers, keyed by entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferHistory {
    pub entry_id: i64,
    pub transfers: Value,
}

/// Render a JSON value as a CSV cell
///
/// Strings are written without quotes, null as an empty cell, and everything
/// else in its JSON form.
pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
