use crate::models::LeaguePage;
use odds_engine::PlayerProfile;
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

/// Player profiles on a standings page
///
/// New entries come first and carry names; standings rows follow with only an
/// entry name. The first occurrence of an entry wins.
pub fn extract_players(page: &LeaguePage) -> Vec<PlayerProfile> {
    let mut seen = HashSet::new();
    let mut players = Vec::new();

    for entry in &page.new_entries.results {
        if seen.insert(entry.entry) {
            players.push(PlayerProfile {
                entry_id: entry.entry,
                entry_name: entry.entry_name.clone(),
                joined_time: entry.joined_time.clone(),
                player_first_name: entry.player_first_name.clone(),
                player_last_name: entry.player_last_name.clone(),
            });
        }
    }

    for row in &page.standings.results {
        let Some(entry_id) = row.get("entry").and_then(Value::as_i64) else {
            warn!("Skipping standings row without an entry id: {:?}", row.get("id"));
            continue;
        };
        if seen.insert(entry_id) {
            players.push(PlayerProfile {
                entry_id,
                entry_name: row.get("entry_name").and_then(Value::as_str).map(str::to_string),
                ..Default::default()
            });
        }
    }

    players
}
