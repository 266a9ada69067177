//! Fantasy Premier League Fetcher
//!
//! Fetches league standings, entry histories, transfers, picks and head-to-head
//! matches from the public Fantasy Premier League API and stores them as
//! JSON-lines and CSV files under a data directory. The same directory feeds
//! the odds engine's feature and odds jobs.

pub mod config;
pub mod extract;
pub mod fetcher;
pub mod jobs;
pub mod models;
pub mod storage;

pub use config::FetcherConfig;
pub use extract::extract_players;
pub use fetcher::{FplFetcher, HttpSource, JsonSource};
pub use jobs::JobReport;
pub use models::*;
pub use storage::DataDir;
