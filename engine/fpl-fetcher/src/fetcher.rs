use crate::config::FetcherConfig;
use crate::models::{LeagueKind, LeaguePage, TransferHistory};
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Source of JSON documents addressed by URL
#[async_trait::async_trait]
pub trait JsonSource: Send + Sync {
    /// GET a URL and parse the body as JSON
    async fn get_json(&self, url: &str) -> Result<Value>;
}

/// HTTP source backed by reqwest
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// Create a new HTTP source
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .user_agent(config.api.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl JsonSource for HttpSource {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!("API request to {} failed with status: {}", url, response.status());
        }

        response.json().await.with_context(|| format!("Failed to parse JSON from {url}"))
    }
}

/// Fantasy Premier League API client
pub struct FplFetcher<S = HttpSource> {
    config: FetcherConfig,
    source: S,
}

impl FplFetcher<HttpSource> {
    /// Create a fetcher that talks to the live API
    pub fn new(config: FetcherConfig) -> Result<Self> {
        config.validate()?;
        let source = HttpSource::new(&config)?;
        Ok(Self { config, source })
    }
}

impl<S: JsonSource> FplFetcher<S> {
    /// Create a fetcher over any JSON source
    pub fn with_source(config: FetcherConfig, source: S) -> Self {
        Self { config, source }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api.base_url, path)
    }

    /// Fetch every standings page of a league
    ///
    /// New-entry pages are walked first; once they run out the standings page
    /// advances. Stops when neither list has a next page.
    pub async fn fetch_league_pages(&self, league_id: i64, kind: LeagueKind) -> Result<Vec<Value>> {
        let mut page_standings = 1u32;
        let mut page_new_entries = 1u32;
        let mut pages = Vec::new();

        loop {
            let url = self.url(&format!(
                "{}/{}/standings/?page_standings={}&page_new_entries={}",
                kind.path(),
                league_id,
                page_standings,
                page_new_entries
            ));
            info!("Fetching {} standings from: {}", kind, url);

            let raw = self.source.get_json(&url).await?;
            let page = LeaguePage::from_value(&raw)
                .with_context(|| format!("Unexpected standings page from {url}"))?;
            pages.push(raw);

            if page.new_entries.has_next {
                page_new_entries += 1;
            } else if page.standings.has_next {
                page_standings += 1;
            } else {
                break;
            }
        }

        info!("Fetched {} pages for league {}", pages.len(), league_id);
        Ok(pages)
    }

    /// Fetch every page of a head-to-head league's matches
    pub async fn fetch_h2h_matches(&self, league_id: i64) -> Result<Vec<Value>> {
        let mut page = 1u32;
        let mut pages = Vec::new();

        loop {
            let url = self.url(&format!("leagues-h2h-matches/league/{league_id}/?page={page}"));
            info!("Fetching H2H matches from: {}", url);

            let raw = self.source.get_json(&url).await?;
            let has_next = raw.get("has_next").and_then(Value::as_bool).unwrap_or(false);
            pages.push(raw);

            if !has_next {
                break;
            }
            page += 1;
        }

        info!("Fetched {} match pages for league {}", pages.len(), league_id);
        Ok(pages)
    }

    /// Fetch an entry's season history, annotated with `entry_id`
    pub async fn fetch_entry_history(&self, entry_id: i64) -> Result<Value> {
        let url = self.url(&format!("entry/{entry_id}/history/"));
        debug!("Fetching history for entry {} from: {}", entry_id, url);

        let mut history = self.source.get_json(&url).await?;
        annotate(&mut history, &[("entry_id", Value::from(entry_id))])
            .with_context(|| format!("History for entry {entry_id} is not a JSON object"))?;
        Ok(history)
    }

    /// Fetch an entry's transfers
    pub async fn fetch_transfers(&self, entry_id: i64) -> Result<TransferHistory> {
        let url = self.url(&format!("entry/{entry_id}/transfers/"));
        debug!("Fetching transfers for entry {} from: {}", entry_id, url);

        let transfers = self.source.get_json(&url).await?;
        Ok(TransferHistory { entry_id, transfers })
    }

    /// Fetch an entry's picks for a gameweek, annotated with `entry_id` and `event`
    pub async fn fetch_picks(&self, gameweek: u32, entry_id: i64) -> Result<Value> {
        let url = self.url(&format!("entry/{entry_id}/event/{gameweek}/picks/"));
        debug!("Fetching gameweek {} picks for entry {} from: {}", gameweek, entry_id, url);

        let mut picks = self.source.get_json(&url).await?;
        annotate(
            &mut picks,
            &[("entry_id", Value::from(entry_id)), ("event", Value::from(gameweek))],
        )
        .with_context(|| format!("Picks for entry {entry_id} are not a JSON object"))?;
        Ok(picks)
    }
}

fn annotate(value: &mut Value, fields: &[(&str, Value)]) -> Result<()> {
    let object = value.as_object_mut().context("expected a JSON object")?;
    for (key, field) in fields {
        object.insert((*key).to_string(), field.clone());
    }
    Ok(())
}

/// In-memory JSON source for tests
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemorySource {
        documents: HashMap<String, Value>,
        requested: Mutex<Vec<String>>,
    }

    impl InMemorySource {
        pub fn with(mut self, url: &str, document: Value) -> Self {
            self.documents.insert(url.to_string(), document);
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl JsonSource for InMemorySource {
        async fn get_json(&self, url: &str) -> Result<Value> {
            self.requested.lock().unwrap().push(url.to_string());
            self.documents
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("API request to {} failed with status: 404 Not Found", url))
        }
    }

    pub const BASE: &str = "https://fantasy.premierleague.com/api";

    pub fn fetcher(source: InMemorySource) -> FplFetcher<InMemorySource> {
        FplFetcher::with_source(FetcherConfig::default(), source)
    }
}
