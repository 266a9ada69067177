//! # Command Line Interface
//!
//! One subcommand per pipeline job.

use crate::config::ServiceConfig;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fpl_fetcher::{jobs, DataDir, FplFetcher, JobReport, LeagueKind};
use odds_engine::OddsEngine;
use std::path::PathBuf;
use tracing::info;

/// Fantasy league data fetcher and odds calculator
#[derive(Parser, Debug)]
#[command(name = "suze", version)]
#[command(about = "Fetch Fantasy Premier League data and compute odds of winning")]
pub struct Cli {
    /// Configuration file (defaults to ./suze.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Fetch a classic league and update leagues.csv
    ClassicLeague {
        /// League id
        league_id: i64,
    },
    /// Fetch a head-to-head league, its league table and standings
    H2hLeague {
        /// League id
        league_id: i64,
    },
    /// Fetch a head-to-head league's matches
    H2hMatches {
        /// League id
        league_id: i64,
    },
    /// Extract players from the stored classic league pages
    Players,
    /// Fetch every player's season history
    PlayerHistory,
    /// Fetch every player's transfers
    TransferHistory,
    /// Fetch every player's picks for a gameweek
    PicksHistory {
        /// Gameweek number
        gameweek: u32,
    },
    /// Compute features and percentiles from the stored histories
    Features,
    /// Compute odds from the stored features
    Odds,
    /// Compute features, then odds
    Pipeline,
    /// Print the effective configuration as TOML
    ShowConfig,
}

impl Cli {
    /// Apply command line overrides to a loaded configuration
    pub fn apply_overrides(&self, config: &mut ServiceConfig) {
        if let Some(data_dir) = &self.data_dir {
            config.service.data_dir = data_dir.clone();
        }
    }
}

/// CLI handler
pub struct CliHandler {
    config: ServiceConfig,
    data: DataDir,
}

impl CliHandler {
    /// Create new CLI handler
    pub fn new(config: ServiceConfig) -> Self {
        let data = DataDir::new(config.service.data_dir.clone());
        Self { config, data }
    }

    fn fetcher(&self) -> Result<FplFetcher> {
        FplFetcher::new(self.config.fetcher.clone()).context("Failed to create API client")
    }

    fn engine(&self) -> Result<OddsEngine> {
        OddsEngine::new(self.config.scoring.clone()).context("Invalid scoring profile")
    }

    /// Handle CLI commands
    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        info!("Running {:?} with data directory {}", command, self.data.root().display());

        let report = match command {
            Commands::ClassicLeague { league_id } => {
                jobs::league(&self.fetcher()?, &self.data, league_id, LeagueKind::Classic).await?
            }
            Commands::H2hLeague { league_id } => {
                jobs::league(&self.fetcher()?, &self.data, league_id, LeagueKind::H2h).await?
            }
            Commands::H2hMatches { league_id } => {
                jobs::h2h_matches(&self.fetcher()?, &self.data, league_id).await?
            }
            Commands::Players => jobs::players(&self.data)?,
            Commands::PlayerHistory => jobs::player_history(&self.fetcher()?, &self.data).await?,
            Commands::TransferHistory => jobs::transfer_history(&self.fetcher()?, &self.data).await?,
            Commands::PicksHistory { gameweek } => {
                jobs::picks_history(&self.fetcher()?, &self.data, gameweek).await?
            }
            Commands::Features => jobs::features(&self.engine()?, &self.data)?,
            Commands::Odds => jobs::odds(&self.engine()?, &self.data)?,
            Commands::Pipeline => {
                let engine = self.engine()?;
                jobs::features(&engine, &self.data)?;
                jobs::odds(&engine, &self.data)?
            }
            Commands::ShowConfig => {
                let rendered = toml::to_string_pretty(&self.config)
                    .context("Failed to render configuration")?;
                println!("{rendered}");
                return Ok(());
            }
        };

        self.print_report(&report);
        Ok(())
    }

    fn print_report(&self, report: &JobReport) {
        println!("✅ Done: {report}");
    }
}
