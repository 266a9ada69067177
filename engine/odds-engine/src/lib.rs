//! Odds Engine
//!
//! Turns fantasy league entries' past-season histories into a ranked odds-of-winning
//! table. Each history is summarized into eleven features, every feature is ranked
//! across the population, and the weighted distance of each entry's percentile vector
//! to the ideal champion profile is converted into a probability and odds.

pub mod calculator;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod percentile;
pub mod summarizer;
pub mod table;

pub use calculator::OddsCalculator;
pub use config::{Direction, FeatureRule, MissingPlacement, ScoringProfile};
pub use engine::OddsEngine;
pub use error::{OddsError, Result};
pub use models::*;
pub use summarizer::SeasonSummarizer;
