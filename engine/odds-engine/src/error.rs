//! Error types for the odds engine

use thiserror::Error;

/// Result type alias for odds engine operations
pub type Result<T> = std::result::Result<T, OddsError>;

/// Errors that can occur while computing features, percentiles or odds
#[derive(Error, Debug)]
pub enum OddsError {
    /// Season name does not end in a two-digit year
    #[error("Invalid season name '{0}': expected a two-digit year suffix")]
    InvalidSeasonName(String),

    /// Scoring profile is incomplete or inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Too few entries for the softmax to produce meaningful odds
    #[error("Population of {size} entries is below the minimum of {min} required to compute odds")]
    PopulationTooSmall { size: usize, min: usize },

    /// Probability of 0 or 1 makes the odds ratio undefined
    #[error("Degenerate probability {probability} for entry {entry_id}")]
    DegenerateProbability { entry_id: i64, probability: f64 },

    /// Distance or odds evaluated to NaN or infinity
    #[error("Non-finite {quantity} ({value}) for entry {entry_id}")]
    NonFinite { entry_id: i64, quantity: &'static str, value: f64 },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON line
    #[error("JSON error on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl OddsError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
