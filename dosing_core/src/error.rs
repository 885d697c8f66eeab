//! Error types for the dosing_core library.

use chrono::NaiveDate;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dosing_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Dose count or interval rule rejected before scheduling
    #[error("Invalid protocol: {0}")]
    InvalidProtocol(String),

    /// No operating day found within the forward search window
    #[error("Scheduling impossible: no open clinic day within {window_days} days of {from}")]
    SchedulingImpossible { from: NaiveDate, window_days: u32 },

    /// Date arithmetic left chrono's representable range
    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    /// Malformed or unencodable date/time handed to the calendar encoder
    #[error("Invalid date/time: {0}")]
    InvalidDateTime(String),
}
