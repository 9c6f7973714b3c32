//! Library error type.
//! Loaders, task sources and the fetch driver all return `TimelineError`
//! so the viewer only has one thing to turn into a status message.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {body}")]
    ApiStatus { status: u16, body: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type TimelineResult<T> = Result<T, TimelineError>;
