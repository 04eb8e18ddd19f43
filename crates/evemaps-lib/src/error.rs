use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the EVE Maps library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The backing dataset is missing or could not be parsed. Every
    /// operation that depends on it fails with this until the dataset is
    /// restored.
    #[error("universe dataset unavailable at {path}: {detail}")]
    DataUnavailable { path: PathBuf, detail: String },

    /// Raised when a system name could not be found in the dataset.
    #[error("unknown system name: {name}{}", format_suggestions(.suggestions))]
    UnknownSystem {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when a route computation exceeded its wall-clock deadline.
    #[error("route computation exceeded the {seconds}s deadline")]
    Timeout { seconds: u64 },

    /// Raised when a dispatched route computation failed internally.
    #[error("route computation failed: {0}")]
    Computation(String),

    /// Raised when admission control rejects a request.
    #[error("rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Wrapper for HTTP client errors from overlay providers.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
