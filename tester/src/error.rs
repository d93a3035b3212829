//! Tester-specific error types

use shared::SharedError;
use std::time::Duration;
use supervisor::SupervisorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TesterError {
    #[error("Unknown test scenario: '{name}'. Available: {available}")]
    UnknownScenario { name: String, available: String },

    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("{url} not ready within {timeout:?}")]
    NotReady { url: String, timeout: Duration },

    #[error("Scenario timed out after {0:?}")]
    Timeout(Duration),

    #[error("{failed} of {total} group(s) failed")]
    GroupsFailed { failed: usize, total: usize },

    #[error("Supervisor error: {0}")]
    Supervisor(#[from] SupervisorError),

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type TesterResult<T> = Result<T, TesterError>;
