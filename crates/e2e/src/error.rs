//! Error types for E2E verification

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Liveness probe could not be issued: {0}")]
    Probe(String),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Unknown check: {0}")]
    UnknownCheck(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;

/// Errors raised by the browser capability.
///
/// Everything except a lost session is recoverable: the page may simply not
/// have rendered yet, and the next navigation starts from a clean slate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowserError {
    #[error("WebDriver session unavailable: {0}")]
    Session(String),

    #[error("Navigation to '{url}' failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Browser command failed: {0}")]
    Command(String),

    #[error("Timed out after {timeout:?} waiting for {condition}")]
    WaitTimeout { condition: String, timeout: Duration },
}

impl BrowserError {
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, BrowserError::Session(_))
    }
}

impl From<fantoccini::error::CmdError> for BrowserError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        match err {
            fantoccini::error::CmdError::Lost(e) => BrowserError::Session(e.to_string()),
            other => BrowserError::Command(other.to_string()),
        }
    }
}

impl From<fantoccini::error::NewSessionError> for BrowserError {
    fn from(err: fantoccini::error::NewSessionError) -> Self {
        BrowserError::Session(err.to_string())
    }
}
