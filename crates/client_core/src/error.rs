use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single item store call. None of these are retried.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("item store unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{reason}")]
    Rejected { status: StatusCode, reason: String },
    #[error("item store returned {status} without an error reason")]
    MalformedError { status: StatusCode },
    #[error("unexpected item store payload: {0}")]
    Decode(String),
    #[error("item store did not acknowledge the request")]
    Unacknowledged,
}

impl StoreError {
    pub fn rejected(status: StatusCode, reason: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            reason: reason.into(),
        }
    }

    /// Text shown to the user for this failure.
    pub fn reason(&self) -> String {
        match self {
            Self::Rejected { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Rejected { status, .. } | Self::MalformedError { status } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::Decode(_) | Self::Unacknowledged => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid server url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("server url '{0}' cannot be used as a base url")]
    NotABaseUrl(String),
    #[error("invalid port '{0}'")]
    InvalidPort(String),
    #[error("invalid request timeout '{0}'")]
    InvalidTimeout(String),
    #[error("invalid list fallback '{0}' (expected 'propagate' or 'placeholder')")]
    InvalidListFallback(String),
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
