// src/health/error.rs
use reqwest::StatusCode;

/// Coarse failure classes; both are handled the same way by the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Parse,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::Parse => "parse",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("health endpoint returned HTTP {0}")]
    HttpStatus(StatusCode),

    #[error("malformed health response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("health response body was JSON null")]
    NullBody,
}

impl PollError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PollError::Transport(_) | PollError::HttpStatus(_) => FailureKind::Transport,
            PollError::Parse(_) | PollError::NullBody => FailureKind::Parse,
        }
    }
}
