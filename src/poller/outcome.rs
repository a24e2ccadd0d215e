// src/poller/outcome.rs
use crate::health::{FailureKind, HealthStatus};

/// What a single poll did to the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Active,
    Inactive,
    /// The endpoint answered but the status element was not on the page.
    Skipped(HealthStatus),
    /// Nothing was written; the previous state stays visible.
    Failed(FailureKind),
}

impl PollOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            PollOutcome::Active => "active",
            PollOutcome::Inactive => "inactive",
            PollOutcome::Skipped(_) => "skipped",
            PollOutcome::Failed(FailureKind::Transport) => "transport_error",
            PollOutcome::Failed(FailureKind::Parse) => "parse_error",
        }
    }

    /// Health reported by the endpoint, if the poll got that far.
    pub fn health_status(&self) -> Option<HealthStatus> {
        match *self {
            PollOutcome::Active => Some(HealthStatus::Active),
            PollOutcome::Inactive => Some(HealthStatus::Inactive),
            PollOutcome::Skipped(status) => Some(status),
            PollOutcome::Failed(_) => None,
        }
    }
}
