// src/poller/mod.rs
mod handle;
mod outcome;
mod status_poller;

pub use handle::PollerHandle;
pub use outcome::PollOutcome;
pub use status_poller::StatusPoller;

use std::time::Duration;

/// Path of the health endpoint, resolved against the host origin.
pub const HEALTH_PATH: &str = "/health";

/// Time between polls. The first poll runs immediately.
pub const POLL_INTERVAL: Duration = Duration::from_millis(30_000);

/// Identifier of the element that shows the status.
pub const STATUS_ELEMENT_ID: &str = "api-status";

pub const ACTIVE_MESSAGE: &str = "API Status: Active";
pub const INACTIVE_MESSAGE: &str = "API Status: Inactive";
