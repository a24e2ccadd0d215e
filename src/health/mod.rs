// src/health/mod.rs
mod error;
mod source;
mod status;

pub use error::{FailureKind, PollError};
pub use source::{HealthSource, HttpHealthSource};
pub use status::{HealthResponse, HealthStatus};
