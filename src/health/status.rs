// src/health/status.rs
use super::PollError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body returned by the health endpoint.
///
/// `status` is `None` when the body has no string `status` field; that
/// still counts as a reported (negative) status, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl HealthResponse {
    pub const HEALTHY: &'static str = "healthy";

    pub fn healthy() -> Self {
        Self::reporting(Self::HEALTHY)
    }

    pub fn reporting(status: &str) -> Self {
        Self {
            status: Some(status.to_string()),
        }
    }

    /// Parses a raw body. Only non-JSON bodies and a bare `null` fail.
    pub fn from_json(body: &[u8]) -> Result<Self, PollError> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, PollError> {
        if value.is_null() {
            return Err(PollError::NullBody);
        }

        Ok(Self {
            status: value
                .get("status")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    pub fn health_status(&self) -> HealthStatus {
        match self.status.as_deref() {
            Some(status) => HealthStatus::from_reported(status),
            None => HealthStatus::Inactive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Active,
    Inactive,
}

impl HealthStatus {
    /// Only the exact string `healthy` counts; case and whitespace matter.
    pub fn from_reported(status: &str) -> Self {
        if status == HealthResponse::HEALTHY {
            HealthStatus::Active
        } else {
            HealthStatus::Inactive
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, HealthStatus::Active)
    }
}
