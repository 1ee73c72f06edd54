//! Driver configuration

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::error::Result;
use crate::protocol::{ElementId, SessionId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// First id handed out by the session root
    pub first_session_id: SessionId,

    /// First id handed out by each session's element store
    pub first_element_id: ElementId,

    /// Sleep between find attempts while an implicit wait is running
    pub poll_interval_ms: u64,

    /// Implicit wait new sessions start with
    pub default_implicit_wait_ms: u64,

    /// Returned by `GET /session/{id}`
    pub capabilities: Value,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            first_session_id: 1,
            first_element_id: 1,
            poll_interval_ms: 100,
            default_implicit_wait_ms: 0,
            capabilities: json!({
                "browserName": "native",
                "platform": "ANY",
                "javascriptEnabled": false,
            }),
        }
    }
}

impl DriverConfig {
    /// Parse a (possibly partial) JSON document; missing fields keep defaults
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn default_implicit_wait(&self) -> Duration {
        Duration::from_millis(self.default_implicit_wait_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = DriverConfig::from_json(r#"{ "poll_interval_ms": 250 }"#).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.first_session_id, 1);
        assert_eq!(config.default_implicit_wait(), Duration::ZERO);
        assert_eq!(config.capabilities["browserName"], "native");
    }

    #[test]
    fn test_bad_config() {
        assert!(DriverConfig::from_json(r#"{ "poll_interval_ms": "fast" }"#).is_err());
    }
}
