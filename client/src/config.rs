//! Client configuration from environment variables

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// | Env Var                  | Default                  |
/// |--------------------------|--------------------------|
/// | `CLIPCAP_VIDEO_API`      | `http://localhost:3001`  |
/// | `CLIPCAP_ASSISTANT_API`  | `http://localhost:3002`  |
/// | `CLIPCAP_FALLBACK_HOSTS` | `127.0.0.1,10.0.2.2`     |
/// | `CLIPCAP_MEMORY_API`     | `http://localhost:7002`  |
/// | `CLIPCAP_CREATOR_ID`     | unset (no memory sync)   |
/// | `CLIPCAP_MOCK_DELAY_MS`  | `2000`                   |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub video_api: String,
    pub assistant_api: String,
    pub memory_api: String,
    /// Approved chat suggestions are remembered for this creator when set
    pub creator_id: Option<String>,
    /// Hosts tried with the same scheme and port when the primary is down
    pub fallback_hosts: Vec<String>,
    pub mock_delay: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mock_delay_ms = match lookup("CLIPCAP_MOCK_DELAY_MS") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "CLIPCAP_MOCK_DELAY_MS",
                value,
            })?,
            None => 2000,
        };

        Ok(Self {
            video_api: lookup("CLIPCAP_VIDEO_API")
                .unwrap_or_else(|| "http://localhost:3001".into()),
            assistant_api: lookup("CLIPCAP_ASSISTANT_API")
                .unwrap_or_else(|| "http://localhost:3002".into()),
            memory_api: lookup("CLIPCAP_MEMORY_API")
                .unwrap_or_else(|| "http://localhost:7002".into()),
            creator_id: lookup("CLIPCAP_CREATOR_ID")
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
            fallback_hosts: lookup("CLIPCAP_FALLBACK_HOSTS")
                .unwrap_or_else(|| "127.0.0.1,10.0.2.2".into())
                .split(',')
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .collect(),
            mock_delay: Duration::from_millis(mock_delay_ms),
        })
    }
}
