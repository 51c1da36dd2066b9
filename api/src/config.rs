//! Server configuration loaded from environment variables.
//!
//! Both binaries call `dotenvy::dotenv()` first, so a `.env` file in the
//! working directory is honoured.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::DEFAULT_CAPTION_DELAY_MS;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Video/caption backend configuration.
///
/// | Env Var            | Default                  |
/// |--------------------|--------------------------|
/// | `HOST`             | `0.0.0.0`                |
/// | `PORT`             | `3001`                   |
/// | `UPLOAD_DIR`       | `./uploads`              |
/// | `PUBLIC_BASE_URL`  | `http://localhost:{port}`|
/// | `CAPTION_DELAY_MS` | `2000`                   |
/// | `CORS_ORIGINS`     | empty (any origin)       |
#[derive(Debug, Clone)]
pub struct VideoServerConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    /// Prefix for the `url` of stored videos
    pub public_base_url: String,
    /// Artificial processing delay before captions are returned
    pub caption_delay: Duration,
    pub cors_origins: Vec<String>,
}

impl VideoServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_var(&lookup, "PORT", 3001)?;
        let upload_dir = lookup("UPLOAD_DIR").unwrap_or_else(|| "./uploads".into());
        let public_base_url = lookup("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();
        let delay_ms: u64 = parse_var(&lookup, "CAPTION_DELAY_MS", DEFAULT_CAPTION_DELAY_MS)?;

        Ok(Self {
            host,
            port,
            upload_dir: PathBuf::from(upload_dir),
            public_base_url,
            caption_delay: Duration::from_millis(delay_ms),
            cors_origins: split_list(lookup("CORS_ORIGINS").as_deref().unwrap_or_default()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// LLM proxy configuration. Without `OPENAI_API_KEY` every endpoint answers
/// with fallbacks.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub host: String,
    pub port: u16,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub cors_origin: String,
}

impl AssistantConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("ASSISTANT_PORT") {
            Some(_) => parse_var(&lookup, "ASSISTANT_PORT", 3002)?,
            None => parse_var(&lookup, "PORT", 3002)?,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            api_key: lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            model: lookup("OPENAI_MODEL").unwrap_or_else(|| "gpt-3.5-turbo".into()),
            base_url: lookup("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".into()),
            cors_origin: lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".into()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Creator memory backend configuration.
///
/// | Env Var        | Default            |
/// |----------------|--------------------|
/// | `HOST`         | `0.0.0.0`          |
/// | `MEMORY_PORT`  | `7002`             |
/// | `CORS_ORIGINS` | empty (any origin) |
#[derive(Debug, Clone)]
pub struct MemoryServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl MemoryServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_var(&lookup, "MEMORY_PORT", 7002)?,
            cors_origins: split_list(lookup("CORS_ORIGINS").as_deref().unwrap_or_default()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn video_defaults() {
        let config = VideoServerConfig::from_lookup(env(&[])).expect("defaults");
        assert_eq!(config.port, 3001);
        assert_eq!(config.bind_addr(), "0.0.0.0:3001");
        assert_eq!(config.public_base_url, "http://localhost:3001");
        assert_eq!(config.caption_delay, Duration::from_millis(2000));
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn video_overrides() {
        let config = VideoServerConfig::from_lookup(env(&[
            ("PORT", "4000"),
            ("PUBLIC_BASE_URL", "https://cdn.example.com/"),
            ("CAPTION_DELAY_MS", "0"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
        ]))
        .expect("overrides");
        assert_eq!(config.public_base_url, "https://cdn.example.com");
        assert_eq!(config.caption_delay, Duration::ZERO);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = VideoServerConfig::from_lookup(env(&[("PORT", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));
    }

    #[test]
    fn assistant_port_prefers_its_own_variable() {
        let config =
            AssistantConfig::from_lookup(env(&[("PORT", "9000"), ("ASSISTANT_PORT", "9100")]))
                .expect("config");
        assert_eq!(config.port, 9100);

        let config = AssistantConfig::from_lookup(env(&[("PORT", "9000")])).expect("config");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn memory_server_ignores_shared_port() {
        let config = MemoryServerConfig::from_lookup(env(&[("PORT", "3001")])).expect("config");
        assert_eq!(config.bind_addr(), "0.0.0.0:7002");

        let config = MemoryServerConfig::from_lookup(env(&[("MEMORY_PORT", "7100")]))
            .expect("config");
        assert_eq!(config.port, 7100);
    }

    #[test]
    fn blank_api_key_means_offline() {
        let config =
            AssistantConfig::from_lookup(env(&[("OPENAI_API_KEY", "  ")])).expect("config");
        assert!(config.api_key.is_none());
        assert_eq!(config.model, "gpt-3.5-turbo");
    }
}
