use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Value shipped in the sample `.env`; treated the same as a missing key.
pub const PLACEHOLDER_API_KEY: &str = "your_openai_api_key_here";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_ENDPOINT: &str = "OPENAI_ENDPOINT";
pub const ENV_MODEL: &str = "OPENAI_MODEL";
pub const ENV_REQUEST_TIMEOUT: &str = "OPENAI_REQUEST_TIMEOUT_SECS";

const CONFIG_FILE_PATH: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub http_proxy: String,
    pub https_proxy: String,
}

/// Whether the chat can be enabled with the loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigStatus {
    Ready(Credentials),
    MissingApiKey,
    PlaceholderApiKey,
    MissingEndpoint,
}

impl ConfigStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ConfigStatus::Ready(_))
    }
}

/// A validated API key and endpoint. Only obtainable from a ready config.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    endpoint: String,
}

impl Credentials {
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &mask_secret(&self.api_key))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_deref().map(mask_secret))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("http_proxy", &self.http_proxy)
            .field("https_proxy", &self.https_proxy)
            .finish()
    }
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Config {
    /// Load `config.toml` from the working directory, then apply environment overrides.
    pub fn load() -> Self {
        Self::from_sources(Path::new(CONFIG_FILE_PATH), |key| std::env::var(key).ok())
    }

    /// Load from an optional config file and an environment lookup.
    ///
    /// A missing file is not an error. An unreadable or malformed file is
    /// logged and ignored so the environment alone can still configure the chat.
    pub fn from_sources<F>(file: &Path, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if file.exists() {
            match Self::from_file(file) {
                Ok(config) => config,
                Err(err) => {
                    log::warn!("Ignoring config file: {}", err);
                    Config::default()
                }
            }
        } else {
            Config::default()
        };

        config.apply_env(lookup);
        config
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup(ENV_API_KEY) {
            self.api_key = Some(api_key);
        }
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.endpoint = Some(endpoint);
        }
        if let Some(model) = lookup(ENV_MODEL) {
            self.model = Some(model);
        }
        if let Some(timeout) = lookup(ENV_REQUEST_TIMEOUT) {
            match timeout.trim().parse::<u64>() {
                Ok(secs) => self.request_timeout_secs = Some(secs),
                Err(_) => log::warn!(
                    "Ignoring {}={:?}: not a whole number of seconds",
                    ENV_REQUEST_TIMEOUT,
                    timeout
                ),
            }
        }
        if let Some(http_proxy) = lookup("HTTP_PROXY") {
            self.http_proxy = http_proxy;
        }
        if let Some(https_proxy) = lookup("HTTPS_PROXY") {
            self.https_proxy = https_proxy;
        }
    }

    pub fn status(&self) -> ConfigStatus {
        let api_key = non_blank(self.api_key.as_deref());
        let endpoint = non_blank(self.endpoint.as_deref());

        match (api_key, endpoint) {
            (None, _) => ConfigStatus::MissingApiKey,
            (Some(key), _) if key == PLACEHOLDER_API_KEY => ConfigStatus::PlaceholderApiKey,
            (Some(_), None) => ConfigStatus::MissingEndpoint,
            (Some(key), Some(endpoint)) => ConfigStatus::Ready(Credentials {
                api_key: key.to_string(),
                endpoint: endpoint.to_string(),
            }),
        }
    }

    pub fn model(&self) -> &str {
        non_blank(self.model.as_deref()).unwrap_or(DEFAULT_MODEL)
    }

    /// Upper bound for a single completion request. Zero falls back to the default.
    pub fn request_timeout(&self) -> Duration {
        let secs = self
            .request_timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }
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
        move |key: &str| map.get(key).cloned()
    }

    fn missing_file() -> PathBuf {
        PathBuf::from("/nonexistent/chat-relay/config.toml")
    }

    #[test]
    fn status_ready_with_key_and_endpoint() {
        let config = Config::from_sources(
            &missing_file(),
            env(&[
                (ENV_API_KEY, "sk-test"),
                (ENV_ENDPOINT, "https://api.example.com/v1/chat/completions"),
            ]),
        );

        match config.status() {
            ConfigStatus::Ready(credentials) => {
                assert_eq!(credentials.api_key(), "sk-test");
                assert_eq!(
                    credentials.endpoint(),
                    "https://api.example.com/v1/chat/completions"
                );
            }
            other => panic!("expected ready, got {other:?}"),
        }
    }

    #[test]
    fn status_missing_values() {
        let config = Config::from_sources(&missing_file(), env(&[]));
        assert_eq!(config.status(), ConfigStatus::MissingApiKey);

        let config = Config::from_sources(&missing_file(), env(&[(ENV_API_KEY, "sk-test")]));
        assert_eq!(config.status(), ConfigStatus::MissingEndpoint);

        let config = Config::from_sources(
            &missing_file(),
            env(&[(ENV_API_KEY, "   "), (ENV_ENDPOINT, "http://x")]),
        );
        assert_eq!(config.status(), ConfigStatus::MissingApiKey);
    }

    #[test]
    fn status_placeholder_key_is_not_ready() {
        let config = Config::from_sources(
            &missing_file(),
            env(&[(ENV_API_KEY, PLACEHOLDER_API_KEY), (ENV_ENDPOINT, "http://x")]),
        );
        assert_eq!(config.status(), ConfigStatus::PlaceholderApiKey);
        assert!(!config.status().is_ready());
    }

    #[test]
    fn defaults_for_model_and_timeout() {
        let config = Config::default();
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(
            config.request_timeout(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
    }

    #[test]
    fn invalid_timeout_env_is_ignored() {
        let config = Config::from_sources(&missing_file(), env(&[(ENV_REQUEST_TIMEOUT, "soon")]));
        assert_eq!(config.request_timeout_secs, None);

        let config = Config::from_sources(&missing_file(), env(&[(ENV_REQUEST_TIMEOUT, "5")]));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn file_values_are_overridden_by_env() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
api_key = "sk-from-file"
endpoint = "http://file.example/v1/chat/completions"
model = "gpt-4o-mini"
request_timeout_secs = 15
"#,
        )
        .expect("write config");

        let config = Config::from_sources(&path, env(&[(ENV_API_KEY, "sk-from-env")]));

        assert_eq!(config.api_key.as_deref(), Some("sk-from-env"));
        assert_eq!(
            config.endpoint.as_deref(),
            Some("http://file.example/v1/chat/completions")
        );
        assert_eq!(config.model(), "gpt-4o-mini");
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn malformed_file_falls_back_to_env() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_key = [not toml").expect("write config");

        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));

        let config = Config::from_sources(&path, env(&[(ENV_ENDPOINT, "http://x")]));
        assert_eq!(config.endpoint.as_deref(), Some("http://x"));
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn debug_output_masks_api_key() {
        let config = Config {
            api_key: Some("sk-supersecret".to_string()),
            endpoint: Some("http://x".to_string()),
            ..Config::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("supersecret"));

        let ConfigStatus::Ready(credentials) = config.status() else {
            panic!("expected ready config");
        };
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("sk-s****"));
        assert!(!rendered.contains("supersecret"));
    }
}
