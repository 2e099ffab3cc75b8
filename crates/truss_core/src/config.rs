use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_MODEL: &str = "qwen2:0.5b-instruct";
pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_BACKOFF_BASE_SECS: u64 = 10;
/// Where the default local service exposes its chat-completion route.
pub const CHAT_COMPAT_PATH: &str = "/v1";

/// Per-call deadline bounds. Generation services are slow but callers must not hang.
pub const MIN_TIMEOUT_SECS: u64 = 60;
pub const MAX_TIMEOUT_SECS: u64 = 120;

const CONFIG_FILE_PATH: &str = "truss.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Generation back-end shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// One-shot generate call with JSON output enforced by the service.
    #[default]
    Generate,
    /// Plain chat completion with no structural guarantee.
    Chat,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generate" | "ollama" => Ok(BackendKind::Generate),
            "chat" | "openai" => Ok(BackendKind::Chat),
            other => Err(ConfigError::InvalidValue {
                key: "backend".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendKind,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Total attempts for the chat backend.
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub backoff_base_secs: u64,
}

/// Truss config directory (~/.truss)
pub fn truss_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(".truss")
}

/// ~/.truss/config.json
pub fn config_json_path() -> PathBuf {
    truss_dir().join("config.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Generate,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            max_retries: DEFAULT_MAX_RETRIES,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            backoff_base_secs: DEFAULT_BACKOFF_BASE_SECS,
        }
    }
}

impl Config {
    /// Load from `~/.truss/config.json`, else `./truss.toml`, else defaults; then apply
    /// environment overrides. Unreadable files are logged and skipped.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let candidates = [config_json_path(), PathBuf::from(CONFIG_FILE_PATH)];
        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::from_file(path) {
                Ok(file_config) => {
                    log::debug!("Loaded config from {}", path.display());
                    config = file_config;
                    break;
                }
                Err(e) => log::warn!("{}", e),
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a JSON or TOML config file, chosen by extension (TOML unless `.json`).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let parsed = if is_json {
            serde_json::from_str::<Config>(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str::<Config>(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Apply `TRUSS_*` (and the `OLLAMA_HOST` / `OLLAMA_MODEL` aliases) overrides.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("TRUSS_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(base_url) = lookup("TRUSS_BASE_URL").or_else(|| lookup("OLLAMA_HOST")) {
            self.base_url = base_url;
        }
        if let Some(model) = lookup("TRUSS_MODEL").or_else(|| lookup("OLLAMA_MODEL")) {
            self.model = model;
        }
        if let Some(api_key) = lookup("TRUSS_API_KEY") {
            self.api_key = Some(api_key).filter(|k| !k.is_empty());
        }
        if let Some(value) = lookup("TRUSS_MAX_RETRIES") {
            self.max_retries = parse_number("TRUSS_MAX_RETRIES", &value)?;
        }
        if let Some(value) = lookup("TRUSS_TIMEOUT_SECS") {
            self.timeout_secs = parse_number("TRUSS_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("TRUSS_BACKOFF_BASE_SECS") {
            self.backoff_base_secs = parse_number("TRUSS_BACKOFF_BASE_SECS", &value)?;
        }
        Ok(())
    }

    /// Base address for the configured backend. The chat backend pointed at the default local
    /// service goes through its `/v1` chat-completion route.
    pub fn backend_base_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.backend == BackendKind::Chat && base == DEFAULT_BASE_URL {
            format!("{}{}", base, CHAT_COMPAT_PATH)
        } else {
            base.to_string()
        }
    }

    /// Per-call deadline, clamped into the supported window.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS))
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_secs(self.backoff_base_secs)
    }

    /// At least one attempt is always made.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
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
    fn defaults_point_at_local_generate_service() {
        let config = Config::default();
        assert_eq!(config.backend, BackendKind::Generate);
        assert_eq!(config.base_url, "http://127.0.0.1:11434");
        assert_eq!(config.max_attempts(), 5);
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
        assert_eq!(config.backoff_base(), Duration::from_secs(10));
    }

    #[test]
    fn chat_backend_on_default_service_uses_compat_route() {
        let config = Config {
            backend: BackendKind::Chat,
            ..Config::default()
        };
        assert_eq!(config.backend_base_url(), "http://127.0.0.1:11434/v1");

        let config = Config {
            backend: BackendKind::Chat,
            base_url: "https://api.openai.com/v1/".to_string(),
            ..Config::default()
        };
        assert_eq!(config.backend_base_url(), "https://api.openai.com/v1");

        assert_eq!(Config::default().backend_base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn env_overrides_win() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[
                ("TRUSS_BACKEND", "chat"),
                ("OLLAMA_HOST", "http://gpu-box:11434"),
                ("TRUSS_MODEL", "llama3"),
                ("OLLAMA_MODEL", "ignored"),
                ("TRUSS_API_KEY", "sk-test"),
                ("TRUSS_MAX_RETRIES", "3"),
            ]))
            .unwrap();

        assert_eq!(config.backend, BackendKind::Chat);
        assert_eq!(config.base_url, "http://gpu-box:11434");
        assert_eq!(config.model, "llama3");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn invalid_env_values_are_errors() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(env(&[("TRUSS_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "TRUSS_TIMEOUT_SECS"));

        let err = config
            .apply_env_overrides(env(&[("TRUSS_BACKEND", "telepathy")]))
            .unwrap_err();
        assert!(err.to_string().contains("telepathy"));
    }

    #[test]
    fn timeout_is_clamped() {
        let mut config = Config::default();
        config.timeout_secs = 5;
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        config.timeout_secs = 3600;
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn zero_retries_still_attempts_once() {
        let config = Config {
            max_retries: 0,
            ..Config::default()
        };
        assert_eq!(config.max_attempts(), 1);
    }
}
