use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::error::{OpenCloudError, Result};
use crate::util::expand_tilde;

pub const DEFAULT_BASE_URL: &str = "https://apis.roblox.com";

pub const ENV_API_KEY: &str = "ROBLOX_OPEN_CLOUD_API_KEY";
pub const ENV_UNIVERSE_ID: &str = "ROBLOX_UNIVERSE_ID";
pub const ENV_HASH_CONTENT: &str = "ROBLOX_OPEN_CLOUD_HASH_CONTENT";
pub const ENV_BASE_URL: &str = "ROBLOX_OPEN_CLOUD_BASE_URL";

fn default_hash_content() -> bool {
    true
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Everything the client needs to talk to Open Cloud.
///
/// Serialized as camelCase JSON, so a config file looks like:
///
/// ```json
/// { "apiKey": "...", "universeId": "1234", "hashContent": true }
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// API key from the Creator Dashboard credentials page.
    pub api_key: String,
    /// Identifier of the experience the key operates on.
    pub universe_id: String,
    /// Send a `content-md5` header with every entry write.
    #[serde(default = "default_hash_content")]
    pub hash_content: bool,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, universe_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            universe_id: universe_id.into(),
            hash_content: default_hash_content(),
            base_url: default_base_url(),
        }
    }

    pub fn with_hash_content(mut self, hash_content: bool) -> Self {
        self.hash_content = hash_content;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Reads the configuration from `ROBLOX_OPEN_CLOUD_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY)
            .ok_or_else(|| OpenCloudError::Config(format!("{ENV_API_KEY} is not set")))?;
        let universe_id = lookup(ENV_UNIVERSE_ID)
            .ok_or_else(|| OpenCloudError::Config(format!("{ENV_UNIVERSE_ID} is not set")))?;

        let mut config = Self::new(api_key, universe_id);
        if let Some(raw) = lookup(ENV_HASH_CONTENT) {
            config.hash_content = parse_bool(&raw).ok_or_else(|| {
                OpenCloudError::Config(format!("{ENV_HASH_CONTENT} must be true or false, got {raw:?}"))
            })?;
        }
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON config file. A leading `~` is expanded.
    pub fn load(path: &str) -> Result<Self> {
        let path = expand_tilde(path);
        let content = std::fs::read_to_string(&path)?;
        let config: ClientConfig = serde_json::from_str(&content)
            .map_err(|e| OpenCloudError::Config(format!("{path}: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// `~/.rbx-open-cloud/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| config_path_in(&home))
    }

    /// Loads the config file at [`default_path`](Self::default_path).
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path()
            .ok_or_else(|| OpenCloudError::Config("could not determine the home directory".into()))?;
        Self::load(&path.to_string_lossy())
    }

    /// Checks the values the transport depends on.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(OpenCloudError::Config("API key is empty".into()));
        }
        if HeaderValue::from_str(&self.api_key).is_err() {
            return Err(OpenCloudError::Config(
                "API key contains characters that are not allowed in a header".into(),
            ));
        }
        if self.universe_id.trim().is_empty() {
            return Err(OpenCloudError::Config("universe id is empty".into()));
        }
        if self.universe_id.contains('/') {
            return Err(OpenCloudError::Config(format!(
                "universe id {:?} must not contain '/'",
                self.universe_id
            )));
        }
        match reqwest::Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
            _ => Err(OpenCloudError::Config(format!(
                "base URL {:?} is not an http(s) URL",
                self.base_url
            ))),
        }
    }
}

// The API key stays out of logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("universe_id", &self.universe_id)
            .field("hash_content", &self.hash_content)
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn config_path_in(home: &Path) -> PathBuf {
    home.join(".rbx-open-cloud").join("config.json")
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("key", "123");
        assert!(config.hash_content);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ClientConfig::new("super-secret-key", "123");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("123"));
    }

    #[test]
    fn test_validate_rejects_empty_values() {
        assert!(ClientConfig::new("", "123").validate().is_err());
        assert!(ClientConfig::new("key", " ").validate().is_err());
        assert!(ClientConfig::new("key", "1/2").validate().is_err());
        assert!(ClientConfig::new("bad\nkey", "123").validate().is_err());
        assert!(ClientConfig::new("key", "123")
            .with_base_url("ftp://example.com")
            .validate()
            .is_err());
    }

    #[test]
    fn test_from_lookup() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_API_KEY, "key"),
            (ENV_UNIVERSE_ID, "42"),
            (ENV_HASH_CONTENT, "false"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "key");
        assert_eq!(config.universe_id, "42");
        assert!(!config.hash_content);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_from_lookup_missing_key() {
        let err = ClientConfig::from_lookup(lookup_from(&[(ENV_UNIVERSE_ID, "42")])).unwrap_err();
        assert!(matches!(err, OpenCloudError::Config(msg) if msg.contains(ENV_API_KEY)));
    }

    #[test]
    fn test_from_lookup_bad_bool() {
        let result = ClientConfig::from_lookup(lookup_from(&[
            (ENV_API_KEY, "key"),
            (ENV_UNIVERSE_ID, "42"),
            (ENV_HASH_CONTENT, "maybe"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_file_defaults_hash_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"apiKey": "key", "universeId": "99"}}"#).unwrap();

        let config = ClientConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.universe_id, "99");
        assert!(config.hash_content);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_load_file_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = ClientConfig::load(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, OpenCloudError::Config(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ClientConfig::load("/nonexistent/rbx-open-cloud.json").unwrap_err();
        assert!(matches!(err, OpenCloudError::Io(_)));
    }

    #[test]
    fn test_default_path() {
        if let Some(path) = ClientConfig::default_path() {
            assert!(path.ends_with(".rbx-open-cloud/config.json"));
        }
    }

    #[test]
    fn test_load_from_home_layout() {
        let home = tempfile::tempdir().unwrap();
        let path = config_path_in(home.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"apiKey": "key", "universeId": "7", "hashContent": false}"#).unwrap();

        let config = ClientConfig::load(&path.to_string_lossy()).unwrap();
        assert_eq!(config.universe_id, "7");
        assert!(!config.hash_content);
    }

    #[test]
    fn test_load_default_reads_default_path() {
        let Some(path) = ClientConfig::default_path() else {
            let err = ClientConfig::load_default().unwrap_err();
            assert!(matches!(err, OpenCloudError::Config(_)));
            return;
        };
        if !path.exists() {
            let err = ClientConfig::load_default().unwrap_err();
            assert!(matches!(err, OpenCloudError::Io(_)));
        }
    }
}
