//! Configuration for the reporting core.
//!
//! Cooldown policy is fixed and deliberately absent here.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::feed::DEFAULT_MEDIA_URL_EXPIRY_SECS;
use crate::storage::models::DEFAULT_PAGE_SIZE;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "REPORTGUARD_";

/// Moderator code used when none is configured.
pub const DEFAULT_MODERATOR_CODE: &str = "reportguard-admin";

/// Default directory for the file-backed secure store
pub fn default_cooldown_dir() -> PathBuf {
    env::temp_dir().join("reportguard")
}

fn default_moderator_code() -> String {
    DEFAULT_MODERATOR_CODE.to_string()
}

fn default_media_url_expiry_secs() -> u64 {
    DEFAULT_MEDIA_URL_EXPIRY_SECS
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Persistence backend base URL
    #[serde(default)]
    pub backend_url: String,

    /// Public (anonymous) API key for the backend
    #[serde(default)]
    pub anon_key: String,

    /// Expose the moderation gate at all
    #[serde(default)]
    pub moderation_enabled: bool,

    /// Shared moderator code
    #[serde(default = "default_moderator_code")]
    pub moderator_code: String,

    /// Directory holding the cooldown history record
    #[serde(default = "default_cooldown_dir")]
    pub cooldown_dir: PathBuf,

    /// Lifetime of signed media URLs
    #[serde(default = "default_media_url_expiry_secs")]
    pub media_url_expiry_secs: u64,

    /// Feed page size
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: String::new(),
            anon_key: String::new(),
            moderation_enabled: false,
            moderator_code: default_moderator_code(),
            cooldown_dir: default_cooldown_dir(),
            media_url_expiry_secs: default_media_url_expiry_secs(),
            page_size: default_page_size(),
        }
    }
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parse a JSON config document; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Config = serde_json::from_str(json)?;
        if config.moderator_code.trim().is_empty() {
            config.moderator_code = default_moderator_code();
        }
        Ok(config)
    }

    /// Load from any key lookup (unprefixed names are prefixed here).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| -> Option<String> {
            lookup(&format!("{}{}", ENV_PREFIX, name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Config::default();

        if let Some(url) = get("BACKEND_URL") {
            config.backend_url = url;
        }
        config.anon_key = select_anon_key(&[get("ANON_KEY"), get("KEY")]);
        config.moderation_enabled = get("MODERATION_ENABLED").as_deref() == Some("true");
        if let Some(code) = get("MODERATOR_CODE") {
            config.moderator_code = code;
        }
        if let Some(dir) = get("COOLDOWN_DIR") {
            config.cooldown_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get("MEDIA_URL_EXPIRY_SECS") {
            config.media_url_expiry_secs = parse_number("MEDIA_URL_EXPIRY_SECS", &raw)?;
        }
        if let Some(raw) = get("PAGE_SIZE") {
            config.page_size = parse_number("PAGE_SIZE", &raw)?;
        }

        log::debug!(
            "CONFIG_LOADED backend_url_set={} anon_key_set={} moderation_enabled={}",
            !config.backend_url.is_empty(),
            !config.anon_key.is_empty(),
            config.moderation_enabled
        );
        Ok(config)
    }
}

/// Prefer a JWT-shaped key (`eyJ...`); otherwise the first non-blank one.
fn select_anon_key(candidates: &[Option<String>]) -> String {
    let present: Vec<&String> = candidates.iter().flatten().collect();
    present
        .iter()
        .find(|k| k.starts_with("eyJ"))
        .or_else(|| present.first())
        .map(|k| k.to_string())
        .unwrap_or_default()
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        key: format!("{}{}", ENV_PREFIX, name),
        value: raw.to_string(),
    })
}
