use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::messages::Messages;
use crate::store::CartOptions;

/// Storage key the cart blob lives under.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Errors loading a [`CartConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot render config: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Language of the built-in user-facing messages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "pt-BR")]
    PortugueseBrazil,
}

impl Locale {
    pub fn messages(self) -> Messages {
        match self {
            Self::English => Messages::english(),
            Self::PortugueseBrazil => Messages::pt_br(),
        }
    }
}

/// Cart configuration, usually read from a TOML file.
///
/// Every field is optional in the file; missing fields take their defaults.
///
/// ```toml
/// storage_key = "@RocketShoes:cart"
/// data_dir = ".rocketcart"
/// api_url = "http://localhost:3333"
/// request_timeout_secs = 10
/// locale = "pt-BR"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Key the cart blob is stored under.
    pub storage_key: String,
    /// Directory for the file-backed store.
    pub data_dir: PathBuf,
    /// Base URL of the inventory service.
    pub api_url: String,
    /// Per-request timeout for inventory calls.
    pub request_timeout_secs: u64,
    pub locale: Locale,
    /// Overrides the locale's built-in messages when set.
    pub messages: Option<Messages>,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.into(),
            data_dir: PathBuf::from(".rocketcart"),
            api_url: "http://localhost:3333".into(),
            request_timeout_secs: 10,
            locale: Locale::default(),
            messages: None,
        }
    }
}

impl CartConfig {
    /// Read a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Read a config file if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Messages in effect: explicit overrides, else the locale's.
    pub fn messages(&self) -> Messages {
        self.messages
            .clone()
            .unwrap_or_else(|| self.locale.messages())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Cart store options derived from this config.
    pub fn options(&self) -> CartOptions {
        CartOptions {
            storage_key: self.storage_key.clone(),
            messages: self.messages(),
        }
    }
}
