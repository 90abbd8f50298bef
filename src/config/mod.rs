use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const ENV_ENDPOINT: &str = "MULTIBAAS_DEPLOYMENT_URL";
pub const ENV_API_KEY: &str = "MULTIBAAS_DAPP_USER_API_KEY";
pub const ENV_CONTRACT_LABEL: &str = "MULTIBAAS_CONTRACT_NAME";
pub const ENV_ADDRESS_ALIAS: &str = "MULTIBAAS_CONTRACT_ADDRESS";
pub const ENV_CHAIN: &str = "MULTIBAAS_CHAIN";
pub const ENV_TIMEOUT: &str = "MULTIBAAS_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Gateway and contract identity. Immutable once handed to a vault.
#[derive(Clone, Default, Deserialize)]
pub struct Config {
    /// Deployment base URL, e.g. `https://abc123.multibaas.com`
    #[serde(default)]
    pub endpoint: String,

    /// DApp user API key, sent as a bearer token
    #[serde(default)]
    pub api_key: String,

    /// Contract label registered with the gateway (usually `lock`)
    #[serde(default)]
    pub contract_label: String,

    /// Address alias the gateway resolves to the deployed contract
    #[serde(default)]
    pub address_alias: String,

    /// Chain identifier, e.g. `ethereum`
    #[serde(default)]
    pub chain: String,

    /// Per-request timeout; 10 seconds when unset
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() {
            "<missing>"
        } else {
            "<redacted>"
        };
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("api_key", &api_key)
            .field("contract_label", &self.contract_label)
            .field("address_alias", &self.address_alias)
            .field("chain", &self.chain)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Config {
    /// True when every required field is non-empty; no call may be made otherwise.
    pub fn is_configured(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Names of required fields that are empty, in declaration order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("endpoint", &self.endpoint),
            ("api_key", &self.api_key),
            ("contract_label", &self.contract_label),
            ("address_alias", &self.address_alias),
            ("chain", &self.chain),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Overlay values from the process environment
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay trimmed values from `lookup`; blank values leave the field untouched.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get(ENV_ENDPOINT) {
            self.endpoint = v;
        }
        if let Some(v) = get(ENV_API_KEY) {
            self.api_key = v;
        }
        if let Some(v) = get(ENV_CONTRACT_LABEL) {
            self.contract_label = v;
        }
        if let Some(v) = get(ENV_ADDRESS_ALIAS) {
            self.address_alias = v;
        }
        if let Some(v) = get(ENV_CHAIN) {
            self.chain = v;
        }
        if let Some(v) = get(ENV_TIMEOUT) {
            let secs = v.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_TIMEOUT,
                value: v.clone(),
            })?;
            self.request_timeout_secs = Some(secs);
        }
        Ok(self)
    }

    /// Strip surrounding whitespace from every field, so a padded value is
    /// neither sent as part of a URL nor mistaken for a present one.
    pub fn trimmed(self) -> Self {
        let trim = |value: String| value.trim().to_string();
        Self {
            endpoint: trim(self.endpoint),
            api_key: trim(self.api_key),
            contract_label: trim(self.contract_label),
            address_alias: trim(self.address_alias),
            chain: trim(self.chain),
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}

/// Parse a TOML document into a config
pub fn parse(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(content).map(Config::trimmed)
}

/// Load the config file, if any. A missing file is an empty config.
pub fn load() -> Result<Config, ConfigError> {
    match config_path() {
        Some(path) => load_from(&path),
        None => Ok(Config::default()),
    }
}

pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("LOCKBOX_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("lockbox").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("lockbox").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "lockbox", "lockbox")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
