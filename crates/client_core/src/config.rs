use std::{fs, io, path::Path, str::FromStr, time::Duration};

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "todo.toml";

/// What `list` does when the store call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListFallback {
    #[default]
    Propagate,
    /// Serve a fixed placeholder list instead of the error.
    Placeholder,
}

impl FromStr for ListFallback {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "propagate" => Ok(Self::Propagate),
            "placeholder" => Ok(Self::Placeholder),
            _ => Err(ConfigError::InvalidListFallback(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub server_url: String,
    pub port: Option<u16>,
    pub list_fallback: ListFallback,
    pub request_timeout: Option<Duration>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost".into(),
            port: Some(4000),
            list_fallback: ListFallback::Propagate,
            request_timeout: None,
        }
    }
}

impl StoreSettings {
    /// `<server_url>:<port>`, parsed. A port given here overrides one
    /// embedded in `server_url`.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = self.server_url.trim();
        let mut url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
            url: raw.to_string(),
            source,
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::NotABaseUrl(raw.to_string()));
        }
        if let Some(port) = self.port {
            url.set_port(Some(port))
                .map_err(|()| ConfigError::NotABaseUrl(raw.to_string()))?;
        }
        Ok(url)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    port: Option<u16>,
    list_fallback: Option<ListFallback>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then `todo.toml` in the working directory, then the process
/// environment.
pub fn load_settings() -> Result<StoreSettings, ConfigError> {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<StoreSettings, ConfigError> {
    let mut settings = StoreSettings::default();

    if let Some(file_cfg) = read_file_settings(path)? {
        if let Some(v) = file_cfg.server_url {
            settings.server_url = v;
        }
        if let Some(v) = file_cfg.port {
            settings.port = Some(v);
        }
        if let Some(v) = file_cfg.list_fallback {
            settings.list_fallback = v;
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            settings.request_timeout = timeout_from_secs(v);
        }
    }

    if let Some(v) = env("SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = env("PORT") {
        settings.port = parse_port(&v)?;
    }
    if let Some(v) = env("APP__PORT") {
        settings.port = parse_port(&v)?;
    }

    if let Some(v) = env("APP__LIST_FALLBACK") {
        settings.list_fallback = v.parse()?;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        let secs = v
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidTimeout(v.clone()))?;
        settings.request_timeout = timeout_from_secs(secs);
    }

    Ok(settings)
}

/// An empty value clears the port so `server_url` is used as given.
pub fn parse_port(raw: &str) -> Result<Option<u16>, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u16>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidPort(raw.to_string()))
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn read_file_settings(path: &Path) -> Result<Option<FileSettings>, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    toml::from_str(&raw)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
