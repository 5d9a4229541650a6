//! Client config load/save for `~/.cite-qa/config.yaml`.
//! Sections: `api.*` (backend endpoint) and `log.*` (tracing filter and sink).

use std::path::{Path, PathBuf};

/// Backend base URL used when the config does not name one.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
/// Ask endpoint path used when the config does not name one.
pub const DEFAULT_ASK_PATH: &str = "/api/ask";
/// Env var that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "CITE_QA_CONFIG";

/// API section (base_url, ask_path).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ApiSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ask_path: Option<String>,
}

/// Log section (level, file).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LogSection {
    /// `EnvFilter` directive, e.g. `info` or `cite_qa_client=debug`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Full config file.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub log: LogSection,
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.api.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn ask_path(&self) -> &str {
        self.api.ask_path.as_deref().unwrap_or(DEFAULT_ASK_PATH)
    }

    /// Copy with every unset field filled from the defaults (for `--init-config`).
    pub fn with_defaults(&self) -> Config {
        Config {
            api: ApiSection {
                base_url: Some(self.base_url().to_string()),
                ask_path: Some(self.ask_path().to_string()),
            },
            log: self.log.clone(),
        }
    }
}

/// Returns the default config file path: `~/.cite-qa/config.yaml` (platform-specific).
pub fn default_config_path() -> Option<PathBuf> {
    let home = home_dir()?;
    Some(home.join(".cite-qa").join("config.yaml"))
}

#[cfg(unix)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(windows)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE").map(PathBuf::from)
}

#[cfg(not(any(unix, windows)))]
fn home_dir() -> Option<PathBuf> {
    None
}

/// Where the config came from; decides whether a missing file is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` flag or `CITE_QA_CONFIG`. Must exist.
    Explicit(PathBuf),
    /// `~/.cite-qa/config.yaml`. Falls back to defaults when absent.
    Default(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::Explicit(p) | ConfigSource::Default(p) => p,
        }
    }
}

/// Resolve the config location: explicit flag, then env var, then default path.
pub fn resolve_config_path(flag: Option<&Path>) -> Result<ConfigSource, ConfigError> {
    if let Some(p) = flag {
        return Ok(ConfigSource::Explicit(p.to_path_buf()));
    }
    if let Some(val) = std::env::var_os(CONFIG_ENV_VAR) {
        return Ok(ConfigSource::Explicit(PathBuf::from(val)));
    }
    default_config_path()
        .map(ConfigSource::Default)
        .ok_or(ConfigError::NoHome)
}

/// Load config from a YAML file. Path is typically `~/.cite-qa/config.yaml`.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound(path.to_path_buf())
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load from `source`; a missing default file yields `Config::default()`.
pub fn load_from(source: &ConfigSource) -> Result<Config, ConfigError> {
    match (source, load(source.path())) {
        (ConfigSource::Default(path), Err(ConfigError::NotFound(_))) => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Config::default())
        }
        (_, result) => result,
    }
}

/// Save config to a YAML file. Creates parent directory if missing.
pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    let contents = serde_yaml::to_string(config).map_err(ConfigError::Serialize)?;
    std::fs::write(path, contents).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Config load/save error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("cannot serialize config: {0}")]
    Serialize(#[source] serde_yaml::Error),
    #[error("unable to determine config path (set --config or CITE_QA_CONFIG)")]
    NoHome,
}
