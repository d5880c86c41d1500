use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use svdgrab_pack::HttpClientConfig;

const CONFIG_FILE: &str = "svdgrab.toml";
const HOME_CONFIG_FILE: &str = ".svdgrab.toml";

/// The svdgrab configuration file structure (svdgrab.toml)
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SvdgrabConfig {
    /// Pack index URL
    pub index: Option<String>,

    /// Default destination directory for `fetch`
    pub path: Option<PathBuf>,

    /// Archive path fragment selecting the files to extract
    pub marker: Option<String>,

    /// HTTP client settings
    pub http: HttpConfig,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: Option<String>,

    /// Connection timeout in seconds
    pub connect_timeout: Option<u64>,

    /// Overall request timeout in seconds (none by default)
    pub timeout: Option<u64>,
}

impl SvdgrabConfig {
    /// Resolve the configuration for this invocation.
    ///
    /// An explicit file must exist. Otherwise `svdgrab.toml` is searched
    /// upward from the working directory, then `~/.svdgrab.toml`. Environment
    /// variables are applied on top.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::load_file(path)?,
            None => match Self::load_from_cwd()? {
                Some(config) => config,
                None => Self::load_home()?.unwrap_or_default(),
            },
        };

        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        log::debug!("Using config file {}", path.display());
        Ok(config)
    }

    /// Load configuration from svdgrab.toml, searching upward from the given directory
    pub fn load(start_dir: &Path) -> Result<Option<Self>> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE);

            if config_path.exists() {
                return Self::load_file(&config_path).map(Some);
            }

            // Move to parent directory
            if !current.pop() {
                return Ok(None);
            }
        }
    }

    pub fn load_from_cwd() -> Result<Option<Self>> {
        let cwd = std::env::current_dir()?;
        Self::load(&cwd)
    }

    /// Load `~/.svdgrab.toml` if there is one
    pub fn load_home() -> Result<Option<Self>> {
        let Some(dirs) = directories::BaseDirs::new() else {
            return Ok(None);
        };

        let path = dirs.home_dir().join(HOME_CONFIG_FILE);
        if path.exists() {
            Self::load_file(&path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Override file values with `SVDGRAB_INDEX`, `SVDGRAB_PATH` and `SVDGRAB_MARKER`
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(index) = lookup("SVDGRAB_INDEX") {
            self.index = Some(index);
        }
        if let Some(path) = lookup("SVDGRAB_PATH") {
            self.path = Some(PathBuf::from(path));
        }
        if let Some(marker) = lookup("SVDGRAB_MARKER") {
            self.marker = Some(marker);
        }
        self
    }

    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut config = HttpClientConfig::new();
        if let Some(user_agent) = &self.http.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        if let Some(secs) = self.http.connect_timeout {
            config = config.with_connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.http.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}
