use super::Config;
use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Looked up in the working directory unless `--config` names another file.
pub const CONFIG_FILE: &str = "job-link-logger.toml";

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    job_link_logger: FileOverrides,
}

/// Keys accepted in the `[job_link_logger]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileOverrides {
    #[serde(alias = "sheet")]
    pub excel: Option<PathBuf>,
    pub state: Option<PathBuf>,
    pub query: Option<String>,
    pub credentials: Option<PathBuf>,
    pub token: Option<PathBuf>,
    pub label_name: Option<String>,
    pub days: Option<u32>,
    pub gmail_api_base: Option<String>,
    pub reset: Option<bool>,
}

impl FileOverrides {
    /// Read the table from `path`. A missing file is `None` unless `required`.
    pub fn read(path: &Path, required: bool) -> Result<Option<Self>, ConfigError> {
        if !required && !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(file.job_link_logger))
    }
}

impl Config {
    /// Defaults, then environment, then the config file. Creates the app
    /// directory holding the OAuth files. Not validated: command-line flags
    /// still apply on top, so callers run [`Config::validate`] last.
    pub fn load(explicit: Option<&Path>) -> crate::Result<Self> {
        let app_dir = Self::default_app_dir()?;
        fs::create_dir_all(&app_dir).map_err(|source| ConfigError::Read {
            path: app_dir.clone(),
            source,
        })?;
        Ok(Self::load_from(&app_dir, explicit, |key| {
            std::env::var(key).ok()
        })?)
    }

    pub fn load_from<F>(
        app_dir: &Path,
        explicit: Option<&Path>,
        env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::with_app_dir(app_dir);
        config.apply_env_overrides_from(env)?;

        let path = explicit.unwrap_or(Path::new(CONFIG_FILE));
        if let Some(file) = FileOverrides::read(path, explicit.is_some())? {
            tracing::debug!(path = %path.display(), "applying config file");
            config.apply_file(file);
        }
        Ok(config)
    }

    pub fn apply_file(&mut self, file: FileOverrides) {
        if let Some(path) = file.excel {
            self.sheet_path = path;
        }
        if let Some(path) = file.state {
            self.state_path = path;
        }
        if let Some(query) = file.query {
            self.query = Some(query);
        }
        if let Some(path) = file.credentials {
            self.credentials_path = path;
        }
        if let Some(path) = file.token {
            self.token_path = path;
        }
        if let Some(label) = file.label_name {
            self.label_name = label;
        }
        if let Some(days) = file.days {
            self.days = days;
        }
        if let Some(base) = file.gmail_api_base {
            self.gmail_api_base = base;
        }
        if let Some(reset) = file.reset {
            self.reset = reset;
        }
    }
}
