use super::Config;
use crate::error::ConfigError;
use std::path::PathBuf;

const ENV_PREFIX: &str = "JOB_LINK_LOGGER_";

impl Config {
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_env_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`. The prefixed form of each
    /// variable (`JOB_LINK_LOGGER_DAYS`) wins over the bare one (`DAYS`).
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |names: &[&str]| {
            names.iter().find_map(|name| {
                lookup(&format!("{ENV_PREFIX}{name}"))
                    .or_else(|| lookup(name))
                    .filter(|v| !v.trim().is_empty())
            })
        };

        if let Some(path) = var(&["SHEET_PATH", "EXCEL_PATH"]) {
            self.sheet_path = PathBuf::from(path);
        }
        if let Some(path) = var(&["STATE_PATH"]) {
            self.state_path = PathBuf::from(path);
        }
        if let Some(label) = var(&["LABEL_NAME"]) {
            self.label_name = label;
        }
        if let Some(days) = var(&["DAYS"]) {
            self.days = days.trim().parse().map_err(|_| {
                ConfigError::Validation(format!("DAYS must be a positive integer, got {days:?}"))
            })?;
        }
        if let Some(query) = var(&["QUERY"]) {
            self.query = Some(query);
        }
        if let Some(path) = var(&["CREDENTIALS_PATH"]) {
            self.credentials_path = PathBuf::from(path);
        }
        if let Some(path) = var(&["TOKEN_PATH"]) {
            self.token_path = PathBuf::from(path);
        }
        Ok(())
    }
}
