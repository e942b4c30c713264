use crate::error::ConfigError;
use crate::links::JobSite;
use crate::mailbox::gmail::DEFAULT_API_BASE;
use directories::UserDirs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SHEET_PATH: &str = "job_links.xlsx";
pub const DEFAULT_STATE_PATH: &str = "processed.json";
pub const DEFAULT_LABEL: &str = "Jobs/LinkedIn";
pub const DEFAULT_DAYS: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Link sheet (xlsx workbook).
    pub sheet_path: PathBuf,
    /// Processed message IDs.
    pub state_path: PathBuf,
    /// Gmail label always included in the search.
    pub label_name: String,
    /// Look-back window of the search, in days.
    pub days: u32,
    /// Explicit search query; replaces the generated one when set.
    pub query: Option<String>,
    /// OAuth client secrets file.
    pub credentials_path: PathBuf,
    /// Authorized-user token file.
    pub token_path: PathBuf,
    pub gmail_api_base: String,
    /// Delete sheet and state before running.
    pub reset: bool,
}

impl Config {
    /// Defaults with credential files under `app_dir`.
    pub fn with_app_dir(app_dir: &Path) -> Self {
        Self {
            sheet_path: PathBuf::from(DEFAULT_SHEET_PATH),
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            label_name: DEFAULT_LABEL.to_string(),
            days: DEFAULT_DAYS,
            query: None,
            credentials_path: app_dir.join("credentials.json"),
            token_path: app_dir.join("token.json"),
            gmail_api_base: DEFAULT_API_BASE.to_string(),
            reset: false,
        }
    }

    /// `~/.config/job-link-logger`
    pub fn default_app_dir() -> Result<PathBuf, ConfigError> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .ok_or(ConfigError::NoHome)?;
        Ok(home.join(".config").join("job-link-logger"))
    }

    /// The Gmail search to run: the explicit query, or the label OR any
    /// supported job-site marker, limited to the last `days` days.
    pub fn search_query(&self) -> String {
        if let Some(query) = self.query.as_deref().filter(|q| !q.trim().is_empty()) {
            return query.to_string();
        }
        format!(
            "(label:\"{}\" OR ({})) newer_than:{}d",
            self.label_name,
            JobSite::search_terms(),
            self.days
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days == 0 {
            return Err(ConfigError::Validation("days must be at least 1".into()));
        }
        if self.sheet_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation("sheet path is empty".into()));
        }
        if self.state_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation("state path is empty".into()));
        }
        if self.sheet_path == self.state_path {
            return Err(ConfigError::Validation(
                "sheet and state must be different files".into(),
            ));
        }
        Ok(())
    }
}
