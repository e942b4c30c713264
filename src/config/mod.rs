mod env_overrides;
mod loader;
mod types;

pub use loader::{CONFIG_FILE, FileOverrides};
pub use types::{Config, DEFAULT_DAYS, DEFAULT_LABEL, DEFAULT_SHEET_PATH, DEFAULT_STATE_PATH};
