use clap::Parser;
use job_link_logger::Config;
use std::path::PathBuf;

/// Log LinkedIn / Jobindex job links from Gmail into a deduplicated sheet.
#[derive(Parser, Debug)]
#[command(name = "job-link-logger")]
#[command(version)]
#[command(about = "Log LinkedIn / Jobindex job links from Gmail into a sheet.", long_about = None)]
pub struct Cli {
    /// Config file (default: ./job-link-logger.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the link sheet (default: job_links.xlsx)
    #[arg(long)]
    pub excel: Option<PathBuf>,

    /// Path to the processed-IDs state file (default: processed.json)
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Override the Gmail search query
    #[arg(long)]
    pub query: Option<String>,

    /// OAuth client secrets file
    #[arg(long)]
    pub credentials: Option<PathBuf>,

    /// OAuth authorized-user token file
    #[arg(long)]
    pub token: Option<PathBuf>,

    /// Delete the sheet and state, then rebuild from scratch
    #[arg(long)]
    pub reset: bool,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Flags given on the command line win over every other source.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(path) = &self.excel {
            config.sheet_path.clone_from(path);
        }
        if let Some(path) = &self.state {
            config.state_path.clone_from(path);
        }
        if let Some(query) = &self.query {
            config.query = Some(query.clone());
        }
        if let Some(path) = &self.credentials {
            config.credentials_path.clone_from(path);
        }
        if let Some(path) = &self.token {
            config.token_path.clone_from(path);
        }
        if self.reset {
            config.reset = true;
        }
    }
}
