#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

use anyhow::{Context, Result};
use clap::Parser;
use job_link_logger::{Config, GmailAuth, GmailClient};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    // Optional .env next to the binary's working directory.
    let _ = dotenvy::dotenv();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    cli.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;

    let auth = GmailAuth::new(&config.token_path, &config.credentials_path);
    let token = auth
        .access_token()
        .await
        .context("Failed to obtain Gmail access token")?;
    let mailbox = GmailClient::new(&config.gmail_api_base, &token);

    let summary = job_link_logger::run(&config, &mailbox)
        .await
        .context("Run failed")?;
    println!(
        "Done. Added {} new rows to {}.",
        summary.rows_added,
        config.sheet_path.display()
    );
    Ok(())
}
