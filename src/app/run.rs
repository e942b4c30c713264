//! One incremental pass: search, skip processed messages, extract links,
//! append unseen ones to the sheet, remember contributing messages.

use super::row::rows_for_message;
use crate::config::Config;
use crate::links::extract_from_message;
use crate::mailbox::Mailbox;
use crate::store::{LinkSheet, ProcessedIds, remove_if_exists};
use crate::error::Result;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Messages returned by the search.
    pub matched: usize,
    /// Already processed on an earlier run.
    pub skipped: usize,
    /// Fetched and scanned for links.
    pub scanned: usize,
    /// Fetch or flatten failures; these stay unprocessed.
    pub failed: usize,
    pub rows_added: usize,
}

/// Delete the sheet and state files. Failures are logged, not returned.
pub fn reset_files(config: &Config) {
    for path in [&config.sheet_path, &config.state_path] {
        match remove_if_exists(path) {
            Ok(true) => info!(path = %path.display(), "reset: removed"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "reset failed"),
        }
    }
}

/// Errors from the sheet, the state file or the search abort the run;
/// a message that cannot be fetched or read is only skipped.
pub async fn run(config: &Config, mailbox: &dyn Mailbox) -> Result<RunSummary> {
    if config.reset {
        reset_files(config);
    }

    let sheet = LinkSheet::ensure(&config.sheet_path)?;
    let mut known = sheet.existing_urls()?;
    let mut processed = ProcessedIds::load(&config.state_path)?;

    let query = config.search_query();
    info!(%query, "searching mailbox");
    let ids = mailbox.search(&query).await?;

    let mut summary = RunSummary {
        matched: ids.len(),
        ..RunSummary::default()
    };
    let mut new_rows = Vec::new();
    let mut newly_processed = Vec::new();

    for id in ids {
        if processed.contains(&id) {
            summary.skipped += 1;
            continue;
        }

        let message = match mailbox.fetch(&id).await {
            Ok(message) => message,
            Err(e) => {
                warn!(message_id = %id, error = %e, "fetch failed, skipping");
                summary.failed += 1;
                continue;
            }
        };
        let urls = match extract_from_message(&message) {
            Ok(urls) => urls,
            Err(e) => {
                warn!(message_id = %id, error = %e, "unreadable message, skipping");
                summary.failed += 1;
                continue;
            }
        };
        summary.scanned += 1;

        let rows = rows_for_message(&id, &message, &urls, &mut known);
        debug!(message_id = %id, found = urls.len(), new = rows.len(), "scanned message");
        if !rows.is_empty() {
            new_rows.extend(rows);
            newly_processed.push(id);
        }
    }

    sheet.append_rows(&new_rows)?;
    processed.extend(newly_processed);
    processed.save(&config.state_path)?;

    summary.rows_added = new_rows.len();
    info!(
        matched = summary.matched,
        skipped = summary.skipped,
        scanned = summary.scanned,
        failed = summary.failed,
        rows_added = summary.rows_added,
        "run complete"
    );
    Ok(summary)
}
