pub mod auth;
pub mod consent;
pub mod gmail;

use crate::error::MailboxError;
use crate::message::Message;
use async_trait::async_trait;

pub use auth::{AuthorizedUser, GmailAuth};
pub use gmail::{GmailClient, permalink};

/// Source of mail items: search by query, then fetch each match in full.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Identifiers of every message matching `query`, across all result pages.
    async fn search(&self, query: &str) -> Result<Vec<String>, MailboxError>;

    /// Full message with headers and the MIME part tree.
    async fn fetch(&self, id: &str) -> Result<Message, MailboxError>;
}
