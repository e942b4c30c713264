//! Gmail REST API mailbox.

use super::Mailbox;
use crate::error::MailboxError;
use crate::message::Message;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;

pub const DEFAULT_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
const PAGE_SIZE: u32 = 100;

/// Web UI link for a message.
pub fn permalink(message_id: &str) -> String {
    format!("https://mail.google.com/mail/u/0/#inbox/{message_id}")
}

pub struct GmailClient {
    base_url: String,
    access_token: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

impl GmailClient {
    pub fn new(base_url: &str, access_token: &str) -> Self {
        Self::with_client(base_url, access_token, Client::new())
    }

    pub fn with_client(base_url: &str, access_token: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            client,
        }
    }

    async fn list_page(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<ListResponse, MailboxError> {
        let mut params = vec![
            ("q", query.to_string()),
            ("maxResults", PAGE_SIZE.to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        let response = self
            .client
            .get(format!("{}/messages", self.base_url))
            .bearer_auth(&self.access_token)
            .query(&params)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }
}

#[async_trait]
impl Mailbox for GmailClient {
    async fn search(&self, query: &str) -> Result<Vec<String>, MailboxError> {
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self.list_page(query, page_token.as_deref()).await?;
            ids.extend(page.messages.into_iter().map(|m| m.id));
            tracing::debug!(total = ids.len(), "listed message page");
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(ids)
    }

    async fn fetch(&self, id: &str) -> Result<Message, MailboxError> {
        let response = self
            .client
            .get(format!("{}/messages/{id}", self.base_url))
            .bearer_auth(&self.access_token)
            .query(&[("format", "full")])
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }
}

pub(super) async fn check_status(response: Response) -> Result<Response, MailboxError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(MailboxError::Status { status, body })
}
