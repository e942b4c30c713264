#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use job_link_logger::error::MailboxError;
use job_link_logger::mailbox::Mailbox;
use job_link_logger::message::{Header, Message, Part, PartBody};

/// In-memory mailbox: every message matches every query, in insertion order.
#[derive(Default)]
pub struct FakeMailbox {
    order: Vec<String>,
    messages: HashMap<String, Message>,
    broken: Vec<String>,
    search_fails: bool,
    fetched: Mutex<Vec<String>>,
    queries: Mutex<Vec<String>>,
}

impl FakeMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, message: Message) -> Self {
        self.order.push(message.id.clone());
        self.messages.insert(message.id.clone(), message);
        self
    }

    /// Listed by search, but fetching it fails.
    pub fn with_broken(mut self, id: &str) -> Self {
        self.order.push(id.to_string());
        self.broken.push(id.to_string());
        self
    }

    /// Every search fails.
    pub fn with_failing_search(mut self) -> Self {
        self.search_fails = true;
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailbox for FakeMailbox {
    async fn search(&self, query: &str) -> Result<Vec<String>, MailboxError> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.search_fails {
            return Err(MailboxError::Auth("invalid_grant".into()));
        }
        Ok(self.order.clone())
    }

    async fn fetch(&self, id: &str) -> Result<Message, MailboxError> {
        self.fetched.lock().unwrap().push(id.to_string());
        if self.broken.iter().any(|b| b == id) {
            return Err(MailboxError::Auth("token revoked".into()));
        }
        self.messages
            .get(id)
            .cloned()
            .ok_or_else(|| MailboxError::Auth(format!("unknown message {id}")))
    }
}

pub fn encode(text: &str) -> String {
    URL_SAFE_NO_PAD.encode(text)
}

pub fn text_part(mime: &str, text: &str) -> Part {
    Part {
        mime_type: mime.into(),
        body: PartBody {
            size: text.len() as u64,
            data: Some(encode(text)),
            attachment_id: None,
        },
        ..Part::default()
    }
}

/// `multipart/alternative` message with a plain and an HTML body.
pub fn job_alert(id: &str, subject: &str, plain: &str, html: &str) -> Message {
    Message {
        id: id.into(),
        thread_id: id.into(),
        payload: Some(Part {
            mime_type: "multipart/alternative".into(),
            headers: vec![
                header("Subject", subject),
                header("From", "LinkedIn Job Alerts <jobalerts-noreply@linkedin.com>"),
                header("Date", "Mon, 06 Oct 2025 08:15:00 +0000"),
            ],
            parts: vec![text_part("text/plain", plain), text_part("text/html", html)],
            ..Part::default()
        }),
        ..Message::default()
    }
}

pub fn header(name: &str, value: &str) -> Header {
    Header {
        name: name.into(),
        value: value.into(),
    }
}
