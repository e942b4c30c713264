//! Read-only view of a mail item as returned by the Gmail API `format=full`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub label_ids: Vec<String>,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub payload: Option<Part>,
}

/// One node of the MIME part tree.
///
/// Container parts (`multipart/*`) usually carry no body data, only children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default)]
    pub part_id: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: PartBody,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartBody {
    #[serde(default)]
    pub size: u64,
    /// URL-safe base64 payload.
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub attachment_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Message {
    /// First top-level header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload.as_ref().and_then(|p| p.header(name))
    }

    pub fn subject(&self) -> &str {
        self.header("Subject").unwrap_or_default()
    }

    pub fn sender(&self) -> &str {
        self.header("From").unwrap_or_default()
    }

    pub fn date(&self) -> &str {
        self.header("Date").unwrap_or_default()
    }
}

impl Part {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Media type without parameters, lowercased (`Text/HTML; charset=x` → `text/html`).
    pub fn media_type(&self) -> String {
        self.mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(name: &str, value: &str) -> Header {
        Header {
            name: name.into(),
            value: value.into(),
        }
    }

    #[test]
    fn header_lookup_is_case_insensitive_and_first_wins() {
        let msg = Message {
            id: "m1".into(),
            payload: Some(Part {
                headers: vec![
                    header("SUBJECT", "first"),
                    header("subject", "second"),
                    header("From", "Jobs <jobs@linkedin.com>"),
                ],
                ..Part::default()
            }),
            ..Message::default()
        };
        assert_eq!(msg.subject(), "first");
        assert_eq!(msg.header("from"), Some("Jobs <jobs@linkedin.com>"));
        assert_eq!(msg.date(), "");
    }

    #[test]
    fn missing_payload_has_no_headers() {
        let msg = Message {
            id: "m1".into(),
            ..Message::default()
        };
        assert_eq!(msg.header("Subject"), None);
        assert_eq!(msg.subject(), "");
    }

    #[test]
    fn media_type_drops_parameters() {
        let part = Part {
            mime_type: "Text/HTML; charset=\"utf-8\"".into(),
            ..Part::default()
        };
        assert_eq!(part.media_type(), "text/html");
    }

    #[test]
    fn deserializes_gmail_full_format() {
        let json = r#"{
            "id": "18c0",
            "threadId": "18c0",
            "labelIds": ["INBOX"],
            "payload": {
                "partId": "",
                "mimeType": "multipart/alternative",
                "headers": [{"name": "Subject", "value": "New jobs"}],
                "body": {"size": 0},
                "parts": [
                    {"partId": "0", "mimeType": "text/plain", "body": {"size": 5, "data": "aGVsbG8"}}
                ]
            }
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.thread_id, "18c0");
        assert_eq!(msg.subject(), "New jobs");
        let payload = msg.payload.unwrap();
        assert_eq!(payload.parts.len(), 1);
        assert_eq!(payload.parts[0].body.data.as_deref(), Some("aGVsbG8"));
        assert!(payload.body.data.is_none());
    }
}
