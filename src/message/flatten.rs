//! Projection of a MIME part tree onto its plain-text and HTML bodies.

use super::types::{Message, Part};
use crate::error::MessageError;
use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

/// Gmail emits URL-safe base64, sometimes padded and sometimes not.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decoded text bodies of one message, each joined with `\n` in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyText {
    pub plain: String,
    pub html: String,
}

/// Flatten a message's part tree.
///
/// Only a message without any payload is an error; undecodable parts are
/// skipped individually.
pub fn flatten(message: &Message) -> Result<BodyText, MessageError> {
    let payload = message
        .payload
        .as_ref()
        .ok_or_else(|| MessageError::MissingPayload {
            id: message.id.clone(),
        })?;
    Ok(flatten_part(payload))
}

pub fn flatten_part(root: &Part) -> BodyText {
    let mut plain = Vec::new();
    let mut html = Vec::new();

    // Pre-order: push children reversed so the first child is popped next.
    let mut stack = vec![root];
    while let Some(part) = stack.pop() {
        if let Some(text) = decode_part(part) {
            match part.media_type().as_str() {
                "text/plain" => plain.push(text),
                "text/html" => html.push(text),
                _ => {}
            }
        }
        stack.extend(part.parts.iter().rev());
    }

    BodyText {
        plain: plain.join("\n"),
        html: html.join("\n"),
    }
}

fn decode_part(part: &Part) -> Option<String> {
    let data = part.body.data.as_deref().filter(|d| !d.is_empty())?;
    match PAYLOAD_ENGINE.decode(data.trim()) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            tracing::debug!(
                part_id = %part.part_id,
                mime_type = %part.mime_type,
                error = %e,
                "skipping undecodable part"
            );
            None
        }
    }
}
